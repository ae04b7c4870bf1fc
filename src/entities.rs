/// All game entity types — pure data, no logic.

// ── Loot & upgrades ───────────────────────────────────────────────────────────

/// Loot rarity attached to every 4th snake segment.  The tier indexes the
/// 3-entry value table of each upgrade kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreasureTier {
    None,
    Common,
    Epic,
    Legendary,
}

/// The six upgradeable player stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeKind {
    /// Bullets fired per volley.
    BulletCount,
    /// Volleys per second.
    FireRate,
    /// Segments a single bullet can pass through.
    Penetration,
    /// Chance per hit to slow the whole snake for a second.
    SlowOnHit,
    /// Fraction of damage dealt returned as healing.
    Lifesteal,
    /// Extra milliseconds added to each shield activation.
    ShieldDuration,
}

impl UpgradeKind {
    /// HUD/menu label for this stat.
    pub fn label(&self) -> &'static str {
        match self {
            UpgradeKind::BulletCount => "Bullets",
            UpgradeKind::FireRate => "Fire rate",
            UpgradeKind::Penetration => "Penetration",
            UpgradeKind::SlowOnHit => "Slow chance",
            UpgradeKind::Lifesteal => "Lifesteal",
            UpgradeKind::ShieldDuration => "Shield time",
        }
    }
}

/// One selectable entry of an open upgrade menu.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpgradeChoice {
    pub kind: UpgradeKind,
    pub value: f64,
}

/// The three choices offered when a treasure segment dies, tagged with the
/// tier that rolled them so the menu can colour itself accordingly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpgradeOffer {
    pub tier: TreasureTier,
    pub choices: [UpgradeChoice; 3],
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct PlayerBullet {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Remaining segments this bullet can hit before it is consumed.
    pub penetration: i32,
    pub damage: i32,
}

#[derive(Clone, Debug)]
pub struct EnemyBullet {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub damage: i32,
}

// ── Particles (render-only) ───────────────────────────────────────────────────

/// What a particle burst marks — the renderer picks a colour from this,
/// gameplay never reads it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    SegmentHit,
    PlayerHit,
    ShieldBlock,
    Contact,
}

/// Cosmetic decay-over-time token.  Safe to ignore entirely.
#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Remaining life in [0, 1]; the particle dies at 0.
    pub life: f64,
    pub decay: f64,
    pub size: f64,
    pub kind: ParticleKind,
}

// ── Snake ─────────────────────────────────────────────────────────────────────

/// One destructible unit of the snake.  Health is not clamped at zero —
/// overkill leaves it negative and the segment simply becomes inert.
#[derive(Clone, Debug)]
pub struct Segment {
    pub x: f64,
    pub y: f64,
    pub health: i32,
    pub max_health: i32,
    /// Spawn order; drives the S-path amplitude and never changes.
    pub index: u32,
    pub treasure: TreasureTier,
}

impl Segment {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Health fraction for HUD bars, clamped to [0, 1] for display only.
    pub fn health_ratio(&self) -> f64 {
        (self.health.max(0) as f64 / self.max_health as f64).min(1.0)
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    /// Collision radius.
    pub size: f64,
    /// Bullets per volley.
    pub bullets: u32,
    /// Volleys per second.
    pub fire_rate: f64,
    pub penetration: i32,
    /// Chance in [0, 1] that a hit slows the snake.
    pub slow_on_hit_chance: f64,
    /// Fraction in [0, 1] of damage dealt returned as healing.
    pub lifesteal: f64,
    /// Extra shield duration granted by upgrades.
    pub shield_bonus_ms: f64,
    pub shield_active: bool,
    pub shield_until_ms: f64,
    pub shield_cooldown_until_ms: f64,
    /// Fractional lifesteal accumulator — healing is paid out in whole
    /// points, the remainder stays banked.
    pub lifesteal_bank: f64,
}

// ── Phase ─────────────────────────────────────────────────────────────────────

/// Top-level simulation phase, consulted once at the head of `tick`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    Playing,
    /// Modal: a treasure segment died and the player must pick an upgrade.
    /// All simulation advance is suspended until the choice arrives.
    UpgradeMenuOpen,
    /// Between-level banner; the next snake spawns once `until_ms` passes.
    LevelTransition { until_ms: f64 },
    Won,
    Lost,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire game state.  Cloneable so pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: Player,
    /// Spawn-ordered segments; the first live one is the head.
    pub snake: Vec<Segment>,
    pub bullets: Vec<PlayerBullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub particles: Vec<Particle>,
    pub score: u32,
    /// The highest score seen so far (updated live during play).
    pub high_score: u32,
    pub level: u32,
    /// Shared health pool; the player loses the moment it reaches zero.
    pub health: i32,
    pub phase: Phase,
    pub total_segments: u32,
    pub defeated_segments: u32,
    /// Ms until the next volley may fire (shared by auto-fire and the
    /// explicit fire event).
    pub bullet_cooldown_ms: f64,
    /// Ms until the level-1 boss fires again.
    pub boss_fire_cooldown_ms: f64,
    /// Global slow window: the snake moves at `slow_speed` until this passes.
    pub slow_until_ms: f64,
    pub slow_speed: f64,
    pub spawn_invincible_until_ms: f64,
    /// The three pending choices while the upgrade menu is open.
    pub offer: Option<UpgradeOffer>,
    /// Timestamp of the previous tick; Δt derives from it.
    pub last_time_ms: f64,
    pub width: f64,
    pub height: f64,
}

impl GameState {
    /// The first still-alive segment — the snake's head.  Derived on demand;
    /// O(n) is fine for n ≈ 80–155.
    pub fn head_segment(&self) -> Option<&Segment> {
        self.snake.iter().find(|s| s.is_alive())
    }

    pub fn shield_active_at(&self, now_ms: f64) -> bool {
        self.player.shield_active && now_ms < self.player.shield_until_ms
    }

    /// Whole seconds of shield cooldown left, 0 when ready.
    pub fn shield_cooldown_remaining_s(&self, now_ms: f64) -> u32 {
        let remain = self.player.shield_cooldown_until_ms - now_ms;
        if remain <= 0.0 {
            0
        } else {
            (remain / 1000.0).ceil() as u32
        }
    }
}
