/// Pure game-logic functions.
///
/// Every public function takes an immutable reference to the current
/// `GameState` (and, where needed, a timestamp and an RNG handle) and returns
/// a brand-new `GameState`.  Side effects are limited to the injected RNG, so
/// callers control determinism — the binary passes `thread_rng()`, tests pass
/// a seeded `StdRng`.
///
/// Time is an absolute millisecond clock supplied by the caller.  All timed
/// effects (shield, slow, spawn invincibility, transitions) are "effective
/// until timestamp T" comparisons, never countdowns, so refreshing a window
/// needs no reset logic.

use rand::Rng;

use crate::entities::{
    EnemyBullet, GameState, Particle, ParticleKind, Phase, Player, PlayerBullet, Segment,
    TreasureTier, UpgradeChoice, UpgradeKind, UpgradeOffer,
};

// ── World constants ──────────────────────────────────────────────────────────

pub const PLAYER_SIZE: f64 = 30.0;
pub const BULLET_SIZE: f64 = 5.0;
pub const SEGMENT_SIZE: f64 = 20.0;
/// Baseline snake descent in px per millisecond.
pub const SNAKE_SPEED: f64 = 0.005;
/// Descent speed while a global slow is in effect.
pub const SLOW_SNAKE_SPEED: f64 = 0.0035;
pub const SLOW_DURATION_MS: f64 = 1000.0;
/// Player bullet speed in px per tick.
pub const BULLET_SPEED: f64 = 8.0;
pub const BULLET_DAMAGE: i32 = 25;
pub const CONTACT_DAMAGE: i32 = 10;
pub const SCORE_PER_SEGMENT: u32 = 10;

pub const ENEMY_BULLET_SIZE: f64 = 4.0;
pub const ENEMY_BULLET_SPEED: f64 = 4.0;
pub const ENEMY_BULLET_DAMAGE: i32 = 12;

/// Every 4th segment carries treasure.
pub const TREASURE_INTERVAL: u32 = 4;
pub const BASE_SEGMENT_HEALTH: i32 = 5;
pub const HEALTH_PER_SEGMENT: i32 = 20;

pub const BOSS_FIRE_BASE_INTERVAL_MS: f64 = 1200.0;
pub const BOSS_FIRE_MIN_INTERVAL_MS: f64 = 450.0;
/// First volley of a level comes slightly late.
pub const BOSS_FIRE_FIRST_DELAY_MS: f64 = 600.0;
pub const BOSS_SPREAD_STEP_RAD: f64 = 0.12;
pub const BOSS_MAX_VOLLEY: u32 = 7;
/// One extra volley bullet per this many defeated segments.
pub const BOSS_VOLLEY_RAMP: u32 = 20;
/// Ms shaved off the boss cooldown per defeated segment.
pub const BOSS_INTERVAL_REDUCTION_MS: f64 = 30.0;

pub const MAX_LEVEL: u32 = 5;
/// Canonical health cap and starting value.
pub const MAX_HEALTH: i32 = 100;
pub const SHIELD_BASE_MS: f64 = 3000.0;
pub const SHIELD_COOLDOWN_MS: f64 = 15000.0;
pub const SPAWN_INVINCIBLE_MS: f64 = 800.0;
pub const LEVEL_TRANSITION_MS: f64 = 2000.0;

/// Segments are swept once this far past the bottom edge.
const SNAKE_OFFSCREEN_MARGIN: f64 = 50.0;
const ENEMY_BULLET_MARGIN: f64 = 20.0;

// S-shaped path: x is a pure function of y and spawn index.
const PATH_FREQUENCY: f64 = 0.1;
const PATH_BASE_AMPLITUDE: f64 = 200.0;
const PATH_AMPLITUDE_GROWTH: f64 = 0.5;

// ── Level scaling ────────────────────────────────────────────────────────────

/// Segments in the snake for a given level.
pub fn segment_count(level: u32) -> u32 {
    80 + level * 15
}

fn segment_health(index: u32) -> i32 {
    BASE_SEGMENT_HEALTH + index as i32 * HEALTH_PER_SEGMENT
}

fn path_x(width: f64, y: f64, index: u32) -> f64 {
    let amplitude = PATH_BASE_AMPLITUDE + index as f64 * PATH_AMPLITUDE_GROWTH;
    width / 2.0 + (y * PATH_FREQUENCY).sin() * amplitude
}

// ── Upgrade catalog ──────────────────────────────────────────────────────────

/// The six upgrade kinds with their common/epic/legendary value tables.
pub const UPGRADE_CATALOG: [(UpgradeKind, [f64; 3]); 6] = [
    (UpgradeKind::BulletCount, [3.0, 4.0, 5.0]),
    (UpgradeKind::FireRate, [3.0, 4.0, 5.0]),
    (UpgradeKind::Penetration, [3.0, 4.0, 5.0]),
    (UpgradeKind::SlowOnHit, [0.05, 0.10, 0.15]),
    (UpgradeKind::Lifesteal, [0.01, 0.02, 0.03]),
    (UpgradeKind::ShieldDuration, [500.0, 1000.0, 1500.0]),
];

fn tier_index(tier: TreasureTier) -> usize {
    match tier {
        TreasureTier::None | TreasureTier::Common => 0,
        TreasureTier::Epic => 1,
        TreasureTier::Legendary => 2,
    }
}

/// Draw 3 distinct upgrade kinds for the given tier: Fisher–Yates over the
/// catalog indices, take the first three.
pub fn draw_offer(tier: TreasureTier, rng: &mut impl Rng) -> UpgradeOffer {
    let mut indices = [0usize, 1, 2, 3, 4, 5];
    for i in (1..indices.len()).rev() {
        let j = rng.gen_range(0..=i);
        indices.swap(i, j);
    }
    let pick = |slot: usize| {
        let (kind, values) = UPGRADE_CATALOG[indices[slot]];
        UpgradeChoice {
            kind,
            value: values[tier_index(tier)],
        }
    };
    UpgradeOffer {
        tier,
        choices: [pick(0), pick(1), pick(2)],
    }
}

fn apply_upgrade(player: &Player, choice: UpgradeChoice) -> Player {
    let mut p = player.clone();
    match choice.kind {
        UpgradeKind::BulletCount => p.bullets += choice.value as u32,
        UpgradeKind::FireRate => p.fire_rate += choice.value,
        UpgradeKind::Penetration => p.penetration += choice.value as i32,
        // Probability stats must not silently exceed 1.0.
        UpgradeKind::SlowOnHit => {
            p.slow_on_hit_chance = (p.slow_on_hit_chance + choice.value).min(1.0)
        }
        UpgradeKind::Lifesteal => p.lifesteal = (p.lifesteal + choice.value).min(1.0),
        UpgradeKind::ShieldDuration => p.shield_bonus_ms += choice.value,
    }
    p
}

// ── Constructors ─────────────────────────────────────────────────────────────

fn default_player(width: f64, height: f64) -> Player {
    Player {
        x: width / 2.0,
        y: height - 50.0,
        size: PLAYER_SIZE,
        bullets: 5,
        fire_rate: 5.0,
        penetration: 5,
        slow_on_hit_chance: 0.0,
        lifesteal: 0.0,
        shield_bonus_ms: 0.0,
        shield_active: false,
        shield_until_ms: 0.0,
        shield_cooldown_until_ms: 0.0,
        lifesteal_bank: 0.0,
    }
}

/// Generate the snake for a level: segments stacked above the top edge,
/// treasure on every 4th one with a 60/25/15 tier roll.
pub fn spawn_snake(level: u32, width: f64, rng: &mut impl Rng) -> Vec<Segment> {
    let count = segment_count(level);
    (0..count)
        .map(|i| {
            let treasure = if i > 0 && i % TREASURE_INTERVAL == 0 {
                roll_treasure(rng)
            } else {
                TreasureTier::None
            };
            Segment {
                x: width / 2.0,
                y: -(i as f64 * 6.0),
                health: segment_health(i),
                max_health: segment_health(i),
                index: i,
                treasure,
            }
        })
        .collect()
}

fn roll_treasure(rng: &mut impl Rng) -> TreasureTier {
    let r: f64 = rng.gen();
    if r < 0.6 {
        TreasureTier::Common
    } else if r < 0.85 {
        TreasureTier::Epic
    } else {
        TreasureTier::Legendary
    }
}

/// Build the initial game state for a given logical world size.
pub fn init_state(width: f64, height: f64, high_score: u32, rng: &mut impl Rng) -> GameState {
    let snake = spawn_snake(1, width, rng);
    let total = snake.len() as u32;
    GameState {
        player: default_player(width, height),
        snake,
        bullets: Vec::new(),
        enemy_bullets: Vec::new(),
        particles: Vec::new(),
        score: 0,
        high_score,
        level: 1,
        health: MAX_HEALTH,
        phase: Phase::Playing,
        total_segments: total,
        defeated_segments: 0,
        bullet_cooldown_ms: 0.0,
        boss_fire_cooldown_ms: BOSS_FIRE_FIRST_DELAY_MS,
        slow_until_ms: 0.0,
        slow_speed: SNAKE_SPEED,
        spawn_invincible_until_ms: 0.0,
        offer: None,
        last_time_ms: 0.0,
        width,
        height,
    }
}

/// Full reset: level 1, baseline stats, fresh snake, and a short
/// spawn-invincibility window so the respawn isn't instantly punished.
pub fn restart(state: &GameState, now_ms: f64, rng: &mut impl Rng) -> GameState {
    let high_score = state.high_score.max(state.score);
    let mut next = init_state(state.width, state.height, high_score, rng);
    next.last_time_ms = now_ms;
    next.spawn_invincible_until_ms = now_ms + SPAWN_INVINCIBLE_MS;
    next
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Move the player toward an absolute x target, clamped to the play area.
/// Ignored while the menu is open or the game has ended.
pub fn move_player_to(state: &GameState, x: f64) -> GameState {
    match state.phase {
        Phase::UpgradeMenuOpen | Phase::Won | Phase::Lost => return state.clone(),
        _ => {}
    }
    let new_x = x.clamp(state.player.size, state.width - state.player.size);
    GameState {
        player: Player {
            x: new_x,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

/// Fire a volley if the cooldown has lapsed.  Shares the cooldown with the
/// auto-fire in `tick`, so mashing the key cannot exceed the fire rate.
pub fn request_fire(state: &GameState) -> GameState {
    if state.phase != Phase::Playing || state.bullet_cooldown_ms > 0.0 {
        return state.clone();
    }
    let mut next = state.clone();
    fire_volley(&mut next);
    next
}

/// Raise the shield for 3 s (plus any upgrade bonus); 15 s cooldown.
/// Silently ignored while the cooldown is running.
pub fn request_shield(state: &GameState, now_ms: f64) -> GameState {
    if now_ms < state.player.shield_cooldown_until_ms {
        return state.clone();
    }
    GameState {
        player: Player {
            shield_active: true,
            shield_until_ms: now_ms + SHIELD_BASE_MS + state.player.shield_bonus_ms,
            shield_cooldown_until_ms: now_ms + SHIELD_COOLDOWN_MS,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

/// Apply one of the three offered upgrades and resume play.  A no-op unless
/// the menu is actually open and the index is in range.  When the treasure
/// kill also cleared the snake, the next `tick` runs the level advance, so
/// the choice is applied before the per-level stat reset.
pub fn select_upgrade(state: &GameState, index: usize) -> GameState {
    let offer = match (&state.phase, &state.offer) {
        (Phase::UpgradeMenuOpen, Some(offer)) if index < offer.choices.len() => offer,
        _ => return state.clone(),
    };
    GameState {
        player: apply_upgrade(&state.player, offer.choices[index]),
        offer: None,
        phase: Phase::Playing,
        ..state.clone()
    }
}

// ── Per-frame tick (nearly pure — RNG is injected) ──────────────────────────

/// Advance the simulation to `now_ms`.  One synchronous pass:
/// snake movement → boss volley → player bullets → level advance →
/// enemy bullets → particles → auto-fire → loss check.
///
/// The phase gate at the top makes the upgrade menu a cooperative pause
/// (only the clock advances), drives the level-transition delay, and turns
/// ticks in terminal states into no-ops.
pub fn tick(state: &GameState, now_ms: f64, rng: &mut impl Rng) -> GameState {
    let mut next = state.clone();
    let dt = (now_ms - state.last_time_ms).max(0.0);
    next.last_time_ms = now_ms;

    match state.phase {
        Phase::Won | Phase::Lost => return state.clone(),
        Phase::UpgradeMenuOpen => return next,
        Phase::LevelTransition { until_ms } => {
            if now_ms >= until_ms {
                begin_level(&mut next, rng);
            }
            return next;
        }
        Phase::Playing => {}
    }

    // ── 1. Fire cooldown decay ───────────────────────────────────────────────
    next.bullet_cooldown_ms -= dt;

    // ── 2. Snake movement, S-path, contact damage, off-screen sweep ─────────
    advance_snake(&mut next, dt, now_ms, rng);

    // ── 3. Level-1 boss volley ───────────────────────────────────────────────
    update_boss_attack(&mut next, dt);

    // ── 4. Player bullets: move, collide, resolve deaths, sweep ─────────────
    update_player_bullets(&mut next, now_ms, rng);

    // ── 5. Level advance once the snake is cleared (held back while the
    //       upgrade menu keeps a choice open) ───────────────────────────────
    if next.phase == Phase::Playing
        && next.total_segments > 0
        && next.defeated_segments >= next.total_segments
    {
        advance_level(&mut next, now_ms);
    }

    // ── 6. Enemy bullets: move, hit player, sweep ────────────────────────────
    update_enemy_bullets(&mut next, now_ms, rng);

    // ── 7. Particle decay ────────────────────────────────────────────────────
    next.particles.retain_mut(|p| {
        p.x += p.vx;
        p.y += p.vy;
        p.life -= p.decay;
        p.life > 0.0
    });

    // ── 8. Auto-fire on cooldown ─────────────────────────────────────────────
    if next.bullet_cooldown_ms <= 0.0 {
        fire_volley(&mut next);
    }

    // ── 9. Loss check ────────────────────────────────────────────────────────
    if next.health <= 0
        && matches!(next.phase, Phase::Playing | Phase::UpgradeMenuOpen)
    {
        next.phase = Phase::Lost;
        next.offer = None;
    }

    if next.score > next.high_score {
        next.high_score = next.score;
    }
    next
}

// ── Movement & pattern engine ────────────────────────────────────────────────

fn current_snake_speed(state: &GameState, now_ms: f64) -> f64 {
    if now_ms < state.slow_until_ms {
        state.slow_speed
    } else {
        SNAKE_SPEED
    }
}

/// Extend (never shorten) the global slow window.
fn apply_global_slow(next: &mut GameState, now_ms: f64) {
    next.slow_until_ms = next.slow_until_ms.max(now_ms + SLOW_DURATION_MS);
    next.slow_speed = SLOW_SNAKE_SPEED;
}

fn advance_snake(next: &mut GameState, dt: f64, now_ms: f64, rng: &mut impl Rng) {
    let speed = current_snake_speed(next, now_ms);
    let (px, py, psize) = (next.player.x, next.player.y, next.player.size);
    let mut contact_bursts: Vec<(f64, f64)> = Vec::new();

    for segment in &mut next.snake {
        segment.y += speed * dt;
        // x is never integrated — recomputed from y and spawn index, which
        // keeps the whole body on one deterministic S-shaped trail.
        segment.x = path_x(next.width, segment.y, segment.index);

        let overlaps_row = (segment.y - py).abs() <= psize;
        if segment.is_alive()
            && overlaps_row
            && (segment.x - px).abs() < psize + SEGMENT_SIZE / 2.0
        {
            next.health -= CONTACT_DAMAGE;
            contact_bursts.push((segment.x, segment.y));
        }
    }
    for (x, y) in contact_bursts {
        spawn_particles(&mut next.particles, x, y, ParticleKind::Contact, rng);
    }

    // Segments that slip past the bottom edge are gone — not defeated, and
    // they deal no damage on the way out.
    let limit = next.height + SNAKE_OFFSCREEN_MARGIN;
    next.snake.retain(|s| s.y < limit);
}

/// Level-1 boss: the head sprays a fan of bullets at the player.  The fan
/// widens and the cooldown shrinks as segments fall.
fn update_boss_attack(next: &mut GameState, dt: f64) {
    if next.level != 1 {
        return;
    }
    next.boss_fire_cooldown_ms -= dt;
    if next.boss_fire_cooldown_ms > 0.0 {
        return;
    }

    // No live head → hold fire and leave the countdown where it is, so a
    // volley comes out the instant a head reappears.
    let (hx, hy) = match next.head_segment() {
        Some(head) => (head.x, head.y),
        None => return,
    };

    let count = (1 + next.defeated_segments / BOSS_VOLLEY_RAMP).min(BOSS_MAX_VOLLEY);

    let dx = next.player.x - hx;
    let dy = next.player.y - hy;
    let len = dx.hypot(dy);
    let len = if len == 0.0 { 1.0 } else { len };
    let (ux, uy) = (dx / len, dy / len);

    let mid = (count / 2) as i32;
    for i in 0..count {
        let rot = (i as i32 - mid) as f64 * BOSS_SPREAD_STEP_RAD;
        let (sin_r, cos_r) = rot.sin_cos();
        let rx = ux * cos_r - uy * sin_r;
        let ry = ux * sin_r + uy * cos_r;
        next.enemy_bullets.push(EnemyBullet {
            x: hx,
            y: hy,
            vx: rx * ENEMY_BULLET_SPEED,
            vy: ry * ENEMY_BULLET_SPEED,
            damage: ENEMY_BULLET_DAMAGE,
        });
    }

    next.boss_fire_cooldown_ms = (BOSS_FIRE_BASE_INTERVAL_MS
        - next.defeated_segments as f64 * BOSS_INTERVAL_REDUCTION_MS)
        .max(BOSS_FIRE_MIN_INTERVAL_MS);
}

// ── Collision & damage resolver ──────────────────────────────────────────────

fn update_player_bullets(next: &mut GameState, now_ms: f64, rng: &mut impl Rng) {
    let mut deaths: Vec<usize> = Vec::new();

    for bi in 0..next.bullets.len() {
        next.bullets[bi].x += next.bullets[bi].vx;
        next.bullets[bi].y += next.bullets[bi].vy;

        for si in 0..next.snake.len() {
            if next.bullets[bi].penetration <= 0 {
                break;
            }
            if !next.snake[si].is_alive() {
                continue;
            }
            let dx = next.bullets[bi].x - next.snake[si].x;
            let dy = next.bullets[bi].y - next.snake[si].y;
            if dx.hypot(dy) >= SEGMENT_SIZE / 2.0 + BULLET_SIZE {
                continue;
            }

            let prior = next.snake[si].health;
            let damage = next.bullets[bi].damage;
            // Overkill is not clamped — only the display clamps.
            next.snake[si].health -= damage;
            next.bullets[bi].penetration -= 1;
            let (sx, sy) = (next.snake[si].x, next.snake[si].y);
            spawn_particles(&mut next.particles, sx, sy, ParticleKind::SegmentHit, rng);

            // Lifesteal banks fractions; healing pays out in whole points.
            let dealt = prior.min(damage).max(0);
            if next.player.lifesteal > 0.0 && dealt > 0 {
                next.player.lifesteal_bank += dealt as f64 * next.player.lifesteal;
                let heal = next.player.lifesteal_bank.floor() as i32;
                if heal > 0 {
                    next.player.lifesteal_bank -= heal as f64;
                    next.health = (next.health + heal).min(MAX_HEALTH);
                }
            }

            if next.player.slow_on_hit_chance > 0.0
                && rng.gen::<f64>() < next.player.slow_on_hit_chance
            {
                apply_global_slow(next, now_ms);
            }

            // Sign crossing = death, and a dead segment can never cross again.
            if prior > 0 && next.snake[si].health <= 0 {
                deaths.push(si);
            }
        }
    }

    let mut treasure_opened: Option<TreasureTier> = None;
    for si in deaths {
        next.score += SCORE_PER_SEGMENT;
        next.defeated_segments += 1;
        if next.snake[si].treasure != TreasureTier::None {
            treasure_opened = Some(next.snake[si].treasure);
        }
    }

    if let Some(tier) = treasure_opened {
        // Opens even on the kill that clears the snake — the level advance
        // waits in `tick` until the choice lands.
        next.phase = Phase::UpgradeMenuOpen;
        next.offer = Some(draw_offer(tier, rng));
    }

    // Sweep: consumed penetration or out of bounds (small margin).
    let (w, h) = (next.width, next.height);
    next.bullets.retain(|b| {
        b.penetration > 0
            && b.x > -BULLET_SIZE
            && b.x < w + BULLET_SIZE
            && b.y > -BULLET_SIZE
            && b.y < h + BULLET_SIZE
    });
}

fn update_enemy_bullets(next: &mut GameState, now_ms: f64, rng: &mut impl Rng) {
    let bullets = std::mem::take(&mut next.enemy_bullets);
    let mut kept = Vec::with_capacity(bullets.len());

    for mut b in bullets {
        b.x += b.vx;
        b.y += b.vy;

        let dist = (b.x - next.player.x).hypot(b.y - next.player.y);
        if dist < ENEMY_BULLET_SIZE + next.player.size {
            // Strict precedence: spawn invincibility, then shield, then damage.
            // The bullet is consumed in every branch.
            if now_ms < next.spawn_invincible_until_ms {
                continue;
            }
            if next.shield_active_at(now_ms) {
                spawn_particles(&mut next.particles, b.x, b.y, ParticleKind::ShieldBlock, rng);
                continue;
            }
            next.health -= b.damage;
            spawn_particles(&mut next.particles, b.x, b.y, ParticleKind::PlayerHit, rng);
            continue;
        }

        if b.x < -ENEMY_BULLET_MARGIN
            || b.x > next.width + ENEMY_BULLET_MARGIN
            || b.y < -ENEMY_BULLET_MARGIN
            || b.y > next.height + ENEMY_BULLET_MARGIN
        {
            continue;
        }
        kept.push(b);
    }
    next.enemy_bullets = kept;
}

// ── Progression ──────────────────────────────────────────────────────────────

/// The snake is cleared: schedule the next level, or win on the last one.
/// Entering the transition resets only the volley stats — shield, lifesteal
/// and slow-chance upgrades persist across levels.
fn advance_level(next: &mut GameState, now_ms: f64) {
    next.offer = None;
    if next.level < MAX_LEVEL {
        next.level += 1;
        next.player.bullets = 5;
        next.player.fire_rate = 5.0;
        next.player.penetration = 5;
        next.phase = Phase::LevelTransition {
            until_ms: now_ms + LEVEL_TRANSITION_MS,
        };
    } else {
        next.phase = Phase::Won;
    }
}

/// The transition delay elapsed: materialise the new level.
fn begin_level(next: &mut GameState, rng: &mut impl Rng) {
    next.snake = spawn_snake(next.level, next.width, rng);
    next.total_segments = next.snake.len() as u32;
    next.defeated_segments = 0;
    next.enemy_bullets.clear();
    next.boss_fire_cooldown_ms = BOSS_FIRE_FIRST_DELAY_MS;
    next.phase = Phase::Playing;
}

// ── Firing & particles ───────────────────────────────────────────────────────

/// Spawn one fan of player bullets and restart the cooldown.
fn fire_volley(next: &mut GameState) {
    let n = next.player.bullets;
    for i in 0..n {
        let spread = (i as f64 - (n as f64 - 1.0) / 2.0) * 10.0;
        next.bullets.push(PlayerBullet {
            x: next.player.x + spread,
            y: next.player.y - next.player.size / 2.0,
            vx: spread * 0.1,
            vy: -BULLET_SPEED,
            penetration: next.player.penetration,
            damage: BULLET_DAMAGE,
        });
    }
    next.bullet_cooldown_ms = 1000.0 / next.player.fire_rate;
}

fn spawn_particles(
    particles: &mut Vec<Particle>,
    x: f64,
    y: f64,
    kind: ParticleKind,
    rng: &mut impl Rng,
) {
    for _ in 0..8 {
        particles.push(Particle {
            x,
            y,
            vx: rng.gen_range(-2.0..2.0),
            vy: rng.gen_range(-2.0..2.0),
            life: 1.0,
            decay: 0.02,
            size: rng.gen_range(1.0..4.0),
            kind,
        });
    }
}
