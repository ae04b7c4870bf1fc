use serpent_siege::entities::*;

#[test]
fn entity_clone_and_eq() {
    // Enums derive PartialEq — equality comparisons must work
    assert_eq!(TreasureTier::Epic, TreasureTier::Epic);
    assert_ne!(TreasureTier::Common, TreasureTier::Legendary);
    assert_eq!(Phase::Playing, Phase::Playing);
    assert_ne!(Phase::Playing, Phase::Won);
    assert_eq!(
        Phase::LevelTransition { until_ms: 10.0 },
        Phase::LevelTransition { until_ms: 10.0 }
    );
    assert_ne!(
        Phase::LevelTransition { until_ms: 10.0 },
        Phase::LevelTransition { until_ms: 20.0 }
    );
    assert_eq!(UpgradeKind::Lifesteal, UpgradeKind::Lifesteal);
    assert_ne!(UpgradeKind::Lifesteal, UpgradeKind::FireRate);

    // Clone must produce an equal value
    let kind = ParticleKind::ShieldBlock;
    assert_eq!(kind.clone(), ParticleKind::ShieldBlock);
}

#[test]
fn segment_health_ratio_clamps_for_display() {
    let mut seg = Segment {
        x: 0.0,
        y: 0.0,
        health: 50,
        max_health: 100,
        index: 0,
        treasure: TreasureTier::None,
    };
    assert_eq!(seg.health_ratio(), 0.5);
    assert!(seg.is_alive());

    // Overkill shows as empty, never negative
    seg.health = -75;
    assert_eq!(seg.health_ratio(), 0.0);
    assert!(!seg.is_alive());
}

#[test]
fn upgrade_kinds_have_labels() {
    for kind in [
        UpgradeKind::BulletCount,
        UpgradeKind::FireRate,
        UpgradeKind::Penetration,
        UpgradeKind::SlowOnHit,
        UpgradeKind::Lifesteal,
        UpgradeKind::ShieldDuration,
    ] {
        assert!(!kind.label().is_empty());
    }
}

fn blank_state() -> GameState {
    GameState {
        player: Player {
            x: 400.0,
            y: 550.0,
            size: 30.0,
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
        },
        snake: Vec::new(),
        bullets: Vec::new(),
        enemy_bullets: Vec::new(),
        particles: Vec::new(),
        score: 0,
        high_score: 0,
        level: 1,
        health: 100,
        phase: Phase::Playing,
        total_segments: 0,
        defeated_segments: 0,
        bullet_cooldown_ms: 0.0,
        boss_fire_cooldown_ms: 0.0,
        slow_until_ms: 0.0,
        slow_speed: 0.005,
        spawn_invincible_until_ms: 0.0,
        offer: None,
        last_time_ms: 0.0,
        width: 800.0,
        height: 600.0,
    }
}

#[test]
fn game_state_clone_is_independent() {
    let original = blank_state();
    let mut cloned = original.clone();

    // Mutating the clone must not affect the original
    cloned.player.x = 99.0;
    cloned.score = 999;
    cloned.snake.push(Segment {
        x: 1.0,
        y: 1.0,
        health: 5,
        max_health: 5,
        index: 0,
        treasure: TreasureTier::None,
    });

    assert_eq!(original.player.x, 400.0);
    assert_eq!(original.score, 0);
    assert!(original.snake.is_empty());
}

#[test]
fn shield_queries_follow_the_window() {
    let mut s = blank_state();
    s.player.shield_active = true;
    s.player.shield_until_ms = 4500.0;
    s.player.shield_cooldown_until_ms = 16_000.0;

    assert!(s.shield_active_at(4000.0));
    assert!(!s.shield_active_at(4500.0));
    assert_eq!(s.shield_cooldown_remaining_s(1000.0), 15);
    assert_eq!(s.shield_cooldown_remaining_s(16_000.0), 0);
}
