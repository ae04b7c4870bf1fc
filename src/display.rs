/// Rendering layer — all terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state.  No game logic is performed; this module only translates
/// state into terminal commands.  The simulation runs in a logical pixel
/// space, so everything is projected onto terminal cells through one pair
/// of scale factors.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use serpent_siege::entities::{
    GameState, ParticleKind, Phase, TreasureTier, UpgradeChoice, UpgradeKind,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_SHIELD: Color = Color::Cyan;
const C_HEAD: Color = Color::Red;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;
const C_TREASURE_COMMON: Color = Color::Blue;
const C_TREASURE_EPIC: Color = Color::Magenta;
const C_TREASURE_LEGENDARY: Color = Color::Yellow;

/// Boss title shown on the transition banner, one per level.
fn boss_name(level: u32) -> &'static str {
    match level {
        1 => "Demon Serpent King",
        2 => "Blazing Python",
        3 => "Thunder Viper",
        4 => "Shadow Serpent",
        _ => "Serpent Emperor",
    }
}

// ── World → cell projection ───────────────────────────────────────────────────

/// Maps logical pixel coordinates into the bordered play area
/// (rows 2 .. term_h-3, cols 1 .. term_w-2).
struct Projection {
    sx: f64,
    sy: f64,
    cols: u16,
    rows: u16,
}

impl Projection {
    fn new(state: &GameState, cols: u16, rows: u16) -> Self {
        Projection {
            sx: (cols.saturating_sub(2)) as f64 / state.width,
            sy: (rows.saturating_sub(4)) as f64 / state.height,
            cols,
            rows,
        }
    }

    /// Cell for a world position, or `None` when it falls outside the
    /// play area (e.g. snake segments still above the top edge).
    fn cell(&self, x: f64, y: f64) -> Option<(u16, u16)> {
        let col = (x * self.sx) as i32 + 1;
        let row = (y * self.sy) as i32 + 2;
        let in_play = col >= 1
            && col <= self.cols as i32 - 2
            && row >= 2
            && row <= self.rows as i32 - 3;
        in_play.then(|| (col as u16, row as u16))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    now_ms: f64,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let proj = Projection::new(state, cols, rows);

    draw_border(out, cols, rows)?;
    draw_hud(out, state, now_ms, cols)?;

    for particle in &state.particles {
        if let Some((col, row)) = proj.cell(particle.x, particle.y) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(particle_color(particle.kind)))?;
            out.queue(Print("·"))?;
        }
    }

    draw_snake(out, state, &proj)?;

    for bullet in &state.bullets {
        if let Some((col, row)) = proj.cell(bullet.x, bullet.y) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(C_BULLET_PLAYER))?;
            out.queue(Print("•"))?;
        }
    }
    for bullet in &state.enemy_bullets {
        if let Some((col, row)) = proj.cell(bullet.x, bullet.y) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(C_BULLET_ENEMY))?;
            out.queue(Print("✦"))?;
        }
    }

    draw_player(out, state, now_ms, &proj)?;
    draw_controls_hint(out, rows)?;

    match state.phase {
        Phase::UpgradeMenuOpen => draw_upgrade_menu(out, state, cols, rows)?,
        Phase::LevelTransition { .. } => draw_transition(out, state, cols, rows)?,
        Phase::Won => draw_end_overlay(out, state, cols, rows, true)?,
        Phase::Lost => draw_end_overlay(out, state, cols, rows, false)?,
        Phase::Playing => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
    let w = cols as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, rows.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..rows.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    state: &GameState,
    now_ms: f64,
    cols: u16,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    if state.high_score > 0 {
        out.queue(Print(format!(
            "Score:{:>6}  Hi:{:>6}",
            state.score, state.high_score
        )))?;
    } else {
        out.queue(Print(format!("Score:{:>6}", state.score)))?;
    }

    let level_str = format!(
        "[ LV {}  {}/{} ]",
        state.level, state.defeated_segments, state.total_segments
    );
    let lx = (cols / 2).saturating_sub(level_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(Color::Green))?;
    out.queue(Print(&level_str))?;

    // Shield tag + health — right side
    let shield_tag = if state.shield_active_at(now_ms) {
        "[SHIELD*] ".to_string()
    } else {
        match state.shield_cooldown_remaining_s(now_ms) {
            0 => "[SHIELD E] ".to_string(),
            s => format!("[SHIELD {:>2}s] ", s),
        }
    };
    let health_str = format!("HP:{:>3}", state.health.max(0));
    let right_str = format!("{}{}", shield_tag, health_str);

    let rx = cols.saturating_sub(right_str.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_SHIELD))?;
    out.queue(Print(&shield_tag))?;
    out.queue(style::SetForegroundColor(C_HUD_HEALTH))?;
    out.queue(Print(&health_str))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_snake<W: Write>(
    out: &mut W,
    state: &GameState,
    proj: &Projection,
) -> std::io::Result<()> {
    let mut head_seen = false;
    for segment in &state.snake {
        if !segment.is_alive() {
            continue;
        }
        let is_head = !head_seen;
        head_seen = true;

        let Some((col, row)) = proj.cell(segment.x, segment.y) else {
            continue;
        };

        let color = if is_head {
            C_HEAD
        } else {
            match segment.treasure {
                TreasureTier::Common => C_TREASURE_COMMON,
                TreasureTier::Epic => C_TREASURE_EPIC,
                TreasureTier::Legendary => C_TREASURE_LEGENDARY,
                // Body shade tracks remaining health.
                TreasureTier::None => {
                    if segment.health_ratio() > 0.5 {
                        Color::Green
                    } else {
                        Color::DarkYellow
                    }
                }
            }
        };

        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(if is_head { "◉" } else { "●" }))?;
    }
    Ok(())
}

fn draw_player<W: Write>(
    out: &mut W,
    state: &GameState,
    now_ms: f64,
    proj: &Projection,
) -> std::io::Result<()> {
    let Some((col, row)) = proj.cell(state.player.x, state.player.y) else {
        return Ok(());
    };

    if state.shield_active_at(now_ms) {
        out.queue(style::SetForegroundColor(C_SHIELD))?;
        if col >= 2 {
            out.queue(cursor::MoveTo(col - 1, row))?;
            out.queue(Print("("))?;
        }
        out.queue(cursor::MoveTo(col + 1, row))?;
        out.queue(Print(")"))?;
    }

    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(C_PLAYER))?;
    out.queue(Print("▲"))?;
    Ok(())
}

fn particle_color(kind: ParticleKind) -> Color {
    match kind {
        ParticleKind::SegmentHit => Color::DarkYellow,
        ParticleKind::PlayerHit => Color::Red,
        ParticleKind::ShieldBlock => Color::Cyan,
        ParticleKind::Contact => Color::Red,
    }
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, rows: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Shoot   E : Shield   Q : Quit"))?;
    Ok(())
}

// ── Upgrade menu overlay ──────────────────────────────────────────────────────

fn choice_line(key: usize, choice: &UpgradeChoice) -> String {
    let value = match choice.kind {
        UpgradeKind::SlowOnHit | UpgradeKind::Lifesteal => {
            format!("+{}%", (choice.value * 100.0).round() as u32)
        }
        UpgradeKind::ShieldDuration => format!("+{:.1}s", choice.value / 1000.0),
        _ => format!("+{}", choice.value as u32),
    };
    format!("[{}] {:<12}{:>6}", key, choice.kind.label(), value)
}

fn tier_color(tier: TreasureTier) -> Color {
    match tier {
        TreasureTier::Epic => C_TREASURE_EPIC,
        TreasureTier::Legendary => C_TREASURE_LEGENDARY,
        _ => C_TREASURE_COMMON,
    }
}

fn draw_upgrade_menu<W: Write>(
    out: &mut W,
    state: &GameState,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let Some(offer) = &state.offer else {
        return Ok(());
    };

    let cx = cols / 2;
    let start_row = (rows / 2).saturating_sub(3);

    let title = "╢ CHOOSE AN UPGRADE ╟";
    let col = cx.saturating_sub(title.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, start_row))?;
    // All three options carry the offer's tier, so it sets the banner accent.
    out.queue(style::SetForegroundColor(tier_color(offer.tier)))?;
    out.queue(Print(title))?;

    for (i, choice) in offer.choices.iter().enumerate() {
        let line = choice_line(i + 1, choice);
        let col = cx.saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + 2 + i as u16))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(&line))?;
    }

    let hint = "1 / 2 / 3 to pick";
    let col = cx.saturating_sub(hint.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, start_row + 6))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;
    Ok(())
}

// ── Level transition banner ───────────────────────────────────────────────────

fn draw_transition<W: Write>(
    out: &mut W,
    state: &GameState,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let cx = cols / 2;
    let cy = rows / 2;

    let done = format!("Level {} cleared!", state.level.saturating_sub(1));
    let next = format!("Next boss: {}", boss_name(state.level));
    let warn = "Upgrades reset — hunt new treasure!";

    for (i, (msg, color)) in [
        (done.as_str(), Color::Yellow),
        (next.as_str(), C_HEAD),
        (warn, C_HINT),
    ]
    .iter()
    .enumerate()
    {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, cy.saturating_sub(1) + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(*msg))?;
    }
    Ok(())
}

// ── End-of-game overlay ───────────────────────────────────────────────────────

fn draw_end_overlay<W: Write>(
    out: &mut W,
    state: &GameState,
    cols: u16,
    rows: u16,
    won: bool,
) -> std::io::Result<()> {
    let lines: &[&str] = if won {
        &[
            "╔════════════════════╗",
            "║     YOU  WIN !     ║",
            "╚════════════════════╝",
        ]
    } else {
        &[
            "╔════════════════════╗",
            "║    GAME  OVER      ║",
            "╚════════════════════╝",
        ]
    };
    let box_color = if won { Color::Yellow } else { Color::Red };

    let score_line = format!("Final Score: {:>6}", state.score);
    let best_score = state.high_score.max(state.score);
    let best_line = if state.score >= state.high_score && state.score > 0 {
        format!("★ NEW BEST: {:>6} ★", best_score)
    } else {
        format!("Best Score:  {:>6}", best_score)
    };
    let best_color = if state.score >= state.high_score && state.score > 0 {
        Color::Yellow
    } else {
        Color::DarkGrey
    };

    let cx = cols / 2;
    let total_rows = lines.len() + 3;
    let start_row = (rows / 2).saturating_sub(total_rows as u16 / 2);

    for (i, msg) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(box_color))?;
        out.queue(Print(*msg))?;
    }

    let score_row = start_row + lines.len() as u16;
    let col = cx.saturating_sub(score_line.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, score_row))?;
    out.queue(style::SetForegroundColor(Color::Yellow))?;
    out.queue(Print(&score_line))?;

    let col = cx.saturating_sub(best_line.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, score_row + 1))?;
    out.queue(style::SetForegroundColor(best_color))?;
    out.queue(Print(&best_line))?;

    let hint = "R - Play Again  Q - Quit";
    let col = cx.saturating_sub(hint.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, score_row + 2))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(hint))?;

    Ok(())
}
