//! Frame composition
//!
//! The renderer is a pure function of world + player: it composes each cell
//! from layered sources (hidden bits, footprints, in-range reveals, loot, the
//! exit beacon, the player) and applies the rectangular spotlight backdrop
//! around the player. Nothing here mutates game state.

pub mod symbols;

use crate::core::Coordinate;
use crate::level::LevelConfig;
use crate::player::{ActionKind, Player};
use crate::world::bits::{HiddenBit, RevealedBit};
use crate::world::loot::IntegrityTier;
use crate::world::World;
use symbols::{paint, Color, CompatibilityMode, SymbolSet};

/// Character width of the threat and progress meters.
pub const METER_WIDTH: usize = 30;

const METER_FILL: SymbolSet = SymbolSet::new("█", "#", "#");

struct Cell {
    glyph: &'static str,
    fg: Color,
    bg: Option<Color>,
}

/// Render one full frame, one string per grid row, ANSI-colored.
pub fn render(world: &World, player: &Player, mode: CompatibilityMode) -> Vec<String> {
    let level = world.level();
    let mut lines = Vec::with_capacity(level.height as usize);
    for y in 0..level.height {
        let mut line = String::with_capacity(level.width as usize * 16);
        for x in 0..level.width {
            let cell = compose_cell(world, player, mode, Coordinate::new(x, y));
            line.push_str(&paint(cell.glyph, cell.fg, cell.bg));
        }
        lines.push(line);
    }
    lines
}

/// Layer order: hidden bit, footprint, in-range reveal, loot, exit, player.
/// Later layers overwrite earlier ones; the spotlight backdrop applies last
/// and never recolors the player or exit cell.
fn compose_cell(
    world: &World,
    player: &Player,
    mode: CompatibilityMode,
    c: Coordinate,
) -> Cell {
    let level = world.level();
    let bits = world.bits().get(c);
    let in_range = c.in_range(player.location, level.view_distance);

    let mut cell = Cell {
        glyph: bits.hidden.glyph(),
        fg: Color::DarkGray,
        bg: None,
    };

    // Footprints only show where no bit glyph occupies the cell.
    if bits.hidden == HiddenBit::Empty {
        if let Some(fp) = world.footprint_at(c) {
            cell.glyph = symbols::FOOTPRINT.for_mode(mode);
            cell.fg = Color::Index(fade_index(fp.intensity));
        }
    } else if in_range {
        // Rarity stays on the glyph pool; the color carries the danger
        // signal: harmful red, helpful green.
        match bits.revealed {
            RevealedBit::Benign => cell.fg = Color::Gray,
            RevealedBit::Harmful => {
                if let Some(symbol) = &bits.symbol {
                    cell.glyph = symbol.for_mode(mode);
                }
                cell.fg = Color::Red;
            }
            RevealedBit::Helpful => {
                if let Some(symbol) = &bits.symbol {
                    cell.glyph = symbol.for_mode(mode);
                }
                cell.fg = Color::Green;
            }
        }
    }

    let loot = world.loot_at(c);
    if !loot.is_empty() {
        if in_range {
            cell.glyph = loot.symbol().for_mode(mode);
            cell.fg = Color::for_rarity(loot.rarity);
        } else {
            // Out of range, loot reads as a redacted marker tinted by how
            // much integrity it has left.
            cell.glyph = symbols::REDACTED.for_mode(mode);
            cell.fg = match loot.integrity_tier() {
                IntegrityTier::High => Color::White,
                IntegrityTier::Medium => Color::Yellow,
                IntegrityTier::Low => Color::Red,
            };
        }
    }

    let is_exit = world.collides_with_exit(c);
    if is_exit {
        cell.glyph = world.exit_beacon().for_mode(mode);
        cell.fg = Color::Teal;
    }

    let is_player = c == player.location;
    if is_player {
        cell.glyph = symbols::PLAYER.for_mode(mode);
        cell.fg = Color::Yellow;
    }

    // Backdrops: the circular reveal brightens the cell, the rectangular
    // spotlight darkens whatever the reveal does not cover. The player and
    // exit cells keep the neutral background.
    if !is_player && !is_exit {
        let dx = (c.x - player.location.x).abs();
        let dy = (c.y - player.location.y).abs();
        if in_range {
            cell.bg = Some(Color::Slate);
        } else if dx <= level.mask_half_width && dy <= level.mask_half_height {
            cell.bg = Some(Color::DarkGray);
        }
    }

    cell
}

/// Grayscale ramp for footprint fade: fresh prints sit near white, faded
/// ones sink into the background gray.
fn fade_index(intensity: f32) -> u8 {
    235 + (intensity.clamp(0.0, 100.0) * 0.2) as u8
}

/// Threat meter, banded green / yellow / red by thirds of the maximum.
pub fn threat_meter(player: &Player, level: &LevelConfig, mode: CompatibilityMode) -> String {
    let fraction = (player.threat / level.max_threat).clamp(0.0, 1.0);
    let color = if fraction < 1.0 / 3.0 {
        Color::Green
    } else if fraction < 2.0 / 3.0 {
        Color::Yellow
    } else {
        Color::Red
    };
    format!("[{}]", paint(&meter_bar(fraction, mode), color, None))
}

/// Progress bar for the action in flight, or None when idle.
pub fn progress_bar(player: &Player, mode: CompatibilityMode) -> Option<String> {
    let (label, color) = match player.action.kind {
        ActionKind::None => return None,
        ActionKind::Loot => ("EXTRACTING", Color::Teal),
        ActionKind::Exit => ("LEAVING", Color::Green),
    };
    let fraction = (player.action.progress / 100.0).clamp(0.0, 1.0);
    Some(format!(
        "{label:>10} [{}]",
        paint(&meter_bar(fraction, mode), color, None)
    ))
}

fn meter_bar(fraction: f32, mode: CompatibilityMode) -> String {
    let filled = (fraction * METER_WIDTH as f32).round() as usize;
    let mut bar = METER_FILL.for_mode(mode).repeat(filled);
    bar.push_str(&" ".repeat(METER_WIDTH - filled));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::world::bits::Bits;
    use crate::world::loot::{DataKind, Loot, LootKind};
    use symbols::AnimatedSymbol;

    fn fixture() -> (World, Player) {
        let level = Level::Tutorial.config();
        let world = World::generate(level, &mut rand::thread_rng());
        let player = Player::new(Coordinate::new(10, 10));
        (world, player)
    }

    #[test]
    fn test_render_emits_one_line_per_row() {
        let (world, player) = fixture();
        let lines = render(&world, &player, CompatibilityMode::Ascii);
        assert_eq!(lines.len(), world.level().height as usize);
    }

    #[test]
    fn test_player_glyph_drawn_on_its_row() {
        let (world, player) = fixture();
        let lines = render(&world, &player, CompatibilityMode::Ascii);
        assert!(lines[player.location.y as usize].contains('@'));
    }

    #[test]
    fn test_exit_beacon_overrides_loot() {
        let (mut world, player) = fixture();
        let exit = Coordinate::new(12, 10); // inside the player's view range
        world.put_loot(
            exit,
            Loot {
                kind: LootKind::Data(DataKind::Delta),
                rarity: crate::core::Rarity::Common,
                data: 25.0,
                integrity: 1.0,
            },
        );
        world.put_exit(exit);
        let cell = compose_cell(&world, &player, CompatibilityMode::Ascii, exit);
        assert!(["#", "*"].contains(&cell.glyph), "exit must win the cell");
        assert_eq!(cell.fg, Color::Teal);
    }

    #[test]
    fn test_out_of_range_loot_is_redacted() {
        let (mut world, player) = fixture();
        let far = Coordinate::new(90, 2);
        world.put_loot(
            far,
            Loot {
                kind: LootKind::Data(DataKind::Delta),
                rarity: crate::core::Rarity::Epic,
                data: 500.0,
                integrity: 1.0,
            },
        );
        let cell = compose_cell(&world, &player, CompatibilityMode::Any, far);
        assert_eq!(cell.glyph, "?");
        assert_eq!(cell.fg, Color::White, "high integrity tints white");
    }

    #[test]
    fn test_backdrop_brightens_in_range_darkens_mask_only() {
        let (world, player) = fixture();
        // dx=2 is inside the tutorial view radius (4.5); dx=6 is outside it
        // but still inside the 6-wide spotlight rectangle.
        let in_range = Coordinate::new(12, 10);
        let mask_only = Coordinate::new(16, 10);
        let far = Coordinate::new(40, 2);

        let bright = compose_cell(&world, &player, CompatibilityMode::Any, in_range);
        let dark = compose_cell(&world, &player, CompatibilityMode::Any, mask_only);
        let none = compose_cell(&world, &player, CompatibilityMode::Any, far);
        assert_eq!(bright.bg, Some(Color::Slate));
        assert_eq!(dark.bg, Some(Color::DarkGray));
        assert_ne!(bright.bg, dark.bg, "reveal and spotlight backdrops differ");
        assert_eq!(none.bg, None);

        let own = compose_cell(&world, &player, CompatibilityMode::Any, player.location);
        assert_eq!(own.bg, None, "the player cell stays unmasked");
    }

    #[test]
    fn test_revealed_bits_color_by_danger() {
        let (mut world, player) = fixture();
        let bad = Coordinate::new(12, 10);
        let good = Coordinate::new(8, 10);
        world.put_bits(
            bad,
            Bits {
                hidden: HiddenBit::One,
                revealed: RevealedBit::Harmful,
                rarity: crate::core::Rarity::Rare,
                symbol: Some(AnimatedSymbol::noise_for(true, crate::core::Rarity::Rare)),
            },
        );
        world.put_bits(
            good,
            Bits {
                hidden: HiddenBit::Zero,
                revealed: RevealedBit::Helpful,
                rarity: crate::core::Rarity::Rare,
                symbol: Some(AnimatedSymbol::noise_for(false, crate::core::Rarity::Rare)),
            },
        );

        // Make sure no randomly spawned loot repaints either cell.
        world.put_loot(bad, Loot::EMPTY);
        world.put_loot(good, Loot::EMPTY);

        let harmful = compose_cell(&world, &player, CompatibilityMode::Ascii, bad);
        let helpful = compose_cell(&world, &player, CompatibilityMode::Ascii, good);
        assert_eq!(harmful.fg, Color::Red);
        assert_eq!(helpful.fg, Color::Green);
    }

    #[test]
    fn test_threat_meter_bands() {
        let level = Level::Tutorial.config();
        let mut player = Player::new(Coordinate::new(0, 0));
        let low = threat_meter(&player, &level, CompatibilityMode::Ascii);
        assert!(low.contains("38;5;118"), "low threat renders green");
        player.tick_threat(25.0, level.max_threat);
        let mid = threat_meter(&player, &level, CompatibilityMode::Ascii);
        assert!(mid.contains("38;5;226"), "half threat renders yellow");
        player.tick_threat(25.0, level.max_threat);
        let high = threat_meter(&player, &level, CompatibilityMode::Ascii);
        assert!(high.contains("38;5;160"), "max threat renders red");
    }

    #[test]
    fn test_progress_bar_only_during_actions() {
        let mut player = Player::new(Coordinate::new(0, 0));
        assert!(progress_bar(&player, CompatibilityMode::Ascii).is_none());
        player.encounter(ActionKind::Loot, Coordinate::new(0, 0));
        player.advance_action(50.0);
        let bar = progress_bar(&player, CompatibilityMode::Ascii);
        assert!(bar.is_some_and(|b| b.contains("EXTRACTING")));
    }
}
