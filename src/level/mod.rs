//! Level catalog and configuration
//!
//! All pacing constants live here, per level, with a `validate()` pass that
//! enforces the configuration-authoring invariants once at load time. The
//! running engine trusts a validated config and never re-checks it.

use std::time::Duration;

use crate::core::{ConfigError, Rarity, RarityTable, Result};
use crate::world::bits::ScrollPattern;
use crate::world::loot::{DataKind, PowerUpKind};

/// Hitting this much collected data of one kind is a win condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinCondition {
    pub kind: DataKind,
    pub amount: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Tutorial,
    One,
    Two,
    Three,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Tutorial, Level::One, Level::Two, Level::Three];

    /// Lookup by index for CLI flags and level skipping. Out-of-range
    /// indices are an invalid-level precondition, surfaced as None.
    pub fn from_index(index: usize) -> Option<Level> {
        Level::ALL.get(index).copied()
    }

    pub fn next(&self) -> Option<Level> {
        Level::from_index(*self as usize + 1)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Level::Tutorial => "Level 0: Tutorial",
            Level::One => "Level 1",
            Level::Two => "Level 2",
            Level::Three => "Level 3",
        }
    }

    pub fn config(&self) -> LevelConfig {
        match self {
            Level::Tutorial => LevelConfig {
                level: *self,
                width: 100,
                height: 20,
                fps: 2,
                max_threat: 50.0,
                threat_decay: -0.03,
                movement_threat: 0.3,
                view_distance: 4.5,
                mask_half_width: 6,
                mask_half_height: 3,
                loot_speed: 2.0,
                loot_speed_decay: -1.0,
                leave_speed: 1.2,
                leave_speed_decay: -1.0,
                data_decay_rate: -0.001,
                power_up_decay_rate: -0.002,
                looting_decay_rate: -0.0002,
                footprint_decay: -1.5,
                bit_stream_chance: 0.2,
                good_bit_chance: 0.02,
                bad_bit_chance: 0.1,
                rarity_weights: default_rarity_weights(),
                threat_by_rarity: RarityTable([2.0, 3.0, 4.0, 6.0, 10.0, 15.0]),
                data_by_rarity: RarityTable([1.0, 25.0, 40.0, 70.0, 100.0, 1000.0]),
                data_multipliers: vec![(DataKind::Delta, 5.0)],
                data_loot_table: vec![(DataKind::Delta, 1.0)],
                power_up_loot_table: vec![(PowerUpKind::Overclock, 1.0)],
                win_conditions: vec![WinCondition {
                    kind: DataKind::Delta,
                    amount: 500.0,
                }],
                bonus: vec![],
                initial_loot: 8,
                initial_power_ups: 1,
                loot_spawn_rate: 0.01,
                power_up_spawn_rate: 0.004,
                scroll: ScrollPattern::Linear(crate::core::Direction::Down),
            },
            Level::One => LevelConfig {
                level: *self,
                width: 110,
                height: 24,
                fps: 4,
                max_threat: 50.0,
                threat_decay: -0.035,
                movement_threat: 0.35,
                view_distance: 4.5,
                mask_half_width: 6,
                mask_half_height: 3,
                loot_speed: 1.8,
                loot_speed_decay: -1.2,
                leave_speed: 1.1,
                leave_speed_decay: -1.2,
                data_decay_rate: -0.0012,
                power_up_decay_rate: -0.0024,
                looting_decay_rate: -0.0002,
                footprint_decay: -1.2,
                bit_stream_chance: 0.22,
                good_bit_chance: 0.02,
                bad_bit_chance: 0.12,
                rarity_weights: default_rarity_weights(),
                threat_by_rarity: RarityTable([2.0, 3.0, 4.0, 6.0, 10.0, 15.0]),
                data_by_rarity: RarityTable([1.0, 25.0, 45.0, 75.0, 120.0, 1000.0]),
                data_multipliers: vec![
                    (DataKind::Delta, 4.0),
                    (DataKind::Omega, 3.0),
                    (DataKind::Sigma, 6.0),
                ],
                data_loot_table: vec![
                    (DataKind::Delta, 0.45),
                    (DataKind::Omega, 0.45),
                    (DataKind::Sigma, 0.1),
                ],
                power_up_loot_table: vec![
                    (PowerUpKind::Overclock, 0.6),
                    (PowerUpKind::Cloak, 0.4),
                ],
                win_conditions: vec![
                    WinCondition {
                        kind: DataKind::Delta,
                        amount: 450.0,
                    },
                    WinCondition {
                        kind: DataKind::Omega,
                        amount: 350.0,
                    },
                ],
                bonus: vec![DataKind::Sigma],
                initial_loot: 10,
                initial_power_ups: 2,
                loot_spawn_rate: 0.012,
                power_up_spawn_rate: 0.005,
                scroll: ScrollPattern::zig_zag(
                    Duration::from_secs(4),
                    Duration::from_secs(2),
                ),
            },
            Level::Two => LevelConfig {
                level: *self,
                width: 120,
                height: 28,
                fps: 6,
                max_threat: 55.0,
                threat_decay: -0.04,
                movement_threat: 0.4,
                view_distance: 4.0,
                mask_half_width: 5,
                mask_half_height: 3,
                loot_speed: 1.6,
                loot_speed_decay: -1.4,
                leave_speed: 1.0,
                leave_speed_decay: -1.4,
                data_decay_rate: -0.0015,
                power_up_decay_rate: -0.003,
                looting_decay_rate: -0.0003,
                footprint_decay: -1.0,
                bit_stream_chance: 0.25,
                good_bit_chance: 0.015,
                bad_bit_chance: 0.15,
                rarity_weights: default_rarity_weights(),
                threat_by_rarity: RarityTable([2.0, 3.0, 5.0, 7.0, 11.0, 16.0]),
                data_by_rarity: RarityTable([1.0, 30.0, 50.0, 85.0, 140.0, 1200.0]),
                data_multipliers: vec![
                    (DataKind::Omega, 4.0),
                    (DataKind::Sigma, 4.0),
                    (DataKind::Lambda, 8.0),
                ],
                data_loot_table: vec![
                    (DataKind::Omega, 0.4),
                    (DataKind::Sigma, 0.4),
                    (DataKind::Lambda, 0.2),
                ],
                power_up_loot_table: vec![
                    (PowerUpKind::Overclock, 0.4),
                    (PowerUpKind::Cloak, 0.4),
                    (PowerUpKind::Jolt, 0.2),
                ],
                win_conditions: vec![
                    WinCondition {
                        kind: DataKind::Omega,
                        amount: 550.0,
                    },
                    WinCondition {
                        kind: DataKind::Sigma,
                        amount: 450.0,
                    },
                ],
                bonus: vec![DataKind::Lambda],
                initial_loot: 12,
                initial_power_ups: 2,
                loot_spawn_rate: 0.014,
                power_up_spawn_rate: 0.006,
                scroll: ScrollPattern::rotating(
                    Duration::from_secs(6),
                    Duration::from_secs(4),
                    Duration::from_secs(3),
                ),
            },
            Level::Three => LevelConfig {
                level: *self,
                width: 120,
                height: 30,
                fps: 8,
                max_threat: 60.0,
                threat_decay: -0.045,
                movement_threat: 0.5,
                view_distance: 3.5,
                mask_half_width: 5,
                mask_half_height: 2,
                loot_speed: 1.5,
                loot_speed_decay: -1.6,
                leave_speed: 0.9,
                leave_speed_decay: -1.6,
                data_decay_rate: -0.0018,
                power_up_decay_rate: -0.0035,
                looting_decay_rate: -0.0003,
                footprint_decay: -0.8,
                bit_stream_chance: 0.28,
                good_bit_chance: 0.01,
                bad_bit_chance: 0.2,
                rarity_weights: default_rarity_weights(),
                threat_by_rarity: RarityTable([3.0, 4.0, 6.0, 8.0, 12.0, 18.0]),
                data_by_rarity: RarityTable([1.0, 35.0, 55.0, 95.0, 160.0, 1500.0]),
                data_multipliers: vec![
                    (DataKind::Delta, 3.0),
                    (DataKind::Omega, 3.0),
                    (DataKind::Sigma, 3.0),
                    (DataKind::Lambda, 5.0),
                ],
                data_loot_table: vec![
                    (DataKind::Delta, 0.25),
                    (DataKind::Omega, 0.25),
                    (DataKind::Sigma, 0.25),
                    (DataKind::Lambda, 0.25),
                ],
                power_up_loot_table: vec![
                    (PowerUpKind::Overclock, 0.3),
                    (PowerUpKind::Cloak, 0.4),
                    (PowerUpKind::Jolt, 0.3),
                ],
                win_conditions: vec![
                    WinCondition {
                        kind: DataKind::Delta,
                        amount: 300.0,
                    },
                    WinCondition {
                        kind: DataKind::Omega,
                        amount: 300.0,
                    },
                    WinCondition {
                        kind: DataKind::Sigma,
                        amount: 300.0,
                    },
                    WinCondition {
                        kind: DataKind::Lambda,
                        amount: 250.0,
                    },
                ],
                bonus: vec![],
                initial_loot: 14,
                initial_power_ups: 3,
                loot_spawn_rate: 0.016,
                power_up_spawn_rate: 0.007,
                scroll: ScrollPattern::rotating(
                    Duration::from_secs(4),
                    Duration::from_secs(3),
                    Duration::from_secs(2),
                ),
            },
        }
    }
}

/// Rarity draw weights shared by all levels, rarest last. Must sum to 1.
fn default_rarity_weights() -> Vec<(Rarity, f32)> {
    vec![
        (Rarity::Junk, 0.2),
        (Rarity::Common, 0.2),
        (Rarity::Uncommon, 0.3),
        (Rarity::Rare, 0.25),
        (Rarity::Epic, 0.045),
        (Rarity::Legendary, 0.005),
    ]
}

/// Read-only pacing configuration for one level. Grid dimensions are fixed
/// for the lifetime of a world built from this config.
#[derive(Debug, Clone)]
pub struct LevelConfig {
    pub level: Level,
    pub width: i32,
    pub height: i32,
    /// Bit-stream scroll rate; the host loop derives its timer from this.
    pub fps: u32,

    pub max_threat: f32,
    /// Per-tick threat recovery while idle. Negative.
    pub threat_decay: f32,
    /// Threat added per movement step.
    pub movement_threat: f32,

    /// Radius of the circular reveal (vertical distance counts double).
    pub view_distance: f32,
    /// Half-extents of the rectangular background spotlight.
    pub mask_half_width: i32,
    pub mask_half_height: i32,

    /// Action progress per player tick while on loot / the exit.
    pub loot_speed: f32,
    pub loot_speed_decay: f32,
    pub leave_speed: f32,
    pub leave_speed_decay: f32,

    /// Ambient integrity decay for data and power-up loot. Negative.
    pub data_decay_rate: f32,
    pub power_up_decay_rate: f32,
    /// Suppressed decay applied to the cell being actively looted.
    pub looting_decay_rate: f32,
    pub footprint_decay: f32,

    /// Probability a generated cell carries a 0/1 bit at all.
    pub bit_stream_chance: f32,
    pub good_bit_chance: f32,
    pub bad_bit_chance: f32,

    pub rarity_weights: Vec<(Rarity, f32)>,
    pub threat_by_rarity: RarityTable,
    pub data_by_rarity: RarityTable,
    pub data_multipliers: Vec<(DataKind, f32)>,
    pub data_loot_table: Vec<(DataKind, f32)>,
    pub power_up_loot_table: Vec<(PowerUpKind, f32)>,
    pub win_conditions: Vec<WinCondition>,
    /// Kinds that spawn but are not required to win.
    pub bonus: Vec<DataKind>,

    pub initial_loot: usize,
    pub initial_power_ups: usize,
    /// Fractional spawn accumulators: one spawn each time these cross 1.0.
    pub loot_spawn_rate: f32,
    pub power_up_spawn_rate: f32,

    pub scroll: ScrollPattern,
}

impl LevelConfig {
    pub fn name(&self) -> &'static str {
        self.level.name()
    }

    pub fn data_multiplier(&self, kind: DataKind) -> f32 {
        self.data_multipliers
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, m)| *m)
            .unwrap_or(1.0)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Configuration-authoring invariants, checked once at load time.
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }

        check_table_sum("data_loot_table", self.data_loot_table.iter().map(|e| e.1))?;
        check_table_sum(
            "power_up_loot_table",
            self.power_up_loot_table.iter().map(|e| e.1),
        )?;
        check_table_sum("rarity_weights", self.rarity_weights.iter().map(|e| e.1))?;

        for (name, value) in [
            ("threat_decay", self.threat_decay),
            ("loot_speed_decay", self.loot_speed_decay),
            ("leave_speed_decay", self.leave_speed_decay),
            ("data_decay_rate", self.data_decay_rate),
            ("power_up_decay_rate", self.power_up_decay_rate),
            ("looting_decay_rate", self.looting_decay_rate),
            ("footprint_decay", self.footprint_decay),
        ] {
            if value >= 0.0 {
                return Err(ConfigError::NonNegativeDecay { name, value });
            }
        }

        for (name, value) in [
            ("bit_stream_chance", self.bit_stream_chance),
            ("good_bit_chance", self.good_bit_chance),
            ("bad_bit_chance", self.bad_bit_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidChance { name, value });
            }
        }

        for cond in &self.win_conditions {
            if !self.data_loot_table.iter().any(|(k, _)| *k == cond.kind) {
                return Err(ConfigError::MissingWinConditionLoot(cond.kind));
            }
        }

        Ok(())
    }
}

fn check_table_sum(table: &'static str, weights: impl Iterator<Item = f32>) -> Result<()> {
    let sum: f32 = weights.sum();
    if (sum - 1.0).abs() > 1e-4 {
        return Err(ConfigError::UnbalancedTable { table, sum });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_levels_validate() {
        for level in Level::ALL {
            let config = level.config();
            assert_eq!(config.level, level);
            config
                .validate()
                .unwrap_or_else(|e| panic!("{} failed validation: {e}", level.name()));
            assert!(config.is_valid());
            assert!(!config.win_conditions.is_empty(), "must have win conditions");
            assert!(!config.power_up_loot_table.is_empty(), "must have power ups");
            assert!(!config.data_loot_table.is_empty(), "must have data loot");
        }
    }

    #[test]
    fn test_level_progression() {
        assert_eq!(Level::Tutorial.next(), Some(Level::One));
        assert_eq!(Level::Two.next(), Some(Level::Three));
        assert_eq!(Level::Three.next(), None);
        assert_eq!(Level::from_index(99), None);
    }

    #[test]
    fn test_unbalanced_table_is_rejected() {
        let mut config = Level::Tutorial.config();
        config.data_loot_table = vec![(DataKind::Delta, 0.5), (DataKind::Omega, 0.2)];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnbalancedTable { table: "data_loot_table", .. })
        ));
        assert!(!config.is_valid());
    }

    #[test]
    fn test_positive_decay_is_rejected() {
        let mut config = Level::Tutorial.config();
        config.footprint_decay = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonNegativeDecay { name: "footprint_decay", .. })
        ));
    }

    #[test]
    fn test_win_condition_must_be_spawnable() {
        let mut config = Level::Tutorial.config();
        config.win_conditions = vec![WinCondition {
            kind: DataKind::Lambda,
            amount: 10.0,
        }];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingWinConditionLoot(DataKind::Lambda))
        ));
    }

    #[test]
    fn test_unknown_multiplier_defaults_to_identity() {
        let config = Level::Tutorial.config();
        assert_eq!(config.data_multiplier(DataKind::Lambda), 1.0);
    }
}
