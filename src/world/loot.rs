//! Loot and footprint lifecycle
//!
//! Loot is a collectible grid item with a kind, rarity, data value, and an
//! integrity scalar that decays every world tick; at zero integrity the loot
//! is worthless and disappears. Footprints are decaying visual traces left at
//! visited cells.

use rand::Rng;

use crate::core::{weighted_choice, Rarity};
use crate::level::LevelConfig;
use crate::view::symbols::{self, SymbolSet};

/// Data payload categories; win conditions are expressed over these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Delta,
    Omega,
    Sigma,
    Lambda,
}

impl DataKind {
    pub fn symbol(&self) -> SymbolSet {
        match self {
            DataKind::Delta => symbols::DELTA,
            DataKind::Omega => symbols::OMEGA,
            DataKind::Sigma => symbols::SIGMA,
            DataKind::Lambda => symbols::LAMBDA,
        }
    }
}

/// Collectible power-ups. Effects beyond collection are out of scope for the
/// engine; they count toward the end-of-run tally only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    Overclock,
    Cloak,
    Jolt,
}

impl PowerUpKind {
    pub fn symbol(&self) -> SymbolSet {
        match self {
            PowerUpKind::Overclock => symbols::PHI,
            PowerUpKind::Cloak => symbols::PSI,
            PowerUpKind::Jolt => symbols::KOPPA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LootKind {
    Empty,
    Data(DataKind),
    PowerUp(PowerUpKind),
}

/// Which spawn table a new loot draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LootClass {
    Data,
    PowerUp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Loot {
    pub kind: LootKind,
    pub rarity: Rarity,
    pub data: f32,
    /// Freshness in (−∞, 1]; starts at 1.0, destroyed below 0.
    pub integrity: f32,
}

/// Integrity bands used for the redacted out-of-view tint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityTier {
    High,
    Medium,
    Low,
}

impl Loot {
    pub const EMPTY: Loot = Loot {
        kind: LootKind::Empty,
        rarity: Rarity::Junk,
        data: 0.0,
        integrity: 0.0,
    };

    /// Sample a fresh loot from the level's tables. Data loot value is
    /// `data_by_rarity[rarity] * data_multiplier[kind]`.
    pub fn generate(level: &LevelConfig, class: LootClass, rng: &mut impl Rng) -> Loot {
        let rarity = weighted_choice(&level.rarity_weights, rng.gen());
        match class {
            LootClass::Data => {
                let kind = weighted_choice(&level.data_loot_table, rng.gen());
                let data = level.data_by_rarity[rarity] * level.data_multiplier(kind);
                Loot {
                    kind: LootKind::Data(kind),
                    rarity,
                    data,
                    integrity: 1.0,
                }
            }
            LootClass::PowerUp => {
                let kind = weighted_choice(&level.power_up_loot_table, rng.gen());
                Loot {
                    kind: LootKind::PowerUp(kind),
                    rarity,
                    data: 0.0,
                    integrity: 1.0,
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == LootKind::Empty
    }

    /// Apply one tick of (negative) integrity decay. Below zero the loot
    /// becomes an Empty husk worth nothing.
    pub fn tick(&mut self, rate: f32) {
        self.integrity += rate;
        if self.integrity < 0.0 {
            self.kind = LootKind::Empty;
            self.data = 0.0;
            self.rarity = Rarity::Junk;
        }
    }

    pub fn integrity_tier(&self) -> IntegrityTier {
        if self.integrity > 0.33 {
            IntegrityTier::High
        } else if self.integrity > 0.15 {
            IntegrityTier::Medium
        } else {
            IntegrityTier::Low
        }
    }

    pub fn symbol(&self) -> SymbolSet {
        match self.kind {
            LootKind::Empty => SymbolSet::new(" ", " ", " "),
            LootKind::Data(kind) => kind.symbol(),
            LootKind::PowerUp(kind) => kind.symbol(),
        }
    }
}

/// A decaying trace of the player's passage, rendering-only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub intensity: f32,
}

impl Footprint {
    pub const FRESH: Footprint = Footprint { intensity: 100.0 };

    pub fn tick(&mut self, rate: f32) {
        self.intensity += rate;
    }

    pub fn is_faded(&self) -> bool {
        self.intensity <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;

    #[test]
    fn test_loot_decays_to_empty() {
        let mut loot = Loot {
            kind: LootKind::Data(DataKind::Delta),
            rarity: Rarity::Rare,
            data: 350.0,
            integrity: 0.05,
        };
        loot.tick(-0.03);
        assert!(!loot.is_empty(), "still above zero");
        loot.tick(-0.03);
        assert!(loot.is_empty());
        assert_eq!(loot.data, 0.0);
    }

    #[test]
    fn test_integrity_tiers() {
        let mut loot = Loot {
            integrity: 1.0,
            ..Loot::EMPTY
        };
        assert_eq!(loot.integrity_tier(), IntegrityTier::High);
        loot.integrity = 0.2;
        assert_eq!(loot.integrity_tier(), IntegrityTier::Medium);
        loot.integrity = 0.1;
        assert_eq!(loot.integrity_tier(), IntegrityTier::Low);
    }

    #[test]
    fn test_generated_data_loot_uses_value_tables() {
        let level = Level::Tutorial.config();
        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let loot = Loot::generate(&level, LootClass::Data, &mut rng);
            let LootKind::Data(kind) = loot.kind else {
                panic!("data class must generate data loot");
            };
            assert_eq!(loot.integrity, 1.0);
            assert_eq!(
                loot.data,
                level.data_by_rarity[loot.rarity] * level.data_multiplier(kind)
            );
        }
    }

    #[test]
    fn test_footprint_fades() {
        let mut fp = Footprint::FRESH;
        assert!(!fp.is_faded());
        for _ in 0..100 {
            fp.tick(-1.0);
        }
        assert!(fp.is_faded());
    }
}
