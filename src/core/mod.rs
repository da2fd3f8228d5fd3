pub mod error;
pub mod types;

pub use error::{ConfigError, Result};
pub use types::{weighted_choice, Coordinate, Direction, Rarity, RarityTable};
