use thiserror::Error;

/// Configuration-authoring failures, caught once at level load.
///
/// The running engine itself has no recoverable errors: invalid inputs are
/// clamped or ignored, and terminal states surface through boolean queries.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{table} weights sum to {sum}, expected 1.0")]
    UnbalancedTable { table: &'static str, sum: f32 },

    #[error("{name} must be negative, got {value}")]
    NonNegativeDecay { name: &'static str, value: f32 },

    #[error("{name} must be a probability in [0, 1], got {value}")]
    InvalidChance { name: &'static str, value: f32 },

    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("win condition references {0:?} which is missing from the data loot table")]
    MissingWinConditionLoot(crate::world::loot::DataKind),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
