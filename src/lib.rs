//! Bitrunner - terminal arcade simulation engine
//!
//! The player navigates a scrolling grid of procedurally generated bits,
//! collects decaying loot, and escapes through an exit unlocked by win
//! conditions, all while a detection meter climbs toward game over.
//!
//! The engine is pure in-memory computation: a scheduler (see [`runner`])
//! invokes the tick entry points on [`state::GameState`] at different rates,
//! and the terminal frontend asks it for rendered text.

pub mod core;
pub mod level;
pub mod player;
pub mod runner;
pub mod state;
pub mod view;
pub mod world;
