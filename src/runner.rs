//! Multi-rate tick scheduler
//!
//! Four timer families drive the engine concurrently, all funneling into the
//! same [`GameState`] lock: the fixed world/player tick, the level-paced bit
//! stream scroll, the animation re-roll, and the auto-move repeater. The loop
//! exits when the shutdown watch flips to true; `biased` ordering makes the
//! shutdown check win over any due timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::state::GameState;

/// Fixed cadence for world decay and player-action progress.
pub const WORLD_TICK: Duration = Duration::from_millis(33);
/// Flicker and beacon re-roll cadence.
pub const ANIMATION_TICK: Duration = Duration::from_millis(90);
/// Auto-move step cadence while a direction is held.
pub const AUTO_MOVE_TICK: Duration = Duration::from_millis(142);

/// Scroll period derived from the level's stream rate.
pub fn scroll_interval(fps: u32) -> Duration {
    Duration::from_millis(1000 / u64::from(fps.max(1)))
}

/// Drive all periodic ticks until `shutdown` is set to true.
pub async fn run(state: Arc<GameState>, mut shutdown: watch::Receiver<bool>) {
    let mut world = time::interval(WORLD_TICK);
    let mut scroll = time::interval(scroll_interval(state.fps()));
    let mut animation = time::interval(ANIMATION_TICK);
    let mut auto_move = time::interval(AUTO_MOVE_TICK);
    for interval in [&mut world, &mut scroll, &mut animation, &mut auto_move] {
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    }

    tracing::debug!(fps = state.fps(), "scheduler running");
    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                // A dropped sender counts as shutdown.
                if changed.is_err() || *shutdown.borrow() {
                    tracing::debug!("scheduler stopped");
                    return;
                }
            }
            _ = world.tick() => {
                state.tick_world();
                state.tick_player();
            }
            _ = scroll.tick() => state.tick_bit_stream(),
            _ = animation.tick() => state.tick_animations(),
            _ = auto_move.tick() => state.tick_movement(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::view::symbols::CompatibilityMode;

    #[test]
    fn test_scroll_interval_follows_stream_rate() {
        assert_eq!(scroll_interval(2), Duration::from_millis(500));
        assert_eq!(scroll_interval(8), Duration::from_millis(125));
        assert_eq!(scroll_interval(0), Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_runner_stops_on_shutdown() {
        let state = Arc::new(GameState::new(Level::Tutorial, CompatibilityMode::Ascii));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run(state.clone(), rx));

        tokio::time::sleep(Duration::from_millis(150)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        // The session survived concurrent ticking and still renders.
        let height = state.render().len();
        assert_eq!(height, 20);
    }
}
