//! Player state: location, threat, inventory, and the current action
//!
//! Actions (looting, leaving) are progress-gated: they require sustained
//! presence on the target cell, and progress carries over neither across
//! action types nor across cells. Threat is the detection meter; it clamps
//! to `[0, max_threat]` and reaching the ceiling is terminal.

use std::time::{Duration, Instant};

use ahash::AHashMap;

use crate::core::Coordinate;
use crate::world::loot::{DataKind, Loot, LootKind};

/// Same-direction key repeats inside this window engage auto-move.
pub const AUTO_MOVE_WINDOW: Duration = Duration::from_millis(100);

const PROGRESS_DONE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    None,
    Loot,
    Exit,
}

/// Progress-gated interaction with the cell the player stands on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Action {
    pub kind: ActionKind,
    /// In [0, 100]; completion fires exactly when 100 is crossed.
    pub progress: f32,
    pub location: Coordinate,
}

impl Action {
    const IDLE: Action = Action {
        kind: ActionKind::None,
        progress: 0.0,
        location: Coordinate { x: 0, y: 0 },
    };
}

#[derive(Debug)]
pub struct Player {
    pub location: Coordinate,
    pub threat: f32,
    pub action: Action,
    inventory: Vec<Loot>,
    data_collected: AHashMap<DataKind, f32>,
    last_input: Option<(crate::core::Direction, Instant)>,
    auto_move: Option<crate::core::Direction>,
}

impl Player {
    pub fn new(location: Coordinate) -> Self {
        Self {
            location,
            threat: 0.0,
            action: Action::IDLE,
            inventory: Vec::new(),
            data_collected: AHashMap::new(),
            last_input: None,
            auto_move: None,
        }
    }

    // --- threat ---

    /// Apply a signed threat delta, clamped to `[0, max_threat]`.
    pub fn tick_threat(&mut self, delta: f32, max_threat: f32) {
        self.threat = (self.threat + delta).clamp(0.0, max_threat);
    }

    pub fn is_detected(&self, max_threat: f32) -> bool {
        self.threat >= max_threat
    }

    // --- actions ---

    /// Re-anchor the current action. Progress resets whenever the action
    /// type or the encountered coordinate changes, so progress from a
    /// previous cell or action never carries over.
    pub fn encounter(&mut self, kind: ActionKind, location: Coordinate) {
        if self.action.kind != kind || self.action.location != location {
            self.action = Action {
                kind,
                progress: 0.0,
                location,
            };
        }
    }

    /// Advance the current action; true exactly when 100 is crossed, at
    /// which point progress resets for the next interaction.
    pub fn advance_action(&mut self, speed: f32) -> bool {
        self.action.progress += speed;
        if self.action.progress >= PROGRESS_DONE {
            self.action.progress = 0.0;
            return true;
        }
        false
    }

    /// Let a stale action bleed away while the player is off its cell.
    pub fn decay_action(&mut self, rate: f32) {
        self.action.progress = (self.action.progress + rate).max(0.0);
        if self.action.progress == 0.0 {
            self.action = Action {
                location: self.action.location,
                ..Action::IDLE
            };
        }
    }

    // --- inventory ---

    /// Merge extracted loot: append, keep the inventory sorted by rarity
    /// descending, and credit the data total for its kind. Empty husks are
    /// ignored.
    pub fn merge_loot(&mut self, loot: Loot) {
        match loot.kind {
            LootKind::Empty => return,
            LootKind::Data(kind) => {
                *self.data_collected.entry(kind).or_insert(0.0) += loot.data;
            }
            LootKind::PowerUp(_) => {}
        }
        self.inventory.push(loot);
        self.inventory.sort_by(|a, b| b.rarity.cmp(&a.rarity));
    }

    pub fn inventory(&self) -> &[Loot] {
        &self.inventory
    }

    pub fn data_collected(&self, kind: DataKind) -> f32 {
        self.data_collected.get(&kind).copied().unwrap_or(0.0)
    }

    // --- movement input ---

    /// Record a directional key press. A repeat of the same direction inside
    /// the debounce window engages auto-move; any other direction clears it.
    pub fn note_input(&mut self, dir: crate::core::Direction) {
        match self.last_input {
            Some((last, at)) if last == dir && at.elapsed() < AUTO_MOVE_WINDOW => {
                self.auto_move = Some(dir);
            }
            Some((last, _)) if last != dir => {
                self.auto_move = None;
            }
            _ => {}
        }
        self.last_input = Some((dir, Instant::now()));
    }

    pub fn auto_move(&self) -> Option<crate::core::Direction> {
        self.auto_move
    }

    /// Auto-move stops when movement is blocked or direction changes.
    pub fn stop_auto_move(&mut self) {
        self.auto_move = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Direction, Rarity};

    #[test]
    fn test_threat_clamps_to_bounds() {
        let mut player = Player::new(Coordinate::new(0, 0));
        player.tick_threat(30.0, 50.0);
        player.tick_threat(40.0, 50.0);
        assert_eq!(player.threat, 50.0);
        player.tick_threat(-200.0, 50.0);
        assert_eq!(player.threat, 0.0);
    }

    #[test]
    fn test_encounter_resets_on_cell_change() {
        let mut player = Player::new(Coordinate::new(0, 0));
        let a = Coordinate::new(1, 1);
        let b = Coordinate::new(2, 1);

        player.encounter(ActionKind::Loot, a);
        player.advance_action(40.0);
        assert_eq!(player.action.progress, 40.0);

        // Same action, same cell: progress survives.
        player.encounter(ActionKind::Loot, a);
        assert_eq!(player.action.progress, 40.0);

        // Different loot cell: progress resets.
        player.encounter(ActionKind::Loot, b);
        assert_eq!(player.action.progress, 0.0);

        // Different action on the same cell: resets too.
        player.advance_action(25.0);
        player.encounter(ActionKind::Exit, b);
        assert_eq!(player.action.progress, 0.0);
    }

    #[test]
    fn test_advance_completes_once_at_100() {
        let mut player = Player::new(Coordinate::new(0, 0));
        player.encounter(ActionKind::Exit, Coordinate::new(3, 3));
        for _ in 0..99 {
            assert!(!player.advance_action(1.0));
        }
        assert!(player.advance_action(1.0));
        assert_eq!(player.action.progress, 0.0);
    }

    #[test]
    fn test_action_decay_floors_at_zero() {
        let mut player = Player::new(Coordinate::new(0, 0));
        player.encounter(ActionKind::Loot, Coordinate::new(1, 1));
        player.advance_action(10.0);
        player.decay_action(-6.0);
        assert_eq!(player.action.progress, 4.0);
        player.decay_action(-6.0);
        assert_eq!(player.action.progress, 0.0);
        assert_eq!(player.action.kind, ActionKind::None);
    }

    #[test]
    fn test_inventory_sorted_by_rarity_descending() {
        let mut player = Player::new(Coordinate::new(0, 0));
        for (rarity, data) in [
            (Rarity::Common, 25.0),
            (Rarity::Legendary, 1000.0),
            (Rarity::Rare, 70.0),
        ] {
            player.merge_loot(Loot {
                kind: LootKind::Data(DataKind::Delta),
                rarity,
                data,
                integrity: 0.8,
            });
        }
        let rarities: Vec<_> = player.inventory().iter().map(|l| l.rarity).collect();
        assert_eq!(rarities, vec![Rarity::Legendary, Rarity::Rare, Rarity::Common]);
        assert_eq!(player.data_collected(DataKind::Delta), 1095.0);
        assert_eq!(player.data_collected(DataKind::Omega), 0.0);
    }

    #[test]
    fn test_empty_loot_is_not_merged() {
        let mut player = Player::new(Coordinate::new(0, 0));
        player.merge_loot(Loot::EMPTY);
        assert!(player.inventory().is_empty());
    }

    #[test]
    fn test_rapid_repeat_engages_auto_move() {
        let mut player = Player::new(Coordinate::new(5, 5));
        player.note_input(Direction::Right);
        assert_eq!(player.auto_move(), None);
        player.note_input(Direction::Right); // immediate repeat
        assert_eq!(player.auto_move(), Some(Direction::Right));
        player.note_input(Direction::Up); // direction change interrupts
        assert_eq!(player.auto_move(), None);
    }
}
