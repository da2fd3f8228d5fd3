//! Game orchestration behind a single non-reentrant lock
//!
//! [`GameState`] is the only concurrency boundary in the engine. Every tick
//! family and every input handler locks the one session mutex at its public
//! entry point; all private logic runs on an already-locked [`Session`] and
//! never locks again, so no call path can deadlock on itself. Terminal
//! outcomes (detection, completion) freeze every tick family.

use std::sync::{Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::{Coordinate, Direction};
use crate::level::{Level, LevelConfig};
use crate::player::{ActionKind, Player};
use crate::view::{self, symbols::CompatibilityMode};
use crate::world::bits::RevealedBit;
use crate::world::loot::{DataKind, Loot};
use crate::world::World;

pub struct GameState {
    inner: Mutex<Session>,
}

struct Session {
    world: World,
    player: Player,
    mode: CompatibilityMode,
    rng: StdRng,
    complete: bool,
    detected: bool,
}

impl GameState {
    /// Start a run with the player spawned at a random interior cell, one
    /// step in from every edge.
    pub fn new(level: Level, mode: CompatibilityMode) -> Self {
        let config = level.config();
        let mut rng = StdRng::from_entropy();
        let start = Coordinate::new(
            rng.gen_range(1..config.width - 1),
            rng.gen_range(1..config.height - 1),
        );
        Self {
            inner: Mutex::new(Session::new(config, start, mode, rng)),
        }
    }

    /// Explicit spawn point, clamped to the grid interior. Used by tests and
    /// to carry the player's position from one level into the next.
    pub fn with_player_at(level: Level, mode: CompatibilityMode, start: Coordinate) -> Self {
        let config = level.config();
        let start = Coordinate::new(
            start.x.clamp(0, config.width - 2),
            start.y.clamp(0, config.height - 2),
        );
        let rng = StdRng::from_entropy();
        Self {
            inner: Mutex::new(Session::new(config, start, mode, rng)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // A panicked tick poisons the lock; the session data is still
        // coherent enough to render a final frame, so recover it.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // --- tick entry points, one per scheduler rate ---

    pub fn tick_world(&self) {
        self.lock().tick_world();
    }

    pub fn tick_player(&self) {
        self.lock().tick_player();
    }

    pub fn tick_bit_stream(&self) {
        self.lock().tick_bit_stream();
    }

    pub fn tick_animations(&self) {
        self.lock().tick_animations();
    }

    pub fn tick_movement(&self) {
        self.lock().tick_movement();
    }

    // --- input ---

    pub fn move_player(&self, dir: Direction) {
        self.lock().move_player(dir);
    }

    // --- queries ---

    pub fn render(&self) -> Vec<String> {
        let session = self.lock();
        view::render(&session.world, &session.player, session.mode)
    }

    pub fn threat_meter(&self) -> String {
        let session = self.lock();
        view::threat_meter(&session.player, session.world.level(), session.mode)
    }

    pub fn progress_bar(&self) -> Option<String> {
        let session = self.lock();
        view::progress_bar(&session.player, session.mode)
    }

    /// Which kind of action the progress bar is reporting.
    pub fn action_kind(&self) -> ActionKind {
        self.lock().player.action.kind
    }

    pub fn level(&self) -> Level {
        self.lock().world.level().level
    }

    pub fn level_name(&self) -> &'static str {
        self.lock().world.level().name()
    }

    pub fn fps(&self) -> u32 {
        self.lock().world.level().fps
    }

    pub fn is_complete(&self) -> bool {
        self.lock().complete
    }

    pub fn is_detected(&self) -> bool {
        self.lock().detected
    }

    pub fn is_game_over(&self) -> bool {
        let session = self.lock();
        session.complete || session.detected
    }

    pub fn player_location(&self) -> Coordinate {
        self.lock().player.location
    }

    pub fn threat(&self) -> f32 {
        self.lock().player.threat
    }

    pub fn exit_unlocked(&self) -> bool {
        self.lock().world.exit().is_some()
    }

    pub fn inventory(&self) -> Vec<Loot> {
        self.lock().player.inventory().to_vec()
    }

    pub fn loot_remaining(&self) -> usize {
        self.lock().world.live_loot().count()
    }

    /// Win-condition progress: `(kind, collected, wanted)` per condition.
    pub fn objectives(&self) -> Vec<(DataKind, f32, f32)> {
        let session = self.lock();
        session
            .world
            .level()
            .win_conditions
            .iter()
            .map(|w| (w.kind, session.player.data_collected(w.kind), w.amount))
            .collect()
    }
}

impl Session {
    fn new(config: LevelConfig, start: Coordinate, mode: CompatibilityMode, mut rng: StdRng) -> Self {
        let world = World::generate(config, &mut rng);
        Self {
            world,
            player: Player::new(start),
            mode,
            rng,
            complete: false,
            detected: false,
        }
    }

    fn is_over(&self) -> bool {
        self.complete || self.detected
    }

    /// The loot cell being actively extracted, if any; its integrity decay is
    /// suppressed so loot cannot vanish mid-collection.
    fn held_loot(&self) -> Option<Coordinate> {
        (self.player.action.kind == ActionKind::Loot).then_some(self.player.action.location)
    }

    fn tick_world(&mut self) {
        if self.is_over() {
            return;
        }
        let held = self.held_loot();
        self.world.tick_loot(held, &mut self.rng);
        self.world.tick_footprints();
    }

    fn tick_player(&mut self) {
        if self.is_over() {
            return;
        }
        let loc = self.player.location;
        if self.world.collides_with_exit(loc) {
            let speed = self.world.level().leave_speed;
            self.player.encounter(ActionKind::Exit, loc);
            if self.player.advance_action(speed) {
                self.complete = true;
                tracing::info!(level = self.world.level().name(), "level complete");
            }
        } else if self.world.collides_with_loot(loc) {
            let speed = self.world.level().loot_speed;
            self.player.encounter(ActionKind::Loot, loc);
            if self.player.advance_action(speed) {
                let loot = self.world.extract_loot(loc);
                tracing::debug!(?loot.kind, loot.data, "loot extracted");
                self.player.merge_loot(loot);
                self.check_win_conditions();
            }
        } else {
            let (loot_decay, leave_decay, threat_decay, max_threat) = {
                let level = self.world.level();
                (
                    level.loot_speed_decay,
                    level.leave_speed_decay,
                    level.threat_decay,
                    level.max_threat,
                )
            };
            match self.player.action.kind {
                ActionKind::Loot => self.player.decay_action(loot_decay),
                ActionKind::Exit => self.player.decay_action(leave_decay),
                ActionKind::None => {}
            }
            // Threat only recovers while idle off any interaction cell.
            self.player.tick_threat(threat_decay, max_threat);
        }
        self.update_detection();
    }

    fn tick_bit_stream(&mut self) {
        if self.is_over() {
            return;
        }
        self.world.scroll_bits(&mut self.rng);
        self.resolve_bit_collision(self.player.location);
    }

    fn tick_animations(&mut self) {
        if self.is_over() {
            return;
        }
        self.world.tick_animations(&mut self.rng);
    }

    fn tick_movement(&mut self) {
        if self.is_over() {
            return;
        }
        if let Some(dir) = self.player.auto_move() {
            if !self.step(dir) {
                self.player.stop_auto_move();
            }
        }
    }

    fn move_player(&mut self, dir: Direction) {
        if self.is_over() {
            return;
        }
        self.player.note_input(dir);
        if !self.step(dir) {
            self.player.stop_auto_move();
        }
    }

    /// One movement step, clamped to the interior. Returns false when the
    /// clamp blocked the move entirely.
    fn step(&mut self, dir: Direction) -> bool {
        let (width, height, movement_threat, max_threat) = {
            let level = self.world.level();
            (level.width, level.height, level.movement_threat, level.max_threat)
        };
        let from = self.player.location;
        let mut to = from.translated(dir);
        to.x = to.x.clamp(0, width - 2);
        to.y = to.y.clamp(0, height - 2);
        if to == from {
            return false;
        }
        self.player.location = to;
        self.player.tick_threat(movement_threat, max_threat);
        // The footprint marks where the player now stands; it shows once
        // they move on.
        self.world.visit(to);
        self.resolve_bit_collision(to);
        self.update_detection();
        true
    }

    /// Harmful bits raise threat and stay armed; helpful bits lower threat
    /// and are neutralized so they fire once.
    fn resolve_bit_collision(&mut self, c: Coordinate) {
        let max_threat = self.world.level().max_threat;
        let (magnitude, harmful) = self.world.collides_with_bit(c, RevealedBit::Harmful);
        if harmful {
            self.player.tick_threat(magnitude, max_threat);
            self.update_detection();
            return;
        }
        let (magnitude, helpful) = self.world.collides_with_bit(c, RevealedBit::Helpful);
        if helpful {
            self.player.tick_threat(-magnitude, max_threat);
            self.world.neutralize_bit(c);
        }
    }

    fn check_win_conditions(&mut self) {
        let met = self
            .world
            .level()
            .win_conditions
            .iter()
            .all(|w| self.player.data_collected(w.kind) >= w.amount);
        if met {
            self.world.unlock_exit(&mut self.rng);
        }
    }

    fn update_detection(&mut self) {
        let max_threat = self.world.level().max_threat;
        if !self.detected && self.player.is_detected(max_threat) {
            self.detected = true;
            tracing::info!(threat = self.player.threat, "player detected, run over");
        }
    }
}
