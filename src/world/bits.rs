//! Procedural bit stream: generation, scroll, collision queries
//!
//! Every grid cell carries exactly one [`Bits`] value. A periodic scroll
//! translates the whole field one step; cells pushed off an edge wrap to the
//! opposite side and are regenerated, so fresh content continuously enters
//! from the wrap edge. That regeneration is what makes the field read as an
//! endless stream rather than a looping buffer.

use std::time::{Duration, Instant};

use ahash::AHashMap;
use rand::Rng;

use crate::core::{weighted_choice, Coordinate, Direction, Rarity};
use crate::level::LevelConfig;
use crate::view::symbols::AnimatedSymbol;

/// Pre-reveal cell content: a dim 0/1 glyph, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiddenBit {
    Empty,
    Zero,
    One,
}

impl HiddenBit {
    pub fn glyph(&self) -> &'static str {
        match self {
            HiddenBit::Empty => " ",
            HiddenBit::Zero => "0",
            HiddenBit::One => "1",
        }
    }
}

/// Semantic effect of a bit once revealed inside the view radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealedBit {
    Benign,
    Helpful,
    Harmful,
}

/// One grid cell of the stream.
///
/// Invariant: `revealed != Benign` only when `hidden != Empty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bits {
    pub hidden: HiddenBit,
    pub revealed: RevealedBit,
    pub rarity: Rarity,
    pub symbol: Option<AnimatedSymbol>,
}

impl Bits {
    pub const EMPTY: Bits = Bits {
        hidden: HiddenBit::Empty,
        revealed: RevealedBit::Benign,
        rarity: Rarity::Junk,
        symbol: None,
    };

    /// Threat magnitude contributed on collision, by rarity tier. Helpful
    /// bits use the same magnitude with the sign flipped by the caller.
    pub fn threat(&self, level: &LevelConfig) -> f32 {
        level.threat_by_rarity[self.rarity]
    }
}

/// Roll one fresh cell from the level's generation chances.
fn generate_cell(level: &LevelConfig, rng: &mut impl Rng) -> Bits {
    if rng.gen::<f32>() >= level.bit_stream_chance {
        return Bits::EMPTY;
    }
    let hidden = if rng.gen::<bool>() {
        HiddenBit::One
    } else {
        HiddenBit::Zero
    };
    let rarity = weighted_choice(&level.rarity_weights, rng.gen());
    let u = rng.gen::<f32>();
    let revealed = if u < level.bad_bit_chance {
        RevealedBit::Harmful
    } else if u > 1.0 - level.good_bit_chance {
        RevealedBit::Helpful
    } else {
        RevealedBit::Benign
    };
    let symbol = match revealed {
        RevealedBit::Benign => None,
        RevealedBit::Harmful => Some(AnimatedSymbol::noise_for(true, rarity)),
        RevealedBit::Helpful => Some(AnimatedSymbol::noise_for(false, rarity)),
    };
    Bits {
        hidden,
        revealed,
        rarity,
        symbol,
    }
}

/// The full grid of bits. Occupancy is total: every in-bounds coordinate has
/// exactly one cell, before and after any scroll.
#[derive(Debug, Clone)]
pub struct BitStream {
    width: i32,
    height: i32,
    cells: AHashMap<Coordinate, Bits>,
}

impl BitStream {
    pub fn generate(level: &LevelConfig, rng: &mut impl Rng) -> Self {
        let mut cells = AHashMap::with_capacity((level.width * level.height) as usize);
        for x in 0..level.width {
            for y in 0..level.height {
                cells.insert(Coordinate::new(x, y), generate_cell(level, rng));
            }
        }
        Self {
            width: level.width,
            height: level.height,
            cells,
        }
    }

    pub fn get(&self, c: Coordinate) -> Bits {
        self.cells.get(&c).copied().unwrap_or(Bits::EMPTY)
    }

    pub fn occupied(&self) -> usize {
        self.cells.len()
    }

    /// Collision query: threat magnitude at `c` plus whether the cell's
    /// revealed state matches `wanted`.
    pub fn collides_with(
        &self,
        level: &LevelConfig,
        c: Coordinate,
        wanted: RevealedBit,
    ) -> (f32, bool) {
        match self.cells.get(&c) {
            Some(bits) => (bits.threat(level), bits.revealed == wanted),
            None => (0.0, false),
        }
    }

    /// Forcibly reset a cell to Benign so a consumed helpful bit cannot be
    /// re-triggered.
    pub fn neutralize(&mut self, c: Coordinate) {
        if let Some(bits) = self.cells.get_mut(&c) {
            bits.revealed = RevealedBit::Benign;
            bits.symbol = None;
        }
    }

    /// Translate every cell one step in `dir`. Cells leaving the bounds wrap
    /// to the opposite edge and are regenerated rather than carried over.
    pub fn scroll(&mut self, dir: Direction, level: &LevelConfig, rng: &mut impl Rng) {
        let mut next = AHashMap::with_capacity(self.cells.len());
        for (&coord, &bits) in &self.cells {
            let mut c = coord.translated(dir);
            if c.x >= 0 && c.x < self.width && c.y >= 0 && c.y < self.height {
                next.insert(c, bits);
            } else {
                if c.x >= self.width {
                    c.x = 0;
                } else if c.x < 0 {
                    c.x = self.width - 1;
                }
                if c.y >= self.height {
                    c.y = 0;
                } else if c.y < 0 {
                    c.y = self.height - 1;
                }
                next.insert(c, generate_cell(level, rng));
            }
        }
        self.cells = next;
    }

    /// Re-roll the flicker overlay on every animated cell. Rendering-only.
    pub fn tick_animations(&mut self, rng: &mut impl Rng) {
        for bits in self.cells.values_mut() {
            if let Some(symbol) = bits.symbol.as_mut() {
                symbol.tick(rng);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn put(&mut self, c: Coordinate, bits: Bits) {
        self.cells.insert(c, bits);
    }
}

/// One step of a scroll schedule: drift this way for this long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollStep {
    pub dir: Direction,
    pub dwell: Duration,
}

/// Level-authored description of how the stream drifts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrollPattern {
    /// Fixed single direction forever.
    Linear(Direction),
    /// Steps cycled in order, each held for its dwell duration.
    Cycle(Vec<ScrollStep>),
}

impl ScrollPattern {
    /// Full clockwise rotation through all 8 directions, with separate dwell
    /// times for vertical, horizontal, and diagonal legs.
    pub fn rotating(vertical: Duration, horizontal: Duration, diagonal: Duration) -> Self {
        ScrollPattern::Cycle(vec![
            ScrollStep { dir: Direction::Down, dwell: vertical },
            ScrollStep { dir: Direction::DownLeft, dwell: diagonal },
            ScrollStep { dir: Direction::Left, dwell: horizontal },
            ScrollStep { dir: Direction::UpLeft, dwell: diagonal },
            ScrollStep { dir: Direction::Up, dwell: vertical },
            ScrollStep { dir: Direction::UpRight, dwell: diagonal },
            ScrollStep { dir: Direction::Right, dwell: horizontal },
            ScrollStep { dir: Direction::DownRight, dwell: diagonal },
        ])
    }

    /// Downward zig-zag: down, down-left, down, down-right.
    pub fn zig_zag(cardinal: Duration, diagonal: Duration) -> Self {
        ScrollPattern::Cycle(vec![
            ScrollStep { dir: Direction::Down, dwell: cardinal },
            ScrollStep { dir: Direction::DownLeft, dwell: diagonal },
            ScrollStep { dir: Direction::Down, dwell: cardinal },
            ScrollStep { dir: Direction::DownRight, dwell: diagonal },
        ])
    }
}

/// Runtime state of the scroll direction state machine. Advances to the next
/// step only once the current step's dwell has elapsed; yields exactly one
/// direction per invocation either way.
#[derive(Debug, Clone)]
pub struct ScrollSchedule {
    pattern: ScrollPattern,
    current: usize,
    last_advance: Instant,
}

impl ScrollSchedule {
    pub fn new(pattern: ScrollPattern) -> Self {
        Self {
            pattern,
            current: 0,
            last_advance: Instant::now(),
        }
    }

    pub fn next_direction(&mut self) -> Direction {
        match &self.pattern {
            ScrollPattern::Linear(dir) => *dir,
            ScrollPattern::Cycle(steps) => {
                if self.last_advance.elapsed() > steps[self.current].dwell {
                    self.current = (self.current + 1) % steps.len();
                    self.last_advance = Instant::now();
                }
                steps[self.current].dir
            }
        }
    }
}
