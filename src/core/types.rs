//! Core value types shared across the engine

/// Grid cell address. Immutable value type: equality and the view-range
/// predicate are its only operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean range test with the vertical delta doubled, compensating
    /// for terminal glyphs being roughly twice as tall as they are wide.
    pub fn in_range(&self, other: Coordinate, radius: f32) -> bool {
        let dx = (self.x - other.x) as f32;
        let dy = (2 * (self.y - other.y)) as f32;
        (dx * dx + dy * dy).sqrt() <= radius
    }

    pub fn translated(&self, dir: Direction) -> Coordinate {
        let (dx, dy) = dir.delta();
        Coordinate::new(self.x + dx, self.y + dy)
    }
}

/// Movement / scroll direction, 4 cardinal + 4 diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// Unit step in grid coordinates (y grows downward).
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::UpLeft => (-1, -1),
            Direction::UpRight => (1, -1),
            Direction::DownLeft => (-1, 1),
            Direction::DownRight => (1, 1),
        }
    }

    pub const ALL: [Direction; 8] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownLeft,
        Direction::DownRight,
    ];
}

/// Six-tier quality ranking shared by bits and loot. Drives loot value,
/// threat magnitude, and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rarity {
    Junk,
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Junk,
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Per-rarity scalar table (threat magnitudes, data values).
#[derive(Debug, Clone, Copy)]
pub struct RarityTable(pub [f32; 6]);

impl std::ops::Index<Rarity> for RarityTable {
    type Output = f32;

    fn index(&self, rarity: Rarity) -> &f32 {
        &self.0[rarity.index()]
    }
}

/// Cumulative-threshold weighted selection over `(category, weight)` pairs.
///
/// `u` is a uniform draw in [0, 1). A category is chosen once the running
/// cumulative weight exceeds `u`; the final entry absorbs any floating-point
/// residue. Every probabilistic table in the engine funnels through here so
/// the thresholds are never re-derived ad hoc at call sites.
pub fn weighted_choice<T: Copy>(entries: &[(T, f32)], u: f32) -> T {
    debug_assert!(!entries.is_empty());
    let mut cumulative = 0.0;
    for &(category, weight) in entries {
        cumulative += weight;
        if u < cumulative {
            return category;
        }
    }
    entries[entries.len() - 1].0
}
