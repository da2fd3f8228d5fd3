//! Symbol resolution and semantic colors
//!
//! Every glyph the engine draws goes through a [`SymbolSet`], which carries a
//! fallback per terminal compatibility mode, and every color is a semantic
//! [`Color`] resolved to a 256-color index by the single [`paint`] formatting
//! function. Animated glyphs (the exit beacon, the revealed-bit flicker) are
//! modeled as [`AnimatedSymbol`] variants with `tick` + `for_mode`.

use rand::Rng;

/// Terminal glyph compatibility, selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityMode {
    /// Full unicode.
    Any,
    /// Latin-1-ish subset, no exotic codepoints.
    Latin,
    /// Plain ASCII.
    Ascii,
}

/// One glyph with per-mode fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolSet {
    any: &'static str,
    latin: &'static str,
    ascii: &'static str,
}

impl SymbolSet {
    pub const fn new(any: &'static str, latin: &'static str, ascii: &'static str) -> Self {
        Self { any, latin, ascii }
    }

    pub fn for_mode(&self, mode: CompatibilityMode) -> &'static str {
        match mode {
            CompatibilityMode::Any => self.any,
            CompatibilityMode::Latin => self.latin,
            CompatibilityMode::Ascii => self.ascii,
        }
    }
}

pub const PLAYER: SymbolSet = SymbolSet::new("Ȣ", "Ö", "@");
pub const FOOTPRINT: SymbolSet = SymbolSet::new("∙", "·", ".");
pub const REDACTED: SymbolSet = SymbolSet::new("?", "?", "?");

pub const DELTA: SymbolSet = SymbolSet::new("Δ", "D", "D");
pub const OMEGA: SymbolSet = SymbolSet::new("Ω", "O", "O");
pub const SIGMA: SymbolSet = SymbolSet::new("Σ", "S", "S");
pub const LAMBDA: SymbolSet = SymbolSet::new("λ", "L", "L");

pub const PHI: SymbolSet = SymbolSet::new("Φ", "Ø", "P");
pub const PSI: SymbolSet = SymbolSet::new("ψ", "Y", "Y");
pub const KOPPA: SymbolSet = SymbolSet::new("ϟ", "z", "z");

const DAGGER: SymbolSet = SymbolSet::new("†", "+", "+");
const ZHE: SymbolSet = SymbolSet::new("Ж", "X", "X");
const SHCHA: SymbolSet = SymbolSet::new("Щ", "W", "W");
const SAMPI: SymbolSet = SymbolSet::new("Ϡ", "3", "3");
const REFERENCE_MARK: SymbolSet = SymbolSet::new("※", "*", "*");
const SHRUG: SymbolSet = SymbolSet::new("ツ", "u", "u");
const CLOVER: SymbolSet = SymbolSet::new("⌘", "#", "#");

/// Exit beacon frames, cycled by the animation tick.
const EXIT_FRAMES: [SymbolSet; 2] = [CLOVER, REFERENCE_MARK];

/// Flicker pools for revealed bits, one per rarity tier, rarest last.
const HARMFUL_POOLS: [[SymbolSet; 3]; 6] = [
    [DAGGER, DAGGER, ZHE],
    [DAGGER, ZHE, ZHE],
    [ZHE, ZHE, SHCHA],
    [ZHE, SHCHA, SHCHA],
    [SHCHA, SHCHA, DAGGER],
    [SHCHA, DAGGER, ZHE],
];
const HELPFUL_POOLS: [[SymbolSet; 3]; 6] = [
    [SHRUG, SHRUG, KOPPA],
    [SHRUG, KOPPA, KOPPA],
    [KOPPA, KOPPA, SAMPI],
    [KOPPA, SAMPI, SAMPI],
    [SAMPI, SAMPI, SHRUG],
    [SAMPI, SHRUG, KOPPA],
];

/// A glyph that may change over time. Ticks on the animation timer only;
/// never affects gameplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatedSymbol {
    Static(SymbolSet),
    /// Looping frame sequence (the exit beacon).
    Loop {
        frames: &'static [SymbolSet],
        frame: usize,
    },
    /// Stochastic flicker: one glyph from the pool, re-rolled per tick.
    Noise {
        pool: &'static [SymbolSet],
        current: usize,
    },
}

impl AnimatedSymbol {
    pub fn exit_beacon() -> Self {
        AnimatedSymbol::Loop {
            frames: &EXIT_FRAMES,
            frame: 0,
        }
    }

    /// Flickering overlay for a revealed harmful/helpful bit.
    pub fn noise_for(harmful: bool, rarity: crate::core::Rarity) -> Self {
        let pools = if harmful {
            &HARMFUL_POOLS
        } else {
            &HELPFUL_POOLS
        };
        AnimatedSymbol::Noise {
            pool: &pools[rarity as usize],
            current: 0,
        }
    }

    pub fn tick(&mut self, rng: &mut impl Rng) {
        match self {
            AnimatedSymbol::Static(_) => {}
            AnimatedSymbol::Loop { frames, frame } => {
                *frame = (*frame + 1) % frames.len();
            }
            AnimatedSymbol::Noise { pool, current } => {
                *current = rng.gen_range(0..pool.len());
            }
        }
    }

    pub fn for_mode(&self, mode: CompatibilityMode) -> &'static str {
        match self {
            AnimatedSymbol::Static(set) => set.for_mode(mode),
            AnimatedSymbol::Loop { frames, frame } => frames[*frame].for_mode(mode),
            AnimatedSymbol::Noise { pool, current } => pool[*current].for_mode(mode),
        }
    }
}

/// Semantic colors, resolved to xterm 256-color indices by [`paint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    DarkGray,
    /// Brightened backdrop for cells inside the view radius.
    Slate,
    Gray,
    LightGray,
    White,
    Red,
    Green,
    Blue,
    Purple,
    Orange,
    Yellow,
    Teal,
    /// Raw 256-color index, for the footprint fade gradient.
    Index(u8),
}

impl Color {
    fn code(&self) -> u8 {
        match self {
            Color::DarkGray => 235,
            Color::Slate => 238,
            Color::Gray => 243,
            Color::LightGray => 250,
            Color::White => 255,
            Color::Red => 160,
            Color::Green => 118,
            Color::Blue => 33,
            Color::Purple => 129,
            Color::Orange => 208,
            Color::Yellow => 226,
            Color::Teal => 85,
            Color::Index(i) => *i,
        }
    }

    pub fn for_rarity(rarity: crate::core::Rarity) -> Color {
        use crate::core::Rarity;
        match rarity {
            Rarity::Junk => Color::LightGray,
            Rarity::Common => Color::White,
            Rarity::Uncommon => Color::Green,
            Rarity::Rare => Color::Blue,
            Rarity::Epic => Color::Purple,
            Rarity::Legendary => Color::Orange,
        }
    }
}

/// The one place escape sequences are produced. The engine only ever asks
/// for "this glyph in this semantic color on this background".
pub fn paint(glyph: &str, fg: Color, bg: Option<Color>) -> String {
    match bg {
        Some(bg) => format!(
            "\x1b[38;5;{}m\x1b[48;5;{}m{}\x1b[0m",
            fg.code(),
            bg.code(),
            glyph
        ),
        None => format!("\x1b[38;5;{}m{}\x1b[0m", fg.code(), glyph),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rarity;

    #[test]
    fn test_symbol_set_fallbacks() {
        assert_eq!(PLAYER.for_mode(CompatibilityMode::Any), "Ȣ");
        assert_eq!(PLAYER.for_mode(CompatibilityMode::Ascii), "@");
        assert_eq!(DELTA.for_mode(CompatibilityMode::Latin), "D");
    }

    #[test]
    fn test_loop_symbol_cycles() {
        let mut rng = rand::thread_rng();
        let mut beacon = AnimatedSymbol::exit_beacon();
        let first = beacon.for_mode(CompatibilityMode::Any);
        beacon.tick(&mut rng);
        let second = beacon.for_mode(CompatibilityMode::Any);
        assert_ne!(first, second);
        beacon.tick(&mut rng);
        assert_eq!(first, beacon.for_mode(CompatibilityMode::Any));
    }

    #[test]
    fn test_noise_symbol_stays_in_pool() {
        let mut rng = rand::thread_rng();
        let mut noise = AnimatedSymbol::noise_for(true, Rarity::Legendary);
        for _ in 0..32 {
            noise.tick(&mut rng);
            let glyph = noise.for_mode(CompatibilityMode::Ascii);
            assert!(["+", "X", "W"].contains(&glyph));
        }
    }

    #[test]
    fn test_paint_encodes_fg_and_bg() {
        let s = paint("X", Color::Red, Some(Color::DarkGray));
        assert!(s.contains("38;5;160"));
        assert!(s.contains("48;5;235"));
        assert!(s.ends_with("\x1b[0m"));
    }
}
