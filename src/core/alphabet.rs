//! IUPAC nucleotide alphabet and the ambiguity-aware compatibility model.
//!
//! Every symbol is a non-empty subset of the canonical bases `{A, C, G, T}`,
//! stored as a 4-bit mask:
//!
//! | Bit | Base |
//! |-----|------|
//! | 0   | A    |
//! | 1   | C    |
//! | 2   | G    |
//! | 3   | T    |
//!
//! Two symbols are compatible iff their masks intersect. The mask layout is
//! chosen so that the complement of a symbol is the bit-reversal of its mask.

use serde::{Deserialize, Serialize};

/// One nucleotide position's ambiguity class.
///
/// The discriminant of each variant is its base mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Symbol {
    A = 0b0001,
    C = 0b0010,
    M = 0b0011,
    G = 0b0100,
    R = 0b0101,
    S = 0b0110,
    V = 0b0111,
    T = 0b1000,
    W = 0b1001,
    Y = 0b1010,
    H = 0b1011,
    K = 0b1100,
    D = 0b1101,
    B = 0b1110,
    N = 0b1111,
}

/// All recognized symbols, ordered by mask value.
pub const ALL_SYMBOLS: [Symbol; 15] = [
    Symbol::A,
    Symbol::C,
    Symbol::M,
    Symbol::G,
    Symbol::R,
    Symbol::S,
    Symbol::V,
    Symbol::T,
    Symbol::W,
    Symbol::Y,
    Symbol::H,
    Symbol::K,
    Symbol::D,
    Symbol::B,
    Symbol::N,
];

/// Mask value used for "not a symbol" in the byte lookup table.
const INVALID: u8 = 0;

/// ASCII byte -> base mask. Lowercase is accepted, `U` reads as `T` and the
/// `.` wildcard reads as `N`.
const BYTE_TO_MASK: [u8; 256] = build_byte_table();

const fn build_byte_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let pairs: [(u8, u8); 16] = [
        (b'A', 0b0001),
        (b'C', 0b0010),
        (b'G', 0b0100),
        (b'T', 0b1000),
        (b'U', 0b1000),
        (b'R', 0b0101),
        (b'Y', 0b1010),
        (b'S', 0b0110),
        (b'W', 0b1001),
        (b'K', 0b1100),
        (b'M', 0b0011),
        (b'B', 0b1110),
        (b'D', 0b1101),
        (b'H', 0b1011),
        (b'V', 0b0111),
        (b'N', 0b1111),
    ];
    let mut i = 0;
    while i < pairs.len() {
        let (upper, mask) = pairs[i];
        table[upper as usize] = mask;
        table[upper.to_ascii_lowercase() as usize] = mask;
        i += 1;
    }
    table[b'.' as usize] = 0b1111;
    table
}

/// Precomputed compatibility of every pair of masks, indexed `[a][b]`.
const COMPATIBLE: [[bool; 16]; 16] = build_compat_table();

const fn build_compat_table() -> [[bool; 16]; 16] {
    let mut table = [[false; 16]; 16];
    let mut a = 0;
    while a < 16 {
        let mut b = 0;
        while b < 16 {
            table[a][b] = (a & b) != 0;
            b += 1;
        }
        a += 1;
    }
    table
}

impl Symbol {
    /// Parse an ASCII byte, returning `None` for characters outside the alphabet.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::from_mask(BYTE_TO_MASK[byte as usize])
    }

    /// Build a symbol from a non-zero 4-bit mask.
    #[must_use]
    pub fn from_mask(mask: u8) -> Option<Self> {
        match mask {
            1..=15 => Some(ALL_SYMBOLS[(mask - 1) as usize]),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn mask(self) -> u8 {
        self as u8
    }

    /// Canonical uppercase IUPAC character.
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::C => 'C',
            Self::M => 'M',
            Self::G => 'G',
            Self::R => 'R',
            Self::S => 'S',
            Self::V => 'V',
            Self::T => 'T',
            Self::W => 'W',
            Self::Y => 'Y',
            Self::H => 'H',
            Self::K => 'K',
            Self::D => 'D',
            Self::B => 'B',
            Self::N => 'N',
        }
    }

    /// Number of canonical bases this symbol stands for.
    #[must_use]
    pub const fn degeneracy(self) -> u32 {
        (self as u8).count_ones()
    }

    #[must_use]
    pub const fn is_degenerate(self) -> bool {
        self.degeneracy() > 1
    }

    /// Watson-Crick complement, extended to ambiguity codes.
    #[must_use]
    pub fn complement(self) -> Self {
        let m = self.mask();
        let reversed = ((m & 0b0001) << 3) | ((m & 0b0010) << 1) | ((m & 0b0100) >> 1) | ((m & 0b1000) >> 3);
        // A non-zero mask reverses to a non-zero mask.
        ALL_SYMBOLS[(reversed - 1) as usize]
    }

    /// Canonical bases covered by this symbol, in `A, C, G, T` order.
    pub fn bases(self) -> impl Iterator<Item = Symbol> {
        [Symbol::A, Symbol::C, Symbol::G, Symbol::T]
            .into_iter()
            .filter(move |b| self.mask() & b.mask() != 0)
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// True iff the two symbols share at least one canonical base.
#[inline]
#[must_use]
pub fn compatible(a: Symbol, b: Symbol) -> bool {
    COMPATIBLE[a.mask() as usize][b.mask() as usize]
}

/// Reverse complement of a symbol sequence.
#[must_use]
pub fn reverse_complement(symbols: &[Symbol]) -> Vec<Symbol> {
    symbols.iter().rev().map(|s| s.complement()).collect()
}

/// Expand a degenerate sequence into every concrete (A/C/G/T only) sequence it
/// represents.
///
/// Returns `None` if the number of variants would exceed `max_variants`.
#[must_use]
pub fn expand_variants(symbols: &[Symbol], max_variants: usize) -> Option<Vec<Vec<Symbol>>> {
    let mut total: usize = 1;
    for s in symbols {
        total = total.checked_mul(s.degeneracy() as usize)?;
        if total > max_variants {
            return None;
        }
    }

    let mut variants: Vec<Vec<Symbol>> = vec![Vec::with_capacity(symbols.len())];
    for s in symbols {
        let mut next = Vec::with_capacity(variants.len() * s.degeneracy() as usize);
        for prefix in &variants {
            for base in s.bases() {
                let mut v = prefix.clone();
                v.push(base);
                next.push(v);
            }
        }
        variants = next;
    }
    Some(variants)
}
