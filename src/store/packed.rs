//! Word-packed 4-bit mask encoding of oligos.
//!
//! An oligo of length `L` occupies `ceil(L / 16)` `u64` words; symbol `k`
//! lives in bits `4*(k % 16) .. 4*(k % 16) + 4` of word `k / 16`. Padding
//! nibbles past the end are zero, which is never compatible with anything.

use crate::core::alphabet::Symbol;

/// Symbols per 64-bit word
pub const SYMBOLS_PER_WORD: usize = 16;

const LOW_NIBBLE_BITS: u64 = 0x1111_1111_1111_1111;

/// Number of words needed to pack `len` symbols.
#[inline]
#[must_use]
pub const fn words_for(len: usize) -> usize {
    len.div_ceil(SYMBOLS_PER_WORD)
}

/// Pack symbols into `out`, which must hold exactly `words_for(symbols.len())` words.
pub fn pack_into(symbols: &[Symbol], out: &mut [u64]) {
    debug_assert_eq!(out.len(), words_for(symbols.len()));
    out.fill(0);
    for (k, s) in symbols.iter().enumerate() {
        out[k / SYMBOLS_PER_WORD] |= u64::from(s.mask()) << (4 * (k % SYMBOLS_PER_WORD));
    }
}

#[must_use]
pub fn pack(symbols: &[Symbol]) -> Vec<u64> {
    let mut out = vec![0u64; words_for(symbols.len())];
    pack_into(symbols, &mut out);
    out
}

/// Count the nibbles of `a & b` that are non-zero, i.e. compatible positions.
#[inline]
#[must_use]
pub fn compatible_nibbles(a: u64, b: u64) -> u32 {
    let x = a & b;
    let folded = (x | (x >> 1) | (x >> 2) | (x >> 3)) & LOW_NIBBLE_BITS;
    folded.count_ones()
}

/// Read word `w` of the `len`-symbol window starting at symbol `offset` of a
/// packed oligo.
///
/// Nibbles of the returned word beyond the packed oligo's end are zero.
#[inline]
#[must_use]
pub fn window_word(packed: &[u64], offset: usize, w: usize) -> u64 {
    let bit = 4 * (offset + w * SYMBOLS_PER_WORD);
    let idx = bit / 64;
    let shift = bit % 64;
    let low = packed.get(idx).copied().unwrap_or(0);
    if shift == 0 {
        return low;
    }
    let high = packed.get(idx + 1).copied().unwrap_or(0);
    (low >> shift) | (high << (64 - shift))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(s: &str) -> Vec<Symbol> {
        s.bytes().map(|b| Symbol::from_byte(b).unwrap()).collect()
    }

    #[test]
    fn test_words_for() {
        assert_eq!(words_for(0), 0);
        assert_eq!(words_for(1), 1);
        assert_eq!(words_for(16), 1);
        assert_eq!(words_for(17), 2);
        assert_eq!(words_for(18), 2);
    }

    #[test]
    fn test_pack_layout() {
        let packed = pack(&symbols("ACGT"));
        assert_eq!(packed, vec![0x8421]);
    }

    #[test]
    fn test_pack_is_deterministic() {
        let seq = symbols("ACGTRYSWKMBDHVNACGT");
        assert_eq!(pack(&seq), pack(&seq));
        assert_eq!(pack(&seq).len(), 2);
    }

    #[test]
    fn test_compatible_nibbles() {
        let a = pack(&symbols("ACGT"))[0];
        assert_eq!(compatible_nibbles(a, a), 4);
        let b = pack(&symbols("ACGG"))[0];
        assert_eq!(compatible_nibbles(a, b), 3);
        let n = pack(&symbols("NNNN"))[0];
        assert_eq!(compatible_nibbles(a, n), 4);
        let t = pack(&symbols("TTTT"))[0];
        let aa = pack(&symbols("AAAA"))[0];
        assert_eq!(compatible_nibbles(aa, t), 0);
    }

    #[test]
    fn test_window_word_matches_repacking() {
        let seq = symbols("ACGTRYSWKMBDHVNACGTACGTTTGCA");
        let packed = pack(&seq);
        for offset in 0..seq.len() {
            let window = &seq[offset..];
            let expected = pack(window);
            for (w, &word) in expected.iter().enumerate() {
                assert_eq!(window_word(&packed, offset, w), word, "offset {offset} word {w}");
            }
        }
    }
}
