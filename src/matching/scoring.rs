use crate::core::alphabet::compatible;
use crate::core::oligo::Oligo;
use crate::matching::MatchError;
use crate::store::packed::{compatible_nibbles, window_word};
use crate::store::OligoSet;
use crate::utils::validation::count_to_f64;

/// Best comparison of one (query, master) pair within a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreCell {
    /// Number of compatible positions
    pub matches: u32,
    /// Master offset the count was obtained at
    pub offset: u32,
}

/// Fraction of compatible positions between two equal-length oligos,
/// computed symbol by symbol from the compatibility table.
///
/// Returns 0.0 for empty or unequal-length inputs.
#[must_use]
pub fn score_symbols(query: &Oligo, master: &Oligo) -> f64 {
    if query.is_empty() || query.len() != master.len() {
        return 0.0;
    }
    let matches = query
        .symbols()
        .iter()
        .zip(master.symbols())
        .filter(|(a, b)| compatible(**a, **b))
        .count();
    count_to_f64(matches) / count_to_f64(query.len())
}

/// Count compatible positions between a packed query and the window of a
/// packed master starting at symbol `offset`.
///
/// Query padding nibbles are zero, so master symbols past the query length
/// never contribute.
#[inline]
#[must_use]
pub fn count_compatible(query: &[u64], master: &[u64], offset: usize) -> u32 {
    if offset == 0 {
        query
            .iter()
            .zip(master)
            .map(|(&q, &m)| compatible_nibbles(q, m))
            .sum()
    } else {
        query
            .iter()
            .enumerate()
            .map(|(w, &q)| compatible_nibbles(q, window_word(master, offset, w)))
            .sum()
    }
}

/// Best count over offsets `0..offsets`; the smallest offset wins ties.
#[inline]
#[must_use]
pub fn best_offset(query: &[u64], master: &[u64], offsets: usize, max_matches: u32) -> ScoreCell {
    let mut best = ScoreCell::default();
    for offset in 0..offsets {
        let matches = count_compatible(query, master, offset);
        if matches > best.matches || offset == 0 {
            best = ScoreCell {
                matches,
                #[allow(clippy::cast_possible_truncation)] // bounded by MAX_OLIGO_LENGTH
                offset: offset as u32,
            };
            if matches == max_matches {
                break;
            }
        }
    }
    best
}

/// Reusable score buffer for one (query tile, master tile) pair.
///
/// Cells are row-major: one row per query of the tile.
pub struct ScoreArena {
    cells: Vec<ScoreCell>,
    rows: usize,
    cols: usize,
}

impl ScoreArena {
    /// Bytes of score buffer a `rows x cols` tile needs.
    #[must_use]
    pub fn required_bytes(rows: usize, cols: usize) -> usize {
        rows.saturating_mul(cols)
            .saturating_mul(std::mem::size_of::<ScoreCell>())
    }

    /// Check a tile shape against a memory budget.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::TileTooLarge` if the tile's score buffer exceeds
    /// `budget_bytes`.
    pub fn check_budget(rows: usize, cols: usize, budget_bytes: usize) -> Result<usize, MatchError> {
        let required_bytes = Self::required_bytes(rows, cols);
        if required_bytes > budget_bytes {
            return Err(MatchError::TileTooLarge {
                query_tile: rows,
                master_tile: cols,
                required_bytes,
                budget_bytes,
            });
        }
        Ok(required_bytes)
    }

    /// Allocate a buffer for tiles of at most `rows x cols` cells.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cells: vec![ScoreCell::default(); rows * cols],
            rows: 0,
            cols: 0,
        }
    }

    /// Score every query of `queries[q_range]` against every master of
    /// `masters[m_range]`, overwriting the previous tile.
    ///
    /// # Panics
    ///
    /// Panics if the tile is larger than the shape the arena was allocated for.
    pub fn score_tile(
        &mut self,
        queries: &OligoSet,
        q_range: std::ops::Range<usize>,
        masters: &OligoSet,
        m_range: std::ops::Range<usize>,
        offsets: usize,
    ) {
        let rows = q_range.len();
        let cols = m_range.len();
        assert!(rows * cols <= self.cells.len(), "tile exceeds arena capacity");
        self.rows = rows;
        self.cols = cols;
        if rows == 0 || cols == 0 {
            return;
        }

        #[allow(clippy::cast_possible_truncation)] // bounded by MAX_OLIGO_LENGTH
        let max_matches = queries.oligo_length() as u32;
        let q_stride = queries.stride();
        let m_stride = masters.stride();
        let q_words = queries.packed_range(q_range);
        let m_words = masters.packed_range(m_range);

        for (row, query) in self.cells[..rows * cols]
            .chunks_exact_mut(cols)
            .zip(q_words.chunks_exact(q_stride))
        {
            for (cell, master) in row.iter_mut().zip(m_words.chunks_exact(m_stride)) {
                *cell = best_offset(query, master, offsets, max_matches);
            }
        }
    }

    /// Scores of query `row` of the current tile
    #[must_use]
    pub fn row(&self, row: usize) -> &[ScoreCell] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oligo::{Collection, SourceCoord, Strand};
    use crate::store::packed::pack;

    fn oligo(seq: &str) -> Oligo {
        Oligo::parse("x", seq, SourceCoord::new("s", 0, Strand::Forward), Collection::Query).unwrap()
    }

    fn set(collection: Collection, seqs: &[&str]) -> OligoSet {
        let oligos = seqs
            .iter()
            .enumerate()
            .map(|(i, s)| {
                Oligo::parse(format!("o{i}"), s, SourceCoord::new("s", 0, Strand::Forward), collection)
                    .unwrap()
            })
            .collect();
        OligoSet::from_oligos(collection, oligos).unwrap()
    }

    #[test]
    fn test_score_scenarios() {
        assert!((score_symbols(&oligo("ACGT"), &oligo("ACGT")) - 1.0).abs() < 1e-12);
        assert!((score_symbols(&oligo("ACGT"), &oligo("ACGN")) - 1.0).abs() < 1e-12);
        assert!((score_symbols(&oligo("ACGT"), &oligo("ACGG")) - 0.75).abs() < 1e-12);
        assert!(score_symbols(&oligo("AAAA"), &oligo("TTTT")).abs() < 1e-12);
        assert!(score_symbols(&oligo("AAAA"), &oligo("AAA")).abs() < 1e-12);
    }

    #[test]
    fn test_packed_count_agrees_with_symbols() {
        let pairs = [
            ("ACGTACGTACGTACGTACGT", "ACGTACGTACGTACGTACGT"),
            ("ACGTRYSWKMBDHVNACGTA", "TGCAYRWSMKVHDBNTGCAT"),
            ("AAAAAAAAAAAAAAAAAAAA", "RRRRRRRRRRYYYYYYYYYY"),
        ];
        for (a, b) in pairs {
            let expected = score_symbols(&oligo(a), &oligo(b));
            let count = count_compatible(&pack(oligo(a).symbols()), &pack(oligo(b).symbols()), 0);
            assert!((f64::from(count) / 20.0 - expected).abs() < 1e-12, "{a} vs {b}");
        }
    }

    #[test]
    fn test_best_offset_finds_embedded_window() {
        let query = pack(oligo("GGCC").symbols());
        let master = pack(oligo("ATATGGCCAT").symbols());
        let cell = best_offset(&query, &master, 7, 4);
        assert_eq!(cell, ScoreCell { matches: 4, offset: 4 });
    }

    #[test]
    fn test_best_offset_prefers_smallest_offset_on_ties() {
        let query = pack(oligo("AA").symbols());
        let master = pack(oligo("TAATAA").symbols());
        let cell = best_offset(&query, &master, 5, 2);
        assert_eq!(cell, ScoreCell { matches: 2, offset: 1 });

        let master = pack(oligo("TTTT").symbols());
        let cell = best_offset(&query, &master, 3, 2);
        assert_eq!(cell, ScoreCell { matches: 0, offset: 0 });
    }

    #[test]
    fn test_check_budget() {
        let cell = std::mem::size_of::<ScoreCell>();
        assert_eq!(ScoreArena::check_budget(4, 4, 16 * cell).unwrap(), 16 * cell);
        let err = ScoreArena::check_budget(4, 5, 16 * cell).unwrap_err();
        assert!(matches!(
            err,
            MatchError::TileTooLarge { query_tile: 4, master_tile: 5, .. }
        ));
    }

    #[test]
    fn test_score_tile_fills_rows() {
        let queries = set(Collection::Query, &["ACGT", "AAAA"]);
        let masters = set(Collection::Master, &["ACGT", "ACGG", "TTTT"]);
        let mut arena = ScoreArena::new(2, 3);
        arena.score_tile(&queries, 0..2, &masters, 0..3, 1);

        assert_eq!(arena.rows(), 2);
        let counts: Vec<u32> = arena.row(0).iter().map(|c| c.matches).collect();
        assert_eq!(counts, vec![4, 3, 0]);
        let counts: Vec<u32> = arena.row(1).iter().map(|c| c.matches).collect();
        assert_eq!(counts, vec![1, 1, 0]);

        // Reuse the same arena for a smaller tile
        arena.score_tile(&queries, 1..2, &masters, 2..3, 1);
        assert_eq!(arena.rows(), 1);
        assert_eq!(arena.row(0), &[ScoreCell { matches: 0, offset: 0 }]);
    }
}
