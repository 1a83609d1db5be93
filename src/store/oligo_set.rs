use crate::core::oligo::{Collection, Oligo, OligoError};
use crate::store::packed::{pack_into, words_for};

/// An immutable collection of equal-length oligos with their packed encoding.
///
/// Packed words of all oligos are stored back to back, `stride` words per
/// oligo, so a tile of consecutive oligos is one contiguous slice.
#[derive(Debug, Clone)]
pub struct OligoSet {
    collection: Collection,
    oligo_length: usize,
    oligos: Vec<Oligo>,
    packed: Vec<u64>,
    stride: usize,
}

impl OligoSet {
    /// Create an empty set
    #[must_use]
    pub fn empty(collection: Collection) -> Self {
        Self {
            collection,
            oligo_length: 0,
            oligos: Vec::new(),
            packed: Vec::new(),
            stride: 0,
        }
    }

    /// Build a set from already parsed oligos.
    ///
    /// # Errors
    ///
    /// Returns `OligoError::LengthMismatch` naming the first oligo whose length
    /// differs from the first oligo's length.
    pub fn from_oligos(collection: Collection, oligos: Vec<Oligo>) -> Result<Self, OligoError> {
        let Some(first) = oligos.first() else {
            return Ok(Self::empty(collection));
        };
        let oligo_length = first.len();

        if let Some(bad) = oligos.iter().find(|o| o.len() != oligo_length) {
            return Err(OligoError::LengthMismatch {
                record: bad.id.clone(),
                collection,
                expected: oligo_length,
                found: bad.len(),
            });
        }

        let stride = words_for(oligo_length);
        let mut packed = vec![0u64; stride * oligos.len()];
        for (oligo, words) in oligos.iter().zip(packed.chunks_exact_mut(stride)) {
            pack_into(oligo.symbols(), words);
        }

        Ok(Self {
            collection,
            oligo_length,
            oligos,
            packed,
            stride,
        })
    }

    #[must_use]
    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Uniform length of every oligo (0 for an empty set)
    #[must_use]
    pub fn oligo_length(&self) -> usize {
        self.oligo_length
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.oligos.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.oligos.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Oligo> {
        self.oligos.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Oligo> {
        self.oligos.iter()
    }

    #[must_use]
    pub fn oligos(&self) -> &[Oligo] {
        &self.oligos
    }

    /// Words per packed oligo
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Packed words of the oligo at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn packed(&self, index: usize) -> &[u64] {
        &self.packed[index * self.stride..(index + 1) * self.stride]
    }

    /// Packed words of oligos `range.start..range.end`, back to back.
    #[must_use]
    pub fn packed_range(&self, range: std::ops::Range<usize>) -> &[u64] {
        &self.packed[range.start * self.stride..range.end * self.stride]
    }
}
