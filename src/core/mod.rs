//! Core data types for degenerate oligo screening.
//!
//! - [`Symbol`](alphabet::Symbol): an IUPAC nucleotide code as a 4-bit base mask
//! - [`Oligo`](oligo::Oligo): a fixed-length symbol sequence with its source coordinate
//! - [`Confidence`](types::Confidence): coarse classification of a score
//!
//! ## Compatibility
//!
//! Two symbols are compatible when the sets of bases they stand for intersect:
//!
//! | Pair  | Sets              | Compatible |
//! |-------|-------------------|------------|
//! | R / Y | {A,G} ∩ {C,T}     | no         |
//! | R / A | {A,G} ∩ {A}       | yes        |
//! | N / * | {A,C,G,T} ∩ ...   | yes        |

pub mod alphabet;
pub mod oligo;
pub mod types;
