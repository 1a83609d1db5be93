//! In-memory oligo collections encoded for fast comparison.
//!
//! An [`OligoSet`] is built once per run from the records of one collection
//! (queries or masters) and is read-only afterwards. Each oligo is stored both
//! as its symbol sequence and as word-packed 4-bit masks (see [`packed`]).

pub mod builder;
pub mod oligo_set;
pub mod packed;

pub use builder::{build_oligo_set, LengthMismatchPolicy, LengthRule, OligoSetBuilder};
pub use oligo_set::OligoSet;
