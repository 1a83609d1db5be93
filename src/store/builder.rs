//! Builds an [`OligoSet`] from raw records, enforcing the run's length rule.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::oligo::{Collection, Oligo, OligoError};
use crate::parsing::records::OligoRecord;
use crate::store::oligo_set::OligoSet;

/// What to do with a record whose length breaks the length rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LengthMismatchPolicy {
    /// Fail the whole build
    #[default]
    Abort,
    /// Drop the record and log a warning
    Skip,
}

/// Length every oligo of a collection must satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthRule {
    /// Every oligo has exactly this length
    Exact(usize),
    /// Every oligo has the same length, which is at least this value; the
    /// first accepted record fixes it
    UniformAtLeast(usize),
}

pub struct OligoSetBuilder {
    collection: Collection,
    rule: LengthRule,
    policy: LengthMismatchPolicy,
    established: Option<usize>,
    oligos: Vec<Oligo>,
    skipped: Vec<String>,
}

impl OligoSetBuilder {
    #[must_use]
    pub fn new(collection: Collection, rule: LengthRule, policy: LengthMismatchPolicy) -> Self {
        let established = match rule {
            LengthRule::Exact(len) => Some(len),
            LengthRule::UniformAtLeast(_) => None,
        };
        Self {
            collection,
            rule,
            policy,
            established,
            oligos: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Parse and add one record.
    ///
    /// # Errors
    ///
    /// Returns `OligoError::InvalidSymbol` for malformed records regardless of
    /// policy, and `OligoError::LengthMismatch` when the policy is
    /// [`LengthMismatchPolicy::Abort`]. An empty record is a length mismatch.
    pub fn push(&mut self, record: &OligoRecord) -> Result<(), OligoError> {
        if record.sequence.is_empty() {
            let mismatch = OligoError::LengthMismatch {
                record: record.id.clone(),
                collection: self.collection,
                expected: self.expected_length(),
                found: 0,
            };
            return self.reject(record.id.clone(), mismatch);
        }

        let oligo = Oligo::parse(
            record.id.clone(),
            &record.sequence,
            record.source.clone(),
            self.collection,
        )?;

        if let Err(mismatch) = self.check_length(&oligo) {
            return self.reject(oligo.id, mismatch);
        }

        if self.established.is_none() {
            self.established = Some(oligo.len());
        }
        self.oligos.push(oligo);
        Ok(())
    }

    fn reject(&mut self, id: String, mismatch: OligoError) -> Result<(), OligoError> {
        match self.policy {
            LengthMismatchPolicy::Abort => Err(mismatch),
            LengthMismatchPolicy::Skip => {
                warn!("Skipping record: {mismatch}");
                self.skipped.push(id);
                Ok(())
            }
        }
    }

    /// Length the next record must have (the minimum before the first
    /// record is accepted under [`LengthRule::UniformAtLeast`])
    fn expected_length(&self) -> usize {
        match (self.established, self.rule) {
            (Some(len), _) => len,
            (None, LengthRule::UniformAtLeast(min) | LengthRule::Exact(min)) => min,
        }
    }

    fn check_length(&self, oligo: &Oligo) -> Result<(), OligoError> {
        let expected = match (self.established, self.rule) {
            (Some(len), _) => len,
            (None, LengthRule::UniformAtLeast(min)) if oligo.len() >= min => return Ok(()),
            (None, LengthRule::UniformAtLeast(min) | LengthRule::Exact(min)) => min,
        };
        if oligo.len() == expected {
            Ok(())
        } else {
            Err(OligoError::LengthMismatch {
                record: oligo.id.clone(),
                collection: self.collection,
                expected,
                found: oligo.len(),
            })
        }
    }

    /// Ids of records dropped under the skip policy, in input order
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    /// Finish the set.
    ///
    /// # Errors
    ///
    /// Never fails for records accepted by `push`; the signature mirrors
    /// [`OligoSet::from_oligos`].
    pub fn build(self) -> Result<OligoSet, OligoError> {
        if !self.skipped.is_empty() {
            warn!(
                "Skipped {} {} record(s) with mismatched length",
                self.skipped.len(),
                self.collection
            );
        }
        OligoSet::from_oligos(self.collection, self.oligos)
    }
}

/// Build an [`OligoSet`] from records in one call.
///
/// # Errors
///
/// See [`OligoSetBuilder::push`].
pub fn build_oligo_set(
    collection: Collection,
    records: &[OligoRecord],
    rule: LengthRule,
    policy: LengthMismatchPolicy,
) -> Result<OligoSet, OligoError> {
    let mut builder = OligoSetBuilder::new(collection, rule, policy);
    for record in records {
        builder.push(record)?;
    }
    builder.build()
}
