//! Centralized validation and helper functions.

/// Maximum number of records allowed in a single input collection
pub const MAX_RECORDS: usize = 50_000_000;

/// Longest oligo (or master window) accepted, in symbols
pub const MAX_OLIGO_LENGTH: usize = 4096;

/// Check if adding another record would exceed the maximum allowed.
///
/// Call this with the current count BEFORE adding a new record.
/// Returns an error message if adding would exceed the limit, None if safe to add.
///
/// # Example
/// ```ignore
/// if check_record_limit(records.len()).is_some() {
///     return Err(...);
/// }
/// records.push(new_record); // Safe to add
/// ```
#[must_use]
pub fn check_record_limit(count: usize) -> Option<String> {
    if count >= MAX_RECORDS {
        Some(format!(
            "Too many records: adding another would exceed maximum of {MAX_RECORDS}"
        ))
    } else {
        None
    }
}

/// A score threshold must be a finite value in `[0, 1]`.
///
/// # Examples
///
/// ```
/// use fops::utils::validation::is_valid_threshold;
///
/// assert!(is_valid_threshold(0.9));
/// assert!(is_valid_threshold(0.0));
/// assert!(!is_valid_threshold(1.01));
/// assert!(!is_valid_threshold(f64::NAN));
/// ```
#[must_use]
pub fn is_valid_threshold(threshold: f64) -> bool {
    threshold.is_finite() && (0.0..=1.0).contains(&threshold)
}

/// Validate an oligo length against the supported range.
#[must_use]
pub fn check_oligo_length(length: usize) -> Option<String> {
    if length == 0 {
        Some("Oligo length must be positive".to_string())
    } else if length > MAX_OLIGO_LENGTH {
        Some(format!(
            "Oligo length {length} exceeds maximum of {MAX_OLIGO_LENGTH}"
        ))
    } else {
        None
    }
}

/// Safely convert usize to f64 for ratio calculations
#[inline]
#[must_use]
pub fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}
