use serde::{Deserialize, Serialize};

/// Confidence level for a hit, derived from its score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
    Exact,
}

impl Confidence {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 1.0 {
            Self::Exact
        } else if score >= 0.95 {
            Self::High
        } else if score >= 0.80 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "EXACT"),
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
        }
    }
}
