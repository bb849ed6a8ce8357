use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Acknowledgement of a submitted answer vector.
///
/// Score fields are filled only when the Assessment Service grades on receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub submitted_at: DateTime<Utc>,
    pub score: Option<f64>,
    pub max_score: Option<f64>,
}

impl SubmissionReceipt {
    #[must_use]
    pub fn ungraded(submitted_at: DateTime<Utc>) -> Self {
        Self {
            submitted_at,
            score: None,
            max_score: None,
        }
    }

    /// Score as a percentage, when both score and maximum are known.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        percentage(self.score?, self.max_score?)
    }

    #[must_use]
    pub fn grade_band(&self) -> Option<GradeBand> {
        self.percentage().map(GradeBand::from_percentage)
    }
}

/// `score / max * 100`, or `None` when the maximum is not positive.
#[must_use]
pub fn percentage(score: f64, max_score: f64) -> Option<f64> {
    if !max_score.is_finite() || max_score <= 0.0 || !score.is_finite() {
        return None;
    }
    Some((score / max_score * 100.0).clamp(0.0, 100.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradeBand {
    Distinction,
    Merit,
    Pass,
    Fail,
}

impl GradeBand {
    pub const DISTINCTION_MIN: f64 = 85.0;
    pub const MERIT_MIN: f64 = 70.0;
    pub const PASS_MIN: f64 = 50.0;

    #[must_use]
    pub fn from_percentage(percent: f64) -> Self {
        if percent >= Self::DISTINCTION_MIN {
            Self::Distinction
        } else if percent >= Self::MERIT_MIN {
            Self::Merit
        } else if percent >= Self::PASS_MIN {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Distinction => "Distinction",
            Self::Merit => "Merit",
            Self::Pass => "Pass",
            Self::Fail => "Fail",
        }
    }

    #[must_use]
    pub fn is_passing(self) -> bool {
        !matches!(self, Self::Fail)
    }
}
