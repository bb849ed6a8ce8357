use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("assessment id cannot be empty")]
pub struct EmptyIdError;

/// Opaque identifier for an assessment, as issued by the Assessment Service.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssessmentId(String);

impl AssessmentId {
    /// Creates a new `AssessmentId`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `EmptyIdError` if the value is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, EmptyIdError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmptyIdError);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssessmentId({})", self.0)
    }
}

impl fmt::Display for AssessmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AssessmentId {
    type Err = EmptyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AssessmentId {
    type Error = EmptyIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AssessmentId> for String {
    fn from(value: AssessmentId) -> Self {
        value.0
    }
}
