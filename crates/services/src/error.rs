//! Shared error types for the services crate.

use thiserror::Error;

use campus_core::model::{AssessmentError, SessionError};

/// Rejected client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid assessment service URL {raw:?}: {reason}")]
    InvalidBaseUrl { raw: String, reason: String },
}

/// Errors emitted by an `AssessmentService` implementation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentServiceError {
    #[error("assessment service rejected the credentials ({0})")]
    Unauthorized(reqwest::StatusCode),
    #[error("assessment not found")]
    NotFound,
    #[error("assessment service request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("assessment service returned an unreadable payload: {0}")]
    Decode(String),
    #[error(transparent)]
    Invalid(#[from] AssessmentError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Fatal failure while loading the assessment for a session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("could not fetch assessment: {0}")]
    Fetch(#[source] AssessmentServiceError),
    #[error("assessment definition is malformed: {0}")]
    Malformed(#[from] AssessmentError),
}

/// Failure posting an answer vector. The vector stays on the session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmissionError {
    #[error("submission failed: {0}")]
    Rejected(#[from] AssessmentServiceError),
}

/// Errors emitted by `SessionController` entry points.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
