use thiserror::Error;

use crate::model::{AssessmentError, SessionError, ValidationError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Session(#[from] SessionError),
}
