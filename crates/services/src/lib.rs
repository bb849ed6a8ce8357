#![forbid(unsafe_code)]

pub mod assessment_client;
pub mod config;
pub mod error;
pub mod session_controller;
pub mod ticker;

pub use campus_core::Clock;

pub use assessment_client::{AssessmentService, HttpAssessmentService};
pub use config::{AccessToken, AssessmentClientConfig};
pub use error::{AssessmentServiceError, ConfigError, ControllerError, LoadError, SubmissionError};
pub use session_controller::{
    DEFAULT_TICK_PERIOD, SessionController, StartOutcome, SubmitOutcome,
};
pub use ticker::{TickControl, Ticker, TickerHandle};
