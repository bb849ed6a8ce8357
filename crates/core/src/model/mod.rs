mod assessment;
mod grade;
mod ids;
mod ledger;
mod session;

pub use ids::{AssessmentId, EmptyIdError};

pub use assessment::{AssessmentDefinition, AssessmentError, Question};
pub use grade::{GradeBand, SubmissionReceipt, percentage};
pub use ledger::{AnswerLedger, AnswerVector, UNANSWERED, ValidationError};
pub use session::{
    AssessmentSession, SessionError, SessionPhase, SessionSnapshot, SubmitTrigger, TickOutcome,
};
