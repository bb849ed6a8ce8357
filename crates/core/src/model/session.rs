use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::model::{AnswerLedger, AnswerVector, AssessmentDefinition, SubmissionReceipt, ValidationError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("session does not accept answers while {phase}")]
    NotAccepting { phase: SessionPhase },

    #[error("session can only be activated while loading (currently {phase})")]
    AlreadyStarted { phase: SessionPhase },
}

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Lifecycle of one assessment attempt.
///
/// `Loading -> Active -> Submitting -> Submitted`, with `Active -> Expired ->
/// Submitting` on timeout. `Failed` is reachable from `Loading` and
/// `Submitting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    Loading,
    Active,
    Expired,
    Submitting,
    Submitted,
    Failed,
}

impl SessionPhase {
    #[must_use]
    pub fn accepts_selection(self) -> bool {
        matches!(self, Self::Active)
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Submitted | Self::Failed)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Submitting => "submitting",
            Self::Submitted => "submitted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What caused the move into `Submitting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    User,
    Expiry,
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still active with this many seconds left.
    Running { remaining_seconds: u32 },
    /// The countdown just reached zero; reported once.
    Expired,
    /// Not active; the tick had no effect.
    Idle,
}

//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// Read projection of a session for rendering. Holds no authority over state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub definition: Option<Arc<AssessmentDefinition>>,
    pub remaining_seconds: u32,
    pub selections: Vec<i32>,
    pub answered: usize,
    pub trigger: Option<SubmitTrigger>,
    pub submitted_answers: Option<AnswerVector>,
    pub receipt: Option<SubmissionReceipt>,
    pub failure: Option<String>,
}

impl SessionSnapshot {
    #[must_use]
    pub fn loading() -> Self {
        AssessmentSession::new().snapshot()
    }

    /// A failed submission whose answers are still held for another attempt.
    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.phase == SessionPhase::Failed && self.submitted_answers.is_some()
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.definition
            .as_ref()
            .map_or(0, |definition| definition.question_count())
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State machine for a single timed attempt.
///
/// The answer vector is frozen on the way into `Submitting`; from then on
/// selections are rejected and the same vector is used for every post.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    phase: SessionPhase,
    definition: Option<Arc<AssessmentDefinition>>,
    ledger: Option<AnswerLedger>,
    remaining_seconds: u32,
    trigger: Option<SubmitTrigger>,
    submitted: Option<AnswerVector>,
    receipt: Option<SubmissionReceipt>,
    failure: Option<String>,
}

impl Default for AssessmentSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Loading,
            definition: None,
            ledger: None,
            remaining_seconds: 0,
            trigger: None,
            submitted: None,
            receipt: None,
            failure: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    #[must_use]
    pub fn definition(&self) -> Option<&Arc<AssessmentDefinition>> {
        self.definition.as_ref()
    }

    #[must_use]
    pub fn ledger(&self) -> Option<&AnswerLedger> {
        self.ledger.as_ref()
    }

    #[must_use]
    pub fn submitted_answers(&self) -> Option<&AnswerVector> {
        self.submitted.as_ref()
    }

    #[must_use]
    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    /// Start the countdown with a fresh ledger.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` unless the session is `Loading`.
    pub fn activate(&mut self, definition: Arc<AssessmentDefinition>) -> Result<(), SessionError> {
        if self.phase != SessionPhase::Loading {
            return Err(SessionError::AlreadyStarted { phase: self.phase });
        }
        self.remaining_seconds = definition.duration_seconds();
        self.ledger = Some(AnswerLedger::for_definition(&definition));
        self.definition = Some(definition);
        self.phase = SessionPhase::Active;
        Ok(())
    }

    /// Give up on loading. No ledger is ever created.
    pub fn fail_load(&mut self, message: impl Into<String>) {
        if self.phase == SessionPhase::Loading {
            self.phase = SessionPhase::Failed;
            self.failure = Some(message.into());
        }
    }

    /// Record a selection.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAccepting` outside `Active`, and
    /// `SessionError::Validation` for out-of-range indices. Neither changes
    /// the ledger.
    pub fn select_option(&mut self, question_index: usize, option_index: usize) -> Result<(), SessionError> {
        if !self.phase.accepts_selection() {
            return Err(SessionError::NotAccepting { phase: self.phase });
        }
        let Some(ledger) = self.ledger.as_mut() else {
            return Err(SessionError::NotAccepting { phase: self.phase });
        };
        ledger.set(question_index, option_index)?;
        Ok(())
    }

    /// Apply one clock tick.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != SessionPhase::Active {
            return TickOutcome::Idle;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.phase = SessionPhase::Expired;
            return TickOutcome::Expired;
        }
        TickOutcome::Running {
            remaining_seconds: self.remaining_seconds,
        }
    }

    /// Gate into `Submitting`.
    ///
    /// Returns the frozen answer vector the first time it is called from
    /// `Active` or `Expired`; every other call returns `None` and changes
    /// nothing.
    pub fn begin_submission(&mut self, trigger: SubmitTrigger) -> Option<AnswerVector> {
        if !matches!(self.phase, SessionPhase::Active | SessionPhase::Expired)
            || trigger == SubmitTrigger::Retry
        {
            return None;
        }
        let definition = self.definition.as_ref()?;
        let ledger = self.ledger.as_ref()?;
        let vector = ledger.to_vector(definition.question_count());
        self.submitted = Some(vector.clone());
        self.trigger = Some(trigger);
        self.phase = SessionPhase::Submitting;
        Some(vector)
    }

    /// Re-enter `Submitting` after a failed post, returning the retained vector.
    ///
    /// This is the only way out of `Failed`; `begin_submission` never reopens
    /// it, and a failed load has no vector to retry.
    pub fn retry_submission(&mut self) -> Option<AnswerVector> {
        if self.phase != SessionPhase::Failed {
            return None;
        }
        let vector = self.submitted.clone()?;
        self.trigger = Some(SubmitTrigger::Retry);
        self.failure = None;
        self.phase = SessionPhase::Submitting;
        Some(vector)
    }

    /// Settle an in-flight submission. Ignored unless `Submitting`.
    pub fn complete_submission(&mut self, result: Result<SubmissionReceipt, String>) {
        if self.phase != SessionPhase::Submitting {
            return;
        }
        match result {
            Ok(receipt) => {
                self.receipt = Some(receipt);
                self.failure = None;
                self.phase = SessionPhase::Submitted;
            }
            Err(message) => {
                self.failure = Some(message);
                self.phase = SessionPhase::Failed;
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let (selections, answered) = self.ledger.as_ref().map_or_else(
            || (Vec::new(), 0),
            |ledger| (ledger.selections().to_vec(), ledger.answered_count()),
        );
        SessionSnapshot {
            phase: self.phase,
            definition: self.definition.clone(),
            remaining_seconds: self.remaining_seconds,
            selections,
            answered,
            trigger: self.trigger,
            submitted_answers: self.submitted.clone(),
            receipt: self.receipt.clone(),
            failure: self.failure.clone(),
        }
    }
}
