use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use campus_core::model::{
    AnswerVector, AssessmentId, AssessmentSession, SessionError, SessionPhase, SessionSnapshot,
    SubmissionReceipt, SubmitTrigger, TickOutcome,
};

use crate::assessment_client::AssessmentService;
use crate::error::{AssessmentServiceError, ControllerError, LoadError, SubmissionError};
use crate::ticker::{TickControl, Ticker, TickerHandle};

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Definition loaded, countdown running.
    Active,
    /// The controller was disposed while the fetch was in flight.
    Disposed,
    /// `start` had already been called on this controller.
    AlreadyStarted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Submitted(SubmissionReceipt),
    /// The submission gate was already passed (or never opened); nothing was sent.
    Ignored { phase: SessionPhase },
}

struct Inner {
    id: AssessmentId,
    attempt: Uuid,
    service: Arc<dyn AssessmentService>,
    session: Mutex<AssessmentSession>,
    ticker: std::sync::Mutex<Option<TickerHandle>>,
    /// Set by the first `start`, so only one fetch is ever issued.
    starting: AtomicBool,
    disposed: AtomicBool,
    updates: watch::Sender<SessionSnapshot>,
    tick_period: Duration,
}

impl Inner {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    /// Push a fresh projection to subscribers unless the view has detached.
    fn publish(&self, session: &AssessmentSession) {
        if self.is_disposed() {
            return;
        }
        self.updates.send_replace(session.snapshot());
    }

    fn stop_ticker(&self) {
        let handle = self
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.cancel();
        }
    }
}

/// Drives one assessment attempt from load to submission.
///
/// Clock ticks and user actions are serialized through one async lock around
/// the session state machine; the lock is never held across a network call.
/// At most one outbound submission is produced for the first gate pass, and a
/// failed one can be retried with the same frozen vector.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    #[must_use]
    pub fn new(service: Arc<dyn AssessmentService>, id: AssessmentId) -> Self {
        Self::with_tick_period(service, id, DEFAULT_TICK_PERIOD)
    }

    #[must_use]
    pub fn with_tick_period(
        service: Arc<dyn AssessmentService>,
        id: AssessmentId,
        tick_period: Duration,
    ) -> Self {
        let (updates, _) = watch::channel(SessionSnapshot::loading());
        Self {
            inner: Arc::new(Inner {
                id,
                attempt: Uuid::new_v4(),
                service,
                session: Mutex::new(AssessmentSession::new()),
                ticker: std::sync::Mutex::new(None),
                starting: AtomicBool::new(false),
                disposed: AtomicBool::new(false),
                updates,
                tick_period,
            }),
        }
    }

    #[must_use]
    pub fn assessment_id(&self) -> &AssessmentId {
        &self.inner.id
    }

    /// Idempotency key sent with every post of this attempt.
    #[must_use]
    pub fn attempt_id(&self) -> Uuid {
        self.inner.attempt
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.updates.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.session.lock().await.snapshot()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Whether a Clock Source is currently scheduled for this session.
    #[must_use]
    pub fn clock_running(&self) -> bool {
        self.inner
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_cancelled() && !handle.is_finished())
    }

    /// Fetch the assessment and start the countdown. Only the first call
    /// fetches; later or concurrent calls return `AlreadyStarted`, and calls
    /// after `dispose` return `Disposed`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` when the definition cannot be fetched or is
    /// malformed. The session is then `Failed` and the caller should navigate
    /// away; nothing is retried.
    pub async fn start(&self) -> Result<StartOutcome, LoadError> {
        let inner = &self.inner;
        {
            let session = inner.session.lock().await;
            if inner.is_disposed() {
                debug!("start ignored for disposed assessment {}", inner.id);
                return Ok(StartOutcome::Disposed);
            }
            let already = session.phase() != SessionPhase::Loading
                || inner.starting.swap(true, Ordering::SeqCst);
            if already {
                return Ok(StartOutcome::AlreadyStarted);
            }
        }

        info!("loading assessment {}", inner.id);
        let fetched = inner.service.fetch_assessment(&inner.id).await;
        if inner.is_disposed() {
            info!("assessment {} disposed while loading", inner.id);
            return Ok(StartOutcome::Disposed);
        }

        let definition = match fetched {
            Ok(definition) => definition,
            Err(err) => {
                let err = match err {
                    AssessmentServiceError::Invalid(invalid) => LoadError::Malformed(invalid),
                    other => LoadError::Fetch(other),
                };
                error!("failed to load assessment {}: {err}", inner.id);
                let mut session = inner.session.lock().await;
                session.fail_load(err.to_string());
                inner.publish(&session);
                return Err(err);
            }
        };

        {
            let mut session = inner.session.lock().await;
            if inner.is_disposed() {
                return Ok(StartOutcome::Disposed);
            }
            if let Err(err) = session.activate(Arc::new(definition)) {
                warn!("ignoring duplicate start for {}: {err}", inner.id);
                return Ok(StartOutcome::AlreadyStarted);
            }
            info!(
                "assessment {} active with {}s on the clock",
                inner.id,
                session.remaining_seconds()
            );
            inner.publish(&session);
        }

        self.spawn_ticker();
        Ok(StartOutcome::Active)
    }

    /// Record a user selection.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` for out-of-range indices or when the session is
    /// not `Active`. These point at a UI bug and are only logged.
    pub async fn select_option(&self, question_index: usize, option_index: usize) -> Result<(), SessionError> {
        let inner = &self.inner;
        let mut session = inner.session.lock().await;
        match session.select_option(question_index, option_index) {
            Ok(()) => {
                debug!("q{question_index} -> option {option_index}");
                inner.publish(&session);
                Ok(())
            }
            Err(err) => {
                warn!("rejected selection q{question_index}/o{option_index}: {err}");
                Err(err)
            }
        }
    }

    /// Apply one Clock Source tick, auto-submitting when time runs out.
    pub async fn tick(&self) -> TickControl {
        let inner = &self.inner;
        let answers = {
            let mut session = inner.session.lock().await;
            if inner.is_disposed() {
                return TickControl::Stop;
            }
            match session.tick() {
                TickOutcome::Running { .. } => {
                    inner.publish(&session);
                    return TickControl::Continue;
                }
                TickOutcome::Idle => return TickControl::Stop,
                TickOutcome::Expired => {
                    info!("time is up for assessment {}, submitting", inner.id);
                    let Some(answers) = session.begin_submission(SubmitTrigger::Expiry) else {
                        return TickControl::Stop;
                    };
                    inner.publish(&session);
                    answers
                }
            }
        };

        if let Err(err) = self.post(answers).await {
            debug!("auto-submission for {} kept for retry: {err}", inner.id);
        }
        TickControl::Stop
    }

    /// Submit after explicit user confirmation.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Submission` when the post fails; the frozen
    /// answers remain available for `retry_submission`.
    pub async fn submit(&self) -> Result<SubmitOutcome, ControllerError> {
        let inner = &self.inner;
        let answers = {
            let mut session = inner.session.lock().await;
            if inner.is_disposed() {
                return Ok(SubmitOutcome::Ignored {
                    phase: session.phase(),
                });
            }
            let Some(answers) = session.begin_submission(SubmitTrigger::User) else {
                debug!("submit ignored while {}", session.phase());
                return Ok(SubmitOutcome::Ignored {
                    phase: session.phase(),
                });
            };
            info!("submitting assessment {}", inner.id);
            inner.publish(&session);
            answers
        };
        inner.stop_ticker();

        let receipt = self.post(answers).await?;
        Ok(SubmitOutcome::Submitted(receipt))
    }

    /// Post the retained answers again after a failed submission.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Submission` if the post fails again.
    pub async fn retry_submission(&self) -> Result<SubmitOutcome, ControllerError> {
        let inner = &self.inner;
        let answers = {
            let mut session = inner.session.lock().await;
            let retry = if inner.is_disposed() {
                None
            } else {
                session.retry_submission()
            };
            let Some(answers) = retry else {
                return Ok(SubmitOutcome::Ignored {
                    phase: session.phase(),
                });
            };
            info!("retrying submission for assessment {}", inner.id);
            inner.publish(&session);
            answers
        };

        let receipt = self.post(answers).await?;
        Ok(SubmitOutcome::Submitted(receipt))
    }

    /// Tear the session down. Cancels the clock and detaches subscribers.
    ///
    /// A post already in flight still settles the session state, but no
    /// further snapshot is published.
    pub fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("disposing session for assessment {}", self.inner.id);
        self.inner.stop_ticker();
    }

    async fn post(&self, answers: AnswerVector) -> Result<SubmissionReceipt, SubmissionError> {
        let inner = &self.inner;
        let result = inner
            .service
            .submit_answers(&inner.id, inner.attempt, &answers)
            .await;

        let mut session = inner.session.lock().await;
        match result {
            Ok(receipt) => {
                info!("assessment {} submitted", inner.id);
                session.complete_submission(Ok(receipt.clone()));
                inner.publish(&session);
                Ok(receipt)
            }
            Err(err) => {
                error!("submission for assessment {} failed: {err}", inner.id);
                session.complete_submission(Err(err.to_string()));
                inner.publish(&session);
                Err(SubmissionError::Rejected(err))
            }
        }
    }

    fn spawn_ticker(&self) {
        let weak = Arc::downgrade(&self.inner);
        let handle = Ticker::spawn(self.inner.tick_period, move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(inner) => SessionController { inner }.tick().await,
                    None => TickControl::Stop,
                }
            }
        });

        let mut slot = self
            .inner
            .ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.inner.is_disposed() {
            handle.cancel();
            return;
        }
        if let Some(previous) = slot.replace(handle) {
            previous.cancel();
        }
    }
}
