use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use campus_core::model::AssessmentId;
use services::{AssessmentService, DEFAULT_TICK_PERIOD, SessionController};

pub trait UiApp: Send + Sync {
    fn assessments(&self) -> Arc<dyn AssessmentService>;
    fn default_assessment(&self) -> Option<AssessmentId>;

    fn tick_period(&self) -> Duration {
        DEFAULT_TICK_PERIOD
    }
}

#[derive(Clone)]
pub struct AppContext {
    assessments: Arc<dyn AssessmentService>,
    default_assessment: Option<AssessmentId>,
    tick_period: Duration,

    flash: Flash,
}

/// One-shot notice for the next dashboard render.
#[derive(Clone, Default)]
pub struct Flash(Arc<Mutex<Option<String>>>);

impl Flash {
    pub fn set(&self, message: impl Into<String>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(message.into());
    }

    #[must_use]
    pub fn take(&self) -> Option<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            assessments: app.assessments(),
            default_assessment: app.default_assessment(),
            tick_period: app.tick_period(),
            flash: Flash::default(),
        }
    }

    #[must_use]
    pub fn default_assessment(&self) -> Option<&AssessmentId> {
        self.default_assessment.as_ref()
    }

    pub fn set_flash(&self, message: impl Into<String>) {
        self.flash.set(message);
    }

    #[must_use]
    pub fn take_flash(&self) -> Option<String> {
        self.flash.take()
    }

    /// A fresh controller for one attempt. Every call is a new attempt.
    #[must_use]
    pub fn session_controller(&self, id: AssessmentId) -> SessionController {
        SessionController::with_tick_period(Arc::clone(&self.assessments), id, self.tick_period)
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_is_taken_once() {
        let flash = Flash::default();
        assert_eq!(flash.take(), None);

        flash.set("first");
        flash.clone().set("second");
        assert_eq!(flash.take().as_deref(), Some("second"));
        assert_eq!(flash.take(), None);
    }
}
