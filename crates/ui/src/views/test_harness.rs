use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router, use_navigator};
use uuid::Uuid;

use campus_core::model::{
    AnswerVector, AssessmentDefinition, AssessmentId, Question, SubmissionReceipt,
};
use campus_core::time::fixed_now;
use services::{AssessmentService, AssessmentServiceError, SessionController};

use crate::context::{UiApp, build_app_context};
use crate::views::exam::ExamTestHandles;
use crate::views::{HomeView, TakeExamView};
use crate::vm::ExamIntent;

pub const EXAM_ID: &str = "chem-101";

/// Long enough that no clock tick fires while a test runs.
const NO_AUTO_TICKS: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Default)]
pub struct FakeAssessments {
    definition: Option<AssessmentDefinition>,
    fail_submits: bool,
    submissions: Mutex<Vec<Vec<i32>>>,
    fetches: AtomicUsize,
}

impl FakeAssessments {
    pub fn chemistry() -> Self {
        let questions = vec![
            Question::new(
                "Symbol for sodium?",
                vec!["So".into(), "Na".into(), "Sd".into()],
                1.0,
            ),
            Question::new("pH of pure water?", vec!["5".into(), "7".into()], 1.0),
            Question::new("Noble gas?", vec!["Argon".into(), "Nitrogen".into()], 2.0),
        ];
        let definition = AssessmentDefinition::new(
            AssessmentId::new(EXAM_ID).unwrap(),
            "Chemistry basics",
            90,
            questions,
        )
        .unwrap();
        Self {
            definition: Some(definition),
            ..Self::default()
        }
    }

    pub fn missing() -> Self {
        Self::default()
    }

    pub fn failing_submits(mut self) -> Self {
        self.fail_submits = true;
        self
    }

    pub fn submissions(&self) -> Vec<Vec<i32>> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssessmentService for FakeAssessments {
    async fn fetch_assessment(
        &self,
        _id: &AssessmentId,
    ) -> Result<AssessmentDefinition, AssessmentServiceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.definition
            .clone()
            .ok_or(AssessmentServiceError::NotFound)
    }

    async fn submit_answers(
        &self,
        _id: &AssessmentId,
        _attempt: Uuid,
        answers: &AnswerVector,
    ) -> Result<SubmissionReceipt, AssessmentServiceError> {
        self.submissions
            .lock()
            .unwrap()
            .push(answers.as_slice().to_vec());
        if self.fail_submits {
            return Err(AssessmentServiceError::Decode("offline".to_string()));
        }
        Ok(SubmissionReceipt {
            submitted_at: fixed_now(),
            score: Some(3.0),
            max_score: Some(4.0),
        })
    }
}

struct TestApp {
    assessments: Arc<FakeAssessments>,
    default_assessment: Option<AssessmentId>,
}

impl UiApp for TestApp {
    fn assessments(&self) -> Arc<dyn AssessmentService> {
        self.assessments.clone()
    }

    fn default_assessment(&self) -> Option<AssessmentId> {
        self.default_assessment.clone()
    }

    fn tick_period(&self) -> Duration {
        NO_AUTO_TICKS
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Exam(String),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    handles: ExamTestHandles,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// Exam route the harness opens once, right after mounting.
#[derive(Clone)]
struct PendingExam(Rc<RefCell<Option<String>>>);

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| {
        let pending = match &props.view {
            ViewKind::Home => None,
            ViewKind::Exam(exam_id) => Some(exam_id.clone()),
        };
        PendingExam(Rc::new(RefCell::new(pending)))
    });
    use_context_provider(|| props.handles.clone());
    rsx! { Router::<TestRoute> {} }
}

/// Same paths as the app router, without the layout chrome.
#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/", Dashboard)] Home {},
    #[route("/exam/:exam_id", TakeExamView)] TakeExam { exam_id: String },
}

#[component]
fn Dashboard() -> Element {
    let navigator = use_navigator();
    let pending = use_context::<PendingExam>();
    use_hook(move || {
        if let Some(exam_id) = pending.0.borrow_mut().take() {
            let _ = navigator.replace(TestRoute::TakeExam { exam_id });
        }
    });
    rsx! { HomeView {} }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub assessments: Arc<FakeAssessments>,
    handles: ExamTestHandles,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Let spawned view tasks and the snapshot mirror catch up.
    pub async fn settle(&mut self) {
        for _ in 0..6 {
            self.drive_async().await;
        }
    }

    pub fn dispatch(&self, intent: ExamIntent) {
        let dispatch = self.handles.dispatch();
        self.dom.in_runtime(|| dispatch.call(intent));
    }

    pub fn controller(&self) -> SessionController {
        self.handles.controller()
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(view: ViewKind, assessments: FakeAssessments) -> ViewHarness {
    let assessments = Arc::new(assessments);
    let handles = ExamTestHandles::default();
    let app = Arc::new(TestApp {
        assessments: Arc::clone(&assessments),
        default_assessment: Some(AssessmentId::new(EXAM_ID).unwrap()),
    });

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            handles: handles.clone(),
        },
    );

    ViewHarness {
        dom,
        assessments,
        handles,
    }
}
