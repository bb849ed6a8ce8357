use campus_core::model::SessionPhase;

use super::ViewError;
use super::test_harness::{EXAM_ID, FakeAssessments, ViewKind, setup_view_harness};
use crate::vm::ExamIntent;

fn exam() -> ViewKind {
    ViewKind::Exam(EXAM_ID.to_string())
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_links_to_assessment() {
    let mut harness = setup_view_harness(ViewKind::Home, FakeAssessments::chemistry());
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Dashboard"), "missing title in {html}");
    assert!(html.contains("/exam/chem-101"), "missing exam link in {html}");
    assert_eq!(harness.assessments.fetches(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_renders_loaded_paper() {
    let mut harness = setup_view_harness(exam(), FakeAssessments::chemistry());
    harness.rebuild();
    assert!(harness.render().contains("Loading assessment"));

    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Chemistry basics"), "missing title in {html}");
    assert!(html.contains("01:30"), "missing countdown in {html}");
    assert!(html.contains("0 / 3 answered"), "missing progress in {html}");
    assert!(html.contains("Symbol for sodium?"), "missing question in {html}");
    assert!(html.contains("2 marks"), "missing marks in {html}");
    assert!(html.contains("Submit answers"), "missing submit in {html}");
    assert!(harness.controller().clock_running());
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_selection_updates_paper() {
    let mut harness = setup_view_harness(exam(), FakeAssessments::chemistry());
    harness.rebuild();
    harness.settle().await;

    harness.dispatch(ExamIntent::Select { question: 0, option: 1 });
    harness.settle().await;

    let snapshot = harness.controller().snapshot().await;
    assert_eq!(snapshot.selections, vec![1, -1, -1]);
    let html = harness.render();
    assert!(html.contains("1 / 3 answered"), "missing progress in {html}");
    assert!(html.contains("exam-option--selected"), "missing selection in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_submit_requires_confirmation() {
    let mut harness = setup_view_harness(exam(), FakeAssessments::chemistry());
    harness.rebuild();
    harness.settle().await;

    harness.dispatch(ExamIntent::Select { question: 0, option: 1 });
    harness.dispatch(ExamIntent::RequestSubmit);
    harness.settle().await;
    let html = harness.render();
    assert!(
        html.contains("2 of 3 questions are unanswered"),
        "missing confirm prompt in {html}"
    );
    assert!(harness.assessments.submissions().is_empty());

    harness.dispatch(ExamIntent::CancelSubmit);
    harness.settle().await;
    assert!(!harness.render().contains("Keep working"));

    harness.dispatch(ExamIntent::RequestSubmit);
    harness.dispatch(ExamIntent::ConfirmSubmit);
    harness.settle().await;

    assert_eq!(harness.assessments.submissions(), vec![vec![1, -1, -1]]);
    let html = harness.render();
    assert!(html.contains("Your answers have been submitted."), "missing notice in {html}");
    assert!(html.contains("Score 3 / 4 (75%)"), "missing score in {html}");
    assert!(html.contains("Merit"), "missing band in {html}");
    assert!(html.contains("Back to dashboard"), "missing leave in {html}");
    assert!(!harness.controller().clock_running());
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_double_confirm_posts_once() {
    let mut harness = setup_view_harness(exam(), FakeAssessments::chemistry());
    harness.rebuild();
    harness.settle().await;

    harness.dispatch(ExamIntent::ConfirmSubmit);
    harness.dispatch(ExamIntent::ConfirmSubmit);
    harness.settle().await;

    assert_eq!(harness.assessments.submissions(), vec![vec![-1, -1, -1]]);
    assert_eq!(
        harness.controller().snapshot().await.phase,
        SessionPhase::Submitted
    );
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_failed_submission_offers_retry() {
    let mut harness = setup_view_harness(exam(), FakeAssessments::chemistry().failing_submits());
    harness.rebuild();
    harness.settle().await;

    harness.dispatch(ExamIntent::Select { question: 2, option: 0 });
    harness.settle().await;
    harness.dispatch(ExamIntent::ConfirmSubmit);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("could not be submitted"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");

    harness.dispatch(ExamIntent::RetrySubmit);
    harness.settle().await;
    assert_eq!(
        harness.assessments.submissions(),
        vec![vec![-1, -1, 0], vec![-1, -1, 0]]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_load_failure_returns_to_dashboard() {
    let mut harness = setup_view_harness(exam(), FakeAssessments::missing());
    harness.rebuild();
    harness.settle().await;

    let controller = harness.controller();
    let html = harness.render();
    assert!(!html.contains("exam-root"), "still on exam route: {html}");
    assert!(html.contains("Dashboard"), "missing dashboard in {html}");
    assert!(
        html.contains(ViewError::LoadFailed.message()),
        "missing notice in {html}"
    );
    assert_eq!(harness.assessments.fetches(), 1);
    assert!(controller.is_disposed());
    assert!(!controller.clock_running());
    assert_eq!(controller.snapshot().await.phase, SessionPhase::Failed);
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_blank_id_returns_to_dashboard_without_fetch() {
    let mut harness = setup_view_harness(ViewKind::Exam("  ".to_string()), FakeAssessments::chemistry());
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(!html.contains("exam-root"), "still on exam route: {html}");
    assert!(html.contains(ViewError::Unknown.message()), "missing notice in {html}");
    assert_eq!(harness.assessments.fetches(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn exam_view_smoke_unmount_disposes_session() {
    let mut harness = setup_view_harness(exam(), FakeAssessments::chemistry());
    harness.rebuild();
    harness.settle().await;

    let controller = harness.controller();
    assert!(controller.clock_running());
    drop(harness);

    assert!(controller.is_disposed());
    assert!(!controller.clock_running());
    assert_eq!(controller.snapshot().await.phase, SessionPhase::Active);
}
