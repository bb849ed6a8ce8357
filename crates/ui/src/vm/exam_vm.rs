use campus_core::model::{SessionPhase, SessionSnapshot, SubmitTrigger};
use campus_core::time::format_countdown;

use super::time_fmt::format_datetime;

/// Remaining time at or below which the timer is highlighted.
pub const LOW_TIME_SECS: u32 = 60;

/// User actions the exam page can raise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExamIntent {
    Select { question: usize, option: usize },
    RequestSubmit,
    ConfirmSubmit,
    CancelSubmit,
    RetrySubmit,
    Leave,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExamStatus {
    Loading,
    InProgress,
    Submitting,
    Submitted,
    SubmitFailed,
    LoadFailed,
}

impl ExamStatus {
    fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        match snapshot.phase {
            SessionPhase::Loading => Self::Loading,
            SessionPhase::Active => Self::InProgress,
            SessionPhase::Expired | SessionPhase::Submitting => Self::Submitting,
            SessionPhase::Submitted => Self::Submitted,
            SessionPhase::Failed if snapshot.submitted_answers.is_some() => Self::SubmitFailed,
            SessionPhase::Failed => Self::LoadFailed,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OptionRowVm {
    pub index: usize,
    pub label: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuestionRowVm {
    pub index: usize,
    pub number_label: String,
    pub text: String,
    pub marks_label: String,
    pub answered: bool,
    pub options: Vec<OptionRowVm>,
}

/// Render-ready projection of a session snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct ExamVm {
    pub status: ExamStatus,
    pub title: String,
    pub clock_label: String,
    pub low_time: bool,
    pub progress_label: String,
    pub questions: Vec<QuestionRowVm>,
    pub confirming: bool,
    pub confirm_prompt: String,
    pub can_submit: bool,
    pub can_retry: bool,
    pub notice: Option<String>,
    pub result_line: Option<String>,
}

impl ExamVm {
    #[must_use]
    pub fn from_snapshot(snapshot: &SessionSnapshot, confirming: bool) -> Self {
        let status = ExamStatus::from_snapshot(snapshot);
        let total = snapshot.question_count();
        let questions = snapshot
            .definition
            .as_ref()
            .map(|definition| {
                definition
                    .questions()
                    .iter()
                    .enumerate()
                    .map(|(index, question)| {
                        let selected = snapshot.selections.get(index).copied();
                        QuestionRowVm {
                            index,
                            number_label: format!("Question {}", index + 1),
                            text: question.text().to_owned(),
                            marks_label: marks_label(question.marks()),
                            answered: selected.is_some_and(|value| value >= 0),
                            options: question
                                .options()
                                .iter()
                                .enumerate()
                                .map(|(option, label)| OptionRowVm {
                                    index: option,
                                    label: label.clone(),
                                    selected: selected
                                        .and_then(|value| usize::try_from(value).ok())
                                        == Some(option),
                                })
                                .collect(),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let can_submit = status == ExamStatus::InProgress;
        let unanswered = total.saturating_sub(snapshot.answered);
        let confirm_prompt = if unanswered == 0 {
            "Submit your answers? You cannot change them afterwards.".to_string()
        } else {
            format!(
                "{unanswered} of {total} questions are unanswered. Submit anyway?"
            )
        };

        Self {
            status,
            title: snapshot
                .definition
                .as_ref()
                .map_or_else(String::new, |definition| definition.title().to_owned()),
            clock_label: format_countdown(snapshot.remaining_seconds),
            low_time: can_submit && snapshot.remaining_seconds <= LOW_TIME_SECS,
            progress_label: format!("{} / {total} answered", snapshot.answered),
            questions,
            confirming: confirming && can_submit,
            confirm_prompt,
            can_submit,
            can_retry: snapshot.can_retry(),
            notice: notice(status, snapshot),
            result_line: result_line(snapshot),
        }
    }
}

fn marks_label(marks: f64) -> String {
    if (marks - 1.0).abs() < f64::EPSILON {
        "1 mark".to_string()
    } else {
        format!("{marks} marks")
    }
}

fn notice(status: ExamStatus, snapshot: &SessionSnapshot) -> Option<String> {
    let expired = snapshot.trigger == Some(SubmitTrigger::Expiry);
    match status {
        ExamStatus::Loading
        | ExamStatus::InProgress
        | ExamStatus::SubmitFailed
        | ExamStatus::LoadFailed => None,
        ExamStatus::Submitting if expired => {
            Some("Time is up. Submitting your answers…".to_string())
        }
        ExamStatus::Submitting => Some("Submitting your answers…".to_string()),
        ExamStatus::Submitted if expired => {
            Some("Time is up. Your answers were submitted automatically.".to_string())
        }
        ExamStatus::Submitted => Some("Your answers have been submitted.".to_string()),
    }
}

fn result_line(snapshot: &SessionSnapshot) -> Option<String> {
    let receipt = snapshot.receipt.as_ref()?;
    let submitted = format!("Submitted at {}", format_datetime(receipt.submitted_at));
    match (receipt.score, receipt.max_score, receipt.percentage(), receipt.grade_band()) {
        (Some(score), Some(max), Some(percent), Some(band)) => Some(format!(
            "{submitted} · Score {score} / {max} ({percent:.0}%) · {}",
            band.label()
        )),
        _ => Some(submitted),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use campus_core::model::{
        AssessmentDefinition, AssessmentId, AssessmentSession, Question, SubmissionReceipt,
    };
    use campus_core::time::fixed_now;

    use super::*;

    fn session(duration_seconds: u32) -> AssessmentSession {
        let definition = AssessmentDefinition::new(
            AssessmentId::new("geo").unwrap(),
            "Geography",
            duration_seconds,
            vec![
                Question::new("Capital of France?", vec!["Paris".into(), "Rome".into()], 1.0),
                Question::new("Longest river?", vec!["Nile".into(), "Amazon".into(), "Po".into()], 2.0),
            ],
        )
        .unwrap();
        let mut session = AssessmentSession::new();
        session.activate(Arc::new(definition)).unwrap();
        session
    }

    #[test]
    fn loading_snapshot_has_no_questions() {
        let vm = ExamVm::from_snapshot(&SessionSnapshot::loading(), false);
        assert_eq!(vm.status, ExamStatus::Loading);
        assert!(vm.questions.is_empty());
        assert!(!vm.can_submit);
    }

    #[test]
    fn active_snapshot_projects_questions_and_selection() {
        let mut session = session(125);
        session.select_option(1, 2).unwrap();

        let vm = ExamVm::from_snapshot(&session.snapshot(), false);
        assert_eq!(vm.status, ExamStatus::InProgress);
        assert_eq!(vm.title, "Geography");
        assert_eq!(vm.clock_label, "02:05");
        assert!(!vm.low_time);
        assert_eq!(vm.progress_label, "1 / 2 answered");
        assert_eq!(vm.questions[0].marks_label, "1 mark");
        assert_eq!(vm.questions[1].marks_label, "2 marks");
        assert!(!vm.questions[0].answered);
        assert!(vm.questions[1].answered);
        let selected: Vec<bool> = vm.questions[1].options.iter().map(|o| o.selected).collect();
        assert_eq!(selected, vec![false, false, true]);
    }

    #[test]
    fn low_time_flag_at_threshold() {
        let mut session = session(LOW_TIME_SECS + 1);
        assert!(!ExamVm::from_snapshot(&session.snapshot(), false).low_time);
        session.tick();
        let vm = ExamVm::from_snapshot(&session.snapshot(), false);
        assert!(vm.low_time);
        assert_eq!(vm.clock_label, "01:00");
    }

    #[test]
    fn confirmation_prompt_counts_unanswered() {
        let mut session = session(60);
        let vm = ExamVm::from_snapshot(&session.snapshot(), true);
        assert!(vm.confirming);
        assert_eq!(vm.confirm_prompt, "2 of 2 questions are unanswered. Submit anyway?");

        session.select_option(0, 0).unwrap();
        session.select_option(1, 0).unwrap();
        let vm = ExamVm::from_snapshot(&session.snapshot(), true);
        assert!(vm.confirm_prompt.starts_with("Submit your answers?"));
    }

    #[test]
    fn confirmation_is_hidden_once_submitting() {
        let mut session = session(60);
        session.begin_submission(SubmitTrigger::User);
        let vm = ExamVm::from_snapshot(&session.snapshot(), true);
        assert_eq!(vm.status, ExamStatus::Submitting);
        assert!(!vm.confirming);
        assert!(!vm.can_submit);
    }

    #[test]
    fn expiry_submission_shows_time_up_notice() {
        let mut session = session(1);
        session.tick();
        session.begin_submission(SubmitTrigger::Expiry);
        session.complete_submission(Ok(SubmissionReceipt::ungraded(fixed_now())));

        let vm = ExamVm::from_snapshot(&session.snapshot(), false);
        assert_eq!(vm.status, ExamStatus::Submitted);
        assert_eq!(
            vm.notice.as_deref(),
            Some("Time is up. Your answers were submitted automatically.")
        );
        assert_eq!(vm.clock_label, "00:00");
        assert!(vm.result_line.unwrap().starts_with("Submitted at "));
    }

    #[test]
    fn graded_receipt_shows_band() {
        let mut session = session(60);
        session.begin_submission(SubmitTrigger::User);
        session.complete_submission(Ok(SubmissionReceipt {
            submitted_at: fixed_now(),
            score: Some(3.0),
            max_score: Some(3.0),
        }));

        let vm = ExamVm::from_snapshot(&session.snapshot(), false);
        let line = vm.result_line.unwrap();
        assert!(line.contains("Score 3 / 3 (100%)"), "{line}");
        assert!(line.ends_with("Distinction"), "{line}");
    }

    #[test]
    fn failed_submission_offers_retry() {
        let mut session = session(60);
        session.begin_submission(SubmitTrigger::User);
        session.complete_submission(Err("offline".into()));

        let vm = ExamVm::from_snapshot(&session.snapshot(), false);
        assert_eq!(vm.status, ExamStatus::SubmitFailed);
        assert!(vm.can_retry);
        assert!(!vm.can_submit);
        assert!(vm.notice.is_none());
    }

    #[test]
    fn failed_load_is_distinguished() {
        let mut session = AssessmentSession::new();
        session.fail_load("404");
        let vm = ExamVm::from_snapshot(&session.snapshot(), false);
        assert_eq!(vm.status, ExamStatus::LoadFailed);
        assert!(!vm.can_retry);
    }
}
