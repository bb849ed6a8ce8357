use dioxus::prelude::*;

use crate::vm::{ExamIntent, ExamStatus, ExamVm, OptionRowVm, QuestionRowVm};

/// Renders one exam attempt. Holds no state of its own.
#[component]
pub fn ExamPaper(vm: ExamVm, on_intent: EventHandler<ExamIntent>) -> Element {
    let locked = !vm.can_submit;
    let timer_class = if vm.low_time {
        "exam-timer exam-timer--low"
    } else {
        "exam-timer"
    };

    rsx! {
        div { class: "exam-paper",
            header { class: "exam-paper__header",
                h2 { class: "exam-paper__title", id: "exam-title", "{vm.title}" }
                span { class: "{timer_class}", id: "exam-timer", role: "timer", "{vm.clock_label}" }
                span { class: "exam-progress", id: "exam-progress", "{vm.progress_label}" }
            }
            if let Some(notice) = vm.notice.as_deref() {
                p { class: "exam-notice", id: "exam-notice", role: "status", "{notice}" }
            }
            if let Some(result) = vm.result_line.as_deref() {
                p { class: "exam-result", id: "exam-result", "{result}" }
            }
            ol { class: "exam-questions",
                for question in vm.questions.iter().cloned() {
                    QuestionCard {
                        key: "{question.index}",
                        question,
                        locked,
                        on_intent,
                    }
                }
            }
            footer { class: "exam-paper__footer",
                if vm.confirming {
                    div { class: "exam-confirm", role: "dialog", aria_modal: "true",
                        p { class: "exam-confirm__prompt", "{vm.confirm_prompt}" }
                        button {
                            class: "btn btn-primary",
                            id: "exam-confirm-submit",
                            r#type: "button",
                            onclick: move |_| on_intent.call(ExamIntent::ConfirmSubmit),
                            "Submit"
                        }
                        button {
                            class: "btn btn-secondary",
                            id: "exam-cancel-submit",
                            r#type: "button",
                            onclick: move |_| on_intent.call(ExamIntent::CancelSubmit),
                            "Keep working"
                        }
                    }
                } else if vm.can_submit {
                    button {
                        class: "btn btn-primary",
                        id: "exam-submit",
                        r#type: "button",
                        onclick: move |_| on_intent.call(ExamIntent::RequestSubmit),
                        "Submit answers"
                    }
                }
                if vm.status == ExamStatus::Submitted {
                    button {
                        class: "btn btn-secondary",
                        id: "exam-leave",
                        r#type: "button",
                        onclick: move |_| on_intent.call(ExamIntent::Leave),
                        "Back to dashboard"
                    }
                }
            }
        }
    }
}

#[component]
fn QuestionCard(
    question: QuestionRowVm,
    locked: bool,
    on_intent: EventHandler<ExamIntent>,
) -> Element {
    let class = if question.answered {
        "exam-question exam-question--answered"
    } else {
        "exam-question"
    };
    let question_index = question.index;

    rsx! {
        li { class: "{class}",
            div { class: "exam-question__meta",
                span { class: "exam-question__number", "{question.number_label}" }
                span { class: "exam-question__marks", "{question.marks_label}" }
            }
            p { class: "exam-question__text", "{question.text}" }
            div { class: "exam-options", role: "radiogroup",
                for option in question.options.iter().cloned() {
                    OptionButton {
                        key: "{option.index}",
                        question_index,
                        option,
                        locked,
                        on_intent,
                    }
                }
            }
        }
    }
}

#[component]
fn OptionButton(
    question_index: usize,
    option: OptionRowVm,
    locked: bool,
    on_intent: EventHandler<ExamIntent>,
) -> Element {
    let class = if option.selected {
        "exam-option exam-option--selected"
    } else {
        "exam-option"
    };
    let option_index = option.index;

    rsx! {
        button {
            class: "{class}",
            id: "exam-q{question_index}-o{option_index}",
            r#type: "button",
            role: "radio",
            aria_checked: "{option.selected}",
            disabled: locked,
            onclick: move |_| {
                on_intent.call(ExamIntent::Select {
                    question: question_index,
                    option: option_index,
                });
            },
            "{option.label}"
        }
    }
}
