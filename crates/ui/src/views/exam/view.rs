use dioxus::prelude::*;
use dioxus_router::use_navigator;
use log::{debug, warn};

use campus_core::model::{AssessmentId, SessionSnapshot};
use services::SessionController;

use super::paper::ExamPaper;
use crate::context::AppContext;
use crate::routes::Route;
use crate::views::ViewError;
use crate::vm::{ExamIntent, ExamStatus, ExamVm};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

fn view_error(controller: Option<&SessionController>, status: ExamStatus) -> Option<ViewError> {
    if controller.is_none() {
        return Some(ViewError::Unknown);
    }
    match status {
        ExamStatus::LoadFailed => Some(ViewError::LoadFailed),
        ExamStatus::SubmitFailed => Some(ViewError::SubmissionFailed),
        _ => None,
    }
}

/// One timed attempt at `exam_id`. The attempt lives exactly as long as
/// this component is mounted; if it cannot be loaded the learner is sent
/// back to the dashboard with a notice.
#[component]
pub fn TakeExamView(exam_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let controller = use_hook(|| match AssessmentId::new(exam_id.clone()) {
        Ok(id) => Some(ctx.session_controller(id)),
        Err(err) => {
            warn!("cannot open assessment {exam_id:?}: {err}");
            None
        }
    });
    let snapshot = use_signal(SessionSnapshot::loading);
    let mut confirming = use_signal(|| false);

    {
        let controller = controller.clone();
        use_drop(move || {
            if let Some(controller) = controller.as_ref() {
                controller.dispose();
            }
        });
    }

    {
        let controller = controller.clone();
        let ctx = ctx.clone();
        use_future(move || {
            let controller = controller.clone();
            let ctx = ctx.clone();
            async move {
                let mut snapshot = snapshot;
                let leave_with = |err: ViewError| {
                    ctx.set_flash(err.message());
                    let _ = navigator.replace(Route::Home {});
                };
                let Some(controller) = controller else {
                    leave_with(ViewError::Unknown);
                    return;
                };
                let mut updates = controller.subscribe();
                if let Err(err) = controller.start().await {
                    warn!("assessment {} failed to load: {err}", controller.assessment_id());
                    snapshot.set(updates.borrow_and_update().clone());
                    leave_with(ViewError::LoadFailed);
                    return;
                }
                loop {
                    let latest = updates.borrow_and_update().clone();
                    snapshot.set(latest);
                    if updates.changed().await.is_err() {
                        break;
                    }
                }
            }
        });
    }

    let dispatch_intent = {
        let controller = controller.clone();
        use_callback(move |intent: ExamIntent| {
            debug!("exam intent {intent:?}");
            match intent {
                ExamIntent::Leave => {
                    let _ = navigator.push(Route::Home {});
                    return;
                }
                ExamIntent::RequestSubmit => {
                    confirming.set(true);
                    return;
                }
                ExamIntent::CancelSubmit => {
                    confirming.set(false);
                    return;
                }
                _ => {}
            }
            let Some(controller) = controller.clone() else {
                return;
            };
            match intent {
                ExamIntent::Select { question, option } => {
                    spawn(async move {
                        let _ = controller.select_option(question, option).await;
                    });
                }
                ExamIntent::ConfirmSubmit => {
                    confirming.set(false);
                    spawn(async move {
                        if let Err(err) = controller.submit().await {
                            warn!("submission not accepted: {err}");
                        }
                    });
                }
                ExamIntent::RetrySubmit => {
                    spawn(async move {
                        if let Err(err) = controller.retry_submission().await {
                            warn!("retry not accepted: {err}");
                        }
                    });
                }
                ExamIntent::Leave | ExamIntent::RequestSubmit | ExamIntent::CancelSubmit => {}
            }
        })
    };

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<ExamTestHandles>() {
                handles.register(dispatch_intent, controller.clone());
            }
        }
    }

    let vm = ExamVm::from_snapshot(&snapshot.read(), confirming());
    let error = view_error(controller.as_ref(), vm.status);

    rsx! {
        div { class: "page exam-page", id: "exam-root",
            match (vm.status, error) {
                (_, Some(err @ (ViewError::Unknown | ViewError::LoadFailed))) => rsx! {
                    div { class: "exam-failure", role: "alert",
                        p { "{err.message()}" }
                        button {
                            class: "btn btn-secondary",
                            id: "exam-back",
                            r#type: "button",
                            onclick: move |_| dispatch_intent.call(ExamIntent::Leave),
                            "Back to dashboard"
                        }
                    }
                },
                (ExamStatus::Loading, _) => rsx! {
                    p { class: "exam-loading", "Loading assessment..." }
                },
                (_, submit_error) => rsx! {
                    if let Some(err) = submit_error {
                        div { class: "exam-failure", role: "alert",
                            p { "{err.message()}" }
                            button {
                                class: "btn btn-primary",
                                id: "exam-retry",
                                r#type: "button",
                                disabled: !vm.can_retry,
                                onclick: move |_| dispatch_intent.call(ExamIntent::RetrySubmit),
                                "Retry"
                            }
                        }
                    }
                    ExamPaper { vm: vm.clone(), on_intent: dispatch_intent }
                },
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct ExamTestHandles {
    dispatch: Rc<RefCell<Option<Callback<ExamIntent>>>>,
    controller: Rc<RefCell<Option<SessionController>>>,
}

#[cfg(test)]
impl ExamTestHandles {
    pub(crate) fn register(
        &self,
        dispatch: Callback<ExamIntent>,
        controller: Option<SessionController>,
    ) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.controller.borrow_mut() = controller;
    }

    pub(crate) fn dispatch(&self) -> Callback<ExamIntent> {
        (*self.dispatch.borrow()).expect("exam dispatch registered")
    }

    pub(crate) fn controller(&self) -> SessionController {
        self.controller
            .borrow()
            .clone()
            .expect("exam controller registered")
    }
}
