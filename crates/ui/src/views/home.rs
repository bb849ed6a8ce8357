use dioxus::prelude::*;
use dioxus_router::Link;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let assessment = ctx.default_assessment().cloned();
    let flash = use_hook(|| ctx.take_flash());

    rsx! {
        div { class: "page",
            h2 { "Dashboard" }
            if let Some(message) = flash {
                p { class: "flash flash--error", id: "home-flash", role: "alert", "{message}" }
            }
            if let Some(id) = assessment {
                p { "Assessment {id} is ready. The timer starts when you open it." }
                Link {
                    class: "btn btn-primary",
                    id: "home-start-exam",
                    to: Route::TakeExam { exam_id: id.to_string() },
                    "Start assessment"
                }
            } else {
                p { class: "muted", "No assessment is assigned. Launch with --exam <id>." }
            }
        }
    }
}
