use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{HomeView, TakeExamView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/exam/:exam_id", TakeExamView)] TakeExam { exam_id: String },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Campus" }
            ul {
                li { Link { to: Route::Home {}, "Dashboard" } }
            }
        }
    }
}
