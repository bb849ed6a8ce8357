mod exam;
mod home;
mod state;

pub use exam::{ExamPaper, TakeExamView};
pub use home::HomeView;
pub use state::ViewError;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;
