mod paper;
mod view;

pub use paper::ExamPaper;
pub use view::TakeExamView;
#[cfg(test)]
pub(crate) use view::ExamTestHandles;
