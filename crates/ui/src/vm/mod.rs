mod exam_vm;
mod time_fmt;

pub use exam_vm::{ExamIntent, ExamStatus, ExamVm, LOW_TIME_SECS, OptionRowVm, QuestionRowVm};
pub use time_fmt::format_datetime;
