#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    Unknown,
    LoadFailed,
    SubmissionFailed,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::Unknown => "Something went wrong. Please try again.",
            Self::LoadFailed => "This assessment could not be loaded. Please try again later.",
            Self::SubmissionFailed => {
                "Your answers could not be submitted. They are kept here, so you can retry."
            }
        }
    }
}
