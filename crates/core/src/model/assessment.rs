use thiserror::Error;

use crate::model::ids::AssessmentId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum AssessmentError {
    #[error("assessment title cannot be empty")]
    EmptyTitle,

    #[error("assessment duration must be > 0 seconds")]
    InvalidDuration,

    #[error("assessment has no questions")]
    NoQuestions,

    #[error("question {index} has empty text")]
    EmptyQuestionText { index: usize },

    #[error("question {index} needs at least 2 options, got {count}")]
    TooFewOptions { index: usize, count: usize },

    #[error("question {index} has invalid marks {marks}")]
    InvalidMarks { index: usize, marks: f64 },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One multiple-choice item of an assessment.
///
/// The option list is fixed once the definition is built. Which option is
/// correct is never known on the client; grading happens server side.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    text: String,
    options: Vec<String>,
    marks: f64,
}

impl Question {
    #[must_use]
    pub fn new(text: impl Into<String>, options: Vec<String>, marks: f64) -> Self {
        Self {
            text: text.into(),
            options,
            marks,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn marks(&self) -> f64 {
        self.marks
    }

    fn validate(&self, index: usize) -> Result<(), AssessmentError> {
        if self.text.trim().is_empty() {
            return Err(AssessmentError::EmptyQuestionText { index });
        }
        if self.options.len() < 2 {
            return Err(AssessmentError::TooFewOptions {
                index,
                count: self.options.len(),
            });
        }
        if !self.marks.is_finite() || self.marks <= 0.0 {
            return Err(AssessmentError::InvalidMarks {
                index,
                marks: self.marks,
            });
        }
        Ok(())
    }
}

//
// ─── DEFINITION ────────────────────────────────────────────────────────────────
//

/// Immutable snapshot of one timed test as delivered by the Assessment Service.
///
/// Question order is significant: it defines the indexing of the answer vector.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentDefinition {
    id: AssessmentId,
    title: String,
    duration_seconds: u32,
    questions: Vec<Question>,
}

impl AssessmentDefinition {
    /// Build a validated assessment definition.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentError` if the title is blank, the duration is zero,
    /// there are no questions, or any question is malformed.
    pub fn new(
        id: AssessmentId,
        title: impl Into<String>,
        duration_seconds: u32,
        questions: Vec<Question>,
    ) -> Result<Self, AssessmentError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AssessmentError::EmptyTitle);
        }
        if duration_seconds == 0 {
            return Err(AssessmentError::InvalidDuration);
        }
        if questions.is_empty() {
            return Err(AssessmentError::NoQuestions);
        }
        for (index, question) in questions.iter().enumerate() {
            question.validate(index)?;
        }

        Ok(Self {
            id,
            title,
            duration_seconds,
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> &AssessmentId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Sum of all question marks.
    #[must_use]
    pub fn total_marks(&self) -> f64 {
        self.questions.iter().map(Question::marks).sum()
    }
}
