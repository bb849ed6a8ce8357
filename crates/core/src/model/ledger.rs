use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::assessment::AssessmentDefinition;

/// Marks a question with no selection. Never a valid option index.
pub const UNANSWERED: i32 = -1;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("question index {index} out of range (0..{len})")]
    QuestionOutOfRange { index: usize, len: usize },

    #[error("option index {option} out of range for question {question} (0..{len})")]
    OptionOutOfRange {
        question: usize,
        option: usize,
        len: usize,
    },
}

/// Positionally aligned list of selected option indices, `UNANSWERED` where
/// nothing was picked. Serializes as a bare JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerVector(Vec<i32>);

impl AnswerVector {
    #[must_use]
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<i32> {
        self.0
    }
}

impl From<Vec<i32>> for AnswerVector {
    fn from(value: Vec<i32>) -> Self {
        Self(value)
    }
}

/// Latest selection per question, dense over `[0, questions.len())`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerLedger {
    selections: Vec<i32>,
    option_counts: Vec<usize>,
}

impl AnswerLedger {
    /// Create a ledger with every question unanswered.
    #[must_use]
    pub fn for_definition(definition: &AssessmentDefinition) -> Self {
        let option_counts: Vec<usize> = definition
            .questions()
            .iter()
            .map(|question| question.option_count())
            .collect();
        Self {
            selections: vec![UNANSWERED; option_counts.len()],
            option_counts,
        }
    }

    /// Record `option_index` as the answer to `question_index`, replacing any
    /// earlier pick for that question.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if either index is out of bounds; the ledger
    /// is left untouched.
    pub fn set(&mut self, question_index: usize, option_index: usize) -> Result<(), ValidationError> {
        let Some(&len) = self.option_counts.get(question_index) else {
            return Err(ValidationError::QuestionOutOfRange {
                index: question_index,
                len: self.option_counts.len(),
            });
        };
        if option_index >= len {
            return Err(ValidationError::OptionOutOfRange {
                question: question_index,
                option: option_index,
                len,
            });
        }
        let value = i32::try_from(option_index).map_err(|_| ValidationError::OptionOutOfRange {
            question: question_index,
            option: option_index,
            len,
        })?;
        self.selections[question_index] = value;
        Ok(())
    }

    /// Selected option for `question_index`, or `UNANSWERED`.
    #[must_use]
    pub fn get(&self, question_index: usize) -> i32 {
        self.selections
            .get(question_index)
            .copied()
            .unwrap_or(UNANSWERED)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.selections
            .iter()
            .filter(|value| **value != UNANSWERED)
            .count()
    }

    #[must_use]
    pub fn selections(&self) -> &[i32] {
        &self.selections
    }

    /// Materialize exactly `length` entries, padding with `UNANSWERED`.
    #[must_use]
    pub fn to_vector(&self, length: usize) -> AnswerVector {
        let answers = (0..length).map(|index| self.get(index)).collect();
        AnswerVector(answers)
    }
}
