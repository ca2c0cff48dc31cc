use crate::error::QuestionError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// One left/right association of a matching task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

impl MatchPair {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

/// The variant-specific part of a question: what is shown and what counts as correct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerSpec {
    SingleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
    MultipleChoice {
        options: Vec<String>,
        correct_indices: BTreeSet<usize>,
    },
    /// Accepted answers are stored already normalized.
    FreeText { accepted_answers: BTreeSet<String> },
    /// Pairs keep their authored order; left labels are unique.
    Matching { pairs: Vec<MatchPair> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum QuestionKind {
    #[strum(serialize = "single choice")]
    SingleChoice,
    #[strum(serialize = "multiple choice")]
    MultipleChoice,
    #[strum(serialize = "free text")]
    FreeText,
    #[strum(serialize = "matching")]
    Matching,
}

/// A submitted answer. Its shape follows the question variant it answers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Answer {
    /// Nothing was selected, typed or placed.
    #[default]
    Blank,
    Single(usize),
    Multiple(BTreeSet<usize>),
    Text(String),
    /// left label -> right label placed under it; may be partial
    Matching(HashMap<String, String>),
}

impl Answer {
    pub fn is_blank(&self) -> bool {
        match self {
            Answer::Blank => true,
            Answer::Single(_) => false,
            Answer::Multiple(selected) => selected.is_empty(),
            Answer::Text(text) => text.trim().is_empty(),
            Answer::Matching(placed) => placed.is_empty(),
        }
    }
}

/// An authored quiz question. Immutable once built; every instance is valid.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawQuestion")]
pub struct Question {
    id: String,
    prompt: String,
    points: u32,
    spec: AnswerSpec,
}

/// Case-folds and trims free text the same way for authored and submitted answers.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

impl Question {
    pub fn single_choice(
        id: impl Into<String>,
        prompt: impl Into<String>,
        points: u32,
        options: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, QuestionError> {
        let id = id.into();
        check_options(&id, &options)?;
        check_index(&id, correct_index, options.len())?;
        Self::build(
            id,
            prompt.into(),
            points,
            AnswerSpec::SingleChoice {
                options,
                correct_index,
            },
        )
    }

    pub fn multiple_choice(
        id: impl Into<String>,
        prompt: impl Into<String>,
        points: u32,
        options: Vec<String>,
        correct_indices: impl IntoIterator<Item = usize>,
    ) -> Result<Self, QuestionError> {
        let id = id.into();
        check_options(&id, &options)?;
        let correct_indices: BTreeSet<usize> = correct_indices.into_iter().collect();
        if correct_indices.is_empty() {
            return Err(QuestionError::NoCorrectOption(id));
        }
        for &index in &correct_indices {
            check_index(&id, index, options.len())?;
        }
        Self::build(
            id,
            prompt.into(),
            points,
            AnswerSpec::MultipleChoice {
                options,
                correct_indices,
            },
        )
    }

    pub fn free_text<S: AsRef<str>>(
        id: impl Into<String>,
        prompt: impl Into<String>,
        points: u32,
        accepted_answers: impl IntoIterator<Item = S>,
    ) -> Result<Self, QuestionError> {
        let id = id.into();
        let accepted_answers: BTreeSet<String> = accepted_answers
            .into_iter()
            .map(|a| normalize(a.as_ref()))
            .filter(|a| !a.is_empty())
            .collect();
        if accepted_answers.is_empty() {
            return Err(QuestionError::NoAcceptedAnswers(id));
        }
        Self::build(
            id,
            prompt.into(),
            points,
            AnswerSpec::FreeText { accepted_answers },
        )
    }

    pub fn matching(
        id: impl Into<String>,
        prompt: impl Into<String>,
        points: u32,
        pairs: Vec<MatchPair>,
    ) -> Result<Self, QuestionError> {
        let id = id.into();
        if pairs.len() < 2 {
            return Err(QuestionError::TooFewPairs(id));
        }
        let mut seen = HashSet::new();
        for pair in &pairs {
            if !seen.insert(pair.left.as_str()) {
                return Err(QuestionError::DuplicateLeftLabel {
                    label: pair.left.clone(),
                    id,
                });
            }
        }
        Self::build(id, prompt.into(), points, AnswerSpec::Matching { pairs })
    }

    fn build(
        id: String,
        prompt: String,
        points: u32,
        spec: AnswerSpec,
    ) -> Result<Self, QuestionError> {
        if points == 0 {
            return Err(QuestionError::ZeroPoints(id));
        }
        Ok(Self {
            id,
            prompt,
            points,
            spec,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn spec(&self) -> &AnswerSpec {
        &self.spec
    }

    pub fn kind(&self) -> QuestionKind {
        match self.spec {
            AnswerSpec::SingleChoice { .. } => QuestionKind::SingleChoice,
            AnswerSpec::MultipleChoice { .. } => QuestionKind::MultipleChoice,
            AnswerSpec::FreeText { .. } => QuestionKind::FreeText,
            AnswerSpec::Matching { .. } => QuestionKind::Matching,
        }
    }

    /// Options of a choice question, empty for the other variants.
    pub fn options(&self) -> &[String] {
        match &self.spec {
            AnswerSpec::SingleChoice { options, .. }
            | AnswerSpec::MultipleChoice { options, .. } => {
                options
            }
            _ => &[],
        }
    }

    /// Points earned for `answer`: all of them when exactly correct, otherwise zero.
    ///
    /// Total over every input. A blank answer, or one shaped for a different
    /// variant, scores zero instead of failing.
    pub fn evaluate(&self, answer: &Answer) -> u32 {
        if self.is_correct(answer) {
            self.points
        } else {
            0
        }
    }

    pub fn is_correct(&self, answer: &Answer) -> bool {
        match (&self.spec, answer) {
            (AnswerSpec::SingleChoice { correct_index, .. }, Answer::Single(selected)) => {
                selected == correct_index
            }
            (
                AnswerSpec::MultipleChoice {
                    correct_indices, ..
                },
                Answer::Multiple(selected),
            ) => selected == correct_indices,
            (AnswerSpec::FreeText { accepted_answers }, Answer::Text(text)) => {
                accepted_answers.contains(&normalize(text))
            }
            (AnswerSpec::Matching { pairs }, Answer::Matching(_)) => {
                self.correct_pairs(answer) == pairs.len()
            }
            _ => false,
        }
    }

    /// Number of pairs placed exactly right. Unplaced keys count as wrong.
    /// Always zero for non-matching questions.
    pub fn correct_pairs(&self, answer: &Answer) -> usize {
        match (&self.spec, answer) {
            (AnswerSpec::Matching { pairs }, Answer::Matching(placed)) => pairs
                .iter()
                .filter(|pair| placed.get(&pair.left) == Some(&pair.right))
                .count(),
            _ => 0,
        }
    }
}

fn check_options(id: &str, options: &[String]) -> Result<(), QuestionError> {
    if options.len() < 2 {
        return Err(QuestionError::TooFewOptions(id.to_string()));
    }
    Ok(())
}

fn check_index(id: &str, index: usize, len: usize) -> Result<(), QuestionError> {
    if index >= len {
        return Err(QuestionError::IndexOutOfRange {
            id: id.to_string(),
            index,
            len,
        });
    }
    Ok(())
}

/// Authored on-disk form; only ever turned into a `Question` through validation.
#[derive(Deserialize)]
pub(crate) struct RawQuestion {
    id: String,
    prompt: String,
    points: u32,
    #[serde(flatten)]
    spec: RawSpec,
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawSpec {
    SingleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
    MultipleChoice {
        options: Vec<String>,
        correct_indices: Vec<usize>,
    },
    FreeText {
        accepted_answers: Vec<String>,
    },
    Matching {
        pairs: Vec<MatchPair>,
    },
}

impl TryFrom<RawQuestion> for Question {
    type Error = QuestionError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let RawQuestion {
            id,
            prompt,
            points,
            spec,
        } = raw;
        match spec {
            RawSpec::SingleChoice {
                options,
                correct_index,
            } => Question::single_choice(id, prompt, points, options, correct_index),
            RawSpec::MultipleChoice {
                options,
                correct_indices,
            } => Question::multiple_choice(id, prompt, points, options, correct_indices),
            RawSpec::FreeText { accepted_answers } => {
                Question::free_text(id, prompt, points, accepted_answers)
            }
            RawSpec::Matching { pairs } => Question::matching(id, prompt, points, pairs),
        }
    }
}
