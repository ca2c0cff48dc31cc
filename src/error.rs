use thiserror::Error;

/// Caller-contract violations raised by the quiz engine.
///
/// None of these are retried or recovered from internally; the caller decides.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("unknown difficulty '{0}' (expected easy, medium or hard)")]
    UnknownDifficulty(String),

    #[error("session is not in progress")]
    SessionNotActive,

    #[error("session has not finished yet")]
    SessionNotFinished,

    #[error("session was already started")]
    SessionAlreadyStarted,

    #[error("question bank is invalid: {0}")]
    Bank(String),

    #[error("question bank is invalid: {file}: {error}")]
    InvalidQuestion {
        file: String,
        #[source]
        error: QuestionError,
    },
}

/// Authoring violations detected when a question is constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question '{0}' must be worth at least one point")]
    ZeroPoints(String),

    #[error("question '{0}' needs at least two options")]
    TooFewOptions(String),

    #[error("question '{id}' refers to option {index}, but only {len} options exist")]
    IndexOutOfRange { id: String, index: usize, len: usize },

    #[error("question '{0}' has no correct option")]
    NoCorrectOption(String),

    #[error("question '{0}' has no accepted answers")]
    NoAcceptedAnswers(String),

    #[error("question '{0}' needs at least two pairs to match")]
    TooFewPairs(String),

    #[error("question '{id}' has duplicate left label '{label}'")]
    DuplicateLeftLabel { id: String, label: String },
}

pub type Result<T> = std::result::Result<T, QuizError>;
