// Library surface for headless/integration tests and reuse.
// The quiz engine (question, bank, sampler, session, result) does no terminal I/O;
// app, runtime and ui are the terminal front-end driving it.
pub mod app;
pub mod app_dirs;
pub mod bank;
pub mod config;
pub mod error;
pub mod input;
pub mod presentation;
pub mod question;
pub mod result;
pub mod runtime;
pub mod sampler;
pub mod session;
pub mod ui;

pub use bank::{Difficulty, QuestionBank};
pub use error::{QuestionError, QuizError};
pub use question::{Answer, AnswerSpec, MatchPair, Question};
pub use result::{ResultStore, ResultSummary};
pub use session::{QuizSession, SessionState, User};
