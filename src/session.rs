use crate::bank::{Difficulty, QuestionBank};
use crate::error::{QuizError, Result};
use crate::question::{Answer, Question};
use crate::result::ResultSummary;
use crate::sampler::draw_without_replacement;
use chrono::Local;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of questions drawn for one session.
pub const QUIZ_LENGTH: usize = 10;

/// Identity supplied by the login form. Non-emptiness is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub group: String,
}

impl User {
    pub fn new(name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    NotStarted,
    InProgress,
    Finished,
}

/// One learner's pass through a drawn set of questions.
///
/// Moves `NotStarted -> InProgress -> Finished` and never back. Answering a
/// question and advancing to the next one is a single step, so nothing can be
/// skipped, revisited or scored twice. Once finished the session is frozen.
///
/// There is no internal locking: drivers on several threads must serialize
/// calls, e.g. by holding the session in a `Mutex`.
#[derive(Debug, Default)]
pub struct QuizSession {
    user: Option<User>,
    difficulty: Option<Difficulty>,
    drawn: Vec<Arc<Question>>,
    current_index: usize,
    score: u64,
    state: SessionState,
    result: Option<ResultSummary>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws the questions for `difficulty` and begins the session.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        bank: &QuestionBank,
        user: User,
        difficulty: &str,
        rng: &mut R,
    ) -> Result<()> {
        if self.state != SessionState::NotStarted {
            return Err(QuizError::SessionAlreadyStarted);
        }
        let level: Difficulty = difficulty.parse()?;
        let pool = bank.get_pool(difficulty)?;

        self.drawn = draw_without_replacement(pool, QUIZ_LENGTH, rng);
        self.score = 0;
        self.current_index = 0;
        self.difficulty = Some(level);
        self.user = Some(user);
        self.state = SessionState::InProgress;

        info!(
            difficulty = %level,
            pool = pool.len(),
            drawn = self.drawn.len(),
            "quiz started"
        );
        debug!(
            ids = ?self.drawn.iter().map(|q| q.id()).collect::<Vec<_>>(),
            "drawn questions"
        );

        if self.drawn.is_empty() {
            self.finish();
        }
        Ok(())
    }

    pub fn current_question(&self) -> Result<&Arc<Question>> {
        if self.state != SessionState::InProgress {
            return Err(QuizError::SessionNotActive);
        }
        self.drawn
            .get(self.current_index)
            .ok_or(QuizError::SessionNotActive)
    }

    /// Scores `answer` against the current question and advances.
    ///
    /// Returns the points awarded for this question.
    pub fn submit_answer(&mut self, answer: &Answer) -> Result<u32> {
        let question = self.current_question()?;
        let awarded = question.evaluate(answer);
        debug!(
            id = question.id(),
            position = self.current_index + 1,
            blank = answer.is_blank(),
            awarded,
            "answer scored"
        );

        self.score += u64::from(awarded);
        self.current_index += 1;
        if self.current_index == self.drawn.len() {
            self.finish();
        }
        Ok(awarded)
    }

    pub fn result(&self) -> Result<&ResultSummary> {
        self.result.as_ref().ok_or(QuizError::SessionNotFinished)
    }

    fn finish(&mut self) {
        let max_score = self.max_score();
        let user = self.user.clone().unwrap_or_else(|| User::new("", ""));
        let summary = ResultSummary::new(
            &user,
            self.difficulty.unwrap_or_default(),
            self.score,
            max_score,
            Local::now(),
        );
        info!(score = self.score, max_score, "quiz finished");
        self.result = Some(summary);
        self.state = SessionState::Finished;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Sum of points over the drawn questions.
    pub fn max_score(&self) -> u64 {
        self.drawn.iter().map(|q| u64::from(q.points())).sum()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.drawn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty()
    }

    /// One-based position of the current question and the total.
    pub fn progress(&self) -> (usize, usize) {
        ((self.current_index + 1).min(self.drawn.len()), self.drawn.len())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    pub fn drawn_questions(&self) -> &[Arc<Question>] {
        &self.drawn
    }
}
