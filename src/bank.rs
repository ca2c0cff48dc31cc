use crate::error::{QuizError, Result};
use crate::question::{Question, RawQuestion};
use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

static BANK_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/bank");

/// Difficulty tier. The lowercase tag is the only external protocol.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }

    fn file_name(self) -> String {
        format!("{self}.json")
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(QuizError::UnknownDifficulty(other.to_string())),
        }
    }
}

/// Leveled pools of authored questions, fixed once built.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pools: HashMap<Difficulty, Vec<Arc<Question>>>,
}

impl QuestionBank {
    /// The bank compiled into the binary.
    pub fn builtin() -> Result<Self> {
        let mut pools = HashMap::new();
        for difficulty in Difficulty::ALL {
            let name = difficulty.file_name();
            let file = BANK_DIR
                .get_file(&name)
                .ok_or_else(|| QuizError::Bank(format!("{name} is not bundled")))?;
            let text = file
                .contents_utf8()
                .ok_or_else(|| QuizError::Bank(format!("{name} is not valid UTF-8")))?;
            pools.insert(difficulty, parse_pool(&name, text)?);
        }
        Self::from_pools(pools)
    }

    /// Loads `easy.json`, `medium.json` and `hard.json` from a directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut pools = HashMap::new();
        for difficulty in Difficulty::ALL {
            let path = dir.as_ref().join(difficulty.file_name());
            let text = fs::read_to_string(&path)
                .map_err(|e| QuizError::Bank(format!("{}: {e}", path.display())))?;
            pools.insert(difficulty, parse_pool(&path.display().to_string(), &text)?);
        }
        Self::from_pools(pools)
    }

    /// Builds a bank from already constructed questions. Missing tiers are empty.
    pub fn from_pools(pools: HashMap<Difficulty, Vec<Question>>) -> Result<Self> {
        let mut shared = HashMap::new();
        for difficulty in Difficulty::ALL {
            let pool = pools.get(&difficulty).cloned().unwrap_or_default();
            let mut ids = HashSet::new();
            for question in &pool {
                if !ids.insert(question.id().to_string()) {
                    return Err(QuizError::Bank(format!(
                        "duplicate question id '{}' in {difficulty} pool",
                        question.id()
                    )));
                }
            }
            shared.insert(difficulty, pool.into_iter().map(Arc::new).collect());
        }
        Ok(Self { pools: shared })
    }

    /// Pool for a difficulty tag as received from outside.
    pub fn get_pool(&self, tag: &str) -> Result<&[Arc<Question>]> {
        Ok(self.pool(tag.parse()?))
    }

    pub fn pool(&self, difficulty: Difficulty) -> &[Arc<Question>] {
        self.pools
            .get(&difficulty)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn parse_pool(file: &str, text: &str) -> Result<Vec<Question>> {
    let raw: Vec<RawQuestion> =
        serde_json::from_str(text).map_err(|e| QuizError::Bank(format!("{file}: {e}")))?;
    raw.into_iter()
        .map(|question| {
            Question::try_from(question).map_err(|error| QuizError::InvalidQuestion {
                file: file.to_string(),
                error,
            })
        })
        .collect()
}
