use crate::presentation::PresentedQuestion;
use crate::question::{Answer, QuestionKind};
use std::collections::{BTreeSet, HashMap};

/// Answer being put together on screen for the current question.
///
/// Works in display slots while editing; `to_answer` translates slots back to
/// original option indices and label values.
#[derive(Debug, Clone)]
pub struct AnswerDraft {
    kind: QuestionKind,
    rows: usize,
    cursor: usize,
    choice: Option<usize>,
    checked: BTreeSet<usize>,
    text: String,
    /// per left label, the display slot of the right label placed there
    placements: Vec<Option<usize>>,
    labels: usize,
}

impl AnswerDraft {
    pub fn new(presented: &PresentedQuestion) -> Self {
        let kind = presented.question().kind();
        let rows = match kind {
            QuestionKind::SingleChoice | QuestionKind::MultipleChoice => {
                presented.option_order().len()
            }
            QuestionKind::Matching => presented.left_labels().len(),
            QuestionKind::FreeText => 0,
        };
        Self {
            kind,
            rows,
            cursor: 0,
            choice: None,
            checked: BTreeSet::new(),
            text: String::new(),
            placements: vec![None; if kind == QuestionKind::Matching { rows } else { 0 }],
            labels: presented.right_labels().len(),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_chosen(&self, slot: usize) -> bool {
        match self.kind {
            QuestionKind::SingleChoice => self.choice == Some(slot),
            QuestionKind::MultipleChoice => self.checked.contains(&slot),
            _ => false,
        }
    }

    /// Display slot of the right label placed on a matching row.
    pub fn placement(&self, row: usize) -> Option<usize> {
        self.placements.get(row).copied().flatten()
    }

    pub fn up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn down(&mut self) {
        if self.cursor + 1 < self.rows {
            self.cursor += 1;
        }
    }

    /// Space: pick, toggle or cycle at the cursor depending on the variant.
    pub fn select(&mut self) {
        match self.kind {
            QuestionKind::SingleChoice if self.rows > 0 => self.choice = Some(self.cursor),
            QuestionKind::MultipleChoice if self.rows > 0 => {
                if !self.checked.remove(&self.cursor) {
                    self.checked.insert(self.cursor);
                }
            }
            QuestionKind::Matching => self.cycle(true),
            QuestionKind::FreeText => self.push(' '),
            _ => {}
        }
    }

    /// Moves the placement on the current matching row through
    /// "nothing placed" and every label, in either direction.
    pub fn cycle(&mut self, forward: bool) {
        if self.kind != QuestionKind::Matching || self.labels == 0 {
            return;
        }
        let Some(slot) = self.placements.get_mut(self.cursor) else {
            return;
        };
        *slot = match (*slot, forward) {
            (None, true) => Some(0),
            (None, false) => Some(self.labels - 1),
            (Some(i), true) if i + 1 < self.labels => Some(i + 1),
            (Some(i), false) if i > 0 => Some(i - 1),
            (Some(_), _) => None,
        };
    }

    pub fn push(&mut self, c: char) {
        if self.kind == QuestionKind::FreeText {
            self.text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        match self.kind {
            QuestionKind::FreeText => {
                self.text.pop();
            }
            QuestionKind::Matching => {
                if let Some(slot) = self.placements.get_mut(self.cursor) {
                    *slot = None;
                }
            }
            _ => {}
        }
    }

    pub fn to_answer(&self, presented: &PresentedQuestion) -> Answer {
        match self.kind {
            QuestionKind::SingleChoice => match self.choice {
                Some(slot) => Answer::Single(presented.option_order()[slot]),
                None => Answer::Blank,
            },
            QuestionKind::MultipleChoice => Answer::Multiple(
                self.checked
                    .iter()
                    .map(|&slot| presented.option_order()[slot])
                    .collect(),
            ),
            QuestionKind::FreeText => Answer::Text(self.text.clone()),
            QuestionKind::Matching => {
                let rights = presented.right_labels();
                let placed: HashMap<String, String> = presented
                    .left_labels()
                    .into_iter()
                    .zip(&self.placements)
                    .filter_map(|(left, slot)| {
                        slot.map(|i| (left.to_string(), rights[i].clone()))
                    })
                    .collect();
                Answer::Matching(placed)
            }
        }
    }
}
