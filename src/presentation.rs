use crate::question::{AnswerSpec, Question};
use crate::sampler::shuffle_presentation_order;
use rand::Rng;
use std::sync::Arc;

/// A question together with the display order chosen for it.
///
/// Display slots map back to original option indices and right-hand label
/// values, so answers are always built from values and never from positions.
#[derive(Debug, Clone)]
pub struct PresentedQuestion {
    question: Arc<Question>,
    option_order: Vec<usize>,
    right_labels: Vec<String>,
}

impl PresentedQuestion {
    pub fn new<R: Rng + ?Sized>(question: Arc<Question>, rng: &mut R) -> Self {
        let (option_order, right_labels) = match question.spec() {
            AnswerSpec::SingleChoice { options, .. }
            | AnswerSpec::MultipleChoice { options, .. } => {
                let indices: Vec<usize> = (0..options.len()).collect();
                (shuffle_presentation_order(&indices, rng), Vec::new())
            }
            AnswerSpec::Matching { pairs } => {
                let rights: Vec<String> = pairs.iter().map(|p| p.right.clone()).collect();
                (Vec::new(), shuffle_presentation_order(&rights, rng))
            }
            AnswerSpec::FreeText { .. } => (Vec::new(), Vec::new()),
        };
        Self {
            question,
            option_order,
            right_labels,
        }
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    /// Original option index shown in each display slot.
    pub fn option_order(&self) -> &[usize] {
        &self.option_order
    }

    /// `(original index, text)` in display order.
    pub fn displayed_options(&self) -> impl Iterator<Item = (usize, &str)> {
        let options = self.question.options();
        self.option_order
            .iter()
            .map(move |&index| (index, options[index].as_str()))
    }

    /// Right-hand labels of a matching task in display order. Duplicates are kept.
    pub fn right_labels(&self) -> &[String] {
        &self.right_labels
    }

    /// Left-hand labels of a matching task in authored order.
    pub fn left_labels(&self) -> Vec<&str> {
        match self.question.spec() {
            AnswerSpec::Matching { pairs } => pairs.iter().map(|p| p.left.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}
