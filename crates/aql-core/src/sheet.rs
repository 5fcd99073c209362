//! Answer sheets: pre-filled answers for non-interactive runs.
//!
//! A sheet is a flat TOML table of step id → value. Values are read against
//! the question they answer:
//!
//! ```toml
//! q1 = "q1a"   # multiple-choice: option id
//! q2 = 3       # multiple-choice: 1-based option position
//! q3 = 8       # slider
//! q4 = "free text"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Answer, QuestionType, QuizStep, StepBank};
use crate::session::{Interaction, InteractionSource, StepView};

/// A raw sheet value before it is matched to a question type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetValue {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    entries: BTreeMap<String, SheetValue>,
}

impl AnswerSheet {
    pub fn parse(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read answer sheet: {}", path.display()))?;
        Self::parse_str(&content, path)
    }

    pub fn parse_str(content: &str, source_path: &Path) -> Result<Self> {
        toml::from_str(content)
            .with_context(|| format!("failed to parse answer sheet: {}", source_path.display()))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, SheetValue)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, step_id: &str) -> Option<&SheetValue> {
        self.entries.get(step_id)
    }

    /// Sheet keys that name no step in `bank`.
    pub fn unknown_steps<'a>(&'a self, bank: &StepBank) -> Vec<&'a str> {
        self.entries
            .keys()
            .filter(|id| bank.step(id).is_none())
            .map(String::as_str)
            .collect()
    }

    /// The typed answer for `step`, or `None` if the sheet has no entry.
    pub fn answer_for(&self, step: &QuizStep) -> Result<Option<Answer>> {
        let Some(question) = step.question() else {
            return Ok(None);
        };
        let Some(value) = self.entries.get(&step.id) else {
            return Ok(None);
        };

        let answer = match (question.question_type, value) {
            (QuestionType::MultipleChoice, SheetValue::Text(id)) => Answer::Choice(id.clone()),
            (QuestionType::MultipleChoice, SheetValue::Number(position)) => {
                let option = usize::try_from(*position)
                    .ok()
                    .and_then(|p| p.checked_sub(1))
                    .and_then(|i| question.options.get(i))
                    .ok_or_else(|| {
                        anyhow::anyhow!(
                            "step '{}': option position {} is outside 1..={}",
                            step.id,
                            position,
                            question.options.len()
                        )
                    })?;
                Answer::Choice(option.id.clone())
            }
            (QuestionType::Slider, SheetValue::Number(n)) => {
                let value = u32::try_from(*n).map_err(|_| {
                    anyhow::anyhow!("step '{}': slider value {} is negative", step.id, n)
                })?;
                Answer::Slider(value)
            }
            (QuestionType::Slider, SheetValue::Text(text)) => {
                let value = text.trim().parse::<u32>().map_err(|_| {
                    anyhow::anyhow!("step '{}': slider expects a number, got {:?}", step.id, text)
                })?;
                Answer::Slider(value)
            }
            (QuestionType::Text, SheetValue::Text(text)) => Answer::Text(text.clone()),
            (QuestionType::Text, SheetValue::Number(n)) => Answer::Text(n.to_string()),
        };

        Ok(Some(answer))
    }

    /// An interaction source that answers every question from this sheet
    /// and walks forward.
    pub fn interactions(&self) -> SheetInteractions<'_> {
        SheetInteractions {
            sheet: self,
            answered: None,
        }
    }
}

/// Walks a session forward, answering each question once from a sheet.
pub struct SheetInteractions<'a> {
    sheet: &'a AnswerSheet,
    answered: Option<String>,
}

impl InteractionSource for SheetInteractions<'_> {
    fn next_interaction(&mut self, view: &StepView<'_>) -> Result<Interaction> {
        let step = view.step;
        if !step.is_question() || self.answered.as_deref() == Some(step.id.as_str()) {
            return Ok(Interaction::Advance);
        }

        let answer = self
            .sheet
            .answer_for(step)?
            .ok_or_else(|| anyhow::anyhow!("answer sheet has no answer for step '{}'", step.id))?;
        self.answered = Some(step.id.clone());
        Ok(Interaction::Answer(answer))
    }
}
