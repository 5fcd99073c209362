//! Assessment report types with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Answer, StepBank};
use crate::scoring::{NormalizedResult, ScoreAccumulator};
use crate::session::AssessmentSession;

/// A completed assessment, ready to hand to whoever stores or renders it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    /// Session identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the step bank.
    pub bank: BankSummary,
    /// Latest answer per step id.
    pub answers: BTreeMap<String, Answer>,
    /// Raw sums before normalization.
    pub raw: ScoreAccumulator,
    /// Normalized percentages.
    pub result: NormalizedResult,
}

/// Summary of a step bank (without the step definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

impl From<&StepBank> for BankSummary {
    fn from(bank: &StepBank) -> Self {
        Self {
            id: bank.id.clone(),
            name: bank.name.clone(),
            question_count: bank.question_count(),
        }
    }
}

impl AssessmentReport {
    /// Build a report from a completed session.
    pub fn from_session(session: &AssessmentSession) -> Result<Self> {
        let result = session
            .result()
            .context("assessment is not complete yet")?
            .clone();

        Ok(Self {
            id: session.id(),
            created_at: Utc::now(),
            bank: BankSummary::from(session.scorer().bank()),
            answers: session.answers().clone(),
            raw: session.accumulator().clone(),
            result,
        })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AssessmentReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the profile as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let result = &self.result;

        md.push_str(&format!("## {}\n\n", self.bank.name));
        md.push_str(&format!(
            "**Answered:** {} of {} questions\n\n",
            self.answers.len(),
            self.bank.question_count
        ));

        if let Some(dominant) = result.dominant_trait() {
            md.push_str(&format!("**Dominant trait:** {dominant}\n\n"));
        }

        md.push_str("### Traits\n\n");
        md.push_str("| Trait | Raw | Percent |\n");
        md.push_str("|-------|-----|---------|\n");
        for (t, percent) in result.ranked_traits() {
            md.push_str(&format!(
                "| {} | {} | {}% |\n",
                t,
                self.raw.traits().get(t),
                percent
            ));
        }

        md.push_str("\n### Learning style\n\n");
        md.push_str("| Style | Raw | Percent |\n");
        md.push_str("|-------|-----|---------|\n");
        for (style, percent) in result.learning_style.ranked() {
            md.push_str(&format!(
                "| {} | {} | {}% |\n",
                style,
                self.raw.learning_style().get(style),
                percent
            ));
        }

        if !result.career_affinity.is_empty() {
            md.push_str("\n### Career interests\n\n");
            for career in &result.career_affinity {
                md.push_str(&format!("- {career}\n"));
            }
        }

        md
    }
}
