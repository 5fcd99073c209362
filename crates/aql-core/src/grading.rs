//! Module knowledge-check grading.
//!
//! A module quiz has exactly one correct option per question. The grade is
//! the rounded share of correct selections, banded into a performance tier.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A selectable option of a module quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedOption {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleQuestion {
    pub id: String,
    pub prompt: String,
    pub options: Vec<GradedOption>,
    /// Shown after the question is answered.
    #[serde(default)]
    pub explanation: Option<String>,
}

impl ModuleQuestion {
    pub fn is_correct(&self, option_id: &str) -> bool {
        self.options.iter().any(|o| o.id == option_id && o.correct)
    }
}

/// A knowledge check attached to a learning module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleQuiz {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<ModuleQuestion>,
}

/// Percentage thresholds for the performance tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingConfig {
    #[serde(default = "default_mastery_threshold")]
    pub mastery_threshold: u32,
    #[serde(default = "default_proficiency_threshold")]
    pub proficiency_threshold: u32,
}

fn default_mastery_threshold() -> u32 {
    80
}
fn default_proficiency_threshold() -> u32 {
    60
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            mastery_threshold: default_mastery_threshold(),
            proficiency_threshold: default_proficiency_threshold(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceTier {
    Mastered,
    Proficient,
    NeedsReview,
}

impl PerformanceTier {
    pub fn from_percentage(percentage: u32, config: &GradingConfig) -> Self {
        if percentage >= config.mastery_threshold {
            PerformanceTier::Mastered
        } else if percentage >= config.proficiency_threshold {
            PerformanceTier::Proficient
        } else {
            PerformanceTier::NeedsReview
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PerformanceTier::Mastered => "Excellent! You've mastered this module.",
            PerformanceTier::Proficient => "Good job! You understand most of the concepts.",
            PerformanceTier::NeedsReview => "You might need to review this module again.",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PerformanceTier::Mastered => write!(f, "mastered"),
            PerformanceTier::Proficient => write!(f, "proficient"),
            PerformanceTier::NeedsReview => write!(f, "needs-review"),
        }
    }
}

/// The outcome of grading one quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizGrade {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
    pub tier: PerformanceTier,
    /// Question ids answered wrongly or not at all, in quiz order.
    pub missed: Vec<String>,
}

/// Grade selections (question id → option id) against a quiz.
///
/// Unanswered questions count as wrong. An empty quiz grades as 0%.
pub fn grade(
    quiz: &ModuleQuiz,
    selections: &HashMap<String, String>,
    config: &GradingConfig,
) -> QuizGrade {
    let mut correct = 0u32;
    let mut missed = Vec::new();

    for question in &quiz.questions {
        let answered_correctly = selections
            .get(&question.id)
            .is_some_and(|option_id| question.is_correct(option_id));
        if answered_correctly {
            correct += 1;
        } else {
            missed.push(question.id.clone());
        }
    }

    let total = quiz.questions.len() as u32;
    let percentage = if total == 0 {
        0
    } else {
        // Round half up in integers: (2 * 100c + t) / 2t
        (200 * correct + total) / (2 * total)
    };

    QuizGrade {
        correct,
        total,
        percentage,
        tier: PerformanceTier::from_percentage(percentage, config),
        missed,
    }
}
