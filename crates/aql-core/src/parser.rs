//! TOML step bank and module quiz parser.
//!
//! Loads step banks from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::grading::{ModuleQuestion, ModuleQuiz};
use crate::model::{
    Category, Question, QuestionOption, QuestionType, QuizStep, StepBank, StepKind, Trait,
};
use crate::scoring::ScoringConfig;

/// Intermediate TOML structure for parsing step bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    steps: Vec<TomlStep>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlStep {
    id: String,
    kind: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    question_type: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, rename = "trait")]
    trait_key: Option<String>,
    #[serde(default)]
    options: Vec<TomlOption>,
}

#[derive(Debug, Deserialize)]
struct TomlOption {
    id: String,
    text: String,
}

/// Parse a single TOML file into a `StepBank`.
pub fn parse_bank(path: &Path) -> Result<StepBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read step bank file: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `StepBank`.
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<StepBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let steps = parsed
        .steps
        .into_iter()
        .map(convert_step)
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid step in {}", source_path.display()))?;

    Ok(StepBank {
        id: parsed.bank.id,
        name: parsed.bank.name,
        description: parsed.bank.description,
        steps,
    })
}

fn convert_step(step: TomlStep) -> Result<QuizStep> {
    let kind = match step.kind.to_lowercase().as_str() {
        "intro" => StepKind::Intro {
            title: step.title,
            body: step.body,
        },
        "results" => StepKind::Results { title: step.title },
        "question" => {
            let prompt = step
                .prompt
                .ok_or_else(|| anyhow::anyhow!("step '{}': question has no prompt", step.id))?;
            let question_type = match step.question_type {
                Some(t) => t
                    .parse::<QuestionType>()
                    .map_err(|e| anyhow::anyhow!("step '{}': {}", step.id, e))?,
                None => QuestionType::MultipleChoice,
            };
            let category = step
                .category
                .ok_or_else(|| anyhow::anyhow!("step '{}': question has no category", step.id))?
                .parse::<Category>()
                .map_err(|e| anyhow::anyhow!("step '{}': {}", step.id, e))?;
            let trait_key = step
                .trait_key
                .map(|t| {
                    t.parse::<Trait>()
                        .map_err(|e| anyhow::anyhow!("step '{}': {}", step.id, e))
                })
                .transpose()?;
            let options = step
                .options
                .into_iter()
                .map(|o| QuestionOption {
                    id: o.id,
                    text: o.text,
                })
                .collect();

            StepKind::Question(Question {
                prompt,
                question_type,
                category,
                trait_key,
                options,
            })
        }
        other => anyhow::bail!("step '{}': unknown step kind '{}'", step.id, other),
    };

    Ok(QuizStep { id: step.id, kind })
}

/// Recursively load all `.toml` step bank files from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<StepBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// A warning from step bank or quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The step or question ID (if applicable).
    pub step_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn step(id: &str, message: impl Into<String>) -> Self {
        Self {
            step_id: Some(id.to_string()),
            message: message.into(),
        }
    }

    fn bank(message: impl Into<String>) -> Self {
        Self {
            step_id: None,
            message: message.into(),
        }
    }
}

/// Validate a step bank for steps that will never score or cannot be navigated.
pub fn validate_bank(bank: &StepBank, config: &ScoringConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for step in &bank.steps {
        if !seen_ids.insert(&step.id) {
            warnings.push(ValidationWarning::step(
                &step.id,
                format!("duplicate step ID: {}", step.id),
            ));
        }
    }

    if bank.question_count() == 0 {
        warnings.push(ValidationWarning::bank("bank has no question steps"));
    }

    match bank.steps.iter().position(|s| s.is_results()) {
        None => warnings.push(ValidationWarning::bank(
            "no results step; the assessment completes after the last step",
        )),
        Some(index) => {
            for step in &bank.steps[index + 1..] {
                warnings.push(ValidationWarning::step(
                    &step.id,
                    "step follows the results step and is never reached",
                ));
            }
        }
    }

    for step in &bank.steps {
        let Some(question) = step.question() else {
            continue;
        };
        let id = step.id.as_str();

        let mut option_ids = HashSet::new();
        for option in &question.options {
            if !option_ids.insert(&option.id) {
                warnings.push(ValidationWarning::step(
                    id,
                    format!("duplicate option ID: {}", option.id),
                ));
            }
        }

        match question.question_type {
            QuestionType::MultipleChoice if question.options.is_empty() => {
                warnings.push(ValidationWarning::step(
                    id,
                    "multiple-choice question has no options",
                ));
            }
            QuestionType::Slider | QuestionType::Text if !question.options.is_empty() => {
                warnings.push(ValidationWarning::step(
                    id,
                    format!("options are ignored for {} questions", question.question_type),
                ));
            }
            _ => {}
        }

        match question.category {
            Category::Traits if question.trait_key.is_none() => {
                warnings.push(ValidationWarning::step(
                    id,
                    "traits question has no trait key; answers will not score",
                ));
            }
            Category::LearningStyle | Category::CareerAffinity
                if question.question_type != QuestionType::MultipleChoice =>
            {
                warnings.push(ValidationWarning::step(
                    id,
                    format!(
                        "{} questions only score multiple-choice answers",
                        question.category
                    ),
                ));
            }
            Category::LearningStyle if question.options.len() > config.learning_style_order.len() => {
                warnings.push(ValidationWarning::step(
                    id,
                    format!(
                        "only the first {} options map to a learning style; the rest will not score",
                        config.learning_style_order.len()
                    ),
                ));
            }
            _ => {}
        }
    }

    warnings
}

/// Intermediate TOML structure for module quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<ModuleQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
}

/// Parse a module quiz TOML file.
pub fn parse_quiz(path: &Path) -> Result<ModuleQuiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<ModuleQuiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    Ok(ModuleQuiz {
        id: parsed.quiz.id,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        questions: parsed.questions,
    })
}

/// Validate a module quiz for questions that cannot be graded sensibly.
pub fn validate_quiz(quiz: &ModuleQuiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning::bank("quiz has no questions"));
    }

    let mut seen_ids = HashSet::new();
    for question in &quiz.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning::step(
                &question.id,
                format!("duplicate question ID: {}", question.id),
            ));
        }

        match question.options.iter().filter(|o| o.correct).count() {
            0 => warnings.push(ValidationWarning::step(
                &question.id,
                "no correct option; this question can never be answered correctly",
            )),
            1 => {}
            n => warnings.push(ValidationWarning::step(
                &question.id,
                format!("{n} options are marked correct"),
            )),
        }
    }

    warnings
}
