//! The `aql take` command.

use std::io;
use std::path::PathBuf;

use anyhow::Result;

use aql_core::bank;
use aql_core::config::load_config_from;
use aql_core::error::SessionError;
use aql_core::model::StepBank;
use aql_core::parser::{parse_bank, validate_bank};
use aql_core::report::AssessmentReport;
use aql_core::scorer::AssessmentScorer;
use aql_core::scoring::{Contribution, NormalizedResult};
use aql_core::session::{
    run_assessment, AssessmentObserver, AssessmentSession, NoopObserver, StepView,
};
use aql_core::sheet::AnswerSheet;

use crate::console::ConsoleInteractions;
use crate::render::print_profile;

/// Reports answer-sheet runs on stderr.
struct SheetReporter;

impl AssessmentObserver for SheetReporter {
    fn on_step(&self, _: &StepView<'_>) {}

    fn on_answer(&self, step_id: &str, contribution: &Contribution) {
        let effect = match contribution {
            Contribution::Trait { dimension, amount } => format!("+{amount} {dimension}"),
            Contribution::LearningStyle { style, amount } => format!("+{amount} {style}"),
            Contribution::CareerAffinity { text } => format!("career: {text}"),
            Contribution::Unscored(reason) => format!("not scored ({reason:?})"),
        };
        eprintln!("  {step_id}: {effect}");
    }

    fn on_rejected(&self, step_id: &str, error: &SessionError) {
        eprintln!("  REJECTED: {step_id}: {error}");
    }

    fn on_complete(&self, result: &NormalizedResult) {
        eprintln!(
            "\nComplete: {} career interest(s), dominant trait {}",
            result.career_affinity.len(),
            result
                .dominant_trait()
                .map_or_else(|| "none".to_string(), |t| t.to_string())
        );
    }
}

pub fn execute(
    bank_path: Option<PathBuf>,
    answers_path: Option<PathBuf>,
    format: String,
    output: Option<PathBuf>,
    save: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "table" | "json"),
        "unknown format '{format}', expected table or json"
    );

    let config = load_config_from(config_path.as_deref())?;

    let bank: StepBank = match bank_path.or_else(|| config.default_bank.clone()) {
        Some(path) => parse_bank(&path)?,
        None => bank::builtin()?,
    };
    for w in validate_bank(&bank, &config.scoring) {
        match &w.step_id {
            Some(id) => tracing::warn!(step = %id, "{}", w.message),
            None => tracing::warn!("{}", w.message),
        }
    }

    let scorer = AssessmentScorer::new(bank, config.scoring.clone());
    let mut session = AssessmentSession::new(scorer);

    match &answers_path {
        Some(path) => {
            let sheet = AnswerSheet::parse(path)?;
            for id in sheet.unknown_steps(session.scorer().bank()) {
                tracing::warn!(step = %id, "answer sheet entry matches no step");
            }
            eprintln!(
                "aql v{}: {} ({} answers)",
                env!("CARGO_PKG_VERSION"),
                session.scorer().bank().name,
                sheet.len()
            );
            run_assessment(&mut session, &mut sheet.interactions(), &SheetReporter)?;
        }
        None => {
            let stdin = io::stdin();
            let mut console =
                ConsoleInteractions::new(stdin.lock(), io::stderr(), &config.scoring);
            run_assessment(&mut session, &mut console, &NoopObserver)?;
        }
    }

    let report = AssessmentReport::from_session(&session)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_profile(&report);
    }

    if let Some(dir) = output.or_else(|| save.then(|| config.output_dir.clone())) {
        let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
        let path = dir.join(format!("assessment-{timestamp}.json"));
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}
