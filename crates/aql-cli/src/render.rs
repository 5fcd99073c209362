//! Terminal rendering of assessment profiles.

use comfy_table::{Cell, Table};

use aql_core::report::AssessmentReport;

/// Print the profile tables for a report to stdout.
pub fn print_profile(report: &AssessmentReport) {
    let result = &report.result;
    let raw = &report.raw;

    println!(
        "{} ({} of {} questions answered)",
        report.bank.name,
        report.answers.len(),
        report.bank.question_count
    );

    let mut traits = Table::new();
    traits.set_header(vec!["Trait", "Raw", "Percent"]);
    for (t, percent) in result.ranked_traits() {
        traits.add_row(vec![
            Cell::new(t),
            Cell::new(raw.traits().get(t)),
            Cell::new(format!("{percent}%")),
        ]);
    }
    println!("\n{traits}");

    let mut styles = Table::new();
    styles.set_header(vec!["Learning style", "Raw", "Percent"]);
    for (style, percent) in result.learning_style.ranked() {
        styles.add_row(vec![
            Cell::new(style),
            Cell::new(raw.learning_style().get(style)),
            Cell::new(format!("{percent}%")),
        ]);
    }
    println!("\n{styles}");

    match result.dominant_trait() {
        Some(t) => println!("\nDominant trait: {t}"),
        None => println!("\nDominant trait: none"),
    }
    if let Some(style) = result.primary_learning_style() {
        println!("Primary learning style: {style}");
    }
    if !result.career_affinity.is_empty() {
        println!("Career interests: {}", result.career_affinity.join(", "));
    }
}
