use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use aql_core::bank;
use aql_core::model::{Answer, Trait};
use aql_core::scorer::AssessmentScorer;
use aql_core::scoring::{
    normalize_group, score_answer, NormalizationMode, ScoreGroup, ScoringConfig,
};
use aql_core::session::{run_assessment, AssessmentSession, NoopObserver};
use aql_core::sheet::AnswerSheet;

const SHEET: &str = r#"
q1 = "q1a"
q2 = 3
q3 = 8
q4 = 6
q5 = "q5a"
q6 = "q6b"
q7 = 5
q8 = 1
q9 = "q9d"
q10 = 2
"#;

fn bench_score_answer(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_answer");
    let bank = bank::builtin().expect("builtin bank parses");
    let config = ScoringConfig::default();

    let slider = bank.step("q3").and_then(|s| s.question()).expect("q3");
    group.bench_function("slider", |b| {
        let answer = Answer::Slider(8);
        b.iter(|| score_answer("q3", black_box(slider), black_box(&answer), &config))
    });

    let style = bank.step("q2").and_then(|s| s.question()).expect("q2");
    group.bench_function("learning_style", |b| {
        let answer = Answer::Choice("q2c".into());
        b.iter(|| score_answer("q2", black_box(style), black_box(&answer), &config))
    });

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    let raw = ScoreGroup::from_values([
        (Trait::Analytical, 15),
        (Trait::Creative, 6),
        (Trait::Practical, 5),
        (Trait::Social, 1),
    ]);

    let independent = ScoringConfig::default();
    group.bench_function("independent", |b| {
        b.iter(|| normalize_group(black_box(&raw), &independent))
    });

    let largest = ScoringConfig {
        normalization: NormalizationMode::LargestRemainder,
        ..ScoringConfig::default()
    };
    group.bench_function("largest_remainder", |b| {
        b.iter(|| normalize_group(black_box(&raw), &largest))
    });

    group.finish();
}

fn bench_full_assessment(c: &mut Criterion) {
    let bank = bank::builtin().expect("builtin bank parses");
    let sheet = AnswerSheet::parse_str(SHEET, Path::new("bench.toml")).expect("sheet parses");

    c.bench_function("full_assessment", |b| {
        b.iter(|| {
            let scorer = AssessmentScorer::new(bank.clone(), ScoringConfig::default());
            let mut session = AssessmentSession::new(scorer);
            run_assessment(&mut session, &mut sheet.interactions(), &NoopObserver)
        })
    });
}

criterion_group!(
    benches,
    bench_score_answer,
    bench_normalize,
    bench_full_assessment
);
criterion_main!(benches);
