//! Answer scoring and percentage normalization.
//!
//! Raw scores are additive sums per bucket. Normalization rescales each group
//! to integer percentages using exact integer arithmetic. Independently
//! rounded percentages are not guaranteed to sum to 100 (e.g. three equal
//! buckets give 33/33/33); `NormalizationMode::LargestRemainder` is the
//! opt-in variant that always sums to exactly 100.

use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::model::{Answer, Category, Dimension, LearningStyle, Question, QuestionType, Trait};

/// Weight added to a trait for any non-slider answer.
pub const TRAIT_CHOICE_WEIGHT: u32 = 7;
/// Weight added to the selected learning style.
pub const LEARNING_STYLE_WEIGHT: u32 = 10;
pub const SLIDER_MIN: u32 = 0;
pub const SLIDER_MAX: u32 = 10;

/// How a ratio is rounded to an integer percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingMode {
    /// x.5 rounds up. Scores are never negative, so this matches the usual
    /// host `round` primitive.
    #[default]
    HalfAwayFromZero,
    /// x.5 rounds to the even neighbour.
    HalfToEven,
}

/// How a score group is rescaled to percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NormalizationMode {
    /// Round every bucket on its own. Totals may drift to 99 or 101.
    #[default]
    Independent,
    /// Floor every bucket, then hand the shortfall to the largest remainders.
    LargestRemainder,
}

impl FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "half-away-from-zero" | "half-up" => Ok(RoundingMode::HalfAwayFromZero),
            "half-to-even" | "half-even" | "bankers" => Ok(RoundingMode::HalfToEven),
            other => Err(format!("unknown rounding mode: {other}")),
        }
    }
}

impl FromStr for NormalizationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "independent" => Ok(NormalizationMode::Independent),
            "largest-remainder" => Ok(NormalizationMode::LargestRemainder),
            other => Err(format!("unknown normalization mode: {other}")),
        }
    }
}

/// Tunable scoring constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_trait_choice_weight")]
    pub trait_choice_weight: u32,
    #[serde(default = "default_learning_style_weight")]
    pub learning_style_weight: u32,
    #[serde(default = "default_slider_min")]
    pub slider_min: u32,
    #[serde(default = "default_slider_max")]
    pub slider_max: u32,
    /// Learning style selected by each option position of a learning-style
    /// question. Positions past the end score nothing.
    #[serde(default = "default_learning_style_order")]
    pub learning_style_order: Vec<LearningStyle>,
    #[serde(default)]
    pub rounding: RoundingMode,
    #[serde(default)]
    pub normalization: NormalizationMode,
}

fn default_trait_choice_weight() -> u32 {
    TRAIT_CHOICE_WEIGHT
}
fn default_learning_style_weight() -> u32 {
    LEARNING_STYLE_WEIGHT
}
fn default_slider_min() -> u32 {
    SLIDER_MIN
}
fn default_slider_max() -> u32 {
    SLIDER_MAX
}
fn default_learning_style_order() -> Vec<LearningStyle> {
    LearningStyle::ALL.to_vec()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            trait_choice_weight: default_trait_choice_weight(),
            learning_style_weight: default_learning_style_weight(),
            slider_min: default_slider_min(),
            slider_max: default_slider_max(),
            learning_style_order: default_learning_style_order(),
            rounding: RoundingMode::default(),
            normalization: NormalizationMode::default(),
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.slider_min <= self.slider_max,
            "slider_min ({}) must not exceed slider_max ({})",
            self.slider_min,
            self.slider_max
        );
        let mut seen = std::collections::HashSet::new();
        for style in &self.learning_style_order {
            anyhow::ensure!(
                seen.insert(style),
                "learning_style_order lists '{style}' more than once"
            );
        }
        Ok(())
    }
}

/// Additive per-bucket sums for one score group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    transparent,
    bound(serialize = "D: Serialize", deserialize = "D: Deserialize<'de> + Ord")
)]
pub struct ScoreGroup<D> {
    values: BTreeMap<D, u32>,
}

impl<D: Dimension> ScoreGroup<D> {
    /// Every bucket present at zero.
    pub fn zeroed() -> Self {
        Self {
            values: D::ALL.iter().map(|&d| (d, 0)).collect(),
        }
    }

    /// Build a group from explicit values; unlisted buckets are zero.
    pub fn from_values(values: impl IntoIterator<Item = (D, u32)>) -> Self {
        let mut group = Self::zeroed();
        for (d, v) in values {
            group.values.insert(d, v);
        }
        group
    }

    pub fn get(&self, dimension: D) -> u32 {
        self.values.get(&dimension).copied().unwrap_or(0)
    }

    fn add(&mut self, dimension: D, amount: u32) {
        let entry = self.values.entry(dimension).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    pub fn total(&self) -> u64 {
        D::ALL.iter().map(|&d| u64::from(self.get(d))).sum()
    }

    /// Buckets in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (D, u32)> + '_ {
        D::ALL.iter().map(move |&d| (d, self.get(d)))
    }

    /// Buckets from highest to lowest; ties keep canonical order.
    pub fn ranked(&self) -> Vec<(D, u32)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// The highest bucket, or `None` when every bucket is zero.
    pub fn top(&self) -> Option<D> {
        self.ranked()
            .into_iter()
            .next()
            .filter(|&(_, v)| v > 0)
            .map(|(d, _)| d)
    }
}

impl<D: Dimension> Default for ScoreGroup<D> {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Why an answer left the accumulator untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum UnscoredReason {
    /// Free text outside the traits category.
    TextAnswer,
    /// A traits question with no trait bucket assigned.
    MissingTraitKey,
    /// A learning-style option whose position has no mapped style.
    NoMappedStyle { index: usize },
    /// The selected option id is not one of the question's options.
    UnknownOption { option_id: String },
    /// The category has no rule for this question type.
    Unsupported {
        category: Category,
        question_type: QuestionType,
    },
}

/// The effect of one answer on the accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Contribution {
    Trait { dimension: Trait, amount: u32 },
    LearningStyle { style: LearningStyle, amount: u32 },
    CareerAffinity { text: String },
    Unscored(UnscoredReason),
}

impl Contribution {
    pub fn is_scored(&self) -> bool {
        !matches!(self, Contribution::Unscored(_))
    }
}

/// Raw score sums built up over an assessment.
///
/// Values only ever grow: the only mutation is [`ScoreAccumulator::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreAccumulator {
    traits: ScoreGroup<Trait>,
    learning_style: ScoreGroup<LearningStyle>,
    career_affinity: Vec<String>,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn traits(&self) -> &ScoreGroup<Trait> {
        &self.traits
    }

    pub fn learning_style(&self) -> &ScoreGroup<LearningStyle> {
        &self.learning_style
    }

    pub fn career_affinity(&self) -> &[String] {
        &self.career_affinity
    }

    /// Apply a contribution. Returns `false` for unscored contributions.
    pub fn apply(&mut self, contribution: &Contribution) -> bool {
        match contribution {
            Contribution::Trait { dimension, amount } => self.traits.add(*dimension, *amount),
            Contribution::LearningStyle { style, amount } => {
                self.learning_style.add(*style, *amount)
            }
            Contribution::CareerAffinity { text } => self.career_affinity.push(text.clone()),
            Contribution::Unscored(_) => return false,
        }
        true
    }
}

/// Percentages produced from a finished accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub traits: ScoreGroup<Trait>,
    pub learning_style: ScoreGroup<LearningStyle>,
    pub career_affinity: Vec<String>,
}

impl NormalizedResult {
    pub fn ranked_traits(&self) -> Vec<(Trait, u32)> {
        self.traits.ranked()
    }

    pub fn dominant_trait(&self) -> Option<Trait> {
        self.traits.top()
    }

    pub fn primary_learning_style(&self) -> Option<LearningStyle> {
        self.learning_style.top()
    }
}

/// Classify an answer to `question` into a contribution.
///
/// Fails only when the answer cannot be read against the question at all.
/// Answers that are understood but carry no score come back as
/// `Contribution::Unscored`.
pub fn score_answer(
    step_id: &str,
    question: &Question,
    answer: &Answer,
    config: &ScoringConfig,
) -> Result<Contribution, ScoringError> {
    if answer.kind() != question.question_type {
        return Err(ScoringError::InvalidAnswerKind {
            step_id: step_id.to_string(),
            expected: question.question_type,
            found: answer.kind(),
        });
    }
    if let Answer::Slider(value) = answer {
        if !(config.slider_min..=config.slider_max).contains(value) {
            return Err(ScoringError::SliderOutOfRange {
                step_id: step_id.to_string(),
                value: i64::from(*value),
                min: config.slider_min,
                max: config.slider_max,
            });
        }
    }

    let contribution = match (question.category, answer) {
        (Category::Traits, answer) => match question.trait_key {
            None => Contribution::Unscored(UnscoredReason::MissingTraitKey),
            Some(dimension) => {
                // Any non-slider answer counts the same, whichever option it picks.
                let amount = match answer {
                    Answer::Slider(value) => *value,
                    _ => config.trait_choice_weight,
                };
                Contribution::Trait { dimension, amount }
            }
        },
        (Category::LearningStyle, Answer::Choice(option_id)) => {
            match question.option_index(option_id) {
                None => Contribution::Unscored(UnscoredReason::UnknownOption {
                    option_id: option_id.clone(),
                }),
                Some(index) => match config.learning_style_order.get(index) {
                    Some(&style) => Contribution::LearningStyle {
                        style,
                        amount: config.learning_style_weight,
                    },
                    None => Contribution::Unscored(UnscoredReason::NoMappedStyle { index }),
                },
            }
        }
        (Category::CareerAffinity, Answer::Choice(option_id)) => match question.option(option_id) {
            Some(option) => Contribution::CareerAffinity {
                text: option.text.clone(),
            },
            None => Contribution::Unscored(UnscoredReason::UnknownOption {
                option_id: option_id.clone(),
            }),
        },
        (_, Answer::Text(_)) => Contribution::Unscored(UnscoredReason::TextAnswer),
        (category, _) => Contribution::Unscored(UnscoredReason::Unsupported {
            category,
            question_type: question.question_type,
        }),
    };

    Ok(contribution)
}

/// Round `numerator / denominator` to the nearest integer. `denominator > 0`.
fn round_ratio(numerator: u64, denominator: u64, mode: RoundingMode) -> u64 {
    let quotient = numerator / denominator;
    let twice_remainder = 2 * (numerator % denominator);
    match twice_remainder.cmp(&denominator) {
        std::cmp::Ordering::Less => quotient,
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal => match mode {
            RoundingMode::HalfAwayFromZero => quotient + 1,
            RoundingMode::HalfToEven => quotient + (quotient % 2),
        },
    }
}

/// Rescale one group to integer percentages. An all-zero group stays zero.
pub fn normalize_group<D: Dimension>(
    group: &ScoreGroup<D>,
    config: &ScoringConfig,
) -> ScoreGroup<D> {
    let total = group.total();
    if total == 0 {
        return ScoreGroup::zeroed();
    }

    let percent = |value: u32| u64::from(value) * 100;

    match config.normalization {
        NormalizationMode::Independent => ScoreGroup::from_values(
            group
                .iter()
                .map(|(d, v)| (d, round_ratio(percent(v), total, config.rounding) as u32)),
        ),
        NormalizationMode::LargestRemainder => {
            let mut floors: Vec<(D, u64, u64)> = group
                .iter()
                .map(|(d, v)| (d, percent(v) / total, percent(v) % total))
                .collect();
            let assigned: u64 = floors.iter().map(|(_, floor, _)| floor).sum();
            let shortfall = 100u64.saturating_sub(assigned) as usize;

            let mut order: Vec<usize> = (0..floors.len()).collect();
            order.sort_by(|&a, &b| floors[b].2.cmp(&floors[a].2));
            for &i in order.iter().take(shortfall) {
                floors[i].1 += 1;
            }

            ScoreGroup::from_values(floors.into_iter().map(|(d, v, _)| (d, v as u32)))
        }
    }
}

/// Normalize both score groups; career affinity passes through unchanged.
pub fn normalize(accumulator: &ScoreAccumulator, config: &ScoringConfig) -> NormalizedResult {
    NormalizedResult {
        traits: normalize_group(accumulator.traits(), config),
        learning_style: normalize_group(accumulator.learning_style(), config),
        career_affinity: accumulator.career_affinity().to_vec(),
    }
}
