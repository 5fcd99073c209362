//! Core data model types for aql.
//!
//! Step banks are ordered, immutable sequences of quiz steps. Answers are
//! keyed by step id and typed by the question they answer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named bucket within a score group.
///
/// `ALL` fixes the canonical order used for display and tie-breaking.
pub trait Dimension: Copy + Ord + fmt::Display + 'static {
    const ALL: &'static [Self];
}

/// One of the four personality dimensions scored by the assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trait {
    Analytical,
    Creative,
    Practical,
    Social,
}

impl Dimension for Trait {
    const ALL: &'static [Self] = &[
        Trait::Analytical,
        Trait::Creative,
        Trait::Practical,
        Trait::Social,
    ];
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trait::Analytical => write!(f, "analytical"),
            Trait::Creative => write!(f, "creative"),
            Trait::Practical => write!(f, "practical"),
            Trait::Social => write!(f, "social"),
        }
    }
}

impl FromStr for Trait {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "analytical" => Ok(Trait::Analytical),
            "creative" => Ok(Trait::Creative),
            "practical" => Ok(Trait::Practical),
            "social" => Ok(Trait::Social),
            other => Err(format!("unknown trait: {other}")),
        }
    }
}

/// One of the four content-modality preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningStyle {
    Visual,
    Auditory,
    Reading,
    Kinesthetic,
}

impl Dimension for LearningStyle {
    const ALL: &'static [Self] = &[
        LearningStyle::Visual,
        LearningStyle::Auditory,
        LearningStyle::Reading,
        LearningStyle::Kinesthetic,
    ];
}

impl fmt::Display for LearningStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearningStyle::Visual => write!(f, "visual"),
            LearningStyle::Auditory => write!(f, "auditory"),
            LearningStyle::Reading => write!(f, "reading"),
            LearningStyle::Kinesthetic => write!(f, "kinesthetic"),
        }
    }
}

impl FromStr for LearningStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "visual" => Ok(LearningStyle::Visual),
            "auditory" => Ok(LearningStyle::Auditory),
            "reading" | "reading/writing" => Ok(LearningStyle::Reading),
            "kinesthetic" => Ok(LearningStyle::Kinesthetic),
            other => Err(format!("unknown learning style: {other}")),
        }
    }
}

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    Slider,
    Text,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "multiple-choice"),
            QuestionType::Slider => write!(f, "slider"),
            QuestionType::Text => write!(f, "text"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "multiple-choice" | "multiple_choice" | "choice" => Ok(QuestionType::MultipleChoice),
            "slider" => Ok(QuestionType::Slider),
            "text" => Ok(QuestionType::Text),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// Which score group a question feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Traits,
    LearningStyle,
    CareerAffinity,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Traits => write!(f, "traits"),
            Category::LearningStyle => write!(f, "learning-style"),
            Category::CareerAffinity => write!(f, "career-affinity"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "traits" | "trait" => Ok(Category::Traits),
            "learningstyle" => Ok(Category::LearningStyle),
            "careeraffinity" => Ok(Category::CareerAffinity),
            _ => Err(format!("unknown category: {s}")),
        }
    }
}

/// A selectable option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    /// Display text. Career-affinity answers collect this verbatim.
    pub text: String,
}

/// The scored part of a `question` step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub question_type: QuestionType,
    pub category: Category,
    /// Trait bucket updated by `traits` questions. Without it the question
    /// does not score.
    #[serde(default, rename = "trait")]
    pub trait_key: Option<Trait>,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// 0-based position of an option by id.
    pub fn option_index(&self, option_id: &str) -> Option<usize> {
        self.options.iter().position(|o| o.id == option_id)
    }

    pub fn option(&self, option_id: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// What a step shows and whether it takes an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StepKind {
    Intro {
        #[serde(default)]
        title: String,
        #[serde(default)]
        body: String,
    },
    Question(Question),
    Results {
        #[serde(default)]
        title: String,
    },
}

/// One step of an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizStep {
    pub id: String,
    #[serde(flatten)]
    pub kind: StepKind,
}

impl QuizStep {
    pub fn question(&self) -> Option<&Question> {
        match &self.kind {
            StepKind::Question(q) => Some(q),
            _ => None,
        }
    }

    pub fn is_question(&self) -> bool {
        matches!(self.kind, StepKind::Question(_))
    }

    pub fn is_results(&self) -> bool {
        matches!(self.kind, StepKind::Results { .. })
    }
}

/// An ordered, immutable collection of quiz steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepBank {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub steps: Vec<QuizStep>,
}

impl StepBank {
    pub fn step(&self, step_id: &str) -> Option<&QuizStep> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn index_of(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    /// Number of `question` steps.
    pub fn question_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_question()).count()
    }

    /// Number of `question` steps strictly before `index`.
    pub fn questions_before(&self, index: usize) -> usize {
        self.steps
            .iter()
            .take(index)
            .filter(|s| s.is_question())
            .count()
    }
}

/// A user's answer to a single question step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Answer {
    /// Selected option id.
    Choice(String),
    Slider(u32),
    Text(String),
}

impl Answer {
    pub fn kind(&self) -> QuestionType {
        match self {
            Answer::Choice(_) => QuestionType::MultipleChoice,
            Answer::Slider(_) => QuestionType::Slider,
            Answer::Text(_) => QuestionType::Text,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Choice(id) => write!(f, "{id}"),
            Answer::Slider(v) => write!(f, "{v}"),
            Answer::Text(t) => write!(f, "{t:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bank() -> StepBank {
        let question = |id: &str| QuizStep {
            id: id.into(),
            kind: StepKind::Question(Question {
                prompt: "How much?".into(),
                question_type: QuestionType::Slider,
                category: Category::Traits,
                trait_key: Some(Trait::Social),
                options: vec![],
            }),
        };
        StepBank {
            id: "bank".into(),
            name: "Bank".into(),
            description: String::new(),
            steps: vec![
                QuizStep {
                    id: "intro".into(),
                    kind: StepKind::Intro {
                        title: "Hi".into(),
                        body: String::new(),
                    },
                },
                question("q1"),
                question("q2"),
                QuizStep {
                    id: "results".into(),
                    kind: StepKind::Results {
                        title: String::new(),
                    },
                },
            ],
        }
    }

    #[test]
    fn category_parse_accepts_aliases() {
        assert_eq!("traits".parse::<Category>().unwrap(), Category::Traits);
        assert_eq!(
            "learningStyle".parse::<Category>().unwrap(),
            Category::LearningStyle
        );
        assert_eq!(
            "learning-style".parse::<Category>().unwrap(),
            Category::LearningStyle
        );
        assert_eq!(
            "career_affinity".parse::<Category>().unwrap(),
            Category::CareerAffinity
        );
        assert!("hobbies".parse::<Category>().is_err());
    }

    #[test]
    fn trait_and_type_display_and_parse() {
        assert_eq!(Trait::Analytical.to_string(), "analytical");
        assert_eq!("Creative".parse::<Trait>().unwrap(), Trait::Creative);
        assert!("curious".parse::<Trait>().is_err());
        assert_eq!(
            "multiple-choice".parse::<QuestionType>().unwrap(),
            QuestionType::MultipleChoice
        );
        assert_eq!(QuestionType::Slider.to_string(), "slider");
        assert_eq!(
            "reading/writing".parse::<LearningStyle>().unwrap(),
            LearningStyle::Reading
        );
    }

    #[test]
    fn bank_question_numbering() {
        let bank = sample_bank();
        assert_eq!(bank.question_count(), 2);
        assert_eq!(bank.questions_before(0), 0);
        assert_eq!(bank.questions_before(2), 1);
        assert_eq!(bank.questions_before(4), 2);
        assert_eq!(bank.index_of("q2"), Some(2));
        assert!(bank.step("nope").is_none());
    }

    #[test]
    fn answer_kind_matches_question_type() {
        assert_eq!(Answer::Choice("a".into()).kind(), QuestionType::MultipleChoice);
        assert_eq!(Answer::Slider(3).kind(), QuestionType::Slider);
        assert_eq!(Answer::Text("x".into()).kind(), QuestionType::Text);
    }

    #[test]
    fn quiz_step_serde_roundtrip() {
        let bank = sample_bank();
        let json = serde_json::to_string(&bank.steps[1]).unwrap();
        assert!(json.contains("\"kind\":\"question\""));
        assert!(json.contains("\"trait\":\"social\""));
        let back: QuizStep = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bank.steps[1]);
    }
}
