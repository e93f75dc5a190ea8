//! Quiz questions and the question bank
//!
//! The bank accepts the JSON produced by the question authoring tools, where
//! the prompt field is called `question` and the kind `type` is `"mcq"` or
//! `"calculation"`. A multiple-choice `correctAnswer` may be given as option
//! text or as a zero-based option index.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Built-in physics question bank
const BUILTIN_QUESTIONS: &str = include_str!("../assets/questions.json");

/// Slack for decimal answers that are exact on paper but not in binary.
/// Only applied when the question has a tolerance.
const TOLERANCE_EPSILON: f64 = 1e-9;

/// How an answer is judged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerKind {
    /// Answer must match the correct option exactly
    #[serde(rename = "multipleChoice", alias = "mcq")]
    MultipleChoice,
    /// Answer is parsed as a number and compared within a tolerance
    #[serde(rename = "numeric", alias = "calculation")]
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Difficulty band for a level: 1-2 easy, 3-4 medium, then hard
    pub fn for_level(level: u32) -> Self {
        match level {
            0..=2 => Difficulty::Easy,
            3..=4 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }
}

/// A single quiz question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawQuestion")]
pub struct Question {
    pub id: u32,
    pub prompt: String,
    pub answer_kind: AnswerKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl Question {
    /// Multiple-choice question
    pub fn multiple_choice(
        id: u32,
        prompt: impl Into<String>,
        options: &[&str],
        correct: impl Into<String>,
    ) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            answer_kind: AnswerKind::MultipleChoice,
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_answer: correct.into(),
            tolerance: None,
            explanation: String::new(),
            difficulty: None,
            topic: None,
        }
    }

    /// Numeric question
    pub fn numeric(
        id: u32,
        prompt: impl Into<String>,
        correct: impl Into<String>,
        tolerance: Option<f64>,
    ) -> Self {
        Self {
            id,
            prompt: prompt.into(),
            answer_kind: AnswerKind::Numeric,
            options: Vec::new(),
            correct_answer: correct.into(),
            tolerance,
            explanation: String::new(),
            difficulty: None,
            topic: None,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    /// Judge a submitted answer
    ///
    /// Numeric answers that do not parse are simply wrong.
    pub fn is_correct(&self, answer: &str) -> bool {
        let answer = answer.trim();
        match self.answer_kind {
            AnswerKind::MultipleChoice => answer == self.correct_answer.trim(),
            AnswerKind::Numeric => {
                let (Some(given), Some(expected)) = (parse_number(answer), self.numeric_answer())
                else {
                    return false;
                };
                match self.tolerance {
                    Some(tolerance) if tolerance > 0.0 => {
                        (given - expected).abs() <= tolerance + TOLERANCE_EPSILON
                    }
                    _ => given == expected,
                }
            }
        }
    }

    /// Correct value of a numeric question
    pub fn numeric_answer(&self) -> Option<f64> {
        parse_number(&self.correct_answer)
    }

    /// Reject questions that can never be answered correctly
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(Error::InvalidQuestion {
                id: self.id,
                reason: reason.to_string(),
            })
        };

        if self.prompt.trim().is_empty() {
            return invalid("empty prompt");
        }
        match self.answer_kind {
            AnswerKind::MultipleChoice => {
                if self.options.len() < 2 {
                    return invalid("multiple choice needs at least two options");
                }
                if !self
                    .options
                    .iter()
                    .any(|o| o.trim() == self.correct_answer.trim())
                {
                    return invalid("correct answer is not one of the options");
                }
            }
            AnswerKind::Numeric => {
                if self.numeric_answer().is_none() {
                    return invalid("correct answer is not a number");
                }
                let tolerance = self.tolerance.unwrap_or(0.0);
                if !(tolerance.is_finite() && tolerance >= 0.0) {
                    return invalid("tolerance must be a non-negative number");
                }
            }
        }
        Ok(())
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Wire format accepted on input (authoring-tool field names)
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    id: u32,
    #[serde(alias = "question")]
    prompt: String,
    #[serde(alias = "type", default)]
    answer_kind: Option<AnswerKind>,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: RawAnswer,
    #[serde(default)]
    tolerance: Option<f64>,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    difficulty: Option<Difficulty>,
    #[serde(default)]
    topic: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAnswer {
    Text(String),
    Number(f64),
}

impl TryFrom<RawQuestion> for Question {
    type Error = Error;

    fn try_from(raw: RawQuestion) -> Result<Self> {
        // Untyped questions are multiple choice when they list options
        let answer_kind = raw.answer_kind.unwrap_or(if raw.options.is_empty() {
            AnswerKind::Numeric
        } else {
            AnswerKind::MultipleChoice
        });

        let correct_answer = match (answer_kind, raw.correct_answer) {
            (_, RawAnswer::Text(text)) => text,
            (AnswerKind::Numeric, RawAnswer::Number(n)) => n.to_string(),
            (AnswerKind::MultipleChoice, RawAnswer::Number(n)) => {
                let option = (n >= 0.0 && n.fract() == 0.0)
                    .then(|| raw.options.get(n as usize))
                    .flatten();
                match option {
                    Some(option) => option.clone(),
                    None => {
                        return Err(Error::InvalidQuestion {
                            id: raw.id,
                            reason: format!("option index {n} out of range"),
                        });
                    }
                }
            }
        };

        let question = Question {
            id: raw.id,
            prompt: raw.prompt,
            answer_kind,
            options: raw.options,
            correct_answer,
            tolerance: raw.tolerance,
            explanation: raw.explanation,
            difficulty: raw.difficulty,
            topic: raw.topic,
        };
        question.validate()?;
        Ok(question)
    }
}

/// Supplies a question each time an invader is shot
///
/// Returning `None` skips the quiz for that kill.
pub trait QuestionSource {
    fn next_question(&mut self, level: u32) -> Option<Question>;
}

impl<F> QuestionSource for F
where
    F: FnMut(u32) -> Option<Question>,
{
    fn next_question(&mut self, level: u32) -> Option<Question> {
        self(level)
    }
}

/// In-memory question bank with seeded random selection
#[derive(Debug, Clone)]
pub struct QuestionBank {
    questions: Vec<Question>,
    rng: Pcg32,
    banded: bool,
}

impl QuestionBank {
    /// Validate and wrap a list of questions
    pub fn new(questions: Vec<Question>, seed: u64) -> Result<Self> {
        if questions.is_empty() {
            return Err(Error::EmptyQuestionBank);
        }
        for (i, question) in questions.iter().enumerate() {
            question.validate()?;
            if questions[..i].iter().any(|q| q.id == question.id) {
                return Err(Error::InvalidQuestion {
                    id: question.id,
                    reason: "duplicate id".to_string(),
                });
            }
        }
        Ok(Self {
            questions,
            rng: Pcg32::seed_from_u64(seed),
            banded: false,
        })
    }

    /// Parse a JSON array of questions
    pub fn from_json(json: &str, seed: u64) -> Result<Self> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::new(questions, seed)
    }

    /// The embedded physics bank
    pub fn builtin(seed: u64) -> Result<Self> {
        Self::from_json(BUILTIN_QUESTIONS, seed)
    }

    /// Pick questions matching the level's difficulty band
    pub fn banded(mut self, banded: bool) -> Self {
        self.banded = banded;
        self
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Uniformly random question
    pub fn random(&mut self) -> Option<Question> {
        if self.questions.is_empty() {
            return None;
        }
        let i = self.rng.random_range(0..self.questions.len());
        Some(self.questions[i].clone())
    }

    /// Random question from the level's band, or from the whole bank if the band is empty
    pub fn for_level(&mut self, level: u32) -> Option<Question> {
        let band = Difficulty::for_level(level);
        let matching: Vec<usize> = self
            .questions
            .iter()
            .enumerate()
            .filter(|(_, q)| q.difficulty == Some(band))
            .map(|(i, _)| i)
            .collect();
        if matching.is_empty() {
            return self.random();
        }
        let i = matching[self.rng.random_range(0..matching.len())];
        Some(self.questions[i].clone())
    }
}

impl QuestionSource for QuestionBank {
    fn next_question(&mut self, level: u32) -> Option<Question> {
        if self.banded {
            self.for_level(level)
        } else {
            self.random()
        }
    }
}
