//! Core data model types for gemquiz.
//!
//! Questions, quiz configuration, live session state and its storage form,
//! and the result shapes produced when a session is scored.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a question, which decides how it is rendered and checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    Matching,
    FillBlank,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "multiple-choice"),
            QuestionType::TrueFalse => write!(f, "true-false"),
            QuestionType::Matching => write!(f, "matching"),
            QuestionType::FillBlank => write!(f, "fill-blank"),
        }
    }
}

/// How demanding a piece of content (and the questions drawn from it) is.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "beginner"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Topic domains of the gemmology curriculum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fundamentals,
    Crystallography,
    Equipment,
    Identification,
    Species,
    Phenomena,
    Treatments,
    Synthetics,
}

impl Category {
    /// Every category, in curriculum order.
    pub const ALL: [Category; 8] = [
        Category::Fundamentals,
        Category::Crystallography,
        Category::Equipment,
        Category::Identification,
        Category::Species,
        Category::Phenomena,
        Category::Treatments,
        Category::Synthetics,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Fundamentals => "fundamentals",
            Category::Crystallography => "crystallography",
            Category::Equipment => "equipment",
            Category::Identification => "identification",
            Category::Species => "species",
            Category::Phenomena => "phenomena",
            Category::Treatments => "treatments",
            Category::Synthetics => "synthetics",
        };
        f.write_str(name)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.to_string() == wanted)
            .ok_or_else(|| format!("unknown category: {wanted}"))
    }
}

/// A single answer, or a list of answers.
///
/// As a question's correct answer, `Multiple` means "any of these" for
/// fill-in questions and "all of these `left:right` pairs" for matching.
/// As a user answer, `Multiple` carries the pairs chosen for a matching question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(String),
    Multiple(Vec<String>),
}

impl Answer {
    /// The answer as a single string, if it is one.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Answer::Single(s) => Some(s),
            Answer::Multiple(_) => None,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Single(s) => f.write_str(s),
            Answer::Multiple(items) => f.write_str(&items.join(", ")),
        }
    }
}

impl From<&str> for Answer {
    fn from(s: &str) -> Self {
        Answer::Single(s.to_string())
    }
}

impl From<String> for Answer {
    fn from(s: String) -> Self {
        Answer::Single(s)
    }
}

impl From<Vec<String>> for Answer {
    fn from(items: Vec<String>) -> Self {
        Answer::Multiple(items)
    }
}

/// One left/right pair of a matching question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingPair {
    pub left: String,
    pub right: String,
}

impl MatchingPair {
    /// The `left:right` encoding used in answers.
    pub fn encode(&self) -> String {
        format!("{}:{}", self.left, self.right)
    }
}

/// One quiz item. Built by the generator and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within a generated pool.
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub category: Category,
    /// Title of the content entry the question was drawn from.
    pub topic: String,
    pub question_text: String,
    /// Choices for multiple-choice and true/false questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub correct_answer: Answer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Back-link to the content the question was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matching_pairs: Vec<MatchingPair>,
}

/// Practice shows feedback as you go; exam withholds it until submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    #[default]
    Practice,
    Exam,
}

/// Selection and mode parameters, fixed for a session's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Categories to draw from; empty means all.
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    /// Exam time limit in seconds.
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default = "default_true")]
    pub shuffle_questions: bool,
    #[serde(default = "default_true")]
    pub shuffle_options: bool,
    #[serde(default)]
    pub mode: QuizMode,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            difficulty: None,
            question_count: default_question_count(),
            time_limit: None,
            shuffle_questions: true,
            shuffle_options: true,
            mode: QuizMode::Practice,
        }
    }
}

fn default_question_count() -> usize {
    10
}

fn default_true() -> bool {
    true
}

/// One active or completed session.
///
/// Only the session controllers mutate this, and never after `submitted`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizState {
    pub questions: Vec<Question>,
    pub current_index: usize,
    /// Question id → the user's answer.
    pub answers: HashMap<String, Answer>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Question ids marked for review.
    pub flagged_questions: HashSet<String>,
    pub submitted: bool,
}

impl QuizState {
    /// A fresh, unanswered session over `questions`, started now.
    pub fn new(questions: Vec<Question>) -> Self {
        Self::started_at(questions, Utc::now())
    }

    pub fn started_at(questions: Vec<Question>, start_time: DateTime<Utc>) -> Self {
        Self {
            questions,
            current_index: 0,
            answers: HashMap::new(),
            start_time,
            end_time: None,
            flagged_questions: HashSet::new(),
            submitted: false,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }
}

/// Storage form of [`QuizState`]: answers as `[id, answer]` pairs and flags as
/// a list, both sorted by question id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedQuizState {
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub answers: Vec<(String, Answer)>,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub flagged_questions: Vec<String>,
    #[serde(default)]
    pub submitted: bool,
}

pub fn serialize_quiz_state(state: &QuizState) -> SerializedQuizState {
    let mut answers: Vec<(String, Answer)> = state
        .answers
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    answers.sort_by(|a, b| a.0.cmp(&b.0));

    let mut flagged: Vec<String> = state.flagged_questions.iter().cloned().collect();
    flagged.sort();

    SerializedQuizState {
        questions: state.questions.clone(),
        current_index: state.current_index,
        answers,
        start_time: state.start_time,
        end_time: state.end_time,
        flagged_questions: flagged,
        submitted: state.submitted,
    }
}

/// Rebuild a [`QuizState`]. An out-of-range `current_index` is clamped.
pub fn deserialize_quiz_state(serialized: SerializedQuizState) -> QuizState {
    let current_index = serialized
        .current_index
        .min(serialized.questions.len().saturating_sub(1));

    QuizState {
        questions: serialized.questions,
        current_index,
        answers: serialized.answers.into_iter().collect(),
        start_time: serialized.start_time,
        end_time: serialized.end_time,
        flagged_questions: serialized.flagged_questions.into_iter().collect(),
        submitted: serialized.submitted,
    }
}

impl QuizState {
    /// Encode as the JSON storage form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&serialize_quiz_state(self))
    }

    /// Decode from the JSON storage form.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let serialized: SerializedQuizState = serde_json::from_str(json)?;
        Ok(deserialize_quiz_state(serialized))
    }
}

/// Outcome for one question of a scored session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: String,
    pub question_type: QuestionType,
    pub category: Category,
    pub difficulty: Difficulty,
    pub topic: String,
    /// `None` when the question was left unanswered.
    pub user_answer: Option<Answer>,
    pub correct_answer: Answer,
    pub is_correct: bool,
}

/// Per-category correctness within one scored session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
}

/// Read-only snapshot computed when a session is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: Uuid,
    pub score: usize,
    pub total_questions: usize,
    /// Rounded, in `[0, 100]`.
    pub percentage: u32,
    pub time_taken_ms: i64,
    /// One entry per category present, in order of first appearance.
    pub breakdown: Vec<CategoryBreakdown>,
    pub question_results: Vec<QuestionResult>,
    pub config: QuizConfig,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str) -> Question {
        Question {
            id: id.into(),
            question_type: QuestionType::MultipleChoice,
            difficulty: Difficulty::Beginner,
            category: Category::Fundamentals,
            topic: "Hardness".into(),
            question_text: format!("Question {id}?"),
            options: vec!["a".into(), "b".into()],
            correct_answer: Answer::Single("a".into()),
            explanation: None,
            source_ref: None,
            matching_pairs: vec![],
        }
    }

    #[test]
    fn category_display_and_parse() {
        for c in Category::ALL {
            assert_eq!(c.to_string().parse::<Category>().unwrap(), c);
        }
        assert_eq!(" Species ".parse::<Category>().unwrap(), Category::Species);
        assert!("mineralogy".parse::<Category>().is_err());
    }

    #[test]
    fn difficulty_parse() {
        assert_eq!("ADVANCED".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert!("expert".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::default(), Difficulty::Beginner);
    }

    #[test]
    fn answer_is_untagged_in_json() {
        let single: Answer = serde_json::from_str("\"ruby\"").unwrap();
        assert_eq!(single, Answer::Single("ruby".into()));
        let many: Answer = serde_json::from_str("[\"a:b\",\"c:d\"]").unwrap();
        assert_eq!(many, Answer::Multiple(vec!["a:b".into(), "c:d".into()]));
    }

    #[test]
    fn question_type_uses_kebab_case() {
        let json = serde_json::to_string(&QuestionType::FillBlank).unwrap();
        assert_eq!(json, "\"fill-blank\"");
        let q = question("q1");
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["type"], "multiple-choice");
        assert!(value.get("matching_pairs").is_none());
    }

    #[test]
    fn serialized_form_uses_pairs_and_lists() {
        let mut state = QuizState::new(vec![question("q1"), question("q2")]);
        state.answers.insert("q2".into(), "b".into());
        state.answers.insert("q1".into(), "a".into());
        state.flagged_questions.insert("q2".into());

        let serialized = serialize_quiz_state(&state);
        assert_eq!(
            serialized.answers,
            vec![
                ("q1".to_string(), Answer::Single("a".into())),
                ("q2".to_string(), Answer::Single("b".into())),
            ]
        );
        assert_eq!(serialized.flagged_questions, vec!["q2".to_string()]);

        let value = serde_json::to_value(&serialized).unwrap();
        assert_eq!(value["answers"][0][0], "q1");
        assert_eq!(value["answers"][0][1], "a");
    }

    #[test]
    fn state_survives_json_regardless_of_insertion_order() {
        let mut state = QuizState::new(vec![question("q1"), question("q2"), question("q3")]);
        state.current_index = 2;
        state.answers.insert("q3".into(), "x".into());
        state
            .answers
            .insert("q1".into(), Answer::Multiple(vec!["l:r".into()]));
        state.flagged_questions.insert("q3".into());
        state.flagged_questions.insert("q1".into());

        let json = state.to_json().unwrap();
        let restored = QuizState::from_json(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn deserialize_clamps_index() {
        let mut serialized = serialize_quiz_state(&QuizState::new(vec![question("q1")]));
        serialized.current_index = 9;
        let state = deserialize_quiz_state(serialized);
        assert_eq!(state.current_index, 0);
    }

    #[test]
    fn quiz_config_defaults_from_empty_json() {
        let config: QuizConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, QuizConfig::default());
        assert_eq!(config.question_count, 10);
        assert!(config.shuffle_questions);
    }
}
