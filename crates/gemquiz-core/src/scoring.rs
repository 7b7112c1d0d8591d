//! Session scoring, grades, and remediation statistics.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generator::check_answer;
use crate::model::{
    Category, CategoryBreakdown, Difficulty, QuestionResult, QuizConfig, QuizResult, QuizState,
};

/// Default pass mark, in percent.
pub const DEFAULT_PASSING_SCORE: u32 = 70;

/// `round(correct / total * 100)`, or 0 when there is nothing to score.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

/// Score a session.
///
/// Every question counts, answered or not; an unanswered question is incorrect.
pub fn calculate_results(state: &QuizState, config: &QuizConfig) -> QuizResult {
    calculate_results_at(state, config, Utc::now())
}

/// [`calculate_results`] with an explicit clock, used when `end_time` is unset.
pub fn calculate_results_at(
    state: &QuizState,
    config: &QuizConfig,
    now: DateTime<Utc>,
) -> QuizResult {
    let question_results: Vec<QuestionResult> = state
        .questions
        .iter()
        .map(|q| {
            let user_answer = state.answers.get(&q.id).cloned();
            let is_correct = user_answer
                .as_ref()
                .is_some_and(|answer| check_answer(q, answer));
            QuestionResult {
                question_id: q.id.clone(),
                question_type: q.question_type,
                category: q.category,
                difficulty: q.difficulty,
                topic: q.topic.clone(),
                user_answer,
                correct_answer: q.correct_answer.clone(),
                is_correct,
            }
        })
        .collect();

    let score = question_results.iter().filter(|r| r.is_correct).count();
    let total = question_results.len();

    let mut breakdown: Vec<CategoryBreakdown> = Vec::new();
    for r in &question_results {
        let idx = match breakdown.iter().position(|b| b.category == r.category) {
            Some(i) => i,
            None => {
                breakdown.push(CategoryBreakdown {
                    category: r.category,
                    correct: 0,
                    total: 0,
                    percentage: 0,
                });
                breakdown.len() - 1
            }
        };
        let entry = &mut breakdown[idx];
        entry.total += 1;
        if r.is_correct {
            entry.correct += 1;
        }
    }
    for b in &mut breakdown {
        b.percentage = percentage(b.correct, b.total);
    }

    let end = state.end_time.unwrap_or(now);

    QuizResult {
        id: Uuid::new_v4(),
        score,
        total_questions: total,
        percentage: percentage(score, total),
        time_taken_ms: (end - state.start_time).num_milliseconds(),
        breakdown,
        question_results,
        config: config.clone(),
        completed_at: now,
    }
}

/// Letter grade for a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

pub fn get_grade(percentage: u32) -> Grade {
    match percentage {
        90.. => Grade::A,
        80..=89 => Grade::B,
        70..=79 => Grade::C,
        60..=69 => Grade::D,
        _ => Grade::F,
    }
}

/// Pass/fail verdict with a message for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassStatus {
    pub passed: bool,
    pub message: String,
}

pub fn get_pass_status(percentage: u32, passing_score: u32) -> PassStatus {
    if percentage >= passing_score {
        PassStatus {
            passed: true,
            message: format!("Passed with {percentage}% (pass mark {passing_score}%)."),
        }
    } else {
        PassStatus {
            passed: false,
            message: format!(
                "Not passed: {percentage}% is {} points short of the {passing_score}% pass mark.",
                passing_score - percentage
            ),
        }
    }
}

/// How often each topic, category, and difficulty was answered wrongly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WrongAnswerStats {
    pub by_topic: BTreeMap<String, usize>,
    pub by_category: BTreeMap<Category, usize>,
    pub by_difficulty: BTreeMap<Difficulty, usize>,
}

impl WrongAnswerStats {
    /// Topics sorted by miss count, most missed first.
    pub fn weakest_topics(&self) -> Vec<(&str, usize)> {
        let mut topics: Vec<(&str, usize)> = self
            .by_topic
            .iter()
            .map(|(t, n)| (t.as_str(), *n))
            .collect();
        topics.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        topics
    }
}

pub fn get_wrong_answer_stats(results: &[QuestionResult]) -> WrongAnswerStats {
    let mut stats = WrongAnswerStats::default();
    for r in results.iter().filter(|r| !r.is_correct) {
        *stats.by_topic.entry(r.topic.clone()).or_default() += 1;
        *stats.by_category.entry(r.category).or_default() += 1;
        *stats.by_difficulty.entry(r.difficulty).or_default() += 1;
    }
    stats
}

/// `"1h 5m"`, `"3m 20s"`, or `"45s"`. Sub-second remainders are dropped.
pub fn format_duration(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
