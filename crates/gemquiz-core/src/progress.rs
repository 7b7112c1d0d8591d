//! Cumulative progress: best scores, completed topics, mastery, study
//! suggestions, and activity streaks.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Category, QuizResult};

/// A category score at or above this marks its topics as completed.
pub const COMPLETION_THRESHOLD: u32 = 70;
/// Best score needed, on top of full completion, for mastery.
pub const MASTERY_THRESHOLD: u32 = 80;

/// Progress across every session on this device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    #[serde(default)]
    pub completed_topics: BTreeMap<Category, BTreeSet<String>>,
    #[serde(default)]
    pub best_scores: BTreeMap<Category, u32>,
    #[serde(default)]
    pub total_quizzes: u32,
    #[serde(default)]
    pub total_correct: u32,
    #[serde(default)]
    pub total_attempted: u32,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    /// Latest session timestamp for each active UTC day, oldest first.
    #[serde(default)]
    pub activity: Vec<DateTime<Utc>>,
}

impl UserProgress {
    /// Share of all attempted questions answered correctly, in percent.
    pub fn overall_accuracy(&self) -> u32 {
        crate::scoring::percentage(self.total_correct as usize, self.total_attempted as usize)
    }
}

/// Fold a scored session into `current`.
pub fn update_progress(current: &UserProgress, result: &QuizResult) -> UserProgress {
    update_progress_at(current, result, Utc::now())
}

pub fn update_progress_at(
    current: &UserProgress,
    result: &QuizResult,
    now: DateTime<Utc>,
) -> UserProgress {
    let mut next = current.clone();
    next.total_quizzes += 1;
    next.total_correct += result.score as u32;
    next.total_attempted += result.total_questions as u32;

    for b in &result.breakdown {
        let best = next.best_scores.entry(b.category).or_insert(0);
        if b.percentage > *best {
            *best = b.percentage;
        }

        if b.percentage >= COMPLETION_THRESHOLD {
            let topics = next.completed_topics.entry(b.category).or_default();
            topics.extend(
                result
                    .question_results
                    .iter()
                    .filter(|r| r.category == b.category)
                    .map(|r| r.topic.clone()),
            );
        }
    }

    next.last_activity = Some(now);
    match next.activity.last_mut() {
        Some(last) if last.date_naive() == now.date_naive() => *last = now,
        _ => next.activity.push(now),
    }
    next
}

/// Forget one category's completed topics and best score.
///
/// Lifetime totals and the activity log are kept.
pub fn reset_category(current: &UserProgress, category: Category) -> UserProgress {
    let mut next = current.clone();
    next.completed_topics.remove(&category);
    next.best_scores.remove(&category);
    next
}

/// Every topic completed and a best score of at least 80%.
pub fn has_category_mastery(
    progress: &UserProgress,
    category: Category,
    total_topics_in_category: usize,
) -> bool {
    let completed = progress
        .completed_topics
        .get(&category)
        .map_or(0, BTreeSet::len);
    let best = progress.best_scores.get(&category).copied().unwrap_or(0);
    completed >= total_topics_in_category && best >= MASTERY_THRESHOLD
}

/// A category worth studying next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySuggestion {
    pub category: Category,
    pub priority: f64,
    pub reason: String,
}

/// Rank categories that have topics and return the top three.
///
/// Never attempted: priority 100. Best score under 70: `80 - best`.
/// Otherwise: `(1 - completion rate) * 50`.
pub fn get_study_suggestions(
    progress: &UserProgress,
    topic_counts: &BTreeMap<Category, usize>,
) -> Vec<StudySuggestion> {
    let mut suggestions: Vec<StudySuggestion> = topic_counts
        .iter()
        .filter(|(_, &count)| count > 0)
        .map(|(&category, &count)| {
            let completed = progress
                .completed_topics
                .get(&category)
                .map_or(0, BTreeSet::len);
            match progress.best_scores.get(&category) {
                None => StudySuggestion {
                    category,
                    priority: 100.0,
                    reason: "Not attempted yet".into(),
                },
                Some(&best) if best < COMPLETION_THRESHOLD => StudySuggestion {
                    category,
                    priority: 80.0 - best as f64,
                    reason: format!("Best score {best}% is below {COMPLETION_THRESHOLD}%"),
                },
                Some(_) => {
                    let rate = (completed as f64 / count as f64).min(1.0);
                    StudySuggestion {
                        category,
                        priority: (1.0 - rate) * 50.0,
                        reason: format!("{completed} of {count} topics completed"),
                    }
                }
            }
        })
        .collect();

    suggestions.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    suggestions.truncate(3);
    suggestions
}

/// Consecutive-day activity counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInfo {
    /// Run ending today or yesterday; 0 otherwise.
    pub current_streak: u32,
    pub longest_streak: u32,
}

/// Streaks over UTC calendar days, with "today" taken from the system clock.
pub fn calculate_streak(activity: &[DateTime<Utc>]) -> StreakInfo {
    calculate_streak_on(activity, Utc::now().date_naive())
}

pub fn calculate_streak_on(activity: &[DateTime<Utc>], today: NaiveDate) -> StreakInfo {
    let days: BTreeSet<NaiveDate> = activity.iter().map(|t| t.date_naive()).collect();
    let days: Vec<NaiveDate> = days.into_iter().rev().collect();
    let Some(&latest) = days.first() else {
        return StreakInfo::default();
    };

    let mut longest = 1u32;
    let mut run = 1u32;
    let mut current = 0u32;
    let counts_as_current = (today - latest).num_days() <= 1;
    let mut current_open = counts_as_current;

    for pair in days.windows(2) {
        if (pair[0] - pair[1]).num_days() == 1 {
            run += 1;
        } else {
            if current_open {
                current = run;
                current_open = false;
            }
            run = 1;
        }
        longest = longest.max(run);
    }
    if current_open {
        current = run;
    }

    StreakInfo {
        current_streak: current,
        longest_streak: longest,
    }
}
