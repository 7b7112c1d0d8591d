//! Timed exam session controller.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::quiz::{parse_saved_state, QuizSession};
use crate::model::{Answer, Question, QuizConfig, QuizMode, QuizResult};
use crate::storage::{read_or_none, remove_best_effort, write_best_effort, KeyValueStore, EXAM_STATE_KEY};

/// Time limit used when the config carries none: 30 minutes.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 30 * 60;

/// Storage form of an exam: the nested session JSON plus the timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamEnvelope {
    /// [`crate::model::QuizState::to_json`] output, stored as a string.
    pub quiz_state: String,
    pub time_remaining: u32,
    pub is_paused: bool,
}

/// What one clock tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One second elapsed and time remains.
    Running,
    /// This tick reached zero.
    Expired,
    /// Nothing happened: paused, submitted, or already at zero.
    Idle,
}

/// An exam: a session with a countdown, no feedback, and no live score.
///
/// The countdown only moves through [`ExamSession::tick`]; [`super::ExamTimer`]
/// calls it once a second.
pub struct ExamSession {
    quiz: QuizSession,
    time_limit: u32,
    time_remaining: u32,
    is_paused: bool,
    auto_submit: bool,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl ExamSession {
    pub fn new(questions: Vec<Question>, mut config: QuizConfig) -> Self {
        config.mode = QuizMode::Exam;
        let time_limit = config.time_limit.unwrap_or(DEFAULT_TIME_LIMIT_SECS);
        Self {
            quiz: QuizSession::new(questions, config),
            time_limit,
            time_remaining: time_limit,
            is_paused: false,
            auto_submit: true,
            store: None,
        }
    }

    /// Whether reaching zero submits the exam. On by default.
    pub fn with_auto_submit(mut self, enabled: bool) -> Self {
        self.auto_submit = enabled;
        self
    }

    /// Save to `store` after every change, resuming a saved exam if one exists.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        if let Some(envelope) = restore_envelope(store.as_ref()) {
            if let Some(state) = parse_saved_state(&envelope.quiz_state, EXAM_STATE_KEY) {
                tracing::debug!(
                    time_remaining = envelope.time_remaining,
                    "resuming saved exam"
                );
                let config = self.quiz.config().clone();
                self.quiz = QuizSession::from_state(state, config);
                self.time_remaining = envelope.time_remaining.min(self.time_limit);
                self.is_paused = envelope.is_paused;
            }
        }
        self.store = Some(store);
        self
    }

    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn is_time_up(&self) -> bool {
        self.time_remaining == 0
    }

    pub fn is_complete(&self) -> bool {
        self.quiz.is_complete()
    }

    /// Whether the clock should be ticking.
    pub fn is_running(&self) -> bool {
        !self.is_paused && !self.is_complete() && !self.is_time_up()
    }

    pub fn questions(&self) -> &[Question] {
        &self.quiz.state().questions
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.current_question()
    }

    pub fn current_index(&self) -> usize {
        self.quiz.current_index()
    }

    pub fn current_answer(&self) -> Option<&Answer> {
        self.quiz.current_answer()
    }

    pub fn answer_for(&self, question_id: &str) -> Option<&Answer> {
        self.quiz.state().answers.get(question_id)
    }

    pub fn is_flagged(&self) -> bool {
        self.quiz.is_flagged()
    }

    pub fn is_question_flagged(&self, question_id: &str) -> bool {
        self.quiz.state().flagged_questions.contains(question_id)
    }

    pub fn answered_count(&self) -> usize {
        self.quiz.answered_count()
    }

    pub fn flagged_count(&self) -> usize {
        self.quiz.state().flagged_questions.len()
    }

    /// Results are withheld until the exam is submitted.
    pub fn results(&self) -> Option<&QuizResult> {
        self.quiz.results()
    }

    pub fn select_answer(&mut self, answer: impl Into<Answer>) {
        self.quiz.select_answer(answer);
        self.persist();
    }

    pub fn next_question(&mut self) {
        self.quiz.next_question();
        self.persist();
    }

    pub fn previous_question(&mut self) {
        self.quiz.previous_question();
        self.persist();
    }

    pub fn go_to_question(&mut self, index: usize) {
        self.quiz.go_to_question(index);
        self.persist();
    }

    pub fn toggle_flag(&mut self) {
        self.quiz.toggle_flag();
        self.persist();
    }

    pub fn pause_timer(&mut self) {
        if self.is_complete() || self.is_paused {
            return;
        }
        self.is_paused = true;
        self.persist();
    }

    pub fn resume_timer(&mut self) {
        if self.is_complete() || !self.is_paused {
            return;
        }
        self.is_paused = false;
        self.persist();
    }

    /// Advance the clock by one second, submitting on expiry when enabled.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_running() {
            return TickOutcome::Idle;
        }
        self.time_remaining -= 1;
        if self.time_remaining > 0 {
            self.persist();
            return TickOutcome::Running;
        }
        if self.auto_submit {
            tracing::info!(
                answered = self.answered_count(),
                total = self.questions().len(),
                "exam time expired, submitting"
            );
            self.submit_exam();
        } else {
            self.persist();
        }
        TickOutcome::Expired
    }

    /// Submit and score. Later calls return the same result.
    pub fn submit_exam(&mut self) -> &QuizResult {
        if !self.quiz.is_complete() {
            if let Some(store) = &self.store {
                remove_best_effort(store.as_ref(), EXAM_STATE_KEY);
            }
        }
        self.quiz.submit_quiz()
    }

    /// Start over on the same questions with a full clock.
    pub fn reset_exam(&mut self) {
        self.quiz.reset_quiz();
        self.time_remaining = self.time_limit;
        self.is_paused = false;
        if let Some(store) = &self.store {
            remove_best_effort(store.as_ref(), EXAM_STATE_KEY);
        }
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if self.is_complete() {
            return;
        }
        write_best_effort(store.as_ref(), EXAM_STATE_KEY, || {
            let envelope = ExamEnvelope {
                quiz_state: self.quiz.state().to_json()?,
                time_remaining: self.time_remaining,
                is_paused: self.is_paused,
            };
            Ok(serde_json::to_string(&envelope)?)
        });
    }
}

fn restore_envelope(store: &dyn KeyValueStore) -> Option<ExamEnvelope> {
    let json = read_or_none(store, EXAM_STATE_KEY)?;
    match serde_json::from_str(&json) {
        Ok(envelope) => Some(envelope),
        Err(e) => {
            tracing::warn!("saved exam is unreadable, starting fresh: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::storage::MemoryStore;
    use crate::test_support::{questions, FailingStore};

    fn exam(n: usize, time_limit: u32) -> ExamSession {
        let config = QuizConfig {
            time_limit: Some(time_limit),
            ..QuizConfig::default()
        };
        ExamSession::new(questions(n, Category::Equipment), config)
    }

    #[test]
    fn starts_at_time_limit_or_default() {
        assert_eq!(exam(3, 90).time_remaining(), 90);
        let untimed = ExamSession::new(questions(1, Category::Equipment), QuizConfig::default());
        assert_eq!(untimed.time_remaining(), DEFAULT_TIME_LIMIT_SECS);
    }

    #[test]
    fn auto_submits_once_at_zero() {
        let mut e = exam(3, 2);
        e.select_answer("a");
        assert_eq!(e.tick(), TickOutcome::Running);
        assert_eq!(e.time_remaining(), 1);
        assert!(!e.is_complete());

        assert_eq!(e.tick(), TickOutcome::Expired);
        assert_eq!(e.time_remaining(), 0);
        assert!(e.is_complete());
        let id = e.results().map(|r| r.id);
        assert_eq!(e.results().map(|r| r.score), Some(1));

        assert_eq!(e.tick(), TickOutcome::Idle);
        assert_eq!(e.time_remaining(), 0);
        assert_eq!(e.results().map(|r| r.id), id);
    }

    #[test]
    fn expiry_without_auto_submit_stays_open() {
        let mut e = exam(2, 1).with_auto_submit(false);
        assert_eq!(e.tick(), TickOutcome::Expired);
        assert!(e.is_time_up());
        assert!(!e.is_complete());
        assert_eq!(e.tick(), TickOutcome::Idle);
        e.select_answer("a");
        assert_eq!(e.submit_exam().score, 1);
    }

    #[test]
    fn paused_clock_does_not_move() {
        let mut e = exam(2, 10);
        e.pause_timer();
        assert!(e.is_paused());
        assert_eq!(e.tick(), TickOutcome::Idle);
        assert_eq!(e.time_remaining(), 10);
        e.resume_timer();
        assert_eq!(e.tick(), TickOutcome::Running);
        assert_eq!(e.time_remaining(), 9);
    }

    #[test]
    fn failing_store_does_not_block_the_exam() {
        let mut e = exam(2, 2).with_store(Arc::new(FailingStore));
        e.select_answer("a");
        e.toggle_flag();
        e.next_question();
        assert_eq!(e.tick(), TickOutcome::Running);
        assert_eq!(e.time_remaining(), 1);
        assert_eq!(e.answered_count(), 1);
        assert_eq!(e.flagged_count(), 1);

        assert_eq!(e.tick(), TickOutcome::Expired);
        assert!(e.is_complete());
        assert_eq!(e.results().map(|r| r.score), Some(1));
    }

    #[test]
    fn results_withheld_until_submission() {
        let mut e = exam(2, 60);
        e.select_answer("a");
        assert!(e.results().is_none());
        let result = e.submit_exam().clone();
        assert_eq!(result.score, 1);
        assert_eq!(result.config.mode, QuizMode::Exam);
        assert_eq!(e.tick(), TickOutcome::Idle);
    }

    #[test]
    fn envelope_persists_timer_and_nested_state() {
        let store = Arc::new(MemoryStore::new());
        let mut e = exam(3, 60).with_store(store.clone());
        e.next_question();
        e.select_answer("b");
        e.tick();
        e.tick();
        e.pause_timer();

        let raw = store.get(EXAM_STATE_KEY).unwrap().unwrap();
        let envelope: ExamEnvelope = serde_json::from_str(&raw).unwrap();
        assert_eq!(envelope.time_remaining, 58);
        assert!(envelope.is_paused);
        assert!(envelope.quiz_state.starts_with('{'));

        let resumed = exam(3, 60).with_store(store.clone());
        assert_eq!(resumed.time_remaining(), 58);
        assert!(resumed.is_paused());
        assert_eq!(resumed.current_index(), 1);
        assert_eq!(resumed.answered_count(), 1);
    }

    #[test]
    fn submission_and_reset_clear_saved_exam() {
        let store = Arc::new(MemoryStore::new());
        let mut e = exam(2, 60).with_store(store.clone());
        e.select_answer("a");
        assert!(store.get(EXAM_STATE_KEY).unwrap().is_some());
        e.submit_exam();
        assert!(store.get(EXAM_STATE_KEY).unwrap().is_none());
        e.select_answer("b");
        assert!(store.get(EXAM_STATE_KEY).unwrap().is_none());

        e.reset_exam();
        assert!(!e.is_complete());
        assert_eq!(e.time_remaining(), 60);
        assert_eq!(e.answered_count(), 0);
    }

    #[test]
    fn corrupt_envelope_starts_fresh() {
        let store = Arc::new(MemoryStore::new());
        store.set(EXAM_STATE_KEY, "not json").unwrap();
        let e = exam(2, 45).with_store(store.clone());
        assert_eq!(e.time_remaining(), 45);
        assert_eq!(e.answered_count(), 0);

        let bad_inner = serde_json::to_string(&ExamEnvelope {
            quiz_state: "{broken".into(),
            time_remaining: 3,
            is_paused: true,
        })
        .unwrap();
        store.set(EXAM_STATE_KEY, &bad_inner).unwrap();
        let e = exam(2, 45).with_store(store);
        assert_eq!(e.time_remaining(), 45);
        assert!(!e.is_paused());
    }
}
