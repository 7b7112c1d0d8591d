//! Practice-mode session controller.

use std::collections::HashSet;
use std::sync::Arc;

use crate::generator::check_answer;
use crate::model::{Answer, Question, QuizConfig, QuizResult, QuizState};
use crate::scoring::calculate_results;
use crate::storage::{read_or_none, remove_best_effort, write_best_effort, KeyValueStore, QUIZ_STATE_KEY};

/// Where a session saves itself after every change.
#[derive(Clone)]
struct Persistence {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

/// A practice session over a fixed question list.
///
/// States: in progress, then submitted (terminal). Every mutator is a no-op
/// once submitted. Navigation outside the question range is ignored.
pub struct QuizSession {
    state: QuizState,
    config: QuizConfig,
    /// Questions whose answer has been checked ("show me").
    feedback_shown: HashSet<String>,
    result: Option<QuizResult>,
    persistence: Option<Persistence>,
}

impl QuizSession {
    /// A fresh, unsaved session.
    pub fn new(questions: Vec<Question>, config: QuizConfig) -> Self {
        Self::from_state(QuizState::new(questions), config)
    }

    /// Wrap an existing state, e.g. one restored from storage.
    pub fn from_state(state: QuizState, config: QuizConfig) -> Self {
        let result = state
            .submitted
            .then(|| calculate_results(&state, &config));
        Self {
            state,
            config,
            feedback_shown: HashSet::new(),
            result,
            persistence: None,
        }
    }

    /// Save to `store` after every change, resuming a saved session if one exists.
    pub fn with_store(self, store: Arc<dyn KeyValueStore>) -> Self {
        self.with_store_key(store, QUIZ_STATE_KEY)
    }

    pub fn with_store_key(mut self, store: Arc<dyn KeyValueStore>, key: &str) -> Self {
        if let Some(saved) = restore_state(store.as_ref(), key) {
            tracing::debug!(key, questions = saved.questions.len(), "resuming saved session");
            let config = self.config.clone();
            self = Self::from_state(saved, config);
        }
        self.persistence = Some(Persistence {
            store,
            key: key.to_string(),
        });
        self
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.state.current_question()
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn question_count(&self) -> usize {
        self.state.questions.len()
    }

    pub fn current_answer(&self) -> Option<&Answer> {
        self.current_question()
            .and_then(|q| self.state.answers.get(&q.id))
    }

    pub fn has_answer(&self) -> bool {
        self.current_answer().is_some()
    }

    pub fn is_flagged(&self) -> bool {
        self.current_question()
            .is_some_and(|q| self.state.flagged_questions.contains(&q.id))
    }

    /// Whether the current question's answer has been checked.
    pub fn is_feedback_shown(&self) -> bool {
        self.current_question()
            .is_some_and(|q| self.feedback_shown.contains(&q.id))
    }

    /// Correctness of the current answer, once feedback has been requested.
    pub fn current_feedback(&self) -> Option<bool> {
        if !self.is_feedback_shown() {
            return None;
        }
        let q = self.current_question()?;
        let answer = self.state.answers.get(&q.id)?;
        Some(check_answer(q, answer))
    }

    pub fn answered_count(&self) -> usize {
        self.state.answers.len()
    }

    /// Correct answers so far, across every answered question.
    pub fn live_score(&self) -> usize {
        self.state
            .questions
            .iter()
            .filter(|q| {
                self.state
                    .answers
                    .get(&q.id)
                    .is_some_and(|a| check_answer(q, a))
            })
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.state.submitted
    }

    /// The scored result, once submitted.
    pub fn results(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    /// Record (or replace) the answer to the current question.
    pub fn select_answer(&mut self, answer: impl Into<Answer>) {
        if self.state.submitted {
            return;
        }
        let Some(id) = self.current_question().map(|q| q.id.clone()) else {
            return;
        };
        self.state.answers.insert(id, answer.into());
        self.persist();
    }

    /// Reveal feedback for the current question. Does not lock the answer.
    pub fn submit_answer(&mut self) {
        if self.state.submitted {
            return;
        }
        if let Some(id) = self.current_question().map(|q| q.id.clone()) {
            self.feedback_shown.insert(id);
        }
    }

    pub fn next_question(&mut self) {
        self.go_to_question(self.state.current_index + 1);
    }

    pub fn previous_question(&mut self) {
        if let Some(index) = self.state.current_index.checked_sub(1) {
            self.go_to_question(index);
        }
    }

    pub fn go_to_question(&mut self, index: usize) {
        if self.state.submitted || index >= self.state.questions.len() {
            return;
        }
        if index != self.state.current_index {
            self.state.current_index = index;
            self.persist();
        }
    }

    /// Flag or unflag the current question for review.
    pub fn toggle_flag(&mut self) {
        if self.state.submitted {
            return;
        }
        let Some(id) = self.current_question().map(|q| q.id.clone()) else {
            return;
        };
        if !self.state.flagged_questions.remove(&id) {
            self.state.flagged_questions.insert(id);
        }
        self.persist();
    }

    /// End the session and score it. A second call returns the same result.
    pub fn submit_quiz(&mut self) -> &QuizResult {
        if !self.state.submitted {
            self.state.end_time = Some(chrono::Utc::now());
            self.state.submitted = true;
            if let Some(p) = &self.persistence {
                remove_best_effort(p.store.as_ref(), &p.key);
            }
        }
        let (state, config) = (&self.state, &self.config);
        self.result
            .get_or_insert_with(|| calculate_results(state, config))
    }

    /// Throw everything away and start over on the same questions.
    pub fn reset_quiz(&mut self) {
        let questions = std::mem::take(&mut self.state.questions);
        self.state = QuizState::new(questions);
        self.feedback_shown.clear();
        self.result = None;
        if let Some(p) = &self.persistence {
            remove_best_effort(p.store.as_ref(), &p.key);
        }
    }

    fn persist(&self) {
        let Some(p) = &self.persistence else {
            return;
        };
        write_best_effort(p.store.as_ref(), &p.key, || Ok(self.state.to_json()?));
    }
}

/// A saved state under `key`, if present and well-formed.
pub(crate) fn restore_state(store: &dyn KeyValueStore, key: &str) -> Option<QuizState> {
    let json = read_or_none(store, key)?;
    parse_saved_state(&json, key)
}

pub(crate) fn parse_saved_state(json: &str, key: &str) -> Option<QuizState> {
    match QuizState::from_json(json) {
        Ok(state) if !state.questions.is_empty() => Some(state),
        Ok(_) => {
            tracing::warn!(key, "saved session has no questions, starting fresh");
            None
        }
        Err(e) => {
            tracing::warn!(key, "saved session is unreadable, starting fresh: {e}");
            None
        }
    }
}
