//! End-to-end pipeline tests across the library crates.
//!
//! These drive content loading, generation, selection, sessions, scoring, and
//! progress together, with real file-backed storage where persistence matters.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use gemquiz_core::content::{count_topics, load_content};
use gemquiz_core::generator::{check_answer, generate_questions, select_questions, GenerateOptions};
use gemquiz_core::model::{Answer, Category, Difficulty, Question, QuestionType, QuizConfig};
use gemquiz_core::progress::{get_study_suggestions, has_category_mastery, update_progress, UserProgress};
use gemquiz_core::scoring::{get_grade, get_pass_status, Grade, DEFAULT_PASSING_SCORE};
use gemquiz_core::session::{ExamSession, ExamTimer, QuizSession};
use gemquiz_core::storage::{load_progress, save_progress, KeyValueStore, QUIZ_STATE_KEY};
use gemquiz_store::FileStore;

fn sample_content() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../content")
}

fn make_question(id: &str, category: Category, topic: &str) -> Question {
    Question {
        id: id.into(),
        question_type: QuestionType::MultipleChoice,
        difficulty: Difficulty::Beginner,
        category,
        topic: topic.into(),
        question_text: format!("Question {id}?"),
        options: vec![
            "Diamond".into(),
            "Corundum".into(),
            "Topaz".into(),
            "Quartz".into(),
        ],
        correct_answer: "Corundum".into(),
        explanation: None,
        source_ref: None,
        matching_pairs: vec![],
    }
}

/// Fundamentals, 5 of a pool of 8, four right and one skipped: 80%, grade B, passed.
#[test]
fn e2e_practice_scenario() {
    let mut pool: Vec<Question> = (0..8)
        .map(|i| make_question(&format!("f{i}"), Category::Fundamentals, &format!("Topic {}", i % 4)))
        .collect();
    pool.extend((0..4).map(|i| make_question(&format!("s{i}"), Category::Species, "Beryl")));

    let config = QuizConfig {
        categories: vec![Category::Fundamentals],
        question_count: 5,
        ..QuizConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(11);
    let selected = select_questions(&pool, &config, &mut rng);
    assert_eq!(selected.len(), 5);
    assert!(selected.iter().all(|q| q.category == Category::Fundamentals));

    let mut session = QuizSession::new(selected, config);
    for _ in 0..4 {
        session.select_answer("corundum");
        session.next_question();
    }
    assert_eq!(session.live_score(), 4);

    let result = session.submit_quiz().clone();
    assert_eq!(result.score, 4);
    assert_eq!(result.total_questions, 5);
    assert_eq!(result.percentage, 80);
    assert_eq!(get_grade(result.percentage), Grade::B);
    assert!(get_pass_status(result.percentage, DEFAULT_PASSING_SCORE).passed);
    assert_eq!(result.question_results[4].user_answer, None);

    let progress = update_progress(&UserProgress::default(), &result);
    assert_eq!(progress.best_scores.get(&Category::Fundamentals), Some(&80));
    assert_eq!(progress.total_correct, 4);
    assert_eq!(progress.total_attempted, 5);
    let completed = &progress.completed_topics[&Category::Fundamentals];
    assert!(!completed.is_empty());
}

#[test]
fn e2e_generated_pool_answers_itself() {
    let entries = load_content(&sample_content()).unwrap();
    assert_eq!(entries.len(), 3);

    let mut rng = StdRng::seed_from_u64(3);
    let pool = generate_questions(&entries, &GenerateOptions::default(), &mut rng);
    assert!(!pool.is_empty());

    for kind in [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::Matching,
        QuestionType::FillBlank,
    ] {
        assert!(pool.iter().any(|q| q.question_type == kind), "no {kind} questions");
    }

    let ids: std::collections::HashSet<&str> = pool.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids.len(), pool.len());

    for q in &pool {
        let answer = match &q.correct_answer {
            Answer::Multiple(list) if q.question_type == QuestionType::FillBlank => {
                Answer::Single(list[0].clone())
            }
            other => other.clone(),
        };
        assert!(check_answer(q, &answer), "{} rejects its own answer", q.id);
    }
}

#[test]
fn e2e_progress_and_suggestions_from_content() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();

    let entries = load_content(&sample_content()).unwrap();
    let topics = count_topics(&entries);
    assert_eq!(topics.get(&Category::Species), Some(&1));

    let mut rng = StdRng::seed_from_u64(8);
    let pool = generate_questions(&entries, &GenerateOptions::default(), &mut rng);
    let config = QuizConfig {
        categories: vec![Category::Species],
        question_count: 3,
        ..QuizConfig::default()
    };
    let questions = select_questions(&pool, &config, &mut rng);

    let mut session = QuizSession::new(questions, config);
    for _ in 0..3 {
        let answer = session
            .current_question()
            .map(|q| q.correct_answer.clone())
            .unwrap();
        let answer = match answer {
            Answer::Multiple(list) => Answer::Single(list[0].clone()),
            single => single,
        };
        session.select_answer(answer);
        session.next_question();
    }
    let result = session.submit_quiz().clone();
    assert_eq!(result.percentage, 100);

    save_progress(&store, &update_progress(&load_progress(&store), &result));
    let progress = load_progress(&store);
    assert!(has_category_mastery(&progress, Category::Species, 1));

    let suggestions = get_study_suggestions(&progress, &topics);
    let order: Vec<Category> = suggestions.iter().map(|s| s.category).collect();
    assert_eq!(
        order,
        vec![Category::Fundamentals, Category::Phenomena, Category::Species]
    );
    assert_eq!(suggestions[2].priority, 0.0);
}

#[test]
fn e2e_session_resumes_across_stores() {
    let dir = tempfile::tempdir().unwrap();
    let questions: Vec<Question> = (0..3)
        .map(|i| make_question(&format!("q{i}"), Category::Species, "Corundum"))
        .collect();

    {
        let store = Arc::new(FileStore::new(dir.path()));
        let mut session = QuizSession::new(questions.clone(), QuizConfig::default()).with_store(store);
        session.select_answer("Corundum");
        session.go_to_question(2);
    }

    let store = Arc::new(FileStore::new(dir.path()));
    let mut resumed = QuizSession::new(vec![], QuizConfig::default()).with_store(store.clone());
    assert_eq!(resumed.question_count(), 3);
    assert_eq!(resumed.current_index(), 2);
    assert_eq!(resumed.answered_count(), 1);

    resumed.submit_quiz();
    assert_eq!(store.get(QUIZ_STATE_KEY).unwrap(), None);
}

#[test]
fn e2e_corrupt_saved_session_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));
    store.set(QUIZ_STATE_KEY, "not json").unwrap();

    let questions: Vec<Question> = (0..2)
        .map(|i| make_question(&format!("q{i}"), Category::Equipment, "Refractometer"))
        .collect();
    let session = QuizSession::new(questions, QuizConfig::default()).with_store(store);
    assert_eq!(session.question_count(), 2);
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.answered_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn e2e_exam_auto_submits_on_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::new(dir.path()));
    let questions: Vec<Question> = (0..4)
        .map(|i| make_question(&format!("q{i}"), Category::Identification, "Spectroscope"))
        .collect();
    let config = QuizConfig {
        time_limit: Some(2),
        ..QuizConfig::default()
    };

    let exam = ExamSession::new(questions, config).with_store(store.clone());
    let shared = Arc::new(Mutex::new(exam));
    shared.lock().unwrap().select_answer("Corundum");
    assert!(store.get(gemquiz_core::storage::EXAM_STATE_KEY).unwrap().is_some());

    let mut timer = ExamTimer::new(Arc::clone(&shared));
    timer.start();
    tokio::time::sleep(Duration::from_millis(2500)).await;

    let exam = shared.lock().unwrap();
    assert_eq!(exam.time_remaining(), 0);
    assert!(exam.is_complete());
    let result = exam.results().unwrap();
    assert_eq!(result.score, 1);
    assert_eq!(result.total_questions, 4);
    assert_eq!(result.percentage, 25);
    assert!(store.get(gemquiz_core::storage::EXAM_STATE_KEY).unwrap().is_none());
}
