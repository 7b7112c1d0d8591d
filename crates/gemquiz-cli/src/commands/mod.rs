//! Subcommand implementations and the helpers they share.

pub mod exam;
pub mod generate;
pub mod init;
pub mod practice;
pub mod progress;
pub mod reset;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use gemquiz_core::content::load_content;
use gemquiz_core::generator::{generate_questions, select_questions};
use gemquiz_core::model::{Category, Difficulty, Question, QuizConfig, QuizResult};
use gemquiz_core::progress::{update_progress, UserProgress};
use gemquiz_core::scoring::{format_duration, get_grade, get_pass_status, get_wrong_answer_stats};
use gemquiz_core::storage::{load_progress, save_progress, KeyValueStore};
use gemquiz_store::{FileStore, GemquizConfig};

/// Parse a comma-separated category list. `None` means all categories.
pub(crate) fn parse_categories(raw: Option<&str>) -> Result<Vec<Category>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<Category>().map_err(anyhow::Error::msg))
        .collect()
}

pub(crate) fn parse_difficulty(raw: Option<&str>) -> Result<Option<Difficulty>> {
    raw.map(|s| s.parse::<Difficulty>().map_err(anyhow::Error::msg))
        .transpose()
}

pub(crate) fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub(crate) fn open_store(config: &GemquizConfig) -> Result<Arc<FileStore>> {
    let store = FileStore::open(&config.data_dir).with_context(|| {
        format!("failed to open data directory: {}", config.data_dir.display())
    })?;
    Ok(Arc::new(store))
}

/// Generate a pool from `content` and select a session's questions from it.
pub(crate) fn build_questions(
    content: &Path,
    config: &GemquizConfig,
    quiz_config: &QuizConfig,
    rng: &mut StdRng,
) -> Result<Vec<Question>> {
    let entries = load_content(content)?;
    let mut options = config.generate_options();
    options.categories = quiz_config.categories.clone();
    options.difficulty = quiz_config.difficulty;

    let pool = generate_questions(&entries, &options, rng);
    let questions = select_questions(&pool, quiz_config, rng);
    anyhow::ensure!(
        !questions.is_empty(),
        "no questions matched the selected categories and difficulty"
    );
    tracing::debug!(
        pool = pool.len(),
        selected = questions.len(),
        "questions selected"
    );
    Ok(questions)
}

/// Fold `result` into saved progress and return the new totals.
pub(crate) fn record_progress(store: &dyn KeyValueStore, result: &QuizResult) -> UserProgress {
    let progress = update_progress(&load_progress(store), result);
    save_progress(store, &progress);
    progress
}

/// Print the score, grade, category breakdown, and a review of missed questions.
pub(crate) fn print_results(result: &QuizResult, questions: &[Question], passing_score: u32) {
    use comfy_table::{Cell, Table};

    let grade = get_grade(result.percentage);
    let status = get_pass_status(result.percentage, passing_score);

    println!(
        "\nScore: {}/{} ({}%)  Grade: {grade}  Time: {}",
        result.score,
        result.total_questions,
        result.percentage,
        format_duration(result.time_taken_ms)
    );
    println!("{}", status.message);

    let mut table = Table::new();
    table.set_header(vec!["Category", "Correct", "Total", "Score"]);
    for b in &result.breakdown {
        table.add_row(vec![
            Cell::new(b.category),
            Cell::new(b.correct),
            Cell::new(b.total),
            Cell::new(format!("{}%", b.percentage)),
        ]);
    }
    println!("\n{table}");

    let missed: Vec<_> = result
        .question_results
        .iter()
        .filter(|r| !r.is_correct)
        .collect();
    if missed.is_empty() {
        return;
    }

    println!("\nReview:");
    for r in missed {
        let Some(q) = questions.iter().find(|q| q.id == r.question_id) else {
            continue;
        };
        let given = r
            .user_answer
            .as_ref()
            .map_or_else(|| "(unanswered)".to_string(), |a| a.to_string());
        println!("  x {}", q.question_text);
        println!("    your answer: {given} | correct: {}", r.correct_answer);
        if let Some(explanation) = &q.explanation {
            println!("    {explanation}");
        }
    }

    let stats = get_wrong_answer_stats(&result.question_results);
    let weakest: Vec<String> = stats
        .weakest_topics()
        .into_iter()
        .take(3)
        .map(|(topic, n)| format!("{topic} ({n})"))
        .collect();
    println!("\nTopics to revisit: {}", weakest.join(", "));
}
