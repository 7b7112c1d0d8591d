//! The `gemquiz progress` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;

use gemquiz_core::content::{count_topics, load_content};
use gemquiz_core::model::Category;
use gemquiz_core::progress::{calculate_streak, get_study_suggestions, has_category_mastery};
use gemquiz_core::storage::load_progress;
use gemquiz_store::load_config_from;

use super::open_store;

pub fn execute(content_path: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<()> {
    use comfy_table::{Cell, Table};

    let config = load_config_from(config_path.as_deref())?;
    let store = open_store(&config)?;
    let progress = load_progress(store.as_ref());

    let topic_counts: BTreeMap<Category, usize> = match &content_path {
        Some(path) => count_topics(&load_content(path)?),
        None => BTreeMap::new(),
    };

    if progress.total_quizzes == 0 {
        println!("No sessions recorded yet.");
    } else {
        let streak = calculate_streak(&progress.activity);
        println!(
            "Sessions: {}  Questions: {}  Accuracy: {}%",
            progress.total_quizzes,
            progress.total_attempted,
            progress.overall_accuracy()
        );
        println!(
            "Streak: {} day(s), longest {} day(s)",
            streak.current_streak, streak.longest_streak
        );
        if let Some(last) = progress.last_activity {
            println!("Last session: {}", last.format("%Y-%m-%d %H:%M UTC"));
        }
    }

    let mut table = Table::new();
    table.set_header(vec!["Category", "Best", "Topics completed", "Mastered"]);
    for category in Category::ALL {
        let best = progress.best_scores.get(&category);
        let completed = progress
            .completed_topics
            .get(&category)
            .map_or(0, |t| t.len());
        let total = topic_counts.get(&category).copied();
        if best.is_none() && total.is_none() {
            continue;
        }
        let topics = match total {
            Some(total) => format!("{completed}/{total}"),
            None => completed.to_string(),
        };
        let mastered = match total {
            Some(total) if has_category_mastery(&progress, category, total) => "yes",
            Some(_) => "no",
            None => "-",
        };
        table.add_row(vec![
            Cell::new(category),
            Cell::new(best.map_or_else(|| "-".to_string(), |b| format!("{b}%"))),
            Cell::new(topics),
            Cell::new(mastered),
        ]);
    }
    println!("\n{table}");

    let suggestions = get_study_suggestions(&progress, &topic_counts);
    if !suggestions.is_empty() {
        println!("\nStudy next:");
        for s in &suggestions {
            println!("  {} - {}", s.category, s.reason);
        }
    }

    Ok(())
}
