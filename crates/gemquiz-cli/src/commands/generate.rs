//! The `gemquiz generate` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use gemquiz_core::content::load_content;
use gemquiz_core::generator::generate_questions;
use gemquiz_core::model::{Category, Question, QuestionType};
use gemquiz_store::load_config_from;

use super::{make_rng, parse_categories, parse_difficulty};

#[allow(clippy::too_many_arguments)]
pub fn execute(
    content_path: PathBuf,
    category: Option<String>,
    difficulty: Option<String>,
    max_per_section: Option<usize>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut options = config.generate_options();
    options.categories = parse_categories(category.as_deref())?;
    options.difficulty = parse_difficulty(difficulty.as_deref())?;
    if let Some(max) = max_per_section {
        anyhow::ensure!(max >= 1, "max-per-section must be at least 1");
        options.max_per_section = max;
    }

    let entries = load_content(&content_path)?;
    let mut rng = make_rng(seed);
    let pool = generate_questions(&entries, &options, &mut rng);

    println!(
        "Generated {} questions from {} entries",
        pool.len(),
        entries.len()
    );
    print_summary(&pool);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&pool)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write question pool: {}", path.display()))?;
        println!("Question pool saved to: {}", path.display());
    }

    Ok(())
}

fn print_summary(pool: &[Question]) {
    use comfy_table::{Cell, Table};

    const KINDS: [QuestionType; 4] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
        QuestionType::Matching,
        QuestionType::FillBlank,
    ];

    let mut counts: BTreeMap<Category, [usize; 4]> = BTreeMap::new();
    for q in pool {
        let row = counts.entry(q.category).or_default();
        if let Some(i) = KINDS.iter().position(|k| *k == q.question_type) {
            row[i] += 1;
        }
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Category",
        "Multiple choice",
        "True/false",
        "Matching",
        "Fill blank",
        "Total",
    ]);
    for (category, row) in &counts {
        let mut cells = vec![Cell::new(category)];
        cells.extend(row.iter().map(Cell::new));
        cells.push(Cell::new(row.iter().sum::<usize>()));
        table.add_row(cells);
    }

    println!("\n{table}");
}
