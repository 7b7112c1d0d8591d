//! The `gemquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use gemquiz_core::content::{count_topics, load_content, validate_entries};

pub fn execute(content_path: PathBuf) -> Result<()> {
    let entries = load_content(&content_path)?;
    println!("Loaded {} entries", entries.len());

    let warnings = validate_entries(&entries);
    for entry in &entries {
        println!(
            "Entry: {} [{} | {}] ({} sections)",
            entry.data.title,
            entry.data.category,
            entry.difficulty(),
            entry.data.sections.len()
        );
        for w in warnings.iter().filter(|w| w.entry_id == entry.id) {
            let prefix = w
                .section
                .as_ref()
                .map(|s| format!("  [{s}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
    }

    let topics = count_topics(&entries);
    let summary: Vec<String> = topics.iter().map(|(c, n)| format!("{c}: {n}")).collect();
    if !summary.is_empty() {
        println!("Topics per category: {}", summary.join(", "));
    }

    if warnings.is_empty() {
        println!("All content valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
