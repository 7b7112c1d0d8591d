//! The `gemquiz reset` command.

use std::path::PathBuf;

use anyhow::Result;

use gemquiz_core::model::Category;
use gemquiz_core::progress::reset_category;
use gemquiz_core::storage::{load_progress, save_progress};
use gemquiz_store::load_config_from;

use super::open_store;

pub fn execute(category: String, config_path: Option<PathBuf>) -> Result<()> {
    let category: Category = category.parse().map_err(anyhow::Error::msg)?;
    let config = load_config_from(config_path.as_deref())?;
    let store = open_store(&config)?;

    let progress = reset_category(&load_progress(store.as_ref()), category);
    save_progress(store.as_ref(), &progress);
    println!("Progress for {category} cleared.");
    Ok(())
}
