//! Study content input types, loading, and validation.
//!
//! Content entries are authored as TOML or JSON files, one entry per file.
//! The generator only ever sees the types in this module.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::{Category, Difficulty};

/// One piece of study content (a guide page, a reference sheet, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub id: String,
    pub data: ContentData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentData {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A titled block of content. Any combination of the optional parts may be present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub table: Option<Table>,
    #[serde(default)]
    pub comparison: Option<Comparison>,
    #[serde(default)]
    pub subsections: Vec<Section>,
}

/// A named fact, e.g. `Hardness = 10`, optionally with examples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

/// A table whose first column names the subject of each row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Named groups of short distinguishing points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(default)]
    pub groups: Vec<ComparisonGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonGroup {
    pub title: String,
    #[serde(default)]
    pub points: Vec<String>,
}

impl ContentEntry {
    /// Difficulty with the default applied for entries that omit it.
    pub fn difficulty(&self) -> Difficulty {
        self.data.difficulty.unwrap_or_default()
    }
}

/// Parse one content file; `.json` is read as JSON, anything else as TOML.
pub fn load_entry(path: &Path) -> Result<ContentEntry> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read content file: {}", path.display()))?;

    let is_json = path.extension().is_some_and(|ext| ext == "json");
    if is_json {
        parse_entry_json(&content, path)
    } else {
        parse_entry_toml(&content, path)
    }
}

/// Parse a TOML string into a `ContentEntry` (useful for testing).
pub fn parse_entry_toml(content: &str, source_path: &Path) -> Result<ContentEntry> {
    toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))
}

/// Parse a JSON string into a `ContentEntry`.
pub fn parse_entry_json(content: &str, source_path: &Path) -> Result<ContentEntry> {
    serde_json::from_str(content)
        .with_context(|| format!("failed to parse JSON: {}", source_path.display()))
}

/// Recursively load every `.toml` and `.json` entry under `dir`.
///
/// Files that fail to parse are skipped with a warning. Entries are returned
/// sorted by id so generation over a directory is reproducible.
pub fn load_content_directory(dir: &Path) -> Result<Vec<ContentEntry>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = Vec::new();
    collect_entries(dir, &mut entries)?;
    entries.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(entries)
}

fn collect_entries(dir: &Path, entries: &mut Vec<ContentEntry>) -> Result<()> {
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_entries(&path, entries)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "json")
        {
            match load_entry(&path) {
                Ok(e) => entries.push(e),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }
    Ok(())
}

/// Load a single file or a whole directory.
pub fn load_content(path: &Path) -> Result<Vec<ContentEntry>> {
    if path.is_dir() {
        load_content_directory(path)
    } else {
        Ok(vec![load_entry(path)?])
    }
}

/// Number of distinct topic titles per category.
pub fn count_topics(entries: &[ContentEntry]) -> BTreeMap<Category, usize> {
    let mut topics: BTreeMap<Category, BTreeSet<&str>> = BTreeMap::new();
    for entry in entries {
        topics
            .entry(entry.data.category)
            .or_default()
            .insert(entry.data.title.as_str());
    }
    topics.into_iter().map(|(c, t)| (c, t.len())).collect()
}

/// A warning from content validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The entry ID.
    pub entry_id: String,
    /// Section path, if the warning concerns one section.
    pub section: Option<String>,
    pub message: String,
}

/// Check entries for content that will produce few or no questions.
pub fn validate_entries(entries: &[ContentEntry]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for entry in entries {
        if !seen_ids.insert(&entry.id) {
            warnings.push(ValidationWarning {
                entry_id: entry.id.clone(),
                section: None,
                message: format!("duplicate entry ID: {}", entry.id),
            });
        }
    }

    for entry in entries {
        if entry.data.title.trim().is_empty() {
            warnings.push(ValidationWarning {
                entry_id: entry.id.clone(),
                section: None,
                message: "title is empty".into(),
            });
        }
        if entry.data.sections.is_empty() {
            warnings.push(ValidationWarning {
                entry_id: entry.id.clone(),
                section: None,
                message: "entry has no sections".into(),
            });
        }
        for section in &entry.data.sections {
            validate_section(entry, section, &section.title, &mut warnings);
        }
    }

    warnings
}

fn validate_section(
    entry: &ContentEntry,
    section: &Section,
    path: &str,
    warnings: &mut Vec<ValidationWarning>,
) {
    let mut warn = |message: String| {
        warnings.push(ValidationWarning {
            entry_id: entry.id.clone(),
            section: Some(path.to_string()),
            message,
        })
    };

    let has_material = !section.items.is_empty()
        || section.table.as_ref().is_some_and(|t| !t.rows.is_empty())
        || section.comparison.is_some();
    if !has_material && section.subsections.is_empty() {
        warn("section has no items, table, comparison, or subsections".into());
    }

    if let Some(table) = &section.table {
        if table.headers.len() < 2 {
            warn("table needs at least two columns".into());
        }
        for (i, row) in table.rows.iter().enumerate() {
            if row.len() != table.headers.len() {
                warn(format!(
                    "table row {} has {} cells, expected {}",
                    i + 1,
                    row.len(),
                    table.headers.len()
                ));
            }
        }
    }

    if let Some(comparison) = &section.comparison {
        if comparison.groups.len() < 2 {
            warn("comparison needs at least two groups".into());
        }
    }

    for item in &section.items {
        if item.value.is_none() && item.examples.is_empty() {
            warn(format!("item '{}' has neither a value nor examples", item.name));
        }
    }

    for sub in &section.subsections {
        let sub_path = format!("{path} / {}", sub.title);
        validate_section(entry, sub, &sub_path, warnings);
    }
}
