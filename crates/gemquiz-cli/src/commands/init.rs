//! The `gemquiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("gemquiz.toml").exists() {
        println!("gemquiz.toml already exists, skipping.");
    } else {
        std::fs::write("gemquiz.toml", SAMPLE_CONFIG)?;
        println!("Created gemquiz.toml");
    }

    std::fs::create_dir_all("content")?;
    let example_path = std::path::Path::new("content/example.toml");
    if example_path.exists() {
        println!("content/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_CONTENT)?;
        println!("Created content/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Add study notes under content/");
    println!("  2. Run: gemquiz validate --content content");
    println!("  3. Run: gemquiz practice --content content");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gemquiz configuration

data_dir = "./.gemquiz"
passing_score = 70
question_count = 10
exam_time_limit_secs = 1800
max_per_section = 5
auto_submit_on_timeout = true
shuffle_questions = true
shuffle_options = true
"#;

const EXAMPLE_CONTENT: &str = r#"id = "beryl"

[data]
title = "Beryl"
description = "Beryllium aluminium silicate: emerald, aquamarine, and friends."
category = "species"
difficulty = "beginner"

[[data.sections]]
title = "Varieties"

[data.sections.table]
headers = ["Variety", "Colour", "Chromophore"]
rows = [
    ["Emerald", "Green", "Chromium or vanadium"],
    ["Aquamarine", "Blue", "Iron"],
    ["Morganite", "Pink", "Manganese"],
    ["Heliodor", "Yellow", "Iron (ferric)"],
]

[[data.sections]]
title = "Properties"

[[data.sections.items]]
name = "crystal system"
value = "Hexagonal"

[[data.sections.items]]
name = "Mohs hardness"
value = "7.5-8"

[[data.sections.items]]
name = "refractive index"
value = "1.577-1.583"

[[data.sections.items]]
name = "beryl variety"
examples = ["Emerald", "Aquamarine", "Morganite"]
"#;
