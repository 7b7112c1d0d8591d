//! gemquiz CLI: practice quizzes and timed exams from gemmology study notes.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod prompt;

#[derive(Parser)]
#[command(name = "gemquiz", version, about = "Gemmology quiz and exam trainer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config and a sample content entry
    Init,

    /// Check content files for problems
    Validate {
        /// Content file or directory
        #[arg(long)]
        content: PathBuf,
    },

    /// Generate the question pool from content
    Generate {
        /// Content file or directory
        #[arg(long)]
        content: PathBuf,

        /// Categories to include (comma-separated, default: all)
        #[arg(long)]
        category: Option<String>,

        /// Only this difficulty: beginner, intermediate, advanced
        #[arg(long)]
        difficulty: Option<String>,

        /// Cap on questions of each kind per section
        #[arg(long)]
        max_per_section: Option<usize>,

        /// Seed for reproducible generation
        #[arg(long)]
        seed: Option<u64>,

        /// Write the pool to this JSON file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Start (or resume) a practice session
    Practice {
        /// Content file or directory
        #[arg(long)]
        content: PathBuf,

        /// Categories to include (comma-separated, default: all)
        #[arg(long)]
        category: Option<String>,

        /// Only this difficulty: beginner, intermediate, advanced
        #[arg(long)]
        difficulty: Option<String>,

        /// Number of questions
        #[arg(long)]
        count: Option<usize>,

        /// Seed for reproducible selection
        #[arg(long)]
        seed: Option<u64>,

        /// Discard any saved session and start over
        #[arg(long)]
        fresh: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Start (or resume) a timed exam
    Exam {
        /// Content file or directory
        #[arg(long)]
        content: PathBuf,

        /// Categories to include (comma-separated, default: all)
        #[arg(long)]
        category: Option<String>,

        /// Only this difficulty: beginner, intermediate, advanced
        #[arg(long)]
        difficulty: Option<String>,

        /// Number of questions
        #[arg(long)]
        count: Option<usize>,

        /// Time limit in seconds
        #[arg(long)]
        time_limit: Option<u32>,

        /// Seed for reproducible selection
        #[arg(long)]
        seed: Option<u64>,

        /// Discard any saved exam and start over
        #[arg(long)]
        fresh: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show best scores, mastery, streaks, and what to study next
    Progress {
        /// Content file or directory, used to count topics per category
        #[arg(long)]
        content: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Clear progress for one category
    Reset {
        /// Category to reset
        #[arg(long)]
        category: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gemquiz=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { content } => commands::validate::execute(content),
        Commands::Generate {
            content,
            category,
            difficulty,
            max_per_section,
            seed,
            output,
            config,
        } => commands::generate::execute(
            content,
            category,
            difficulty,
            max_per_section,
            seed,
            output,
            config,
        ),
        Commands::Practice {
            content,
            category,
            difficulty,
            count,
            seed,
            fresh,
            config,
        } => commands::practice::execute(content, category, difficulty, count, seed, fresh, config),
        Commands::Exam {
            content,
            category,
            difficulty,
            count,
            time_limit,
            seed,
            fresh,
            config,
        } => {
            commands::exam::execute(
                content, category, difficulty, count, time_limit, seed, fresh, config,
            )
            .await
        }
        Commands::Progress { content, config } => commands::progress::execute(content, config),
        Commands::Reset { category, config } => commands::reset::execute(category, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
