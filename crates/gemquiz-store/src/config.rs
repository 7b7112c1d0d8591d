//! User configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use gemquiz_core::generator::GenerateOptions;
use gemquiz_core::model::{QuizConfig, QuizMode};
use gemquiz_core::scoring::DEFAULT_PASSING_SCORE;
use gemquiz_core::session::DEFAULT_TIME_LIMIT_SECS;

/// Top-level gemquiz configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GemquizConfig {
    /// Where sessions and progress are saved.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Pass mark in percent.
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    #[serde(default = "default_exam_time_limit")]
    pub exam_time_limit_secs: u32,
    /// Cap on questions of one kind per content section.
    #[serde(default = "default_max_per_section")]
    pub max_per_section: usize,
    #[serde(default = "default_true")]
    pub auto_submit_on_timeout: bool,
    #[serde(default = "default_true")]
    pub shuffle_questions: bool,
    #[serde(default = "default_true")]
    pub shuffle_options: bool,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./.gemquiz")
}
fn default_passing_score() -> u32 {
    DEFAULT_PASSING_SCORE
}
fn default_question_count() -> usize {
    10
}
fn default_exam_time_limit() -> u32 {
    DEFAULT_TIME_LIMIT_SECS
}
fn default_max_per_section() -> usize {
    5
}
fn default_true() -> bool {
    true
}

impl Default for GemquizConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            passing_score: default_passing_score(),
            question_count: default_question_count(),
            exam_time_limit_secs: default_exam_time_limit(),
            max_per_section: default_max_per_section(),
            auto_submit_on_timeout: true,
            shuffle_questions: true,
            shuffle_options: true,
        }
    }
}

impl GemquizConfig {
    /// Session config for `mode`, before any per-run category or difficulty filter.
    pub fn quiz_config(&self, mode: QuizMode) -> QuizConfig {
        QuizConfig {
            question_count: self.question_count,
            time_limit: (mode == QuizMode::Exam).then_some(self.exam_time_limit_secs),
            shuffle_questions: self.shuffle_questions,
            shuffle_options: self.shuffle_options,
            mode,
            ..QuizConfig::default()
        }
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            max_per_section: self.max_per_section,
            ..GenerateOptions::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.passing_score > 100 {
            anyhow::bail!("passing_score must be at most 100, got {}", self.passing_score);
        }
        if self.question_count == 0 {
            anyhow::bail!("question_count must be at least 1");
        }
        if self.exam_time_limit_secs == 0 {
            anyhow::bail!("exam_time_limit_secs must be at least 1");
        }
        Ok(())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables expand to the empty string.
pub fn resolve_env_vars(s: &str) -> String {
    expand_vars(s, |name| std::env::var(name).ok())
}

/// Expansions are not rescanned, so a value containing `${` is kept as-is.
fn expand_vars(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&lookup(&rest[start + 2..start + end]).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Apply `GEMQUIZ_DATA_DIR` and `GEMQUIZ_PASSING_SCORE` as found by `lookup`.
fn apply_overrides(config: &mut GemquizConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = lookup("GEMQUIZ_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(raw) = lookup("GEMQUIZ_PASSING_SCORE") {
        match raw.trim().parse() {
            Ok(score) => config.passing_score = score,
            Err(_) => tracing::warn!("ignoring GEMQUIZ_PASSING_SCORE={raw:?}: not a number"),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `gemquiz.toml` in the current directory
/// 2. `~/.config/gemquiz/config.toml`
///
/// Environment variable overrides: `GEMQUIZ_DATA_DIR`, `GEMQUIZ_PASSING_SCORE`.
pub fn load_config() -> Result<GemquizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GemquizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gemquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GemquizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GemquizConfig::default(),
    };

    apply_overrides(&mut config, |name| std::env::var(name).ok());

    let data_dir = config.data_dir.to_string_lossy().into_owned();
    config.data_dir = PathBuf::from(resolve_env_vars(&data_dir));

    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gemquiz"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_GEMQUIZ_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_GEMQUIZ_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_GEMQUIZ_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${_GEMQUIZ_SURELY_UNSET}/x"), "/x");
        assert_eq!(resolve_env_vars("${unterminated"), "${unterminated");
        std::env::remove_var("_GEMQUIZ_TEST_VAR");
    }

    #[test]
    fn expanded_values_are_not_rescanned() {
        let vars: HashMap<&str, &str> =
            HashMap::from([("A", "${A}"), ("B", "${"), ("HOME", "/home/me")]);
        let lookup = |name: &str| vars.get(name).map(|v| v.to_string());
        assert_eq!(expand_vars("${A}/x", lookup), "${A}/x");
        assert_eq!(expand_vars("${B}A}", lookup), "${A}");
        assert_eq!(expand_vars("${HOME}/${HOME}", lookup), "/home/me//home/me");
    }

    #[test]
    fn default_config() {
        let config = GemquizConfig::default();
        assert_eq!(config.passing_score, 70);
        assert_eq!(config.question_count, 10);
        assert_eq!(config.exam_time_limit_secs, 1800);
        assert!(config.auto_submit_on_timeout);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gemquiz.toml");
        std::fs::write(
            &path,
            "passing_score = 75\nquestion_count = 20\nshuffle_options = false\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.question_count, 20);
        assert!(!config.shuffle_options);
        assert!(config.shuffle_questions);
        assert_eq!(config.max_per_section, 5);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn out_of_range_passing_score_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gemquiz.toml");
        std::fs::write(&path, "passing_score = 120\n").unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }

    #[test]
    fn zero_exam_time_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gemquiz.toml");
        std::fs::write(&path, "exam_time_limit_secs = 0\n").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("exam_time_limit_secs"));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GEMQUIZ_DATA_DIR", "/tmp/gq"),
            ("GEMQUIZ_PASSING_SCORE", "85"),
        ]);
        let mut config = GemquizConfig::default();
        apply_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/gq"));
        assert_eq!(config.passing_score, 85);

        let mut config = GemquizConfig::default();
        apply_overrides(&mut config, |k| {
            (k == "GEMQUIZ_PASSING_SCORE").then(|| "lots".to_string())
        });
        assert_eq!(config.passing_score, 70);
    }

    #[test]
    fn quiz_config_only_times_exams() {
        let config = GemquizConfig {
            exam_time_limit_secs: 600,
            ..GemquizConfig::default()
        };
        assert_eq!(config.quiz_config(QuizMode::Practice).time_limit, None);
        let exam = config.quiz_config(QuizMode::Exam);
        assert_eq!(exam.time_limit, Some(600));
        assert_eq!(exam.mode, QuizMode::Exam);
    }
}
