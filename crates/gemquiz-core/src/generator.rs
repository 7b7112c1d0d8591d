//! Question generation from structured content.
//!
//! Turns content entries into a pool of typed questions:
//! - tables become multiple-choice questions in both directions
//!   (subject → property and property → subject)
//! - items with values become fill-in and true/false questions
//! - items with examples become "name one example" fill-in questions
//! - comparison blocks become a matching question plus
//!   "which group does this belong to" multiple-choice questions
//!
//! Material that cannot support a question (too few distinct distractors,
//! blank values) is skipped silently; a short pool is a valid outcome.

use std::collections::HashSet;

use rand::Rng;

use crate::content::{Comparison, ContentEntry, Item, Section, Table};
use crate::model::{
    Answer, Category, Difficulty, MatchingPair, Question, QuestionType, QuizConfig,
};
use crate::shuffle::{generate_wrong_answers, normalize, pick, shuffle};

/// Distractors offered next to the correct answer.
const DISTRACTOR_COUNT: usize = 3;
/// Fewer distractors than this and the question is skipped.
const MIN_DISTRACTORS: usize = 2;
/// Table cells shorter than this do not make usable answers.
const MIN_TABLE_VALUE_LEN: usize = 2;

const TRUE: &str = "True";
const FALSE: &str = "False";

/// Filters and limits applied during generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    /// Categories to generate for; empty means all.
    pub categories: Vec<Category>,
    pub difficulty: Option<Difficulty>,
    /// Cap on questions of each kind drawn from one section.
    pub max_per_section: usize,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            difficulty: None,
            max_per_section: 5,
        }
    }
}

impl GenerateOptions {
    fn accepts(&self, entry: &ContentEntry) -> bool {
        let category_ok =
            self.categories.is_empty() || self.categories.contains(&entry.data.category);
        let difficulty_ok = self
            .difficulty
            .map_or(true, |d| d == entry.difficulty());
        category_ok && difficulty_ok
    }
}

/// Build the question pool for `entries`.
///
/// Output is reproducible for a seeded `rng`. Entries sharing an id get
/// numbered id prefixes (`hardness`, `hardness-2`, ...) so question ids stay
/// unique across the pool.
pub fn generate_questions<R: Rng + ?Sized>(
    entries: &[ContentEntry],
    options: &GenerateOptions,
    rng: &mut R,
) -> Vec<Question> {
    let mut pool = Vec::new();
    let mut prefixes = HashSet::new();

    for entry in entries.iter().filter(|e| options.accepts(e)) {
        let prefix = unique_prefix(&entry.id, &mut prefixes);
        if prefix != entry.id {
            tracing::warn!(entry = %entry.id, %prefix, "duplicate entry id");
        }
        let mut builder = EntryBuilder {
            entry,
            prefix,
            max_per_section: options.max_per_section,
            next_id: 0,
            out: Vec::new(),
        };
        for section in &entry.data.sections {
            builder.section(section, &section.title, rng);
        }
        tracing::debug!(
            entry = %entry.id,
            generated = builder.out.len(),
            "generated questions"
        );
        pool.extend(builder.out);
    }

    pool
}

fn unique_prefix(id: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = id.to_string();
    let mut n = 1;
    while !used.insert(candidate.clone()) {
        n += 1;
        candidate = format!("{id}-{n}");
    }
    candidate
}

/// Per-entry generation state: id counter and output.
struct EntryBuilder<'a> {
    entry: &'a ContentEntry,
    prefix: String,
    max_per_section: usize,
    next_id: usize,
    out: Vec<Question>,
}

/// Question fields that vary by generator; the rest come from the entry.
struct Draft {
    question_type: QuestionType,
    text: String,
    options: Vec<String>,
    correct: Answer,
    explanation: Option<String>,
    matching_pairs: Vec<MatchingPair>,
}

impl Draft {
    fn choice(text: String, options: Vec<String>, correct: String, explanation: String) -> Self {
        Self {
            question_type: QuestionType::MultipleChoice,
            text,
            options,
            correct: Answer::Single(correct),
            explanation: Some(explanation),
            matching_pairs: Vec::new(),
        }
    }
}

impl EntryBuilder<'_> {
    fn push(&mut self, draft: Draft, path: &str) {
        let code = match draft.question_type {
            QuestionType::MultipleChoice => "mc",
            QuestionType::TrueFalse => "tf",
            QuestionType::Matching => "match",
            QuestionType::FillBlank => "fill",
        };
        let id = format!("{}-{}-{}", self.prefix, code, self.next_id);
        self.next_id += 1;

        self.out.push(Question {
            id,
            question_type: draft.question_type,
            difficulty: self.entry.difficulty(),
            category: self.entry.data.category,
            topic: self.entry.data.title.clone(),
            question_text: draft.text,
            options: draft.options,
            correct_answer: draft.correct,
            explanation: draft.explanation,
            source_ref: Some(format!("{}#{}", self.entry.id, slug(path))),
            matching_pairs: draft.matching_pairs,
        });
    }

    fn section<R: Rng + ?Sized>(&mut self, section: &Section, path: &str, rng: &mut R) {
        let mut drafts = Vec::new();

        if let Some(table) = &section.table {
            drafts.extend(table_questions(table, self.max_per_section, rng));
            drafts.extend(reverse_table_questions(table, self.max_per_section, rng));
        }
        if !section.items.is_empty() {
            drafts.extend(fill_blank_questions(
                &section.title,
                &section.items,
                self.max_per_section,
            ));
            drafts.extend(true_false_questions(&section.items, self.max_per_section));
        }
        if let Some(comparison) = &section.comparison {
            drafts.extend(comparison_questions(
                &section.title,
                comparison,
                self.max_per_section,
                rng,
            ));
        }

        for draft in drafts {
            self.push(draft, path);
        }

        for sub in &section.subsections {
            let sub_path = format!("{path} {}", sub.title);
            self.section(sub, &sub_path, rng);
        }
    }
}

fn cell(row: &[String], col: usize) -> Option<&str> {
    row.get(col).map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn usable(value: &str) -> bool {
    value.chars().count() >= MIN_TABLE_VALUE_LEN
}

fn with_correct<R: Rng + ?Sized>(correct: &str, distractors: Vec<String>, rng: &mut R) -> Vec<String> {
    let mut options = distractors;
    options.push(correct.to_string());
    shuffle(&options, rng)
}

/// "What is the {property} of {subject}?" for every row × property column.
fn table_questions<R: Rng + ?Sized>(table: &Table, cap: usize, rng: &mut R) -> Vec<Draft> {
    let mut drafts = Vec::new();

    'rows: for (r, row) in table.rows.iter().enumerate() {
        let Some(subject) = cell(row, 0) else {
            continue;
        };
        for (c, header) in table.headers.iter().enumerate().skip(1) {
            if drafts.len() >= cap {
                break 'rows;
            }
            let Some(correct) = cell(row, c).filter(|v| usable(v)) else {
                continue;
            };
            let pool: Vec<String> = table
                .rows
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != r)
                .filter_map(|(_, other)| cell(other, c))
                .filter(|v| usable(v))
                .map(str::to_string)
                .collect();
            let distractors = generate_wrong_answers(&pool, correct, DISTRACTOR_COUNT, rng);
            if distractors.len() < MIN_DISTRACTORS {
                tracing::debug!(subject, property = %header, "not enough distractors, skipping");
                continue;
            }

            let property = header.trim().to_lowercase();
            drafts.push(Draft::choice(
                format!("What is the {property} of {subject}?"),
                with_correct(correct, distractors, rng),
                correct.to_string(),
                format!("The {property} of {subject} is {correct}."),
            ));
        }
    }

    drafts
}

/// "Which {subject type} has {property} of {value}?" for one randomly chosen row.
fn reverse_table_questions<R: Rng + ?Sized>(
    table: &Table,
    cap: usize,
    rng: &mut R,
) -> Vec<Draft> {
    let mut drafts = Vec::new();
    let Some(subject_type) = table.headers.first().map(|h| h.trim().to_lowercase()) else {
        return drafts;
    };
    let row_indices: Vec<usize> = (0..table.rows.len()).collect();
    let Some(&r) = pick(&row_indices, rng) else {
        return drafts;
    };
    let row = &table.rows[r];
    let Some(subject) = cell(row, 0) else {
        return drafts;
    };

    let other_subjects: Vec<String> = table
        .rows
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != r)
        .filter_map(|(_, other)| cell(other, 0))
        .map(str::to_string)
        .collect();

    for (c, header) in table.headers.iter().enumerate().skip(1) {
        if drafts.len() >= cap {
            break;
        }
        let Some(value) = cell(row, c).filter(|v| usable(v)) else {
            continue;
        };
        // A value shared with another row would have two right answers.
        let ambiguous = table
            .rows
            .iter()
            .enumerate()
            .any(|(i, other)| i != r && cell(other, c).is_some_and(|v| normalize(v) == normalize(value)));
        if ambiguous {
            continue;
        }
        let distractors = generate_wrong_answers(&other_subjects, subject, DISTRACTOR_COUNT, rng);
        if distractors.len() < MIN_DISTRACTORS {
            continue;
        }

        let property = header.trim().to_lowercase();
        drafts.push(Draft::choice(
            format!("Which {subject_type} has {property} of {value}?"),
            with_correct(subject, distractors, rng),
            subject.to_string(),
            format!("{subject} has {property} of {value}."),
        ));
    }

    drafts
}

fn item_value(item: &Item) -> Option<&str> {
    item.value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Value recall and "name one example" questions.
fn fill_blank_questions(section_title: &str, items: &[Item], cap: usize) -> Vec<Draft> {
    let mut drafts = Vec::new();

    for item in items {
        if drafts.len() >= cap {
            break;
        }
        if let Some(value) = item_value(item) {
            drafts.push(Draft {
                question_type: QuestionType::FillBlank,
                text: format!("In {section_title}, what is the value for '{}'?", item.name),
                options: Vec::new(),
                correct: Answer::Single(value.to_string()),
                explanation: Some(
                    item.description
                        .clone()
                        .unwrap_or_else(|| format!("{}: {value}", item.name)),
                ),
                matching_pairs: Vec::new(),
            });
        }

        let examples: Vec<String> = item
            .examples
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .collect();
        if !examples.is_empty() && drafts.len() < cap {
            drafts.push(Draft {
                question_type: QuestionType::FillBlank,
                text: format!("Name one example of {}", item.name),
                options: Vec::new(),
                explanation: Some(format!("Valid examples: {}", examples.join(", "))),
                correct: Answer::Multiple(examples),
                matching_pairs: Vec::new(),
            });
        }
    }

    drafts
}

/// A true statement per valued item, plus a false one borrowing the next
/// valued item's value (circular by position).
fn true_false_questions(items: &[Item], cap: usize) -> Vec<Draft> {
    let valued: Vec<(&str, &str)> = items
        .iter()
        .filter_map(|item| item_value(item).map(|v| (item.name.as_str(), v)))
        .collect();
    let options = vec![TRUE.to_string(), FALSE.to_string()];
    let mut drafts = Vec::new();

    for (i, &(name, value)) in valued.iter().enumerate() {
        if drafts.len() >= cap {
            break;
        }
        drafts.push(Draft {
            question_type: QuestionType::TrueFalse,
            text: format!("The {name} is {value}"),
            options: options.clone(),
            correct: Answer::Single(TRUE.into()),
            explanation: Some(format!("Correct: the {name} is {value}.")),
            matching_pairs: Vec::new(),
        });

        if valued.len() < 2 || drafts.len() >= cap {
            continue;
        }
        let (_, wrong) = valued[(i + 1) % valued.len()];
        if normalize(wrong) == normalize(value) {
            continue;
        }
        drafts.push(Draft {
            question_type: QuestionType::TrueFalse,
            text: format!("The {name} is {wrong}"),
            options: options.clone(),
            correct: Answer::Single(FALSE.into()),
            explanation: Some(format!("The {name} is actually {value}.")),
            matching_pairs: Vec::new(),
        });
    }

    drafts
}

/// One matching question over a random point per group, and a
/// "which group" question per sampled point.
fn comparison_questions<R: Rng + ?Sized>(
    section_title: &str,
    comparison: &Comparison,
    cap: usize,
    rng: &mut R,
) -> Vec<Draft> {
    let mut drafts = Vec::new();

    let pairs: Vec<MatchingPair> = comparison
        .groups
        .iter()
        .filter_map(|group| {
            let points: Vec<&str> = group
                .points
                .iter()
                .map(|p| p.trim())
                .filter(|p| !p.is_empty())
                .collect();
            pick(&points, rng).map(|point| MatchingPair {
                left: point.to_string(),
                right: group.title.trim().to_string(),
            })
        })
        .collect();

    if pairs.len() >= 2 && cap > 0 {
        let encoded: Vec<String> = pairs.iter().map(MatchingPair::encode).collect();
        drafts.push(Draft {
            question_type: QuestionType::Matching,
            text: format!("Match each characteristic to its group in {section_title}"),
            options: Vec::new(),
            correct: Answer::Multiple(encoded),
            explanation: Some(
                pairs
                    .iter()
                    .map(|p| format!("{} → {}", p.left, p.right))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            matching_pairs: pairs.clone(),
        });
    }

    let titles: Vec<String> = comparison
        .groups
        .iter()
        .map(|g| g.title.trim().to_string())
        .collect();
    let mut choice_count = 0;
    for pair in &pairs {
        if choice_count >= cap {
            break;
        }
        let distractors = generate_wrong_answers(&titles, &pair.right, DISTRACTOR_COUNT, rng);
        if distractors.len() < MIN_DISTRACTORS {
            continue;
        }
        drafts.push(Draft::choice(
            format!("Which group does \"{}\" belong to?", pair.left),
            with_correct(&pair.right, distractors, rng),
            pair.right.clone(),
            format!("\"{}\" is a characteristic of {}.", pair.left, pair.right),
        ));
        choice_count += 1;
    }

    drafts
}

fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

/// Filter the pool by the config's categories and difficulty, optionally
/// shuffle questions and multiple-choice options, then truncate to
/// `question_count`. A pool smaller than requested yields fewer questions.
pub fn select_questions<R: Rng + ?Sized>(
    pool: &[Question],
    config: &QuizConfig,
    rng: &mut R,
) -> Vec<Question> {
    let filtered: Vec<Question> = pool
        .iter()
        .filter(|q| config.categories.is_empty() || config.categories.contains(&q.category))
        .filter(|q| config.difficulty.map_or(true, |d| d == q.difficulty))
        .cloned()
        .collect();

    let mut selected = if config.shuffle_questions {
        shuffle(&filtered, rng)
    } else {
        filtered
    };
    selected.truncate(config.question_count);

    if config.shuffle_options {
        for q in selected
            .iter_mut()
            .filter(|q| q.question_type == QuestionType::MultipleChoice)
        {
            q.options = shuffle(&q.options, rng);
        }
    }

    selected
}

/// Whether `user_answer` is correct for `question`.
///
/// Text is compared trimmed and case-insensitively. A single answer against a
/// list of accepted answers is correct if it matches any of them. Matching
/// questions need exactly the correct pairs, each used once, in any order.
pub fn check_answer(question: &Question, user_answer: &Answer) -> bool {
    if question.question_type == QuestionType::Matching {
        return match (&question.correct_answer, user_answer) {
            (Answer::Multiple(correct), Answer::Multiple(given)) => {
                same_multiset(correct, given, normalize_pair)
            }
            _ => false,
        };
    }

    match (&question.correct_answer, user_answer) {
        (Answer::Single(correct), Answer::Single(given)) => normalize(correct) == normalize(given),
        (Answer::Multiple(accepted), Answer::Single(given)) => {
            let given = normalize(given);
            accepted.iter().any(|a| normalize(a) == given)
        }
        (Answer::Multiple(correct), Answer::Multiple(given)) => {
            same_multiset(correct, given, normalize)
        }
        (Answer::Single(_), Answer::Multiple(_)) => false,
    }
}

fn normalize_pair(pair: &str) -> String {
    match pair.split_once(':') {
        Some((left, right)) => format!("{}:{}", normalize(left), normalize(right)),
        None => normalize(pair),
    }
}

fn same_multiset(correct: &[String], given: &[String], key: fn(&str) -> String) -> bool {
    if correct.len() != given.len() {
        return false;
    }
    let mut remaining: Vec<String> = correct.iter().map(|c| key(c)).collect();
    for g in given {
        let k = key(g);
        match remaining.iter().position(|r| *r == k) {
            Some(i) => {
                remaining.swap_remove(i);
            }
            None => return false,
        }
    }
    true
}
