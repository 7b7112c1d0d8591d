//! Terminal rendering of questions and parsing of typed input.

use gemquiz_core::model::{Answer, Question, QuestionType};

/// One line of user input during a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Answer(String),
    Check,
    Next,
    Back,
    Go(usize),
    Flag,
    Pause,
    Resume,
    Submit,
    Reset,
    Quit,
    Help,
    Unknown(String),
}

/// Lines starting with `:` are commands; anything else is an answer.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Input::Answer(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or("").to_ascii_lowercase();
    match name.as_str() {
        "c" | "check" => Input::Check,
        "n" | "next" => Input::Next,
        "b" | "back" | "prev" => Input::Back,
        "g" | "go" => match parts.next().and_then(|n| n.parse::<usize>().ok()) {
            Some(n) if n >= 1 => Input::Go(n - 1),
            _ => Input::Unknown(line.to_string()),
        },
        "f" | "flag" => Input::Flag,
        "pause" => Input::Pause,
        "resume" => Input::Resume,
        "s" | "submit" => Input::Submit,
        "reset" => Input::Reset,
        "q" | "quit" => Input::Quit,
        "h" | "help" | "?" => Input::Help,
        _ => Input::Unknown(line.to_string()),
    }
}

pub const PRACTICE_HELP: &str = "\
Type an option number (or the answer text) to answer.
Matching: pair numbers with letters, e.g. `1b 2a 3c`.
Commands: :check  :next  :back  :go N  :flag  :submit  :reset  :quit  :help";

pub const EXAM_HELP: &str = "\
Type an option number (or the answer text) to answer.
Matching: pair numbers with letters, e.g. `1b 2a 3c`.
Commands: :next  :back  :go N  :flag  :pause  :resume  :submit  :quit  :help";

/// Right-hand column of a matching question, in display order.
fn matching_targets(question: &Question) -> Vec<&str> {
    let mut rights: Vec<&str> = question
        .matching_pairs
        .iter()
        .map(|p| p.right.as_str())
        .collect();
    rights.sort_unstable();
    rights.dedup();
    rights
}

fn letter(i: usize) -> char {
    (b'a' + (i % 26) as u8) as char
}

/// Multi-line display of a question, its options, and the saved answer.
pub fn render_question(
    question: &Question,
    index: usize,
    total: usize,
    answer: Option<&Answer>,
    flagged: bool,
) -> String {
    let mut out = format!(
        "\nQuestion {} of {} [{} | {}]{}\n{}\n",
        index + 1,
        total,
        question.category,
        question.difficulty,
        if flagged { " (flagged)" } else { "" },
        question.question_text
    );

    match question.question_type {
        QuestionType::MultipleChoice | QuestionType::TrueFalse => {
            for (i, option) in question.options.iter().enumerate() {
                out.push_str(&format!("  {}. {option}\n", i + 1));
            }
        }
        QuestionType::Matching => {
            for (i, pair) in question.matching_pairs.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, pair.left));
            }
            for (i, right) in matching_targets(question).iter().enumerate() {
                out.push_str(&format!("  {}) {right}\n", letter(i)));
            }
        }
        QuestionType::FillBlank => out.push_str("  (type your answer)\n"),
    }

    if let Some(answer) = answer {
        out.push_str(&format!("Your answer: {answer}\n"));
    }
    out
}

/// Interpret `input` as an answer to `question`.
///
/// Choice questions accept a 1-based option number or the option text.
/// Matching questions accept `<number><letter>` tokens covering every left item.
pub fn parse_answer(question: &Question, input: &str) -> Option<Answer> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    match question.question_type {
        QuestionType::MultipleChoice | QuestionType::TrueFalse => {
            if let Ok(n) = input.parse::<usize>() {
                return n
                    .checked_sub(1)
                    .and_then(|i| question.options.get(i))
                    .map(|o| Answer::Single(o.clone()));
            }
            question
                .options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(input))
                .map(|o| Answer::Single(o.clone()))
        }
        QuestionType::FillBlank => Some(Answer::Single(input.to_string())),
        QuestionType::Matching => parse_matching(question, input),
    }
}

fn parse_matching(question: &Question, input: &str) -> Option<Answer> {
    let targets = matching_targets(question);
    let mut pairs = Vec::new();
    for token in input.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() {
            continue;
        }
        let split = token.find(|c: char| !c.is_ascii_digit())?;
        let (num, rest) = token.split_at(split);
        let left = num
            .parse::<usize>()
            .ok()?
            .checked_sub(1)
            .and_then(|i| question.matching_pairs.get(i))?;
        let mut chars = rest.chars();
        let l = chars.next()?.to_ascii_lowercase();
        if chars.next().is_some() || !l.is_ascii_lowercase() {
            return None;
        }
        let right = targets.get((l as u8 - b'a') as usize)?;
        pairs.push(format!("{}:{}", left.left, right));
    }
    (pairs.len() == question.matching_pairs.len()).then_some(Answer::Multiple(pairs))
}
