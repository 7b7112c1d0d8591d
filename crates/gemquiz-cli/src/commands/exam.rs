//! The `gemquiz exam` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use tokio::sync::mpsc;

use gemquiz_core::model::QuizMode;
use gemquiz_core::session::{ExamSession, ExamTimer};
use gemquiz_core::storage::{KeyValueStore, EXAM_STATE_KEY};
use gemquiz_store::load_config_from;

use super::{build_questions, make_rng, open_store, parse_categories, parse_difficulty};
use super::{print_results, record_progress};
use crate::prompt::{parse_answer, parse_input, render_question, Input, EXAM_HELP};

enum Flow {
    Continue,
    Submit,
    Quit,
}

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    content_path: PathBuf,
    category: Option<String>,
    difficulty: Option<String>,
    count: Option<usize>,
    time_limit: Option<u32>,
    seed: Option<u64>,
    fresh: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut quiz_config = config.quiz_config(QuizMode::Exam);
    quiz_config.categories = parse_categories(category.as_deref())?;
    quiz_config.difficulty = parse_difficulty(difficulty.as_deref())?;
    if let Some(n) = count {
        anyhow::ensure!(n >= 1, "count must be at least 1");
        quiz_config.question_count = n;
    }
    if let Some(secs) = time_limit {
        anyhow::ensure!(secs >= 1, "time-limit must be at least 1 second");
        quiz_config.time_limit = Some(secs);
    }

    let store = open_store(&config)?;
    if fresh {
        store.remove(EXAM_STATE_KEY)?;
    }

    let mut rng = make_rng(seed);
    let questions = build_questions(&content_path, &config, &quiz_config, &mut rng)?;

    let exam = ExamSession::new(questions, quiz_config)
        .with_auto_submit(config.auto_submit_on_timeout)
        .with_store(store.clone());
    let shared = Arc::new(Mutex::new(exam));

    let mut timer = ExamTimer::new(Arc::clone(&shared));
    let mut remaining = timer.subscribe();

    {
        let exam = lock(&shared)?;
        println!(
            "Exam: {} questions, {} remaining.",
            exam.questions().len(),
            format_clock(exam.time_remaining())
        );
        println!("{EXAM_HELP}");
        if exam.is_paused() {
            println!("The exam is paused. Type :resume to continue.");
        }
        show_current(&exam);
    }
    timer.start();

    let mut lines = spawn_line_reader();
    let mut watching = true;
    prompt(&shared)?;

    loop {
        tokio::select! {
            line = lines.recv() => {
                let Some(line) = line else {
                    println!("\nExam saved. Run the same command again to resume.");
                    return Ok(());
                };
                match handle_input(&line, &shared, &mut timer)? {
                    Flow::Continue => prompt(&shared)?,
                    Flow::Submit => break,
                    Flow::Quit => {
                        println!("Exam saved. Run the same command again to resume.");
                        return Ok(());
                    }
                }
            }
            changed = remaining.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                    continue;
                }
                let secs = *remaining.borrow_and_update();
                if lock(&shared)?.is_complete() {
                    println!("\nTime is up! Your exam was submitted automatically.");
                    break;
                }
                if secs == 0 {
                    println!("\nTime is up. Type :submit when ready.");
                    prompt(&shared)?;
                } else if secs % 60 == 0 || secs == 30 || secs == 10 {
                    println!("\n{} remaining", format_clock(secs));
                    prompt(&shared)?;
                }
            }
        }
    }

    timer.stop();
    let (result, questions) = {
        let mut exam = lock(&shared)?;
        let result = exam.submit_exam().clone();
        (result, exam.questions().to_vec())
    };
    print_results(&result, &questions, config.passing_score);

    let progress = record_progress(store.as_ref(), &result);
    println!(
        "\nProgress saved: {} quizzes, {}% overall accuracy.",
        progress.total_quizzes,
        progress.overall_accuracy()
    );
    Ok(())
}

fn handle_input(
    line: &str,
    shared: &Arc<Mutex<ExamSession>>,
    timer: &mut ExamTimer,
) -> Result<Flow> {
    match parse_input(line) {
        Input::Answer(text) if text.is_empty() => {}
        Input::Answer(text) => {
            let mut exam = lock(shared)?;
            let Some(answer) = exam.current_question().and_then(|q| parse_answer(q, &text))
            else {
                println!("Could not read that as an answer. Type :help for input formats.");
                return Ok(Flow::Continue);
            };
            exam.select_answer(answer);
            println!(
                "Saved. {} of {} answered.",
                exam.answered_count(),
                exam.questions().len()
            );
        }
        Input::Next => {
            let mut exam = lock(shared)?;
            exam.next_question();
            show_current(&exam);
        }
        Input::Back => {
            let mut exam = lock(shared)?;
            exam.previous_question();
            show_current(&exam);
        }
        Input::Go(index) => {
            let mut exam = lock(shared)?;
            exam.go_to_question(index);
            show_current(&exam);
        }
        Input::Flag => {
            let mut exam = lock(shared)?;
            exam.toggle_flag();
            println!("{} flagged for review.", exam.flagged_count());
        }
        Input::Pause => {
            timer.pause();
            println!("Paused.");
        }
        Input::Resume => {
            timer.resume();
            println!("Resumed.");
        }
        Input::Submit => {
            let exam = lock(shared)?;
            let unanswered = exam.questions().len() - exam.answered_count();
            if unanswered > 0 {
                println!("Submitting with {unanswered} unanswered question(s).");
            }
            return Ok(Flow::Submit);
        }
        Input::Quit => {
            timer.stop();
            return Ok(Flow::Quit);
        }
        Input::Help => println!("{EXAM_HELP}"),
        Input::Check => println!("Feedback is shown after the exam is submitted."),
        Input::Reset => println!("Exams cannot be reset mid-way. Use --fresh to start over."),
        Input::Unknown(cmd) => println!("Unknown command: {cmd}. Type :help for commands."),
    }
    Ok(Flow::Continue)
}

fn lock(shared: &Arc<Mutex<ExamSession>>) -> Result<MutexGuard<'_, ExamSession>> {
    shared
        .lock()
        .map_err(|_| anyhow::anyhow!("exam session lock poisoned"))
}

fn prompt(shared: &Arc<Mutex<ExamSession>>) -> Result<()> {
    let secs = lock(shared)?.time_remaining();
    print!("[{}] > ", format_clock(secs));
    std::io::stdout().flush()?;
    Ok(())
}

fn show_current(exam: &ExamSession) {
    if let Some(q) = exam.current_question() {
        print!(
            "{}",
            render_question(
                q,
                exam.current_index(),
                exam.questions().len(),
                exam.current_answer(),
                exam.is_flagged(),
            )
        );
    }
}

/// `mm:ss`, or `h:mm:ss` past an hour.
fn format_clock(secs: u32) -> String {
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}

/// Read stdin on a plain thread so a pending read never blocks shutdown.
fn spawn_line_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(1800), "30:00");
        assert_eq!(format_clock(3725), "1:02:05");
    }
}
