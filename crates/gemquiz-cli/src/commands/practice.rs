//! The `gemquiz practice` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use gemquiz_core::model::QuizMode;
use gemquiz_core::session::QuizSession;
use gemquiz_core::storage::{KeyValueStore, QUIZ_STATE_KEY};
use gemquiz_store::load_config_from;

use super::{build_questions, make_rng, open_store, parse_categories, parse_difficulty};
use super::{print_results, record_progress};
use crate::prompt::{parse_answer, parse_input, render_question, Input, PRACTICE_HELP};

#[allow(clippy::too_many_arguments)]
pub fn execute(
    content_path: PathBuf,
    category: Option<String>,
    difficulty: Option<String>,
    count: Option<usize>,
    seed: Option<u64>,
    fresh: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let mut quiz_config = config.quiz_config(QuizMode::Practice);
    quiz_config.categories = parse_categories(category.as_deref())?;
    quiz_config.difficulty = parse_difficulty(difficulty.as_deref())?;
    if let Some(n) = count {
        anyhow::ensure!(n >= 1, "count must be at least 1");
        quiz_config.question_count = n;
    }

    let store = open_store(&config)?;
    if fresh {
        store.remove(QUIZ_STATE_KEY)?;
    }

    let mut rng = make_rng(seed);
    let questions = build_questions(&content_path, &config, &quiz_config, &mut rng)?;
    let selected: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();

    let mut session = QuizSession::new(questions, quiz_config).with_store(store.clone());
    let resumed = session
        .state()
        .questions
        .iter()
        .map(|q| &q.id)
        .ne(selected.iter());
    if resumed {
        println!("Resuming saved session (use --fresh to start over).");
    }

    println!("{PRACTICE_HELP}");
    show_current(&session);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next().transpose()? else {
            println!("\nSession saved. Run the same command again to resume.");
            return Ok(());
        };

        match parse_input(&line) {
            Input::Answer(text) if text.is_empty() => {}
            Input::Answer(text) => {
                let Some(q) = session.current_question() else {
                    continue;
                };
                match parse_answer(q, &text) {
                    Some(answer) => {
                        session.select_answer(answer);
                        println!(
                            "Saved. Live score: {}/{} answered correctly.",
                            session.live_score(),
                            session.answered_count()
                        );
                    }
                    None => println!("Could not read that as an answer. Type :help for input formats."),
                }
            }
            Input::Check => {
                session.submit_answer();
                match session.current_feedback() {
                    Some(true) => println!("Correct!"),
                    Some(false) => {
                        if let Some(q) = session.current_question() {
                            println!("Not quite. Correct answer: {}", q.correct_answer);
                            if let Some(explanation) = &q.explanation {
                                println!("{explanation}");
                            }
                        }
                    }
                    None => println!("Answer the question first."),
                }
            }
            Input::Next => {
                session.next_question();
                show_current(&session);
            }
            Input::Back => {
                session.previous_question();
                show_current(&session);
            }
            Input::Go(index) => {
                session.go_to_question(index);
                show_current(&session);
            }
            Input::Flag => {
                session.toggle_flag();
                let state = if session.is_flagged() { "Flagged" } else { "Unflagged" };
                println!("{state} question {}.", session.current_index() + 1);
            }
            Input::Submit => break,
            Input::Reset => {
                session.reset_quiz();
                println!("Session reset.");
                show_current(&session);
            }
            Input::Quit => {
                println!("Session saved. Run the same command again to resume.");
                return Ok(());
            }
            Input::Help => println!("{PRACTICE_HELP}"),
            Input::Pause | Input::Resume => println!("Practice sessions are untimed."),
            Input::Unknown(cmd) => println!("Unknown command: {cmd}. Type :help for commands."),
        }
    }

    let result = session.submit_quiz().clone();
    print_results(&result, &session.state().questions, config.passing_score);

    let progress = record_progress(store.as_ref(), &result);
    println!(
        "\nProgress saved: {} quizzes, {}% overall accuracy.",
        progress.total_quizzes,
        progress.overall_accuracy()
    );
    Ok(())
}

fn show_current(session: &QuizSession) {
    if let Some(q) = session.current_question() {
        print!(
            "{}",
            render_question(
                q,
                session.current_index(),
                session.question_count(),
                session.current_answer(),
                session.is_flagged(),
            )
        );
    }
}
