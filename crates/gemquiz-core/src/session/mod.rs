//! Stateful session controllers.
//!
//! [`QuizSession`] drives a practice session; [`ExamSession`] adds a countdown
//! and withholds scores until submission; [`ExamTimer`] ticks an exam once a
//! second on the tokio runtime.

pub mod exam;
pub mod quiz;
pub mod timer;

pub use exam::{ExamEnvelope, ExamSession, TickOutcome, DEFAULT_TIME_LIMIT_SECS};
pub use quiz::QuizSession;
pub use timer::ExamTimer;
