//! gemquiz-core: Question generation, quiz/exam sessions, scoring, and progress.
//!
//! This crate turns structured gemmology study content into typed questions,
//! drives resumable practice and timed exam sessions over them, and folds
//! finished sessions into long-running progress statistics.

pub mod content;
pub mod error;
pub mod generator;
pub mod model;
pub mod progress;
pub mod scoring;
pub mod session;
pub mod shuffle;
pub mod storage;

#[cfg(test)]
mod test_support;
