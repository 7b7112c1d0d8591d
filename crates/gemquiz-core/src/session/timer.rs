//! Drives an [`ExamSession`] clock on the tokio runtime.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use super::exam::{ExamSession, TickOutcome};

/// Owns the single background task that ticks a shared exam.
///
/// Starting again replaces the running task, and pausing or dropping the timer
/// aborts it, so at most one task ever ticks a given timer's session.
pub struct ExamTimer {
    session: Arc<Mutex<ExamSession>>,
    period: Duration,
    remaining: Arc<watch::Sender<u32>>,
    task: Option<JoinHandle<()>>,
}

impl ExamTimer {
    pub fn new(session: Arc<Mutex<ExamSession>>) -> Self {
        let initial = session.lock().map(|s| s.time_remaining()).unwrap_or(0);
        let (tx, _rx) = watch::channel(initial);
        Self {
            session,
            period: Duration::from_secs(1),
            remaining: Arc::new(tx),
            task: None,
        }
    }

    pub fn session(&self) -> Arc<Mutex<ExamSession>> {
        Arc::clone(&self.session)
    }

    /// Seconds remaining, updated after every tick.
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.subscribe()
    }

    /// Begin ticking. Does nothing if the exam is paused, finished, or out of time.
    pub fn start(&mut self) {
        self.stop();
        let running = self.session.lock().is_ok_and(|s| s.is_running());
        if !running {
            return;
        }

        let session = Arc::clone(&self.session);
        let remaining = Arc::clone(&self.remaining);
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let (outcome, left) = {
                    let Ok(mut exam) = session.lock() else {
                        break;
                    };
                    (exam.tick(), exam.time_remaining())
                };
                remaining.send_replace(left);
                if outcome != TickOutcome::Running {
                    break;
                }
            }
        }));
    }

    pub fn pause(&mut self) {
        self.stop();
        if let Ok(mut exam) = self.session.lock() {
            exam.pause_timer();
        }
    }

    pub fn resume(&mut self) {
        if let Ok(mut exam) = self.session.lock() {
            exam.resume_timer();
        }
        self.start();
    }

    /// Abort the ticking task, if any.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for ExamTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
