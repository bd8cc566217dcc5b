//! Async driver that runs a round against real (or paused) time.
//!
//! The driver owns no round logic. Each pass of its loop waits for the
//! earliest of the countdown deadline, the question deadline and the next
//! submitted answer, then forwards that one event to the engine. Deadlines
//! are re-read from the engine on every pass, so a timeout belonging to an
//! already answered question can never fire.

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use rand::Rng;

use crate::engine::{RoundEngine, TimerHandle};
use crate::error::Result;
use crate::round_state::RoundState;

/// Runs one [`RoundEngine`] to completion.
#[derive(Debug)]
pub struct RoundDriver<R> {
    engine: RoundEngine<R>,
}

impl<R: Rng> RoundDriver<R> {
    /// Wraps an engine that has not been started yet.
    pub const fn new(engine: RoundEngine<R>) -> Self {
        Self { engine }
    }

    /// Starts the round and processes events until it ends.
    ///
    /// Answers arrive on `answers`. If the sender side is dropped the round
    /// keeps running on its timers alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine was already started.
    pub async fn run(mut self, mut answers: mpsc::Receiver<u32>) -> Result<RoundState> {
        self.engine.start()?;
        let mut input_open = true;

        while !self.engine.is_ended() {
            let countdown = self.engine.countdown();
            let question = self.engine.question_timer();

            tokio::select! {
                biased;

                () = wait_for(countdown) => self.engine.on_tick(),
                () = wait_for(question) => self.engine.on_question_timeout(),
                answer = answers.recv(), if input_open => match answer {
                    Some(value) => self.engine.on_answer(value),
                    None => {
                        debug!("Answer channel closed, round continues on timers");
                        input_open = false;
                    }
                },
            }
        }

        Ok(self.engine.snapshot())
    }
}

/// Sleeps until `timer` is due, or forever when no timer is armed.
async fn wait_for(timer: Option<TimerHandle>) {
    match timer {
        Some(timer) => sleep_until(Instant::from_std(timer.deadline)).await,
        None => std::future::pending().await,
    }
}
