//! The round state machine.
//!
//! [`RoundEngine`] owns the [`RoundState`], both timer handles and the
//! question generator. Each external event has exactly one entry point:
//!
//! - [`RoundEngine::start`]
//! - [`RoundEngine::on_tick`]
//! - [`RoundEngine::on_answer`]
//! - [`RoundEngine::on_question_timeout`]
//!
//! Handlers never block and never fail. Events that arrive outside the
//! `Active` state, or with no question on screen, are ignored.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::Rng;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::Config;
use crate::error::{QuizError, Result};
use crate::events::{EventBroadcaster, Feedback, FeedbackCategory, RoundEvent};
use crate::question::{Question, QuestionGenerator};
use crate::round_state::{AnswerOutcome, AnswerRecord, EndReason, RoundResult, RoundState, RoundStatus};
use crate::sound::SoundService;

/// Interval of the round countdown.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Callback invoked exactly once when a round ends.
pub type CompletionCallback = Box<dyn FnOnce(RoundResult) + Send>;

/// A scheduled, cancellable callback owned by the engine.
///
/// Every arm gets a fresh `id`; a handle that is no longer stored in the
/// engine is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    /// Unique id of this arming.
    pub id: u64,
    /// When the callback is due.
    pub deadline: Instant,
}

/// Feedback plus the instant it was issued.
#[derive(Debug, Clone)]
struct ActiveFeedback {
    feedback: Feedback,
    issued_at: Instant,
}

/// Runtime of a single timed round.
pub struct RoundEngine<R> {
    config: Config,
    state: RoundState,
    generator: QuestionGenerator<R>,
    sound: Arc<dyn SoundService>,
    clock: Arc<dyn Clock>,
    broadcaster: Option<EventBroadcaster>,
    on_round_end: Option<CompletionCallback>,
    countdown: Option<TimerHandle>,
    question_timer: Option<TimerHandle>,
    question_started_at: Option<Instant>,
    feedback: Option<ActiveFeedback>,
    next_timer_id: u64,
}

impl<R> std::fmt::Debug for RoundEngine<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundEngine")
            .field("state", &self.state)
            .field("countdown", &self.countdown)
            .field("question_timer", &self.question_timer)
            .finish_non_exhaustive()
    }
}

impl<R: Rng> RoundEngine<R> {
    /// Creates an engine in the `Ready` state.
    pub fn new(
        config: Config,
        generator: QuestionGenerator<R>,
        sound: Arc<dyn SoundService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let lives = i32::try_from(config.starting_lives).unwrap_or(i32::MAX);
        let state = RoundState::new(lives, config.round_duration_secs);
        Self {
            config,
            state,
            generator,
            sound,
            clock,
            broadcaster: None,
            on_round_end: None,
            countdown: None,
            question_timer: None,
            question_started_at: None,
            feedback: None,
            next_timer_id: 0,
        }
    }

    /// Sets the callback fired when the round ends.
    #[must_use]
    pub fn with_completion(mut self, callback: impl FnOnce(RoundResult) + Send + 'static) -> Self {
        self.on_round_end = Some(Box::new(callback));
        self
    }

    /// Publishes round events through `broadcaster`.
    #[must_use]
    pub fn with_broadcaster(mut self, broadcaster: EventBroadcaster) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Current round state.
    pub const fn state(&self) -> &RoundState {
        &self.state
    }

    /// Owned copy of the current round state.
    pub fn snapshot(&self) -> RoundState {
        self.state.clone()
    }

    /// The configuration this round runs with.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns `true` once the round has ended.
    pub const fn is_ended(&self) -> bool {
        self.state.is_terminal()
    }

    /// The armed round countdown, if any.
    pub const fn countdown(&self) -> Option<TimerHandle> {
        self.countdown
    }

    /// The armed per-question timeout, if any.
    pub const fn question_timer(&self) -> Option<TimerHandle> {
        self.question_timer
    }

    /// Feedback for the last resolved question while it is still visible.
    pub fn feedback(&self) -> Option<&Feedback> {
        let active = self.feedback.as_ref()?;
        let age = self.clock.now().saturating_duration_since(active.issued_at);
        (age < self.config.feedback_duration()).then_some(&active.feedback)
    }

    // ------------------------------------------------------------------------
    // Event entry points
    // ------------------------------------------------------------------------

    /// Starts the round: arms the countdown and shows question 1.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidStateTransition` unless the round is `Ready`.
    pub fn start(&mut self) -> Result<()> {
        if self.state.status != RoundStatus::Ready {
            return Err(QuizError::invalid_transition(
                self.state.status,
                RoundStatus::Active,
            ));
        }

        self.state.status = RoundStatus::Active;
        self.state.started_at = Utc::now();
        let now = self.clock.now();
        self.countdown = Some(self.arm(now + TICK_INTERVAL));

        info!(
            duration_secs = self.config.round_duration_secs,
            lives = self.state.lives,
            "Round started"
        );
        self.publish(RoundEvent::round_start(
            self.config.round_duration_secs,
            self.state.lives,
        ));

        self.next_question();
        Ok(())
    }

    /// Handles one second of the round countdown.
    pub fn on_tick(&mut self) {
        if !self.state.is_active() {
            debug!(status = %self.state.status, "Ignoring tick");
            return;
        }

        let previous = self.state.time_left;
        if previous <= 1 {
            self.state.time_left = 0;
            self.publish(RoundEvent::tick(0));
            self.end_round(EndReason::TimeUp);
            return;
        }

        if previous <= self.config.tick_warning_secs {
            self.sound.play_tick();
        }
        self.state.time_left = previous - 1;

        if let Some(countdown) = self.countdown {
            self.countdown = Some(self.arm(countdown.deadline + TICK_INTERVAL));
        }
        self.publish(RoundEvent::tick(self.state.time_left));
    }

    /// Handles a submitted answer for the current question.
    pub fn on_answer(&mut self, selected: u32) {
        if !self.state.is_active() {
            debug!(selected, status = %self.state.status, "Ignoring answer");
            return;
        }
        let Some(question) = self.state.current_question.clone() else {
            debug!(selected, "Ignoring answer with no active question");
            return;
        };

        let elapsed = self.elapsed_on_question();
        if question.is_correct(selected) {
            self.award(question, selected, elapsed);
        } else {
            self.sound.play_wrong();
            debug!(
                question_index = self.state.question_index,
                selected,
                answer = question.answer,
                "Incorrect answer"
            );
            self.record(question, AnswerOutcome::Incorrect, Some(selected), 0, elapsed);
            if self.miss(Feedback::incorrect()) {
                return;
            }
        }

        self.next_question();
    }

    /// Handles expiry of the per-question timeout.
    pub fn on_question_timeout(&mut self) {
        if !self.state.is_active() || self.question_timer.is_none() {
            debug!(status = %self.state.status, "Ignoring question timeout");
            return;
        }
        let Some(question) = self.state.current_question.clone() else {
            return;
        };

        self.sound.play_wrong();
        debug!(
            question_index = self.state.question_index,
            "Question timed out"
        );
        let elapsed = self.elapsed_on_question();
        self.record(question, AnswerOutcome::TimedOut, None, 0, elapsed);
        if self.miss(Feedback::time_up()) {
            return;
        }

        self.next_question();
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Applies the scoring rules for a correct answer.
    fn award(&mut self, question: Question, selected: u32, elapsed: Duration) {
        let scoring = self.config.scoring;
        self.sound.play_correct();

        let fast = elapsed < self.config.fast_answer_window();
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let mut points = scoring.base_points;
        if fast {
            points = points.saturating_add(scoring.fast_bonus);
        }

        self.state.combo += 1;
        let combo_hit = self.state.combo.checked_rem(scoring.combo_interval) == Some(0);
        if combo_hit {
            points = points.saturating_add(scoring.combo_bonus);
        }

        self.state.score = self.state.score.saturating_add(points);
        self.state.correct_count += 1;

        let category = if combo_hit {
            FeedbackCategory::Combo
        } else if fast {
            FeedbackCategory::Fast
        } else {
            FeedbackCategory::Normal
        };
        debug!(
            question_index = self.state.question_index,
            points,
            combo = self.state.combo,
            elapsed_ms,
            "Correct answer"
        );
        self.record(question, AnswerOutcome::Correct, Some(selected), points, elapsed);
        self.show_feedback(Feedback::correct(category, points, scoring.combo_bonus));
    }

    /// Shared path for wrong answers and timeouts.
    ///
    /// Returns `true` if the lost life ended the round.
    fn miss(&mut self, feedback: Feedback) -> bool {
        self.state.combo = 0;
        self.state.lives -= 1;
        self.show_feedback(feedback);

        if self.state.lives < 0 {
            self.end_round(EndReason::OutOfLives);
            return true;
        }
        false
    }

    /// Replaces the current question and re-arms its timeout.
    fn next_question(&mut self) {
        self.question_timer = None;

        self.state.question_index += 1;
        let question = self.generator.generate(self.state.question_index);
        let now = self.clock.now();
        self.question_started_at = Some(now);
        self.question_timer = Some(self.arm(now + self.config.question_time_limit()));

        debug!(
            question_index = self.state.question_index,
            question = %question,
            "Question generated"
        );
        self.publish(RoundEvent::question_start(
            self.state.question_index,
            question.clone(),
            self.config.question_time_limit_secs,
        ));
        self.state.current_question = Some(question);
    }

    /// Moves to `Ended`, cancels both timers and fires the callback once.
    fn end_round(&mut self, reason: EndReason) {
        if self.state.is_terminal() {
            return;
        }

        self.state.status = RoundStatus::Ended;
        self.state.end_reason = Some(reason);
        self.state.ended_at = Some(Utc::now());
        self.countdown = None;
        self.question_timer = None;

        let result = self.state.result(reason);
        info!(
            reason = %reason,
            score = result.score,
            correct = result.correct_count,
            answered = result.questions_answered,
            "Round ended"
        );
        self.publish(RoundEvent::round_complete(result));

        if let Some(callback) = self.on_round_end.take() {
            callback(result);
        }
    }

    fn record(
        &mut self,
        question: Question,
        outcome: AnswerOutcome,
        selected: Option<u32>,
        points: u32,
        elapsed: Duration,
    ) {
        self.state.history.push(AnswerRecord {
            question_index: self.state.question_index,
            question,
            outcome,
            selected,
            points,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        });
    }

    fn show_feedback(&mut self, feedback: Feedback) {
        self.publish(RoundEvent::feedback(
            feedback.clone(),
            self.state.score,
            self.state.lives,
        ));
        self.feedback = Some(ActiveFeedback {
            feedback,
            issued_at: self.clock.now(),
        });
    }

    fn elapsed_on_question(&self) -> Duration {
        self.question_started_at
            .map_or(Duration::ZERO, |started| {
                self.clock.now().saturating_duration_since(started)
            })
    }

    fn arm(&mut self, deadline: Instant) -> TimerHandle {
        self.next_timer_id += 1;
        TimerHandle {
            id: self.next_timer_id,
            deadline,
        }
    }

    fn publish(&self, event: RoundEvent) {
        if let Some(broadcaster) = &self.broadcaster {
            broadcaster.send(event);
        }
    }
}
