//! Round events and broadcasting for the presentation layer.
//!
//! The engine publishes every observable change as a [`RoundEvent`]. Any
//! number of renderers may subscribe; events are not replayed for late
//! subscribers.
//!
//! # Event Types
//!
//! - `round_start` - Countdown armed, lives set
//! - `question_start` - New question shown
//! - `tick` - Countdown decremented
//! - `feedback` - Outcome of an answer or timeout
//! - `round_complete` - Round ended, final figures
//!
//! # Example
//!
//! ```no_run
//! use pantas_round::events::{EventBroadcaster, RoundEvent};
//!
//! # async fn example() {
//! let broadcaster = EventBroadcaster::new(100);
//! let mut receiver = broadcaster.subscribe();
//!
//! broadcaster.send(RoundEvent::tick(59));
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {}", event.event_name());
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::question::Question;
use crate::round_state::RoundResult;

// ============================================================================
// Feedback
// ============================================================================

/// Category of a feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    /// Correct inside the fast window.
    Fast,
    /// Correct, no bonus.
    Normal,
    /// Correct and completed a combo streak.
    Combo,
    /// Wrong answer.
    Incorrect,
    /// Question timed out.
    TimeUp,
}

/// Transient message describing the last resolved question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    /// Text to display.
    pub text: String,
    /// Outcome category.
    pub category: FeedbackCategory,
    /// Total points awarded for the answer.
    pub points: u32,
}

impl Feedback {
    /// Feedback for a correct answer.
    ///
    /// A combo overrides the text; `points` always holds the full award.
    #[must_use]
    pub fn correct(category: FeedbackCategory, points: u32, combo_bonus: u32) -> Self {
        let text = match category {
            FeedbackCategory::Fast => format!("FAST! +{points}"),
            FeedbackCategory::Combo => format!("COMBO! +{combo_bonus}"),
            _ => format!("CORRECT! +{points}"),
        };
        Self {
            text,
            category,
            points,
        }
    }

    /// Feedback for a wrong answer.
    #[must_use]
    pub fn incorrect() -> Self {
        Self {
            text: "WRONG!".to_string(),
            category: FeedbackCategory::Incorrect,
            points: 0,
        }
    }

    /// Feedback for a question timeout.
    #[must_use]
    pub fn time_up() -> Self {
        Self {
            text: "TIME'S UP!".to_string(),
            category: FeedbackCategory::TimeUp,
            points: 0,
        }
    }

    /// Returns `true` for the two correct-answer categories plus combo.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        matches!(
            self.category,
            FeedbackCategory::Fast | FeedbackCategory::Normal | FeedbackCategory::Combo
        )
    }
}

// ============================================================================
// Event Payloads
// ============================================================================

/// Payload for the `round_start` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundStartPayload {
    /// Countdown length in seconds.
    pub duration_secs: u32,
    /// Lives at round start.
    pub lives: i32,
}

/// Payload for the `question_start` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionStartPayload {
    /// 1-based question index.
    pub question_index: u32,
    /// The question now shown.
    pub question: Question,
    /// Seconds before the question times out.
    pub time_limit_secs: u32,
}

/// Payload for the `tick` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickPayload {
    /// Seconds left after this tick.
    pub time_left: u32,
}

/// Payload for the `feedback` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackPayload {
    /// The feedback message.
    pub feedback: Feedback,
    /// Score after the answer.
    pub score: u32,
    /// Lives after the answer.
    pub lives: i32,
}

// ============================================================================
// Event Enum
// ============================================================================

/// Events emitted while a round runs.
///
/// Serialized as JSON objects with "event" and "payload" fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum RoundEvent {
    /// The round started.
    RoundStart(RoundStartPayload),
    /// A new question is shown.
    QuestionStart(QuestionStartPayload),
    /// The countdown decremented.
    Tick(TickPayload),
    /// An answer or timeout was resolved.
    Feedback(FeedbackPayload),
    /// The round ended.
    RoundComplete(RoundResult),
}

impl RoundEvent {
    /// Creates a `RoundStart` event.
    #[must_use]
    pub const fn round_start(duration_secs: u32, lives: i32) -> Self {
        Self::RoundStart(RoundStartPayload {
            duration_secs,
            lives,
        })
    }

    /// Creates a `QuestionStart` event.
    #[must_use]
    pub const fn question_start(
        question_index: u32,
        question: Question,
        time_limit_secs: u32,
    ) -> Self {
        Self::QuestionStart(QuestionStartPayload {
            question_index,
            question,
            time_limit_secs,
        })
    }

    /// Creates a `Tick` event.
    #[must_use]
    pub const fn tick(time_left: u32) -> Self {
        Self::Tick(TickPayload { time_left })
    }

    /// Creates a `Feedback` event.
    #[must_use]
    pub const fn feedback(feedback: Feedback, score: u32, lives: i32) -> Self {
        Self::Feedback(FeedbackPayload {
            feedback,
            score,
            lives,
        })
    }

    /// Creates a `RoundComplete` event.
    #[must_use]
    pub const fn round_complete(result: RoundResult) -> Self {
        Self::RoundComplete(result)
    }

    /// Returns the event name as a string.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::RoundStart(_) => "round_start",
            Self::QuestionStart(_) => "question_start",
            Self::Tick(_) => "tick",
            Self::Feedback(_) => "feedback",
            Self::RoundComplete(_) => "round_complete",
        }
    }
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Broadcasts round events to every subscriber.
///
/// Uses a tokio broadcast channel. A subscriber that falls more than
/// `capacity` events behind receives `Lagged` and skips ahead.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<RoundEvent>,
}

impl EventBroadcaster {
    /// Creates a new `EventBroadcaster` with the specified buffer capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new subscriber for receiving events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RoundEvent> {
        self.sender.subscribe()
    }

    /// Broadcasts an event to all subscribers.
    ///
    /// Returns the number of receivers; 0 means nobody is listening.
    pub fn send(&self, event: RoundEvent) -> usize {
        // send() returns Err only if there are no receivers, which is fine
        self.sender.send(event).unwrap_or(0)
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(128)
    }
}
