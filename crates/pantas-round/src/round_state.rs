//! Round state types for the Pantas round engine.
//!
//! [`RoundState`] is the single aggregate mutated by the engine. The
//! presentation layer reads it as a snapshot and never writes to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::question::Question;

// ============================================================================
// RoundStatus
// ============================================================================

/// Lifecycle of a round.
///
/// `Ready` -> `Active` -> `Ended`. `Ended` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// Created but not started.
    #[default]
    Ready,
    /// Countdown running, answers accepted.
    Active,
    /// Round finished; no further events are processed.
    Ended,
}

impl RoundStatus {
    /// Returns `true` if this status represents a terminal state.
    ///
    /// # Examples
    ///
    /// ```
    /// use pantas_round::RoundStatus;
    ///
    /// assert!(RoundStatus::Ended.is_terminal());
    /// assert!(!RoundStatus::Active.is_terminal());
    /// ```
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl std::fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready => write!(f, "ready"),
            Self::Active => write!(f, "active"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Why a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The round countdown reached zero.
    TimeUp,
    /// A life was lost with no lives left.
    OutOfLives,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimeUp => write!(f, "time_up"),
            Self::OutOfLives => write!(f, "out_of_lives"),
        }
    }
}

// ============================================================================
// AnswerRecord
// ============================================================================

/// How a question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// The selected value matched the answer.
    Correct,
    /// The selected value did not match.
    Incorrect,
    /// The per-question timeout fired first.
    TimedOut,
}

/// Record of one resolved question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// 1-based index of the question.
    pub question_index: u32,

    /// The question that was shown.
    pub question: Question,

    /// How it was resolved.
    pub outcome: AnswerOutcome,

    /// The submitted value, absent for timeouts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<u32>,

    /// Points awarded.
    pub points: u32,

    /// Milliseconds between the question appearing and its resolution.
    pub elapsed_ms: u64,
}

/// Final figures handed to the completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Final score.
    pub score: u32,
    /// Number of correctly answered questions.
    pub correct_count: u32,
    /// Number of resolved questions (answers plus timeouts).
    pub questions_answered: u32,
    /// Why the round ended.
    pub end_reason: EndReason,
}

// ============================================================================
// RoundState
// ============================================================================

/// Complete state of one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    /// Lifecycle status.
    pub status: RoundStatus,

    /// Accumulated score. Never decreases.
    pub score: u32,

    /// Remaining lives. Drops to -1 on the life loss that ends the round.
    pub lives: i32,

    /// Consecutive correct answers.
    pub combo: u32,

    /// Correctly answered questions.
    pub correct_count: u32,

    /// 1-based index of the current question (0 before the first one).
    pub question_index: u32,

    /// Seconds left on the round countdown.
    pub time_left: u32,

    /// The question awaiting an answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<Question>,

    /// Every resolved question in order.
    pub history: Vec<AnswerRecord>,

    /// Set once the round has ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<EndReason>,

    /// When the state was created.
    pub started_at: DateTime<Utc>,

    /// When the round ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl RoundState {
    /// Creates a `Ready` state with the given lives and countdown.
    ///
    /// # Examples
    ///
    /// ```
    /// use pantas_round::{RoundState, RoundStatus};
    ///
    /// let state = RoundState::new(2, 60);
    /// assert_eq!(state.status, RoundStatus::Ready);
    /// assert_eq!(state.lives, 2);
    /// assert_eq!(state.time_left, 60);
    /// assert!(state.current_question.is_none());
    /// ```
    #[must_use]
    pub fn new(lives: i32, time_left: u32) -> Self {
        Self {
            status: RoundStatus::Ready,
            score: 0,
            lives,
            combo: 0,
            correct_count: 0,
            question_index: 0,
            time_left,
            current_question: None,
            history: Vec::new(),
            end_reason: None,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Returns `true` once the round has ended.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns `true` while answers are accepted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, RoundStatus::Active)
    }

    /// Lives for display, never negative.
    #[must_use]
    pub fn lives_remaining(&self) -> u32 {
        u32::try_from(self.lives).unwrap_or(0)
    }

    /// Number of resolved questions.
    #[must_use]
    pub fn questions_answered(&self) -> u32 {
        u32::try_from(self.history.len()).unwrap_or(u32::MAX)
    }

    /// Builds the completion payload from the current figures.
    #[must_use]
    pub fn result(&self, end_reason: EndReason) -> RoundResult {
        RoundResult {
            score: self.score,
            correct_count: self.correct_count,
            questions_answered: self.questions_answered(),
            end_reason,
        }
    }
}
