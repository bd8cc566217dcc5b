//! Pantas Report Generation
//!
//! Turns a finished round into a [`RoundReport`]: the game-over summary plus
//! the per-question answer list. Reports can be serialized to JSON or rendered
//! as the terminal game-over screen.
//!
//! # Generators
//!
//! - [`ReportGenerator`] - Builds a [`RoundReport`] from a [`ReportInput`]
//! - [`json::JsonGenerator`] - Compact or pretty JSON output
//! - [`SummaryGenerator`] - Plain-text game-over screen
//!
//! # Example
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use pantas_report::{AnswerInput, EndReasonInput, OutcomeInput, ReportGenerator, ReportInput};
//!
//! let started_at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
//! let input = ReportInput {
//!     player_name: "Aina".to_string(),
//!     score_saved: true,
//!     score: 15,
//!     lives_remaining: 2,
//!     end_reason: EndReasonInput::TimeUp,
//!     started_at,
//!     ended_at: started_at + chrono::Duration::seconds(60),
//!     answers: vec![AnswerInput {
//!         question_index: 1,
//!         question: "7 + 5".to_string(),
//!         answer: 12,
//!         selected: Some(12),
//!         outcome: OutcomeInput::Correct,
//!         points: 15,
//!         elapsed_ms: 2_000,
//!     }],
//! };
//!
//! let report = ReportGenerator::new(input).generate().unwrap();
//! assert_eq!(report.summary.accuracy_percent, 100);
//! ```

pub mod json;
mod summary;

pub use summary::SummaryGenerator;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize the report to JSON.
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to read or write report files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid report data.
    #[error("invalid report data: {0}")]
    InvalidData(String),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

// ============================================================================
// Input Types (local mirror of the round crate's types)
// ============================================================================

/// Why the round ended.
///
/// Local copy of the round crate's end reason so reports can be built
/// without depending on the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReasonInput {
    /// The round countdown reached zero.
    #[default]
    TimeUp,
    /// The player ran out of lives.
    OutOfLives,
}

impl EndReasonInput {
    /// Returns a human-readable description of the end reason.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::TimeUp => "Time's up",
            Self::OutOfLives => "Out of lives",
        }
    }
}

impl std::fmt::Display for EndReasonInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// How a single question was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeInput {
    /// Answered correctly.
    Correct,
    /// Answered with a wrong option.
    Incorrect,
    /// The question timer expired.
    TimedOut,
}

impl OutcomeInput {
    /// Returns `true` for a correct answer.
    #[must_use]
    pub const fn is_correct(&self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// One resolved question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerInput {
    /// 1-based question number within the round.
    pub question_index: u32,

    /// Question text, e.g. `"7 + 5"`.
    pub question: String,

    /// Correct answer.
    pub answer: u32,

    /// Option chosen by the player, `None` on timeout.
    pub selected: Option<u32>,

    /// How the question was resolved.
    pub outcome: OutcomeInput,

    /// Points awarded.
    pub points: u32,

    /// Milliseconds between the question appearing and its resolution.
    pub elapsed_ms: u64,
}

/// Everything needed to build a report for one round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInput {
    /// Player display name.
    pub player_name: String,

    /// `false` when the round was played in practice mode.
    pub score_saved: bool,

    /// Final score.
    pub score: u32,

    /// Lives left when the round ended.
    pub lives_remaining: u32,

    /// Why the round ended.
    pub end_reason: EndReasonInput,

    /// When the round started.
    pub started_at: DateTime<Utc>,

    /// When the round ended.
    pub ended_at: DateTime<Utc>,

    /// Resolved questions in order.
    pub answers: Vec<AnswerInput>,
}

// ============================================================================
// Report
// ============================================================================

/// Game-over report for one round.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundReport {
    /// Player display name.
    pub player_name: String,

    /// `false` when the score was not recorded.
    pub score_saved: bool,

    /// Aggregate figures.
    pub summary: ReportSummary,

    /// Resolved questions in order.
    pub answers: Vec<AnswerInput>,
}

impl RoundReport {
    /// Returns `true` when the round was played in practice mode.
    #[must_use]
    pub const fn is_practice(&self) -> bool {
        !self.score_saved
    }
}

/// Aggregate figures for a round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Final score.
    pub score: u32,

    /// Questions answered correctly.
    pub correct: u32,

    /// Questions resolved in any way.
    pub answered: u32,

    /// Correct answers as a rounded percentage of `answered`.
    pub accuracy_percent: u32,

    /// Longest run of consecutive correct answers.
    pub best_streak: u32,

    /// Mean time to a correct answer, `None` when there were none.
    pub average_answer_ms: Option<u64>,

    /// Lives left when the round ended.
    pub lives_remaining: u32,

    /// Why the round ended.
    pub end_reason: EndReasonInput,

    /// Wall-clock duration of the round.
    pub duration_seconds: u64,
}

// ============================================================================
// ReportGenerator
// ============================================================================

/// Builds a [`RoundReport`] from a [`ReportInput`].
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    input: ReportInput,
}

impl ReportGenerator {
    /// Creates a generator for the given input.
    #[must_use]
    pub const fn new(input: ReportInput) -> Self {
        Self { input }
    }

    /// Computes the summary and assembles the report.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidData` if the round ends before it starts
    /// or the answer points exceed the final score.
    pub fn generate(self) -> Result<RoundReport> {
        let input = self.input;

        let duration = input.ended_at.signed_duration_since(input.started_at);
        let duration_seconds = u64::try_from(duration.num_seconds()).map_err(|_| {
            ReportError::InvalidData(format!(
                "round ended at {} before it started at {}",
                input.ended_at, input.started_at
            ))
        })?;

        let awarded: u64 = input.answers.iter().map(|a| u64::from(a.points)).sum();
        if awarded > u64::from(input.score) {
            return Err(ReportError::InvalidData(format!(
                "answers award {awarded} points but the score is {}",
                input.score
            )));
        }

        let answered = count_u32(input.answers.len());
        let correct = count_u32(input.answers.iter().filter(|a| a.outcome.is_correct()).count());

        let summary = ReportSummary {
            score: input.score,
            correct,
            answered,
            accuracy_percent: accuracy_percent(correct, answered),
            best_streak: best_streak(&input.answers),
            average_answer_ms: average_answer_ms(&input.answers),
            lives_remaining: input.lives_remaining,
            end_reason: input.end_reason,
            duration_seconds,
        };

        Ok(RoundReport {
            player_name: input.player_name,
            score_saved: input.score_saved,
            summary,
            answers: input.answers,
        })
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Rounded percentage, 0 when nothing was answered.
fn accuracy_percent(correct: u32, answered: u32) -> u32 {
    if answered == 0 {
        return 0;
    }
    (correct * 100 + answered / 2) / answered
}

/// Longest run of consecutive correct answers.
fn best_streak(answers: &[AnswerInput]) -> u32 {
    let mut best = 0;
    let mut current = 0;
    for answer in answers {
        if answer.outcome.is_correct() {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

fn average_answer_ms(answers: &[AnswerInput]) -> Option<u64> {
    let times: Vec<u64> = answers
        .iter()
        .filter(|a| a.outcome.is_correct())
        .map(|a| a.elapsed_ms)
        .collect();
    if times.is_empty() {
        return None;
    }
    Some(times.iter().sum::<u64>() / times.len() as u64)
}
