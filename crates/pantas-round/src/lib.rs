//! Pantas Round Engine
//!
//! Runs a timed round of addition questions: question generation with
//! difficulty bands, scoring and combos, lives, and the two round timers.

pub mod clock;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod events;
pub mod player;
pub mod question;
pub mod round_state;
pub mod sound;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, ScoringConfig};
pub use driver::RoundDriver;
pub use engine::{CompletionCallback, RoundEngine, TimerHandle};
pub use error::{QuizError, Result};
pub use events::{EventBroadcaster, Feedback, FeedbackCategory, RoundEvent};
pub use player::Player;
pub use question::{generate_question, DifficultyBand, Question, QuestionGenerator, ANSWER_LIMIT};
pub use round_state::{AnswerOutcome, AnswerRecord, EndReason, RoundResult, RoundState, RoundStatus};
pub use sound::{RecordingSound, SilentSound, SoundCue, SoundService};
