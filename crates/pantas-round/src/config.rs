//! Configuration types for a Pantas round.
//!
//! All timing and scoring constants of a round live here so a round can be
//! tuned from `pantas.json` without touching the engine.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "pantas.json";

/// Upper bound for `startingLives`.
const MAX_STARTING_LIVES: u32 = 99;

/// Upper bound for each scoring value.
const MAX_POINTS: u32 = 10_000;

/// Default round length in seconds.
const fn default_round_duration() -> u32 {
    60
}

/// Default per-question time limit in seconds.
const fn default_question_time_limit() -> u32 {
    10
}

/// Default window in seconds for the fast-answer bonus.
const fn default_fast_answer() -> u32 {
    5
}

/// Default number of lives at round start.
const fn default_starting_lives() -> u32 {
    2
}

/// Default countdown value at or below which tick cues are played.
const fn default_tick_warning() -> u32 {
    11
}

/// Default lifetime of an on-screen feedback message.
const fn default_feedback_millis() -> u64 {
    800
}

const fn default_base_points() -> u32 {
    10
}

const fn default_fast_bonus() -> u32 {
    5
}

const fn default_combo_bonus() -> u32 {
    20
}

const fn default_combo_interval() -> u32 {
    3
}

/// Main configuration for a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Total length of the round countdown in seconds.
    #[serde(default = "default_round_duration")]
    pub round_duration_secs: u32,

    /// Seconds a question may stay unanswered before it times out.
    #[serde(default = "default_question_time_limit")]
    pub question_time_limit_secs: u32,

    /// Answers strictly faster than this earn the fast bonus.
    #[serde(default = "default_fast_answer")]
    pub fast_answer_secs: u32,

    /// Lives at round start.
    #[serde(default = "default_starting_lives")]
    pub starting_lives: u32,

    /// Tick cues play while the countdown is at or below this value.
    #[serde(default = "default_tick_warning")]
    pub tick_warning_secs: u32,

    /// How long a feedback message stays visible, in milliseconds.
    #[serde(default = "default_feedback_millis")]
    pub feedback_millis: u64,

    /// Seed for the question generator. Random when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Point values awarded for correct answers.
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            round_duration_secs: default_round_duration(),
            question_time_limit_secs: default_question_time_limit(),
            fast_answer_secs: default_fast_answer(),
            starting_lives: default_starting_lives(),
            tick_warning_secs: default_tick_warning(),
            feedback_millis: default_feedback_millis(),
            seed: None,
            scoring: ScoringConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `pantas.json` in the current directory and falls back to
    /// defaults when it is absent.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            QuizError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `pantas.json` inside `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::ConfigParseError` if the file cannot be read or
    /// contains invalid JSON, and `QuizError::ConfigValidationError` if the
    /// parsed values are out of range.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(QuizError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| QuizError::config_parse(path, e.to_string()))?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "Config loaded");
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::ConfigValidationError` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.round_duration_secs == 0 {
            return Err(QuizError::config_validation(
                "roundDurationSecs must be greater than 0",
                "Set roundDurationSecs to at least 1 second in your pantas.json",
            ));
        }

        if self.question_time_limit_secs == 0 {
            return Err(QuizError::config_validation(
                "questionTimeLimitSecs must be greater than 0",
                "Set questionTimeLimitSecs to at least 1 second in your pantas.json",
            ));
        }

        if self.fast_answer_secs == 0 {
            return Err(QuizError::config_validation(
                "fastAnswerSecs must be greater than 0",
                "Set fastAnswerSecs to at least 1 second in your pantas.json",
            ));
        }

        if self.starting_lives > MAX_STARTING_LIVES {
            return Err(QuizError::config_validation(
                format!("startingLives must be at most {MAX_STARTING_LIVES}"),
                "Lower startingLives in your pantas.json",
            ));
        }

        if self.feedback_millis == 0 {
            return Err(QuizError::config_validation(
                "feedbackMillis must be greater than 0",
                "Set feedbackMillis to a positive number of milliseconds in your pantas.json",
            ));
        }

        let scoring = &self.scoring;
        for (field, value) in [
            ("basePoints", scoring.base_points),
            ("fastBonus", scoring.fast_bonus),
            ("comboBonus", scoring.combo_bonus),
        ] {
            if value > MAX_POINTS {
                return Err(QuizError::config_validation(
                    format!("scoring.{field} must be at most {MAX_POINTS}"),
                    format!("Lower scoring.{field} in your pantas.json"),
                ));
            }
        }

        if self.scoring.combo_interval == 0 {
            return Err(QuizError::config_validation(
                "scoring.comboInterval must be greater than 0",
                "Set scoring.comboInterval to at least 1 in your pantas.json",
            ));
        }

        Ok(())
    }

    /// Total round length.
    #[must_use]
    pub fn round_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.round_duration_secs))
    }

    /// Per-question timeout.
    #[must_use]
    pub fn question_time_limit(&self) -> Duration {
        Duration::from_secs(u64::from(self.question_time_limit_secs))
    }

    /// Fast-answer bonus window.
    #[must_use]
    pub fn fast_answer_window(&self) -> Duration {
        Duration::from_secs(u64::from(self.fast_answer_secs))
    }

    /// Feedback message lifetime.
    #[must_use]
    pub const fn feedback_duration(&self) -> Duration {
        Duration::from_millis(self.feedback_millis)
    }
}

/// Point values for correct answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    /// Points for any correct answer.
    #[serde(default = "default_base_points")]
    pub base_points: u32,

    /// Extra points for answering inside the fast window.
    #[serde(default = "default_fast_bonus")]
    pub fast_bonus: u32,

    /// Extra points every `combo_interval` consecutive correct answers.
    #[serde(default = "default_combo_bonus")]
    pub combo_bonus: u32,

    /// Streak length that triggers the combo bonus.
    #[serde(default = "default_combo_interval")]
    pub combo_interval: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            base_points: default_base_points(),
            fast_bonus: default_fast_bonus(),
            combo_bonus: default_combo_bonus(),
            combo_interval: default_combo_interval(),
        }
    }
}
