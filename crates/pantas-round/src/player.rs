//! Player identity, read-only for the round.

use serde::{Deserialize, Serialize};

/// Name shown when no player name is given.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Who is playing, and whether their score counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Display name.
    pub name: String,

    /// `false` puts the round in practice mode: the score is not recorded.
    pub save_score: bool,
}

impl Player {
    /// Creates a player whose score is recorded.
    ///
    /// Blank names fall back to [`DEFAULT_PLAYER_NAME`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let name = if name.trim().is_empty() {
            DEFAULT_PLAYER_NAME.to_string()
        } else {
            name.trim().to_string()
        };
        Self {
            name,
            save_score: true,
        }
    }

    /// Switches the player to practice mode.
    #[must_use]
    pub fn practice(mut self) -> Self {
        self.save_score = false;
        self
    }

    /// Returns `true` when the score will not be recorded.
    #[must_use]
    pub const fn is_practice(&self) -> bool {
        !self.save_score
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYER_NAME)
    }
}
