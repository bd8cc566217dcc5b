//! Audio cue sink.
//!
//! The engine only fires cues; playback, volume and failures belong to the
//! implementation and are never reported back.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Audio cues emitted during a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    /// Final-countdown beep.
    Tick,
    /// Correct answer.
    Correct,
    /// Wrong answer or timeout.
    Wrong,
}

/// Fire-and-forget audio output.
pub trait SoundService: Send + Sync {
    /// Plays the countdown tick.
    fn play_tick(&self);

    /// Plays the correct-answer cue.
    fn play_correct(&self);

    /// Plays the wrong-answer cue.
    fn play_wrong(&self);

    /// Dispatches `cue` to the matching method.
    fn play(&self, cue: SoundCue) {
        match cue {
            SoundCue::Tick => self.play_tick(),
            SoundCue::Correct => self.play_correct(),
            SoundCue::Wrong => self.play_wrong(),
        }
    }
}

/// Sound service that plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSound;

impl SoundService for SilentSound {
    fn play_tick(&self) {}
    fn play_correct(&self) {}
    fn play_wrong(&self) {}
}

/// Sound service that remembers every cue, for assertions and replays.
#[derive(Debug, Clone, Default)]
pub struct RecordingSound {
    cues: Arc<Mutex<Vec<SoundCue>>>,
}

impl RecordingSound {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cues recorded so far.
    #[must_use]
    pub fn cues(&self) -> Vec<SoundCue> {
        self.cues.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Number of recorded occurrences of `cue`.
    #[must_use]
    pub fn count(&self, cue: SoundCue) -> usize {
        self.cues
            .lock()
            .map(|c| c.iter().filter(|&&c| c == cue).count())
            .unwrap_or(0)
    }

    fn record(&self, cue: SoundCue) {
        if let Ok(mut cues) = self.cues.lock() {
            cues.push(cue);
        }
    }
}

impl SoundService for RecordingSound {
    fn play_tick(&self) {
        self.record(SoundCue::Tick);
    }

    fn play_correct(&self) {
        self.record(SoundCue::Correct);
    }

    fn play_wrong(&self) {
        self.record(SoundCue::Wrong);
    }
}
