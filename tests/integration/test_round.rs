//! End-to-end round scenarios driven by a manual clock.
//!
//! Timers are fired by hand, so every scenario is deterministic.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use pantas_round::{
    AnswerOutcome, Config, EndReason, EventBroadcaster, FeedbackCategory, ManualClock,
    QuestionGenerator, RecordingSound, RoundEngine, RoundEvent, RoundResult, RoundStatus,
    SoundCue,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

struct Round {
    engine: RoundEngine<ChaCha8Rng>,
    clock: ManualClock,
    sound: RecordingSound,
    results: Arc<Mutex<Vec<RoundResult>>>,
}

impl Round {
    fn new(config: Config) -> Self {
        let clock = ManualClock::new();
        let sound = RecordingSound::new();
        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&results);
        let engine = RoundEngine::new(
            config,
            QuestionGenerator::new(ChaCha8Rng::seed_from_u64(2024)),
            Arc::new(sound.clone()),
            Arc::new(clock.clone()),
        )
        .with_completion(move |result| sink.lock().expect("results lock").push(result));

        Self {
            engine,
            clock,
            sound,
            results,
        }
    }

    fn started(config: Config) -> Self {
        let mut round = Self::new(config);
        round.engine.start().expect("round should start");
        round
    }

    fn answer(&self) -> u32 {
        self.engine
            .state()
            .current_question
            .as_ref()
            .expect("a question should be showing")
            .answer
    }

    fn answer_after(&mut self, secs: u64, correct: bool) {
        self.clock.advance_secs(secs);
        let value = if correct {
            self.answer()
        } else {
            self.answer() + 1
        };
        self.engine.on_answer(value);
    }

    fn results(&self) -> Vec<RoundResult> {
        self.results.lock().expect("results lock").clone()
    }
}

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/pantas.json")
}

/// Fast, wrong, slow, slow, slow-with-combo.
#[test]
fn test_mixed_round_scores_sixty_five() {
    let mut round = Round::started(Config::default());

    round.answer_after(2, true);
    assert_eq!(round.engine.state().score, 15);
    assert_eq!(round.engine.feedback().expect("feedback").text, "FAST! +15");

    round.answer_after(1, false);
    assert_eq!(round.engine.state().lives, 1);
    assert_eq!(round.engine.state().combo, 0);
    assert_eq!(round.engine.feedback().expect("feedback").text, "WRONG!");

    round.answer_after(6, true);
    round.answer_after(6, true);
    assert_eq!(round.engine.state().score, 35);

    round.answer_after(6, true);
    let state = round.engine.state();
    assert_eq!(state.score, 65);
    assert_eq!(state.correct_count, 4);
    assert_eq!(state.combo, 3);
    assert_eq!(state.question_index, 6);
    assert_eq!(
        round.engine.feedback().expect("feedback").category,
        FeedbackCategory::Combo
    );
    assert_eq!(round.engine.feedback().expect("feedback").text, "COMBO! +20");

    let outcomes: Vec<AnswerOutcome> = state.history.iter().map(|r| r.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            AnswerOutcome::Correct,
            AnswerOutcome::Incorrect,
            AnswerOutcome::Correct,
            AnswerOutcome::Correct,
            AnswerOutcome::Correct,
        ]
    );
    assert_eq!(round.sound.count(SoundCue::Correct), 4);
    assert_eq!(round.sound.count(SoundCue::Wrong), 1);
}

#[test]
fn test_three_misses_end_the_round() {
    let mut round = Round::started(Config::default());

    round.answer_after(1, false);
    round.clock.advance_secs(10);
    round.engine.on_question_timeout();
    assert_eq!(round.engine.state().lives, 0);
    assert!(!round.engine.is_ended());

    round.answer_after(1, false);

    let state = round.engine.state();
    assert_eq!(state.status, RoundStatus::Ended);
    assert_eq!(state.end_reason, Some(EndReason::OutOfLives));
    assert_eq!(state.lives, -1);
    assert!(round.engine.countdown().is_none());
    assert!(round.engine.question_timer().is_none());

    let results = round.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].end_reason, EndReason::OutOfLives);
    assert_eq!(results[0].questions_answered, 3);
}

#[test]
fn test_countdown_runs_out() {
    let config = Config {
        round_duration_secs: 12,
        ..Default::default()
    };
    let mut round = Round::started(config);

    for _ in 0..12 {
        round.clock.advance_secs(1);
        round.engine.on_tick();
    }

    let state = round.engine.state();
    assert_eq!(state.time_left, 0);
    assert_eq!(state.end_reason, Some(EndReason::TimeUp));
    // Beeps on previous values 11 down to 2.
    assert_eq!(round.sound.count(SoundCue::Tick), 10);
    assert_eq!(round.results().len(), 1);
}

#[test]
fn test_events_after_end_change_nothing() {
    let mut round = Round::started(Config {
        starting_lives: 0,
        ..Default::default()
    });
    round.answer_after(1, false);
    assert!(round.engine.is_ended());

    let before = round.engine.snapshot();
    let cues = round.sound.cues().len();

    round.engine.on_tick();
    round.engine.on_question_timeout();
    round.answer_after(1, true);

    let after = round.engine.snapshot();
    assert_eq!(after.score, before.score);
    assert_eq!(after.lives, before.lives);
    assert_eq!(after.time_left, before.time_left);
    assert_eq!(after.history.len(), before.history.len());
    assert_eq!(round.sound.cues().len(), cues);
    assert_eq!(round.results().len(), 1);
}

#[test]
fn test_broadcaster_sees_round_in_order() {
    let broadcaster = EventBroadcaster::new(64);
    let mut events = broadcaster.subscribe();

    let mut round = Round::new(Config::default());
    round.engine = RoundEngine::new(
        Config::default(),
        QuestionGenerator::new(ChaCha8Rng::seed_from_u64(3)),
        Arc::new(round.sound.clone()),
        Arc::new(round.clock.clone()),
    )
    .with_broadcaster(broadcaster);

    round.engine.start().expect("round should start");
    round.answer_after(1, true);
    round.clock.advance_secs(1);
    round.engine.on_tick();

    let mut names = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let RoundEvent::Feedback(payload) = &event {
            assert_eq!(payload.score, 15);
            assert_eq!(payload.lives, 2);
        }
        names.push(event.event_name());
    }
    assert_eq!(
        names,
        vec![
            "round_start",
            "question_start",
            "feedback",
            "question_start",
            "tick"
        ]
    );
}

#[test]
fn test_fixture_config_shapes_round() {
    let config = Config::load_from_file(&fixture_path()).expect("fixture config should load");
    assert_eq!(config.round_duration_secs, 30);
    assert_eq!(config.question_time_limit_secs, 8);
    assert_eq!(config.seed, Some(42));
    // Unset fields keep their defaults.
    assert_eq!(config.fast_answer_secs, 5);

    let mut round = Round::started(config);
    assert_eq!(round.engine.state().time_left, 30);

    round.answer_after(1, false);
    assert_eq!(round.engine.state().lives, 0);
    assert_eq!(round.engine.state().question_index, 2);
    round.clock.advance_secs(8);
    round.engine.on_question_timeout();
    assert_eq!(
        round.engine.state().end_reason,
        Some(EndReason::OutOfLives)
    );
    // The timeout that ends the round does not show another question.
    assert_eq!(round.engine.state().question_index, 2);
    assert!(round.engine.question_timer().is_none());
    assert!(round.engine.countdown().is_none());
}
