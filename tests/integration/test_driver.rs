//! Driver tests on tokio's paused clock.
//!
//! A simulated player listens to round events and answers through the same
//! channel the terminal uses.

use std::sync::Arc;
use std::time::Duration;

use pantas_round::{
    AnswerOutcome, Config, EndReason, EventBroadcaster, QuestionGenerator, RecordingSound,
    RoundDriver, RoundEngine, RoundEvent, SilentSound, SoundCue, SystemClock,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};

/// Answers every question after `delay`, correctly or not.
fn spawn_player(
    mut events: broadcast::Receiver<RoundEvent>,
    answers: mpsc::Sender<u32>,
    delay: Duration,
    correct: bool,
) -> JoinHandle<Vec<&'static str>> {
    tokio::spawn(async move {
        let mut seen = Vec::new();
        while let Ok(event) = events.recv().await {
            seen.push(event.event_name());
            if let RoundEvent::QuestionStart(payload) = event {
                sleep(delay).await;
                let value = if correct {
                    payload.question.answer
                } else {
                    payload.question.answer + 1
                };
                let _ = answers.send(value).await;
            }
        }
        seen
    })
}

fn engine(config: Config, broadcaster: &EventBroadcaster) -> RoundEngine<ChaCha8Rng> {
    RoundEngine::new(
        config,
        QuestionGenerator::new(ChaCha8Rng::seed_from_u64(99)),
        Arc::new(SilentSound),
        Arc::new(SystemClock),
    )
    .with_broadcaster(broadcaster.clone())
}

#[tokio::test(start_paused = true)]
async fn test_fast_player_hits_combo_before_time_up() {
    let broadcaster = EventBroadcaster::new(256);
    let (tx, rx) = mpsc::channel(8);
    let player = spawn_player(
        broadcaster.subscribe(),
        tx,
        Duration::from_millis(1500),
        true,
    );

    let config = Config {
        round_duration_secs: 5,
        ..Default::default()
    };
    let state = RoundDriver::new(engine(config, &broadcaster))
        .run(rx)
        .await
        .expect("round should run");
    drop(broadcaster);

    // Answers at 1.5s, 3.0s and 4.5s; the fourth would land after 5s.
    assert_eq!(state.correct_count, 3);
    assert_eq!(state.score, 15 + 15 + 35);
    assert_eq!(state.end_reason, Some(EndReason::TimeUp));
    assert_eq!(state.lives, 2);
    assert!(state
        .history
        .iter()
        .all(|r| (1500..1600).contains(&r.elapsed_ms)));

    let seen = player.await.expect("player task");
    assert_eq!(seen.first(), Some(&"round_start"));
    assert_eq!(seen.last(), Some(&"round_complete"));
    assert_eq!(seen.iter().filter(|&&n| n == "question_start").count(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_wrong_player_runs_out_of_lives() {
    let broadcaster = EventBroadcaster::new(256);
    let (tx, rx) = mpsc::channel(8);
    let _player = spawn_player(broadcaster.subscribe(), tx, Duration::from_secs(2), false);

    let started = Instant::now();
    let state = RoundDriver::new(engine(Config::default(), &broadcaster))
        .run(rx)
        .await
        .expect("round should run");

    assert_eq!(state.end_reason, Some(EndReason::OutOfLives));
    assert_eq!(state.history.len(), 3);
    assert!(state
        .history
        .iter()
        .all(|r| r.outcome == AnswerOutcome::Incorrect));
    assert_eq!(started.elapsed(), Duration::from_secs(6));
    assert_eq!(state.time_left, 54);
}

#[tokio::test(start_paused = true)]
async fn test_answer_resets_question_timeout() {
    let sound = RecordingSound::new();
    let broadcaster = EventBroadcaster::new(256);
    let (tx, rx) = mpsc::channel(8);
    // Every answer lands one second before its question would time out.
    let _player = spawn_player(broadcaster.subscribe(), tx, Duration::from_secs(9), true);

    let config = Config {
        round_duration_secs: 30,
        ..Default::default()
    };
    let engine = RoundEngine::new(
        config,
        QuestionGenerator::new(ChaCha8Rng::seed_from_u64(99)),
        Arc::new(sound.clone()),
        Arc::new(SystemClock),
    )
    .with_broadcaster(broadcaster.clone());

    let state = RoundDriver::new(engine)
        .run(rx)
        .await
        .expect("round should run");

    assert_eq!(state.end_reason, Some(EndReason::TimeUp));
    assert_eq!(state.lives, 2);
    assert!(state
        .history
        .iter()
        .all(|r| r.outcome == AnswerOutcome::Correct));
    assert_eq!(state.history.len(), 3);
    assert_eq!(sound.count(SoundCue::Wrong), 0);
}
