//! Round to game-over report, end to end.

use std::sync::Arc;

use pantas_report::{
    json::JsonGenerator, AnswerInput, EndReasonInput, OutcomeInput, ReportGenerator, ReportInput,
    SummaryGenerator,
};
use pantas_round::{
    AnswerOutcome, Config, EndReason, ManualClock, Player, QuestionGenerator, RoundEngine,
    RoundState, SilentSound,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn report_input(state: &RoundState, player: &Player) -> ReportInput {
    ReportInput {
        player_name: player.name.clone(),
        score_saved: player.save_score,
        score: state.score,
        lives_remaining: state.lives_remaining(),
        end_reason: match state.end_reason.expect("round should have ended") {
            EndReason::TimeUp => EndReasonInput::TimeUp,
            EndReason::OutOfLives => EndReasonInput::OutOfLives,
        },
        started_at: state.started_at,
        ended_at: state.ended_at.expect("round should have ended"),
        answers: state
            .history
            .iter()
            .map(|record| AnswerInput {
                question_index: record.question_index,
                question: record.question.to_string(),
                answer: record.question.answer,
                selected: record.selected,
                outcome: match record.outcome {
                    AnswerOutcome::Correct => OutcomeInput::Correct,
                    AnswerOutcome::Incorrect => OutcomeInput::Incorrect,
                    AnswerOutcome::TimedOut => OutcomeInput::TimedOut,
                },
                points: record.points,
                elapsed_ms: record.elapsed_ms,
            })
            .collect(),
    }
}

/// Correct, correct, wrong, timeout, wrong.
fn played_round() -> RoundState {
    let clock = ManualClock::new();
    let mut engine = RoundEngine::new(
        Config::default(),
        QuestionGenerator::new(ChaCha8Rng::seed_from_u64(8)),
        Arc::new(SilentSound),
        Arc::new(clock.clone()),
    );
    engine.start().expect("round should start");

    let answer = |engine: &RoundEngine<ChaCha8Rng>| {
        engine
            .state()
            .current_question
            .as_ref()
            .expect("question showing")
            .answer
    };

    clock.advance_secs(3);
    let value = answer(&engine);
    engine.on_answer(value);

    clock.advance_secs(7);
    let value = answer(&engine);
    engine.on_answer(value);

    clock.advance_secs(1);
    let value = answer(&engine) + 1;
    engine.on_answer(value);

    clock.advance_secs(10);
    engine.on_question_timeout();

    clock.advance_secs(1);
    let value = answer(&engine) + 1;
    engine.on_answer(value);

    engine.snapshot()
}

#[test]
fn test_report_summarizes_round() {
    let state = played_round();
    assert_eq!(state.end_reason, Some(EndReason::OutOfLives));

    let player = Player::new("Aina");
    let report = ReportGenerator::new(report_input(&state, &player))
        .generate()
        .expect("report should build");

    assert_eq!(report.summary.score, 25);
    assert_eq!(report.summary.correct, 2);
    assert_eq!(report.summary.answered, 5);
    assert_eq!(report.summary.accuracy_percent, 40);
    assert_eq!(report.summary.best_streak, 2);
    assert_eq!(report.summary.average_answer_ms, Some(5_000));
    assert_eq!(report.summary.lives_remaining, 0);
    assert_eq!(report.summary.end_reason, EndReasonInput::OutOfLives);
    assert!(!report.is_practice());

    let text = SummaryGenerator::new(&report).generate();
    assert!(text.contains("YOUR SCORE: 25"));
    assert!(text.contains("Out of lives"));
    assert!(!text.contains("PRACTICE MODE"));
}

#[test]
fn test_practice_round_report() {
    let state = played_round();
    let player = Player::new("Aina").practice();

    let report = ReportGenerator::new(report_input(&state, &player))
        .generate()
        .expect("report should build");

    let text = SummaryGenerator::new(&report).generate();
    assert!(text.contains("PRACTICE MODE"));

    let json = JsonGenerator::new(&report)
        .generate()
        .expect("json should serialize");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["score_saved"], false);
    assert_eq!(value["answers"].as_array().map(Vec::len), Some(5));
    assert_eq!(value["answers"][3]["outcome"], "timed_out");
}
