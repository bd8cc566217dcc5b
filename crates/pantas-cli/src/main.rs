//! Pantas CLI
//!
//! Plays timed addition rounds in the terminal.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use pantas_report::{
    json::JsonGenerator, AnswerInput, EndReasonInput, OutcomeInput, ReportGenerator, ReportInput,
    RoundReport, SummaryGenerator,
};
use pantas_round::{
    AnswerOutcome, AnswerRecord, Config, EndReason, EventBroadcaster, Player, QuestionGenerator,
    RoundDriver, RoundEngine, RoundEvent, RoundState, SoundService, SystemClock,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

/// Buffered answers per round.
const ANSWER_BUFFER: usize = 16;

/// Pantas - Timed Addition Quiz
///
/// Answer as many addition questions as you can before the clock runs out.
/// Type one of the offered numbers and press Enter.
#[derive(Parser, Debug)]
#[command(name = "pantas")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: pantas.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Player name shown on the game-over screen
    #[arg(short, long)]
    name: Option<String>,

    /// Practice mode: the score is not recorded
    #[arg(long)]
    practice: bool,

    /// Seed for question generation (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Round duration in seconds (overrides the config file)
    #[arg(short, long, value_name = "SECONDS")]
    duration: Option<u32>,

    /// Print the game-over report as JSON
    #[arg(long)]
    json: bool,

    /// Also write each round's report as pretty JSON to FILE (overwritten per round)
    #[arg(short, long, value_name = "FILE")]
    output: Option<String>,

    /// Enable verbose output (sets log level to debug, lists every answer)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (warn)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Logs go to stderr so they never interleave with the game screen.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Pantas starting");
    tracing::debug!(config = ?args.config, "Config file");

    match run_session(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Plays rounds until the player declines another one, stdin closes or
/// Ctrl+C is pressed.
async fn run_session(args: Args) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(duration) = args.duration {
        config.round_duration_secs = duration;
    }

    // Re-validate after overrides
    config.validate()?;

    let mut player = Player::new(args.name.clone().unwrap_or_default());
    if args.practice {
        player = player.practice();
    }

    print_config(&config, &player);

    let mut lines = spawn_stdin_reader();
    let mut round: u64 = 0;

    loop {
        round += 1;

        let report = tokio::select! {
            Ok(()) = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down");
                println!("\nBye!");
                return Ok(());
            }
            report = play_round(&config, &player, round, &mut lines) => report?,
        };

        print_report(&report, &args)?;

        println!("\nPlay again? [y/N]");
        match lines.recv().await {
            Some(line) if is_yes(&line) => {}
            _ => break,
        }
    }

    Ok(())
}

/// Runs one round and builds its report.
async fn play_round(
    config: &Config,
    player: &Player,
    round: u64,
    lines: &mut mpsc::Receiver<String>,
) -> anyhow::Result<RoundReport> {
    let broadcaster = EventBroadcaster::default();
    let renderer = spawn_renderer(broadcaster.subscribe(), config.tick_warning_secs);

    let (done_tx, done_rx) = oneshot::channel();
    let engine = RoundEngine::new(
        config.clone(),
        QuestionGenerator::new(round_rng(config.seed, round)),
        Arc::new(TerminalSound),
        Arc::new(SystemClock),
    )
    .with_broadcaster(broadcaster)
    .with_completion(move |result| {
        let _ = done_tx.send(result);
    });

    let (answer_tx, answer_rx) = mpsc::channel(ANSWER_BUFFER);
    let mut answer_tx = Some(answer_tx);

    let driver = RoundDriver::new(engine).run(answer_rx);
    tokio::pin!(driver);

    let state = loop {
        tokio::select! {
            state = &mut driver => break state?,
            line = lines.recv(), if answer_tx.is_some() => match line {
                Some(line) => forward_answer(&line, answer_tx.as_ref()),
                None => {
                    tracing::debug!("stdin closed, round continues on timers");
                    answer_tx = None;
                }
            },
        }
    };

    // The engine and its broadcaster are gone, so the renderer drains and stops.
    join_renderer(renderer).await;

    if let Ok(result) = done_rx.await {
        tracing::info!(
            score = result.score,
            correct = result.correct_count,
            reason = %result.end_reason,
            "Round complete"
        );
    }

    let report = ReportGenerator::new(create_report_input(&state, player)?).generate()?;
    Ok(report)
}

/// Seeded rounds get a distinct, reproducible stream per round.
fn round_rng(seed: Option<u64>, round: u64) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(round - 1)),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn forward_answer(line: &str, answers: Option<&mpsc::Sender<u32>>) {
    let Some(answers) = answers else {
        return;
    };
    match parse_answer(line) {
        Some(value) => {
            if answers.try_send(value).is_err() {
                tracing::warn!(value, "Answer dropped, round is not accepting input");
            }
        }
        None if line.trim().is_empty() => {}
        None => println!("Type one of the numbers shown."),
    }
}

fn parse_answer(line: &str) -> Option<u32> {
    line.trim().parse().ok()
}

fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Reads stdin line by line for the whole session.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(ANSWER_BUFFER);
    tokio::spawn(async move {
        let mut reader = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match reader.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
    });
    rx
}

// ============================================================================
// Rendering
// ============================================================================

fn spawn_renderer(
    mut events: broadcast::Receiver<RoundEvent>,
    tick_warning_secs: u32,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => render_event(&event, tick_warning_secs),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Renderer lagged behind round events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Waits for the renderer to finish. Returns `false` if it panicked or was
/// cancelled.
async fn join_renderer(renderer: JoinHandle<()>) -> bool {
    match renderer.await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Renderer task failed");
            false
        }
    }
}

fn render_event(event: &RoundEvent, tick_warning_secs: u32) {
    match event {
        RoundEvent::RoundStart(payload) => {
            println!(
                "\nGO! {}s on the clock, {} lives.",
                payload.duration_secs, payload.lives
            );
        }
        RoundEvent::QuestionStart(payload) => {
            let options: Vec<String> = payload
                .question
                .options
                .iter()
                .map(|o| format!("[{o}]"))
                .collect();
            println!(
                "\nQ{}: {} = ?   {}   ({}s)",
                payload.question_index,
                payload.question,
                options.join(" "),
                payload.time_limit_secs
            );
            print!("> ");
            let _ = std::io::stdout().flush();
        }
        RoundEvent::Tick(payload) => {
            if payload.time_left <= tick_warning_secs || payload.time_left % 10 == 0 {
                println!("  {}s left", payload.time_left);
            }
        }
        RoundEvent::Feedback(payload) => {
            println!(
                "  {}   score {}   lives {}",
                payload.feedback.text,
                payload.score,
                payload.lives.max(0)
            );
        }
        RoundEvent::RoundComplete(result) => {
            let reason = match result.end_reason {
                EndReason::TimeUp => "Time's up!",
                EndReason::OutOfLives => "Out of lives!",
            };
            println!("\n{reason}");
        }
    }
}

/// Terminal bell for the countdown and wrong answers.
struct TerminalSound;

impl TerminalSound {
    fn bell() {
        print!("\x07");
        let _ = std::io::stdout().flush();
    }
}

impl SoundService for TerminalSound {
    fn play_tick(&self) {
        tracing::trace!("tick");
        Self::bell();
    }

    fn play_correct(&self) {
        tracing::trace!("correct");
    }

    fn play_wrong(&self) {
        tracing::trace!("wrong");
        Self::bell();
    }
}

// ============================================================================
// Config and reports
// ============================================================================

fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

fn print_config(config: &Config, player: &Player) {
    println!("Player: {}", player.name);
    if player.is_practice() {
        println!("Practice mode: score is not recorded");
    }
    println!("  Round: {}s", config.round_duration_secs);
    println!("  Per question: {}s", config.question_time_limit_secs);
    println!("  Lives: {}", config.starting_lives);
    if let Some(seed) = config.seed {
        println!("  Seed: {seed}");
    }
}

fn print_report(report: &RoundReport, args: &Args) -> anyhow::Result<()> {
    println!();
    if args.json {
        println!("{}", JsonGenerator::new(report).generate_pretty()?);
    } else if args.verbose {
        print!("{}", SummaryGenerator::new(report).with_answers().generate());
    } else {
        print!("{}", SummaryGenerator::new(report).generate());
    }

    if let Some(ref output) = args.output {
        JsonGenerator::new(report)
            .write_to_file(Path::new(output), true)
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to write report to '{output}': {e}\n\nSuggestion: Check that the directory exists and is writable"
                )
            })?;
        tracing::info!(path = %output, "Report written");
    }
    Ok(())
}

fn create_report_input(state: &RoundState, player: &Player) -> anyhow::Result<ReportInput> {
    let end_reason = state
        .end_reason
        .ok_or_else(|| anyhow::anyhow!("round finished without an end reason"))?;

    Ok(ReportInput {
        player_name: player.name.clone(),
        score_saved: player.save_score,
        score: state.score,
        lives_remaining: state.lives_remaining(),
        end_reason: convert_end_reason(end_reason),
        started_at: state.started_at,
        ended_at: state.ended_at.unwrap_or(state.started_at),
        answers: state.history.iter().map(convert_answer).collect(),
    })
}

const fn convert_end_reason(reason: EndReason) -> EndReasonInput {
    match reason {
        EndReason::TimeUp => EndReasonInput::TimeUp,
        EndReason::OutOfLives => EndReasonInput::OutOfLives,
    }
}

fn convert_answer(record: &AnswerRecord) -> AnswerInput {
    AnswerInput {
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
    }
}
