//! Plain-text game-over screen.
//!
//! ```rust
//! use pantas_report::{RoundReport, SummaryGenerator};
//!
//! let report = RoundReport::default();
//! let text = SummaryGenerator::new(&report).generate();
//! assert!(text.starts_with("GAME OVER"));
//! ```

use std::fmt::Write;

use crate::{AnswerInput, OutcomeInput, RoundReport};

/// Renders a [`RoundReport`] as the terminal game-over screen.
pub struct SummaryGenerator<'a> {
    report: &'a RoundReport,
    include_answers: bool,
}

impl<'a> SummaryGenerator<'a> {
    /// Creates a generator that prints the summary only.
    #[must_use]
    pub const fn new(report: &'a RoundReport) -> Self {
        Self {
            report,
            include_answers: false,
        }
    }

    /// Also lists every resolved question.
    #[must_use]
    pub const fn with_answers(mut self) -> Self {
        self.include_answers = true;
        self
    }

    /// Generates the game-over text.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        self.write_header(&mut output);
        self.write_practice_notice(&mut output);
        self.write_summary(&mut output);
        if self.include_answers {
            self.write_answers(&mut output);
        }

        output
    }

    fn write_header(&self, output: &mut String) {
        let _ = writeln!(output, "GAME OVER");
        let _ = writeln!(output, "Well done, {}!\n", self.report.player_name);
    }

    fn write_practice_notice(&self, output: &mut String) {
        if self.report.is_practice() {
            let _ = writeln!(output, "PRACTICE MODE");
            let _ = writeln!(output, "(Score is not recorded)\n");
        }
    }

    fn write_summary(&self, output: &mut String) {
        let summary = &self.report.summary;

        let _ = writeln!(output, "YOUR SCORE: {}\n", summary.score);
        let _ = writeln!(
            output,
            "Correct:      {} / {} ({}%)",
            summary.correct, summary.answered, summary.accuracy_percent
        );
        let _ = writeln!(output, "Best streak:  {}", summary.best_streak);
        if let Some(ms) = summary.average_answer_ms {
            let _ = writeln!(output, "Avg. answer:  {}", format_millis(ms));
        }
        let _ = writeln!(output, "Lives left:   {}", summary.lives_remaining);
        let _ = writeln!(output, "Ended:        {}", summary.end_reason);
        let _ = writeln!(
            output,
            "Duration:     {}",
            format_duration(summary.duration_seconds)
        );
    }

    fn write_answers(&self, output: &mut String) {
        if self.report.answers.is_empty() {
            return;
        }
        let _ = writeln!(output, "\nAnswers:");
        for answer in &self.report.answers {
            write_answer(output, answer);
        }
    }
}

fn write_answer(output: &mut String, answer: &AnswerInput) {
    let verdict = match answer.outcome {
        OutcomeInput::Correct => format!("+{}", answer.points),
        OutcomeInput::Incorrect => "wrong".to_string(),
        OutcomeInput::TimedOut => "timed out".to_string(),
    };
    let selected = answer
        .selected
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    let _ = writeln!(
        output,
        "  {:>2}. {} = {:<3} you: {:<3} {} ({})",
        answer.question_index,
        answer.question,
        answer.answer,
        selected,
        verdict,
        format_millis(answer.elapsed_ms)
    );
}

/// Formats a duration in seconds as a human-readable string.
///
/// Examples: "45s", "1m", "1m 5s"
fn format_duration(seconds: u64) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if secs > 0 || parts.is_empty() {
        parts.push(format!("{secs}s"));
    }

    parts.join(" ")
}

/// Formats milliseconds with one decimal of seconds, e.g. "2.5s".
fn format_millis(ms: u64) -> String {
    format!("{}.{}s", ms / 1000, (ms % 1000) / 100)
}
