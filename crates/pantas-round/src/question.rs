//! Addition problems and the generator that produces them.
//!
//! Operand ranges tighten into harder bands as the question index grows.
//! Both the operand draw and the distractor fill are retry loops; the band
//! table guarantees that every draw is accepted and that `answer ± 1..=3`
//! always holds three admissible distractors.

use std::fmt;
use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Every answer must stay strictly below this value.
pub const ANSWER_LIMIT: u32 = 20;

/// Number of answer options shown for each question.
pub const OPTION_COUNT: usize = 4;

/// Largest distance between the answer and a distractor.
const MAX_DISTRACTOR_OFFSET: i64 = 3;

// ============================================================================
// DifficultyBand
// ============================================================================

/// Difficulty tier selecting the operand ranges for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyBand {
    /// Questions 1 to 5.
    Warmup,
    /// Questions 6 to 10.
    Standard,
    /// Question 11 onwards.
    Challenge,
}

impl DifficultyBand {
    /// Selects the band for a 1-based question index.
    ///
    /// Index 0 is treated like the first question.
    ///
    /// # Examples
    ///
    /// ```
    /// use pantas_round::DifficultyBand;
    ///
    /// assert_eq!(DifficultyBand::for_index(1), DifficultyBand::Warmup);
    /// assert_eq!(DifficultyBand::for_index(6), DifficultyBand::Standard);
    /// assert_eq!(DifficultyBand::for_index(11), DifficultyBand::Challenge);
    /// ```
    #[must_use]
    pub const fn for_index(question_index: u32) -> Self {
        match question_index {
            0..=5 => Self::Warmup,
            6..=10 => Self::Standard,
            _ => Self::Challenge,
        }
    }

    /// Range for the first operand.
    #[must_use]
    pub const fn num1_range(self) -> RangeInclusive<u32> {
        match self {
            Self::Warmup => 1..=5,
            Self::Standard => 4..=9,
            Self::Challenge => 6..=9,
        }
    }

    /// Range for the second operand.
    #[must_use]
    pub const fn num2_range(self) -> RangeInclusive<u32> {
        match self {
            Self::Warmup => 1..=4,
            Self::Standard => 2..=6,
            Self::Challenge => 5..=9,
        }
    }
}

// ============================================================================
// Question
// ============================================================================

/// A single addition problem with four candidate answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// First operand.
    pub num1: u32,
    /// Second operand.
    pub num2: u32,
    /// `num1 + num2`, always below [`ANSWER_LIMIT`].
    pub answer: u32,
    /// Four distinct positive values in display order, one of them `answer`.
    pub options: Vec<u32>,
}

impl Question {
    /// Returns `true` if `value` is the correct answer.
    #[must_use]
    pub const fn is_correct(&self, value: u32) -> bool {
        value == self.answer
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", self.num1, self.num2)
    }
}

// ============================================================================
// QuestionGenerator
// ============================================================================

/// Produces questions keyed to the question index.
///
/// The generator carries no state besides its random source, so the same
/// seed and index sequence always yields the same questions.
#[derive(Debug, Clone)]
pub struct QuestionGenerator<R> {
    rng: R,
}

impl<R: Rng> QuestionGenerator<R> {
    /// Creates a generator drawing from `rng`.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generates the question for a 1-based `question_index`.
    pub fn generate(&mut self, question_index: u32) -> Question {
        generate_question(&mut self.rng, question_index)
    }
}

/// Generates one question for `question_index` from `rng`.
pub fn generate_question<R: Rng + ?Sized>(rng: &mut R, question_index: u32) -> Question {
    let band = DifficultyBand::for_index(question_index);

    let (num1, num2) = loop {
        let num1 = rng.gen_range(band.num1_range());
        let num2 = rng.gen_range(band.num2_range());
        if num1 + num2 < ANSWER_LIMIT {
            break (num1, num2);
        }
    };
    let answer = num1 + num2;

    let mut options = Vec::with_capacity(OPTION_COUNT);
    options.push(answer);
    while options.len() < OPTION_COUNT {
        let offset = rng.gen_range(1..=MAX_DISTRACTOR_OFFSET);
        let signed = if rng.gen_bool(0.5) { offset } else { -offset };
        let candidate = i64::from(answer) + signed;
        if candidate <= 0 {
            continue;
        }
        if let Ok(candidate) = u32::try_from(candidate) {
            if !options.contains(&candidate) {
                options.push(candidate);
            }
        }
    }
    options.shuffle(rng);

    Question {
        num1,
        num2,
        answer,
        options,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn assert_well_formed(question: &Question, question_index: u32) {
        let band = DifficultyBand::for_index(question_index);
        assert!(band.num1_range().contains(&question.num1));
        assert!(band.num2_range().contains(&question.num2));
        assert_eq!(question.answer, question.num1 + question.num2);
        assert!(question.answer < ANSWER_LIMIT);

        let unique: HashSet<u32> = question.options.iter().copied().collect();
        assert_eq!(question.options.len(), OPTION_COUNT);
        assert_eq!(unique.len(), OPTION_COUNT);
        assert!(unique.contains(&question.answer));
        assert!(question.options.iter().all(|&o| o > 0));
        assert!(question
            .options
            .iter()
            .all(|&o| o.abs_diff(question.answer) <= 3));
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(DifficultyBand::for_index(0), DifficultyBand::Warmup);
        assert_eq!(DifficultyBand::for_index(5), DifficultyBand::Warmup);
        assert_eq!(DifficultyBand::for_index(6), DifficultyBand::Standard);
        assert_eq!(DifficultyBand::for_index(10), DifficultyBand::Standard);
        assert_eq!(DifficultyBand::for_index(11), DifficultyBand::Challenge);
        assert_eq!(DifficultyBand::for_index(u32::MAX), DifficultyBand::Challenge);
    }

    #[test]
    fn test_band_ranges() {
        assert_eq!(DifficultyBand::Warmup.num1_range(), 1..=5);
        assert_eq!(DifficultyBand::Warmup.num2_range(), 1..=4);
        assert_eq!(DifficultyBand::Standard.num1_range(), 4..=9);
        assert_eq!(DifficultyBand::Standard.num2_range(), 2..=6);
        assert_eq!(DifficultyBand::Challenge.num1_range(), 6..=9);
        assert_eq!(DifficultyBand::Challenge.num2_range(), 5..=9);
    }

    #[test]
    fn test_every_band_stays_below_limit() {
        for band in [
            DifficultyBand::Warmup,
            DifficultyBand::Standard,
            DifficultyBand::Challenge,
        ] {
            let max = band.num1_range().end() + band.num2_range().end();
            assert!(max < ANSWER_LIMIT, "{band:?} can reach {max}");
        }
    }

    #[test]
    fn test_smallest_answer_has_positive_options() {
        // Warmup minimum is 1 + 1 = 2, so negative distractors get rejected.
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            let question = generate_question(&mut rng, 1);
            if question.answer == 2 {
                assert!(question.options.iter().all(|&o| o >= 1));
                let expected: HashSet<u32> = [1, 2, 3, 4, 5].into_iter().collect();
                assert!(question.options.iter().all(|o| expected.contains(o)));
            }
        }
    }

    #[test]
    fn test_same_seed_same_questions() {
        let mut first = QuestionGenerator::new(ChaCha8Rng::seed_from_u64(99));
        let mut second = QuestionGenerator::new(ChaCha8Rng::seed_from_u64(99));

        for index in 1..=20 {
            assert_eq!(first.generate(index), second.generate(index));
        }
    }

    #[test]
    fn test_options_are_shuffled() {
        let mut generator = QuestionGenerator::new(ChaCha8Rng::seed_from_u64(3));
        let positions: HashSet<usize> = (0..200)
            .map(|_| {
                let question = generator.generate(8);
                question
                    .options
                    .iter()
                    .position(|&o| o == question.answer)
                    .unwrap()
            })
            .collect();
        assert_eq!(positions.len(), OPTION_COUNT);
    }

    #[test]
    fn test_display_and_is_correct() {
        let question = Question {
            num1: 3,
            num2: 4,
            answer: 7,
            options: vec![6, 7, 8, 9],
        };
        assert_eq!(question.to_string(), "3 + 4");
        assert!(question.is_correct(7));
        assert!(!question.is_correct(8));
    }

    proptest! {
        #[test]
        fn prop_generated_questions_are_well_formed(seed in any::<u64>(), index in 1u32..40) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let question = generate_question(&mut rng, index);
            assert_well_formed(&question, index);
        }
    }
}
