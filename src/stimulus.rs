//! Stimulus sourcing
//!
//! Every stochastic draw the battery needs lives here: study symbols,
//! recognition sets, digit sequences, the attention target mask, and
//! filler letters. All draws go through one caller-owned RNG so a whole
//! session replays from a seed.

use crate::error::AssessError;
use rand::seq::SliceRandom;
use rand::Rng;

/// Fixed symbol palette for the visual recognition test
pub const SYMBOL_PALETTE: [char; 16] = [
    '🔴', '🔵', '🟢', '🟡', '🟣', '🟠', '⚫', '⚪', '🔺', '🔸', '🔹', '🔶', '🔷', '⭐', '❤', '💚',
];

/// Symbols studied per session
pub const STUDY_SET_SIZE: usize = 8;

/// Studied symbols reused in the recognition set
pub const RECOGNITION_OLD: usize = 4;

/// Novel symbols in the recognition set
pub const RECOGNITION_NEW: usize = 4;

/// Smallest palette that can supply a study set plus distractors
pub const MIN_PALETTE_SIZE: usize = STUDY_SET_SIZE + RECOGNITION_NEW;

/// Filler letters for the attention run: A-Z with the target letter removed
pub const FILLER_LETTERS: [char; 25] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'Y', 'Z',
];

/// Target letter for the attention run
pub const TARGET_LETTER: char = 'X';

/// Probability that an attention index is a target
pub const TARGET_PROBABILITY: f64 = 0.3;

/// Validate a palette up front. Checked once at engine construction,
/// never per trial.
pub fn validate_palette(palette: &[char]) -> Result<(), AssessError> {
    if palette.len() < MIN_PALETTE_SIZE {
        return Err(AssessError::PaletteTooSmall {
            got: palette.len(),
            need: MIN_PALETTE_SIZE,
        });
    }
    Ok(())
}

/// Draw the study set: 8 distinct symbols without replacement, in random
/// presentation order.
pub fn draw_study_set<R: Rng>(rng: &mut R, palette: &[char]) -> Vec<char> {
    let mut shuffled: Vec<char> = palette.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(STUDY_SET_SIZE);
    shuffled
}

/// Build the recognition set: the first 4 studied symbols plus 4 symbols
/// guaranteed absent from the study set, concatenated and permuted.
///
/// The fixed 50/50 old/new ratio is load-bearing for the recognition
/// scoring formula and must not drift.
pub fn build_recognition_set<R: Rng>(rng: &mut R, study: &[char], palette: &[char]) -> Vec<char> {
    let mut set: Vec<char> = study.iter().take(RECOGNITION_OLD).copied().collect();

    let mut novel: Vec<char> = palette
        .iter()
        .filter(|s| !study.contains(s))
        .copied()
        .collect();
    novel.shuffle(rng);
    set.extend(novel.into_iter().take(RECOGNITION_NEW));

    set.shuffle(rng);
    set
}

/// Draw a digit sequence of the given length; digits may repeat.
pub fn draw_digits<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen_range(0..10)).collect()
}

/// Draw the attention target mask: `len` booleans, each true with
/// probability [`TARGET_PROBABILITY`]. Drawn once per session.
pub fn draw_target_mask<R: Rng>(rng: &mut R, len: usize) -> Vec<bool> {
    (0..len).map(|_| rng.gen_bool(TARGET_PROBABILITY)).collect()
}

/// Draw a filler letter, uniform over A-Z excluding the target letter.
/// Redrawn on every non-target presentation.
pub fn draw_filler_letter<R: Rng>(rng: &mut R) -> char {
    FILLER_LETTERS[rng.gen_range(0..FILLER_LETTERS.len())]
}
