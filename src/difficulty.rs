//! Score-driven difficulty pacing.
//!
//! One roll per matchup picks the tier. The curve is intentionally not
//! monotonic: early rounds can spike to medium and mid rounds can dip back to
//! easy, which keeps runs from feeling scripted.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// Map a score and a roll in `[0, 1)` to a tier.
    ///
    /// | score   | tiers                              |
    /// |---------|------------------------------------|
    /// | 0..3    | easy 70%, medium 30%               |
    /// | 3..7    | easy 20%, medium 60%, hard 20%     |
    /// | 7..12   | hard 75%, expert 25%               |
    /// | 12..    | expert                             |
    pub fn for_roll(score: u32, roll: f64) -> Self {
        match score {
            0..3 => {
                if roll < 0.7 {
                    Difficulty::Easy
                } else {
                    Difficulty::Medium
                }
            }
            3..7 => {
                if roll < 0.2 {
                    Difficulty::Easy
                } else if roll > 0.8 {
                    Difficulty::Hard
                } else {
                    Difficulty::Medium
                }
            }
            7..12 => {
                if roll < 0.75 {
                    Difficulty::Hard
                } else {
                    Difficulty::Expert
                }
            }
            _ => Difficulty::Expert,
        }
    }

    /// Fraction window `[start, end)` of the similarity-sorted candidates this
    /// tier draws from. Index 0 is the closest popularity match.
    pub(crate) fn window(self, len: usize) -> (usize, usize) {
        let n = len as f64;
        match self {
            Difficulty::Easy => (len - ((n * 0.5).ceil() as usize).min(len), len),
            Difficulty::Medium => ((n * 0.25).floor() as usize, ((n * 0.75).ceil() as usize).min(len)),
            Difficulty::Hard => (0, ((n * 0.5).ceil() as usize).min(len)),
            Difficulty::Expert => (0, ((n * 0.3).ceil() as usize).min(len)),
        }
    }
}

/// Roll the difficulty for the next matchup.
pub fn next_difficulty(score: u32, rng: &mut impl Rng) -> Difficulty {
    let roll: f64 = rng.r#gen();
    let difficulty = Difficulty::for_roll(score, roll);
    log::debug!("difficulty: score={score} roll={roll:.3} -> {difficulty:?}");
    difficulty
}
