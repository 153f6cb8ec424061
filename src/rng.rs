//! Scripted randomness for tests and demos.
//!
//! The core draws everything (difficulty rolls, shuffles, fresh picks) from a
//! plain [`rand::Rng`]. [`FixedSequence`] is an `RngCore` whose `f64` draws
//! come out as the exact rolls it was given, so calibration can be checked
//! against known values.

use rand::RngCore;

/// `rand`'s `Standard` `f64` keeps the top 53 bits of `next_u64`.
const F64_BITS: i32 = 53;

/// Replays a fixed list of rolls, cycling when exhausted.
///
/// Only `f64` draws are exact. Integer draws (`gen_range`, shuffles) see the
/// same words and may reject them, so drive shuffles from a real generator.
#[derive(Clone, Debug)]
pub struct FixedSequence {
    rolls: Vec<f64>,
    pos: usize,
}

impl FixedSequence {
    /// Values are clamped into `[0, 1)`; an empty list always rolls `0.0`.
    pub fn new(rolls: impl Into<Vec<f64>>) -> Self {
        let rolls = rolls
            .into()
            .into_iter()
            .map(|r| r.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { rolls, pos: 0 }
    }

    fn next_roll(&mut self) -> f64 {
        if self.rolls.is_empty() {
            return 0.0;
        }
        let r = self.rolls[self.pos % self.rolls.len()];
        self.pos = self.pos.wrapping_add(1);
        r
    }
}

impl RngCore for FixedSequence {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let mantissa = (self.next_roll() * 2f64.powi(F64_BITS)) as u64;
        mantissa << (64 - F64_BITS)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let word = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_fixed_sequence_cycles() {
        let mut seq = FixedSequence::new(vec![0.25, 0.5]);
        assert_eq!(seq.r#gen::<f64>(), 0.25);
        assert_eq!(seq.r#gen::<f64>(), 0.5);
        assert_eq!(seq.r#gen::<f64>(), 0.25);
    }

    #[test]
    fn test_fixed_sequence_keeps_inexact_rolls_close() {
        let mut seq = FixedSequence::new(vec![0.1, 0.9]);
        let a: f64 = seq.r#gen();
        let b: f64 = seq.r#gen();
        assert!((a - 0.1).abs() < 1e-15, "got {a}");
        assert!((b - 0.9).abs() < 1e-15, "got {b}");
    }

    #[test]
    fn test_fixed_sequence_clamps_one() {
        let mut seq = FixedSequence::new(vec![1.0, -3.0]);
        let high: f64 = seq.r#gen();
        assert!(high < 1.0);
        assert_eq!(seq.r#gen::<f64>(), 0.0);
    }

    #[test]
    fn test_empty_sequence_rolls_zero() {
        let mut seq = FixedSequence::new(Vec::new());
        assert_eq!(seq.r#gen::<f64>(), 0.0);
        let mut buf = [0xffu8; 11];
        seq.fill_bytes(&mut buf);
        assert_eq!(buf, [0u8; 11]);
    }
}
