use crate::errors::GameError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Source of uniformly distributed draws consumed by both engines
pub trait RngSource: Send {
    /// Draw an integer in `[0, n)`. `n == 0` is a contract violation.
    fn draw(&mut self, n: u32) -> Result<u32, GameError>;
}

fn check_bound(n: u32) -> Result<(), GameError> {
    if n == 0 {
        return Err(GameError::InvalidArgument(
            "draw bound must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Entropy-seeded generator used by live tables
pub struct SystemRng {
    inner: StdRng,
}

impl SystemRng {
    pub fn new() -> Self {
        Self {
            inner: StdRng::from_entropy(),
        }
    }
}

impl Default for SystemRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngSource for SystemRng {
    fn draw(&mut self, n: u32) -> Result<u32, GameError> {
        check_bound(n)?;
        Ok(self.inner.gen_range(0..n))
    }
}

/// Reproducible generator for simulations and replays
pub struct SeededRng {
    seed: u64,
    inner: StdRng,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RngSource for SeededRng {
    fn draw(&mut self, n: u32) -> Result<u32, GameError> {
        check_bound(n)?;
        Ok(self.inner.gen_range(0..n))
    }
}

/// Replays a fixed script of outcomes.
///
/// Each value is reduced modulo the requested bound; the script wraps around once exhausted.
pub struct ScriptedRng {
    script: VecDeque<u32>,
}

impl ScriptedRng {
    pub fn new(outcomes: impl IntoIterator<Item = u32>) -> Self {
        Self {
            script: outcomes.into_iter().collect(),
        }
    }
}

impl RngSource for ScriptedRng {
    fn draw(&mut self, n: u32) -> Result<u32, GameError> {
        check_bound(n)?;
        let next = self.script.pop_front().unwrap_or(0);
        self.script.push_back(next);
        Ok(next % n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_bound_rejected() {
        let mut rng = SystemRng::new();
        assert!(matches!(rng.draw(0), Err(GameError::InvalidArgument(_))));

        let mut scripted = ScriptedRng::new([3]);
        assert!(scripted.draw(0).is_err());
    }

    #[test]
    fn test_draws_stay_in_range() {
        let mut rng = SystemRng::new();
        for _ in 0..1_000 {
            assert!(rng.draw(37).unwrap() < 37);
        }
        assert_eq!(rng.draw(1).unwrap(), 0);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SeededRng::new(42);
        let mut b = SeededRng::new(42);
        let left: Vec<u32> = (0..20).map(|_| a.draw(37).unwrap()).collect();
        let right: Vec<u32> = (0..20).map(|_| b.draw(37).unwrap()).collect();
        assert_eq!(left, right);
        assert_eq!(a.seed(), 42);
    }

    #[test]
    fn test_scripted_wraps_and_reduces() {
        let mut rng = ScriptedRng::new([5, 40]);
        assert_eq!(rng.draw(37).unwrap(), 5);
        assert_eq!(rng.draw(37).unwrap(), 3);
        assert_eq!(rng.draw(37).unwrap(), 5);
    }

    #[test]
    fn test_distribution_is_uniform() {
        let mut rng = SeededRng::new(7);
        let buckets = 37usize;
        let draws = 74_000usize;
        let mut counts = vec![0usize; buckets];
        for _ in 0..draws {
            counts[rng.draw(buckets as u32).unwrap() as usize] += 1;
        }

        let expected = draws as f64 / buckets as f64;
        for count in counts {
            let deviation = (count as f64 - expected).abs() / expected;
            assert!(deviation < 0.12, "bucket deviates by {:.3}", deviation);
        }
    }
}
