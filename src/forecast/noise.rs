use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed values in `[0, 1)`.
///
/// Every random term of the model (residual, confidence, the fabricated
/// counterpart measurement) draws from this, so tests can pin it.
pub trait NoiseSource {
    fn unit(&mut self) -> f64;
}

/// Noise backed by a `StdRng`
pub struct RandomNoise {
    rng: StdRng,
}

impl RandomNoise {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl NoiseSource for RandomNoise {
    fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Always returns the same value. `FixedNoise::centered()` yields 0.5, which
/// zeroes every perturbation.
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise(pub f64);

impl FixedNoise {
    pub fn centered() -> Self {
        Self(0.5)
    }
}

impl NoiseSource for FixedNoise {
    fn unit(&mut self) -> f64 {
        self.0
    }
}
