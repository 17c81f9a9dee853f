use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 亚像素抖动源，避免兄弟节点坐标完全重合
pub trait Jitter: Send {
    fn next(&mut self) -> f64;
}

pub struct RandomJitter {
    max: f64,
    rng: StdRng,
}

impl RandomJitter {
    pub fn new(max: f64) -> Self {
        Self { max, rng: StdRng::from_os_rng() }
    }

    pub fn seeded(max: f64, seed: u64) -> Self {
        Self { max, rng: StdRng::seed_from_u64(seed) }
    }
}

impl Jitter for RandomJitter {
    fn next(&mut self) -> f64 {
        if self.max <= 0.0 {
            return 0.0;
        }
        self.rng.random_range(0.0..self.max)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn next(&mut self) -> f64 {
        0.0
    }
}
