//! Xorshift32 generator for reproducible scenarios.
//!
//! Algorithm: x ^= x << 13; x ^= x >> 17; x ^= x << 5.

#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        // Zero is a fixed point of xorshift.
        let state = if seed == 0 { 0xDEAD_BEEF } else { seed };
        Self { state }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        self.state
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Uniform in `[min, max)`.
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }

    /// Uniform in `[min, max_exclusive)`; returns `min` for an empty range.
    pub fn range_usize(&mut self, min: usize, max_exclusive: usize) -> usize {
        let span = max_exclusive.saturating_sub(min);
        if span == 0 {
            return min;
        }
        min + (self.next_u32() as usize) % span
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }
}
