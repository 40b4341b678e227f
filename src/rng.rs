/// Xorshift32 generator. Decisions are reproducible for a given seed.
#[derive(Clone, Copy, Debug)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0xDEAD_BEEF } else { seed },
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    pub fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        self.state
    }

    /// Uniform integer in `[-limit, limit]`.
    pub fn next_symmetric(&mut self, limit: i32) -> i32 {
        if limit <= 0 {
            return 0;
        }
        let span = limit as i64 * 2 + 1;
        (self.next() as i64 % span - limit as i64) as i32
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        // xorshift never yields 0, so shift into [0, 2^32 - 1).
        (self.next() - 1) as f64 / u32::MAX as f64
    }

    /// Uniform float in `[min, max)`; returns `min` for an empty span.
    pub fn next_f64_range(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.next_unit()
    }
}
