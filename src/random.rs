//! Injectable randomness for the GSUB `rand` feature (Inject a
//! random source so tests can fix the seed; do not rely on a global
//! generator), built on the `rand` crate.

use rand::rngs::ThreadRng;
use rand::Rng;

/// A source of randomness for GSUB type 3's `rand` feature tag. Implementors
/// pick a uniformly random index in `0..len`.
pub trait RandomSource {
    fn pick_index(&mut self, len: usize) -> usize;
}

/// The default source, backed by `rand::thread_rng()`.
pub struct ThreadRandomSource(ThreadRng);

impl ThreadRandomSource {
    pub fn new() -> ThreadRandomSource {
        ThreadRandomSource(rand::thread_rng())
    }
}

impl Default for ThreadRandomSource {
    fn default() -> ThreadRandomSource {
        ThreadRandomSource::new()
    }
}

impl RandomSource for ThreadRandomSource {
    fn pick_index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// A fixed-sequence source for deterministic tests.
pub struct FixedRandomSource {
    indexes: Vec<usize>,
    cursor: usize,
}

impl FixedRandomSource {
    pub fn new(indexes: Vec<usize>) -> FixedRandomSource {
        FixedRandomSource { indexes, cursor: 0 }
    }
}

impl RandomSource for FixedRandomSource {
    fn pick_index(&mut self, len: usize) -> usize {
        let value = self.indexes.get(self.cursor).copied().unwrap_or(0);
        self.cursor += 1;
        value.min(len.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_source_is_deterministic() {
        let mut src = FixedRandomSource::new(vec![2, 0, 1]);
        assert_eq!(src.pick_index(5), 2);
        assert_eq!(src.pick_index(5), 0);
        assert_eq!(src.pick_index(5), 1);
    }
}
