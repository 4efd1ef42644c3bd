
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::Tree;

/// Depth-2 tree with leaves `[1, 2, 3, 4]` left to right.
/// Pre-order ids: root 0, left 1 (leaves 2, 3), right 4 (leaves 5, 6).
pub(super) fn four_leaf_tree() -> Tree {
    Tree::from_leaf_rewards(&[1.0, 2.0, 3.0, 4.0]).expect("four leaves form a tree")
}

pub(super) fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Counts how many times randomness was drawn.
pub(super) struct CountingRng {
    inner: ChaCha8Rng,
    pub draws: usize,
}

impl CountingRng {
    pub fn new(seed: u64) -> Self {
        CountingRng {
            inner: seeded(seed),
            draws: 0,
        }
    }
}

impl RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        self.draws += 1;
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws += 1;
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws += 1;
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws += 1;
        self.inner.try_fill_bytes(dest)
    }
}
