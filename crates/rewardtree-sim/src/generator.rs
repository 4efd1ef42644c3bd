use rand::Rng;
use rewardtree_core::{NodeId, Tree};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Closed interval leaf rewards are drawn from uniformly.
pub struct RewardRange {
    pub low: f64,
    pub high: f64,
}

impl RewardRange {
    /// Everyday leaves.
    pub const STANDARD: RewardRange = RewardRange {
        low: 1.0,
        high: 9.0,
    };
    /// Wider spread that includes losses, used to contrast exploration and exploitation.
    pub const CONTRAST: RewardRange = RewardRange {
        low: -5.0,
        high: 15.0,
    };
    /// Range of the single planted leaf.
    pub const PLANTED: RewardRange = RewardRange {
        low: 15.0,
        high: 20.0,
    };

    pub fn new(low: f64, high: f64) -> Result<Self, SimError> {
        let range = RewardRange { low, high };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let finite_width = (self.high - self.low).is_finite();
        if !self.low.is_finite() || !self.high.is_finite() || self.low > self.high || !finite_width
        {
            return Err(SimError::InvalidRewardRange {
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.low..=self.high)
    }
}

impl Default for RewardRange {
    fn default() -> Self {
        RewardRange::STANDARD
    }
}

/// A generated tree plus where its planted optimum went, if any.
#[derive(Debug, Clone)]
pub struct GeneratedTree {
    pub tree: Tree,
    pub planted_leaf: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
/// Builds complete binary reward trees with random leaves.
pub struct TreeGenerator {
    rewards: RewardRange,
    planted: Option<RewardRange>,
    decimals: Option<u32>,
}

impl TreeGenerator {
    /// Leaves drawn from `rewards`, rounded to one decimal, nothing planted.
    pub fn new(rewards: RewardRange) -> Result<Self, SimError> {
        rewards.validate()?;
        Ok(TreeGenerator {
            rewards,
            planted: None,
            decimals: Some(1),
        })
    }

    /// Plant one leaf drawn from `planted`. After rounding, its lowest value must sit
    /// strictly above the highest base value.
    pub fn with_planted(mut self, planted: RewardRange) -> Result<Self, SimError> {
        planted.validate()?;
        self.check_planted(planted)?;
        self.planted = Some(planted);
        Ok(self)
    }

    fn check_planted(&self, planted: RewardRange) -> Result<(), SimError> {
        if self.round(planted.low) <= self.round(self.rewards.high) {
            return Err(SimError::PlantedRangeOverlaps {
                planted_low: planted.low,
                base_high: self.rewards.high,
            });
        }
        Ok(())
    }

    /// Round rewards to this many decimals; `None` keeps raw samples.
    pub fn with_decimals(mut self, decimals: Option<u32>) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn rewards(&self) -> RewardRange {
        self.rewards
    }

    pub fn planted(&self) -> Option<RewardRange> {
        self.planted
    }

    /// Generate a tree of `depth`. See [`TreeGenerator::generate_detailed`].
    pub fn generate<R: Rng + ?Sized>(&self, depth: u32, rng: &mut R) -> Result<Tree, SimError> {
        Ok(self.generate_detailed(depth, rng)?.tree)
    }

    /// Draw every leaf left to right, then, in planted mode, pick one leaf uniformly
    /// and overwrite its reward from the planted range.
    pub fn generate_detailed<R: Rng + ?Sized>(
        &self,
        depth: u32,
        rng: &mut R,
    ) -> Result<GeneratedTree, SimError> {
        if let Some(planted) = self.planted {
            // `with_decimals` may have run after `with_planted`.
            self.check_planted(planted)?;
        }
        let leaf_count = Tree::leaf_count_for(depth)?;

        let mut rewards: Vec<f64> = (0..leaf_count)
            .map(|_| self.round(self.rewards.sample(rng)))
            .collect();

        let planted_index = self.planted.map(|planted| {
            let index = rng.gen_range(0..leaf_count);
            rewards[index] = self.round(planted.sample(rng));
            index
        });

        let tree = Tree::from_leaf_rewards(&rewards)?;
        let planted_leaf = planted_index.and_then(|index| tree.leaves().get(index).copied());

        debug!(
            depth,
            leaves = leaf_count,
            planted = ?planted_leaf.map(|id| id.index()),
            "generated reward tree"
        );
        Ok(GeneratedTree { tree, planted_leaf })
    }

    fn round(&self, value: f64) -> f64 {
        match self.decimals {
            Some(decimals) => {
                let scale = 10f64.powi(decimals.min(i32::MAX as u32) as i32);
                let scaled = value * scale;
                if scaled.is_finite() {
                    scaled.round() / scale
                } else {
                    value
                }
            }
            None => value,
        }
    }
}
