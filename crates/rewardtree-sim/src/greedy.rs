use rand::Rng;
use rewardtree_core::{NodeId, Tree, TreeError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::SimError;

/// Local score used to pick between two children.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GreedyHeuristic {
    /// One random rollout per child.
    RolloutSample,
    /// True subtree mean plus independent uniform noise in `[-noise, noise]` per child.
    NoisyOracle { noise: f64 },
}

impl Default for GreedyHeuristic {
    fn default() -> Self {
        GreedyHeuristic::NoisyOracle { noise: 1.0 }
    }
}

impl GreedyHeuristic {
    pub fn validate(&self) -> Result<(), SimError> {
        match *self {
            GreedyHeuristic::RolloutSample => Ok(()),
            // the sampler draws from [-noise, noise], whose width must stay finite
            GreedyHeuristic::NoisyOracle { noise } if noise >= 0.0 && (2.0 * noise).is_finite() => {
                Ok(())
            }
            GreedyHeuristic::NoisyOracle { noise } => Err(SimError::InvalidNoise { noise }),
        }
    }

    /// Score one child. Draws randomness, never touches statistics.
    pub fn score<R: Rng + ?Sized>(
        &self,
        tree: &Tree,
        child: NodeId,
        rng: &mut R,
    ) -> Result<f64, TreeError> {
        match *self {
            GreedyHeuristic::RolloutSample => tree.rollout(child, rng),
            GreedyHeuristic::NoisyOracle { noise } => {
                let mean = tree.subtree_mean_reward(child)?;
                Ok(mean + rng.gen_range(-noise..=noise))
            }
        }
    }
}

/// Final answer of a greedy walk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GreedyOutcome {
    pub final_reward: f64,
    /// Decisions taken; always the tree depth.
    pub steps: u32,
    pub leaf: NodeId,
    /// Root-to-leaf commitments, both endpoints included.
    pub path: Vec<NodeId>,
}

/// One-shot descent that commits to a child at every level and never backtracks.
///
/// Only borrows the tree immutably, so it cannot touch visit statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct GreedyWalk {
    heuristic: GreedyHeuristic,
    path: Vec<NodeId>,
    done: bool,
}

impl GreedyWalk {
    pub fn new(tree: &Tree, heuristic: GreedyHeuristic) -> Result<Self, SimError> {
        heuristic.validate()?;
        let root = tree.root_id();
        Ok(GreedyWalk {
            heuristic,
            path: vec![root],
            done: tree.node(root)?.is_leaf(),
        })
    }

    pub fn current(&self) -> NodeId {
        // path always holds at least the root
        self.path[self.path.len() - 1]
    }

    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    pub fn steps(&self) -> u32 {
        (self.path.len() - 1) as u32
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Take one decision. Returns the child committed to, or `None` once on a leaf.
    /// Ties keep the first child.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        tree: &Tree,
        rng: &mut R,
    ) -> Result<Option<NodeId>, TreeError> {
        if self.done {
            return Ok(None);
        }

        let node = tree.node(self.current())?;
        let mut best: Option<(NodeId, f64)> = None;
        for &child in node.children() {
            let score = self.heuristic.score(tree, child, rng)?;
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((child, score));
            }
        }

        let Some((chosen, _)) = best else {
            self.done = true;
            return Ok(None);
        };
        self.path.push(chosen);
        self.done = tree.node(chosen)?.is_leaf();
        Ok(Some(chosen))
    }

    /// Step until a leaf is reached and report it.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        tree: &Tree,
        rng: &mut R,
    ) -> Result<GreedyOutcome, TreeError> {
        while self.step(tree, rng)?.is_some() {}
        let current = self.current();
        self.outcome(tree)
            .ok_or(TreeError::MissingNode { node_id: current })
    }

    /// Outcome once the walk stands on a leaf, `None` before that.
    pub fn outcome(&self, tree: &Tree) -> Option<GreedyOutcome> {
        if !self.done {
            return None;
        }
        let leaf = self.current();
        let final_reward = tree.node(leaf).ok()?.reward()?;
        Some(GreedyOutcome {
            final_reward,
            steps: self.steps(),
            leaf,
            path: self.path.clone(),
        })
    }
}

/// Run a full greedy descent from the root of `tree`.
pub fn run_greedy<R: Rng + ?Sized>(
    tree: &Tree,
    heuristic: GreedyHeuristic,
    rng: &mut R,
) -> Result<GreedyOutcome, SimError> {
    let mut walk = GreedyWalk::new(tree, heuristic)?;
    let outcome = walk.run(tree, rng)?;
    debug!(
        steps = outcome.steps,
        reward = outcome.final_reward,
        "greedy walk complete"
    );
    Ok(outcome)
}
