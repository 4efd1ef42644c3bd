use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rewardtree_core::{MctsEngine, NodeId, SearchConfig, Tree, TreeSnapshot};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    SimError,
    greedy::{GreedyHeuristic, GreedyOutcome, GreedyWalk},
};

/// Which algorithm returned the strictly larger reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Mcts,
    Greedy,
    Tie,
}

impl Winner {
    pub fn decide(mcts_reward: f64, greedy_reward: f64) -> Winner {
        if mcts_reward > greedy_reward {
            Winner::Mcts
        } else if greedy_reward > mcts_reward {
            Winner::Greedy
        } else {
            Winner::Tie
        }
    }
}

/// Settings for both sides of a comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub search: SearchConfig,
    pub greedy: GreedyHeuristic,
}

impl ComparisonConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.search.iterations == 0 {
            return Err(SimError::ZeroIterations);
        }
        self.search.validate()?;
        self.greedy.validate()
    }
}

/// Independent random streams for one comparison, all derived from a single seed.
///
/// Each side draws from its own stream, so interleaving and batch size never
/// change what either side sees.
#[derive(Debug, Clone)]
pub struct RngStreams {
    pub generation: ChaCha8Rng,
    pub mcts: ChaCha8Rng,
    pub greedy: ChaCha8Rng,
}

impl RngStreams {
    const GENERATION: u64 = 0;
    const MCTS: u64 = 1;
    const GREEDY: u64 = 2;

    pub fn from_seed(seed: u64) -> Self {
        RngStreams {
            generation: stream(seed, Self::GENERATION),
            mcts: stream(seed, Self::MCTS),
            greedy: stream(seed, Self::GREEDY),
        }
    }
}

fn stream(seed: u64, id: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(id);
    rng
}

/// MCTS side of a finished comparison.
///
/// With a small budget the search may not reach every level. Below the last
/// visited level the recommended path just takes first children, so `reward`
/// is then a leaf nobody evaluated; check [`MctsOutcome::fully_informed`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MctsOutcome {
    pub reward: f64,
    pub leaf: NodeId,
    pub path: Vec<NodeId>,
    /// Levels of `path` chosen from visit statistics.
    pub informed_steps: u32,
    pub iterations: usize,
    /// Mean reward backed up through the root.
    pub root_mean: Option<f64>,
    /// Final per-node statistics.
    pub snapshot: TreeSnapshot,
}

/// Verdict of one comparison. Informational only; neither side reads it back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub mcts: MctsOutcome,
    pub greedy: GreedyOutcome,
    pub winner: Winner,
}

impl MctsOutcome {
    /// Whether every step of `path` was backed by visited children.
    pub fn fully_informed(&self) -> bool {
        self.informed_steps as usize + 1 == self.path.len()
    }
}

impl Comparison {
    pub fn mcts_reward(&self) -> f64 {
        self.mcts.reward
    }

    pub fn greedy_reward(&self) -> f64 {
        self.greedy.final_reward
    }
}

/// What one tick advanced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub mcts_iterations: usize,
    pub greedy_step: Option<NodeId>,
}

/// A comparison that can be driven tick by tick.
///
/// Each tick runs up to `batch_size` MCTS iterations and one greedy decision.
/// Both sides work on their own fresh copy of the source tree.
#[derive(Debug, Clone)]
pub struct ComparisonRun {
    engine: MctsEngine,
    greedy_tree: Tree,
    walk: GreedyWalk,
    mcts_rng: ChaCha8Rng,
    greedy_rng: ChaCha8Rng,
}

impl ComparisonRun {
    pub fn new(
        tree: &Tree,
        config: &ComparisonConfig,
        mcts_rng: ChaCha8Rng,
        greedy_rng: ChaCha8Rng,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let greedy_tree = tree.fresh_copy();
        let walk = GreedyWalk::new(&greedy_tree, config.greedy)?;
        let engine = MctsEngine::new(tree.fresh_copy(), config.search.clone())?;

        Ok(ComparisonRun {
            engine,
            greedy_tree,
            walk,
            mcts_rng,
            greedy_rng,
        })
    }

    pub fn engine(&self) -> &MctsEngine {
        &self.engine
    }

    pub fn mcts_tree(&self) -> &Tree {
        self.engine.tree()
    }

    pub fn greedy_tree(&self) -> &Tree {
        &self.greedy_tree
    }

    pub fn greedy_walk(&self) -> &GreedyWalk {
        &self.walk
    }

    pub fn is_finished(&self) -> bool {
        self.engine.is_finished() && self.walk.is_done()
    }

    pub fn tick(&mut self) -> Result<TickReport, SimError> {
        let mcts_iterations = self.engine.run_batch(&mut self.mcts_rng, |_| {})?;
        let greedy_step = self.walk.step(&self.greedy_tree, &mut self.greedy_rng)?;
        Ok(TickReport {
            mcts_iterations,
            greedy_step,
        })
    }

    /// Drive both sides to completion and score them.
    pub fn finish(mut self) -> Result<Comparison, SimError> {
        let greedy = self.walk.run(&self.greedy_tree, &mut self.greedy_rng)?;
        self.engine.run(&mut self.mcts_rng)?;

        let best = self.engine.best_leaf()?;
        let mcts_tree = self.engine.tree();
        let mcts = MctsOutcome {
            reward: best.reward,
            leaf: best.leaf,
            path: best.path,
            informed_steps: best.informed_steps,
            iterations: self.engine.iterations(),
            root_mean: mcts_tree.root_mean(),
            snapshot: mcts_tree.snapshot(),
        };
        let winner = Winner::decide(mcts.reward, greedy.final_reward);

        info!(
            mcts_reward = mcts.reward,
            greedy_reward = greedy.final_reward,
            ?winner,
            "comparison finished"
        );
        Ok(Comparison {
            mcts,
            greedy,
            winner,
        })
    }
}

/// Run greedy and MCTS on independent copies of `tree` and score the two answers.
pub fn compare(
    tree: &Tree,
    config: &ComparisonConfig,
    mcts_rng: ChaCha8Rng,
    greedy_rng: ChaCha8Rng,
) -> Result<Comparison, SimError> {
    ComparisonRun::new(tree, config, mcts_rng, greedy_rng)?.finish()
}
