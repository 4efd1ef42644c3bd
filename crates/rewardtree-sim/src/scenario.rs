use rewardtree_core::{NodeId, SearchConfig, Tree};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    SimError,
    generator::{GeneratedTree, RewardRange, TreeGenerator},
    greedy::GreedyHeuristic,
    harness::{Comparison, ComparisonConfig, ComparisonRun, RngStreams},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
/// Serializable description of one full comparison, used for YAML IO.
pub struct ScenarioSpec {
    /// Edges on every root-to-leaf path.
    pub depth: u32,
    /// Distribution of ordinary leaves.
    pub rewards: RewardRange,
    /// Range of the single planted optimum; omit for a plain tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planted: Option<RewardRange>,
    /// Decimal places leaf rewards are rounded to; `null` keeps raw samples.
    pub decimals: Option<u32>,
    pub search: SearchConfig,
    pub greedy: GreedyHeuristic,
    /// Seed for every random stream; omit to draw one from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for ScenarioSpec {
    fn default() -> Self {
        ScenarioSpec {
            depth: 4,
            rewards: RewardRange::STANDARD,
            planted: None,
            decimals: Some(1),
            search: SearchConfig::default(),
            greedy: GreedyHeuristic::default(),
            seed: None,
        }
    }
}

/// Everything a finished scenario produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    /// Seed actually used, so an entropy-seeded run can be replayed.
    pub seed: u64,
    pub planted_leaf: Option<NodeId>,
    /// Largest leaf reward in the generated tree.
    pub best_possible: f64,
    pub comparison: Comparison,
}

/// A scenario whose tree has been generated and whose comparison is ready to tick.
#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub seed: u64,
    pub generated: GeneratedTree,
    pub run: ComparisonRun,
}

impl ScenarioRun {
    pub fn finish(self) -> Result<ScenarioReport, SimError> {
        let best_possible = self.generated.tree.max_leaf_reward();
        let comparison = self.run.finish()?;
        Ok(ScenarioReport {
            seed: self.seed,
            planted_leaf: self.generated.planted_leaf,
            best_possible,
            comparison,
        })
    }
}

impl ScenarioSpec {
    /// Check every precondition before any tree is generated.
    pub fn validate(&self) -> Result<(), SimError> {
        self.generator()?;
        self.comparison_config().validate()
    }

    pub fn generator(&self) -> Result<TreeGenerator, SimError> {
        let generator = TreeGenerator::new(self.rewards)?.with_decimals(self.decimals);
        let generator = match self.planted {
            Some(planted) => generator.with_planted(planted)?,
            None => generator,
        };
        Tree::leaf_count_for(self.depth)?;
        Ok(generator)
    }

    pub fn comparison_config(&self) -> ComparisonConfig {
        ComparisonConfig {
            search: self.search.clone(),
            greedy: self.greedy,
        }
    }

    /// Generate the tree and set up both algorithms without running them.
    pub fn start(&self) -> Result<ScenarioRun, SimError> {
        self.validate()?;
        let seed = self.seed.unwrap_or_else(rand::random);
        let mut streams = RngStreams::from_seed(seed);

        let generated = self
            .generator()?
            .generate_detailed(self.depth, &mut streams.generation)?;
        let run = ComparisonRun::new(
            &generated.tree,
            &self.comparison_config(),
            streams.mcts,
            streams.greedy,
        )?;

        debug!(seed, depth = self.depth, "scenario started");
        Ok(ScenarioRun {
            seed,
            generated,
            run,
        })
    }

    /// Generate, compare, and report in one call.
    pub fn run(&self) -> Result<ScenarioReport, SimError> {
        self.start()?.finish()
    }
}
