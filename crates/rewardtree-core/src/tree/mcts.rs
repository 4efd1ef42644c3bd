use std::{fs, path::Path};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::tree::{
    error::TreeError,
    extract::{BestLeaf, ExtractionRule},
    ids::NodeId,
    reward_tree::Tree,
};

const DEFAULT_SEARCH_CONFIG_YAML: &str = include_str!("../../config/search.default.yaml");

/// Search configuration for MCTS iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Iteration budget for one run.
    pub iterations: usize,
    /// UCB1 exploration constant.
    pub c: f64,
    pub extraction: ExtractionRule,
    /// Iterations per external tick. Pacing only, never changes the outcome.
    pub batch_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            iterations: 100,
            c: std::f64::consts::SQRT_2,
            extraction: ExtractionRule::MostVisited,
            batch_size: 1,
        }
    }
}

impl SearchConfig {
    /// Parse a search config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SearchConfigError> {
        let config: SearchConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a search config from a YAML file path.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, SearchConfigError> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_SEARCH_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, SearchConfigError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    /// Reject budgets and constants the engine cannot run with.
    pub fn validate(&self) -> Result<(), SearchConfigError> {
        if self.iterations == 0 {
            return Err(SearchConfigError::Invalid(
                "iterations must be greater than 0".to_string(),
            ));
        }
        if !self.c.is_finite() || self.c < 0.0 {
            return Err(SearchConfigError::Invalid(
                "c must be finite and >= 0".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(SearchConfigError::Invalid(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error type for loading and validating `SearchConfig`.
#[derive(Debug, Error)]
pub enum SearchConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid search config: {0}")]
    Invalid(String),
}

/// Everything one iteration did, for inspection by whoever paces or renders the search.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationMetrics {
    /// 1-based index of this iteration within the engine's lifetime.
    pub iteration: usize,
    /// Node the tree policy committed to (the expansion target).
    pub selected: NodeId,
    /// Selection path, root first. Exactly these nodes were credited.
    pub path: Vec<NodeId>,
    /// Random descent from `selected` to a leaf. Never credited.
    pub rollout_path: Vec<NodeId>,
    pub reward: f64,
}

/// Aggregate metrics for a complete search run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetrics {
    pub iterations_requested: usize,
    pub iterations_completed: usize,
    pub reward_sum: f64,
    pub mean_reward: f64,
}

impl RunMetrics {
    fn new(iterations_requested: usize) -> Self {
        RunMetrics {
            iterations_requested,
            iterations_completed: 0,
            reward_sum: 0.0,
            mean_reward: 0.0,
        }
    }

    fn record(&mut self, metrics: &IterationMetrics) {
        self.iterations_completed += 1;
        self.reward_sum += metrics.reward;
        self.mean_reward = self.reward_sum / self.iterations_completed as f64;
    }
}

impl Tree {
    /// Tree policy from the root. See [`Tree::select_from`].
    pub fn select(&self, c: f64) -> Result<Vec<NodeId>, TreeError> {
        self.select_from(self.root_id(), c)
    }

    /// Descend from `start` and return the path to the node this iteration commits to.
    ///
    /// At each internal node the first unvisited child (in child order) ends the
    /// descent before any UCB1 score is computed. Only when every child has been
    /// visited does UCB1 pick the next node, the first child winning ties.
    /// The descent also ends on a leaf. The path is root-to-node, both endpoints included.
    pub fn select_from(&self, start: NodeId, c: f64) -> Result<Vec<NodeId>, TreeError> {
        let mut path = vec![start];
        let mut current = start;

        loop {
            let node = self.node(current)?;
            if node.is_leaf() {
                return Ok(path);
            }

            for &child_id in node.children() {
                if self.node(child_id)?.stats().is_unvisited() {
                    path.push(child_id);
                    return Ok(path);
                }
            }

            let parent_visits = node.visits();
            let mut best: Option<(NodeId, f64)> = None;
            for &child_id in node.children() {
                let Some(score) = self.node(child_id)?.stats().ucb1(parent_visits, c) else {
                    continue;
                };
                if best.is_none_or(|(_, best_score)| score > best_score) {
                    best = Some((child_id, score));
                }
            }

            match best {
                Some((child_id, _)) => {
                    path.push(child_id);
                    current = child_id;
                }
                None => return Ok(path),
            }
        }
    }

    /// Random playout from `start`: a uniformly random child at every internal node.
    /// Returns the reward of the leaf reached. Statistics are neither read nor written,
    /// and a leaf returns its own reward without touching `rng`.
    pub fn rollout<R: Rng + ?Sized>(&self, start: NodeId, rng: &mut R) -> Result<f64, TreeError> {
        self.rollout_traced(start, rng).map(|(reward, _)| reward)
    }

    /// Same as [`Tree::rollout`], also returning the nodes walked, `start` first.
    pub fn rollout_traced<R: Rng + ?Sized>(
        &self,
        start: NodeId,
        rng: &mut R,
    ) -> Result<(f64, Vec<NodeId>), TreeError> {
        let mut current = start;
        let mut walked = vec![start];

        loop {
            let node = self.node(current)?;
            if let Some(reward) = node.reward() {
                return Ok((reward, walked));
            }
            let children = node.children();
            current = children[rng.gen_range(0..children.len())];
            walked.push(current);
        }
    }

    /// Credit `reward` to every node on the selection path, and only those.
    pub fn backpropagate(&mut self, path: &[NodeId], reward: f64) -> Result<(), TreeError> {
        for node_id in path {
            self.node_mut(*node_id)?.stats_mut().record(reward);
        }
        Ok(())
    }
}

/// Owns one tree snapshot and searches it with UCB1 MCTS.
///
/// The engine is resumable at iteration boundaries: stopping between `iterate`
/// calls leaves a valid tree, and running iterations one at a time or in batches
/// gives the same result for the same random stream.
#[derive(Debug, Clone)]
pub struct MctsEngine {
    tree: Tree,
    config: SearchConfig,
    iterations: usize,
}

impl MctsEngine {
    pub fn new(tree: Tree, config: SearchConfig) -> Result<Self, SearchConfigError> {
        config.validate()?;
        Ok(MctsEngine {
            tree,
            config,
            iterations: 0,
        })
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Iterations performed so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Iterations left in the configured budget.
    pub fn remaining(&self) -> usize {
        self.config.iterations.saturating_sub(self.iterations)
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }

    /// Execute one complete MCTS iteration: selection, expansion, rollout, backpropagation.
    ///
    /// Expansion allocates nothing (the tree is pre-built); the last node of the
    /// selection path is simply where the rollout starts.
    pub fn iterate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<IterationMetrics, TreeError> {
        let path = self.tree.select(self.config.c)?;
        let selected = match path.last() {
            Some(&node_id) => node_id,
            None => self.tree.root_id(),
        };
        let (reward, rollout_path) = self.tree.rollout_traced(selected, rng)?;
        self.tree.backpropagate(&path, reward)?;
        self.iterations += 1;

        trace!(
            iteration = self.iterations,
            selected = selected.index(),
            path_len = path.len(),
            reward,
            "MCTS iteration complete"
        );

        Ok(IterationMetrics {
            iteration: self.iterations,
            selected,
            path,
            rollout_path,
            reward,
        })
    }

    /// Spend the rest of the iteration budget.
    pub fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<RunMetrics, TreeError> {
        self.run_with_hook(rng, |_| {})
    }

    /// Spend the rest of the budget and invoke a callback after each completed iteration.
    pub fn run_with_hook<R, FHook>(
        &mut self,
        rng: &mut R,
        mut on_iteration: FHook,
    ) -> Result<RunMetrics, TreeError>
    where
        R: Rng + ?Sized,
        FHook: FnMut(&IterationMetrics),
    {
        let mut metrics = RunMetrics::new(self.remaining());

        while !self.is_finished() {
            let iteration_metrics = self.iterate(rng)?;
            on_iteration(&iteration_metrics);
            metrics.record(&iteration_metrics);
        }

        debug!(
            iterations = metrics.iterations_completed,
            mean_reward = metrics.mean_reward,
            "MCTS run complete"
        );
        Ok(metrics)
    }

    /// Run one tick: up to `batch_size` iterations, never past the budget.
    /// Returns how many iterations ran.
    pub fn run_batch<R, FHook>(
        &mut self,
        rng: &mut R,
        mut on_iteration: FHook,
    ) -> Result<usize, TreeError>
    where
        R: Rng + ?Sized,
        FHook: FnMut(&IterationMetrics),
    {
        let batch = self.config.batch_size.min(self.remaining());
        for _ in 0..batch {
            let iteration_metrics = self.iterate(rng)?;
            on_iteration(&iteration_metrics);
        }
        Ok(batch)
    }

    /// Final answer under the configured extraction rule.
    pub fn best_leaf(&self) -> Result<BestLeaf, TreeError> {
        self.tree.extract_best_leaf(self.config.extraction)
    }
}
