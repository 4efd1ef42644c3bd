use rewardtree_core::{SearchConfigError, TreeError};
use thiserror::Error;

#[derive(Debug, Error)]
/// Error type for scenario loading, validation, generation, and comparison runs.
pub enum SimError {
    #[error("failed to read YAML file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Search(#[from] SearchConfigError),

    #[error("invalid reward range [{low}, {high}]: bounds and width must be finite and low <= high")]
    InvalidRewardRange { low: f64, high: f64 },

    #[error("planted range starting at {planted_low} does not sit strictly above the base maximum {base_high} after rounding")]
    PlantedRangeOverlaps { planted_low: f64, base_high: f64 },

    #[error("greedy noise must be >= 0 with a finite width, got {noise}")]
    InvalidNoise { noise: f64 },

    #[error("MCTS iteration budget must be at least 1")]
    ZeroIterations,
}
