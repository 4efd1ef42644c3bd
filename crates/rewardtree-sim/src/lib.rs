mod error;
mod generator;
mod greedy;
mod harness;
mod io;
mod scenario;

pub use error::SimError;
pub use generator::{GeneratedTree, RewardRange, TreeGenerator};
pub use greedy::{GreedyHeuristic, GreedyOutcome, GreedyWalk, run_greedy};
pub use harness::{
    Comparison, ComparisonConfig, ComparisonRun, MctsOutcome, RngStreams, TickReport, Winner,
    compare,
};
pub use io::{from_yaml_str, load_yaml, save_yaml};
pub use scenario::{ScenarioReport, ScenarioRun, ScenarioSpec};
