pub mod annotations;
mod arena;
pub mod error;
pub mod extract;
pub mod ids;
pub mod mcts;
mod node;
pub mod reward_tree;
pub mod snapshot;
mod stats;

pub use node::Node;
pub use stats::NodeStats;

#[cfg(test)]
mod tests;
