mod tree;

pub use tree::annotations::{AnnotationMap, Highlight, Phase, PhaseStepper};
pub use tree::error::TreeError;
pub use tree::extract::{BestLeaf, ExtractionRule};
pub use tree::ids::NodeId;
pub use tree::mcts::{IterationMetrics, MctsEngine, RunMetrics, SearchConfig, SearchConfigError};
pub use tree::reward_tree::{MAX_DEPTH, Tree};
pub use tree::snapshot::{NodeSnapshot, SNAPSHOT_SCHEMA_VERSION, TreeSnapshot};
pub use tree::{Node, NodeStats};
