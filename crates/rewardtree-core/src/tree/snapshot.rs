use serde::Serialize;

use crate::tree::reward_tree::Tree;

/// Bumped whenever the serialized layout changes.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeSnapshot {
    pub schema_version: u32,
    pub root_node_id: usize,
    pub depth: u32,
    pub node_count: usize,
    pub nodes: Vec<NodeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub node_id: usize,
    pub depth: u32,
    pub is_leaf: bool,
    pub parent_node_id: Option<usize>,
    pub children: Vec<usize>,
    pub reward: Option<f64>,
    pub visits: u64,
    pub total_reward: f64,
    pub mean: Option<f64>,
}

impl TreeSnapshot {
    /// Serialize the snapshot as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Tree {
    /// Capture shape, rewards and current statistics of every node.
    pub fn snapshot(&self) -> TreeSnapshot {
        let nodes = self
            .nodes()
            .map(|(node_id, node)| NodeSnapshot {
                node_id: node_id.index(),
                depth: node.depth(),
                is_leaf: node.is_leaf(),
                parent_node_id: node.parent().map(|parent| parent.index()),
                children: node.children().iter().map(|child| child.index()).collect(),
                reward: node.reward(),
                visits: node.visits(),
                total_reward: node.total_reward(),
                mean: node.stats().mean(),
            })
            .collect();

        TreeSnapshot {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            root_node_id: self.root_id().index(),
            depth: self.depth(),
            node_count: self.node_count(),
            nodes,
        }
    }
}
