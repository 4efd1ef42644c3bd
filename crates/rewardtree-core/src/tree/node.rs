use crate::tree::{ids::NodeId, stats::NodeStats};

#[derive(Debug, Clone)]
/// represents one decision point (internal) or outcome (leaf) in the reward tree.
/// Shape and reward are fixed at construction; only `stats` changes afterwards.
pub struct Node {
    depth: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    reward: f64,
    stats: NodeStats,
}

impl Node {
    /// Create a leaf carrying a fixed reward.
    pub(crate) fn leaf(depth: u32, parent: Option<NodeId>, reward: f64) -> Self {
        Node {
            depth,
            parent,
            children: Vec::new(),
            reward,
            stats: NodeStats::new(),
        }
    }

    /// Create an internal node; children are attached once they are allocated.
    pub(crate) fn internal(depth: u32, parent: Option<NodeId>) -> Self {
        Node {
            depth,
            parent,
            children: Vec::with_capacity(2),
            reward: 0.0,
            stats: NodeStats::new(),
        }
    }

    pub(crate) fn attach_children(&mut self, left: NodeId, right: NodeId) {
        self.children = vec![left, right];
    }

    /// Copy of this node with statistics reset, shape and reward untouched.
    pub(crate) fn reset(&self) -> Self {
        Node {
            depth: self.depth,
            parent: self.parent,
            children: self.children.clone(),
            reward: self.reward,
            stats: NodeStats::new(),
        }
    }

    /// Children in scan order, empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Check function to see if a node is a leaf
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaf reward. Internal nodes carry no meaningful reward.
    pub fn reward(&self) -> Option<f64> {
        if self.is_leaf() {
            Some(self.reward)
        } else {
            None
        }
    }

    /// Distance from the root.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Return the parent of a given node
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn stats(&self) -> &NodeStats {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut NodeStats {
        &mut self.stats
    }

    pub fn visits(&self) -> u64 {
        self.stats.visits()
    }

    pub fn total_reward(&self) -> f64 {
        self.stats.total_reward()
    }
}
