use crate::tree::{arena::Arena, error::TreeError, ids::NodeId, node::Node};

/// Deepest tree this crate will build; `2^MAX_DEPTH` leaves is already far past demonstration size.
pub const MAX_DEPTH: u32 = 24;

#[derive(Debug, Clone)]
/// A complete binary reward tree.
/// owns the arena (root is always at index 0, ids follow pre-order)
/// every root-to-leaf path has exactly `depth` edges.
pub struct Tree {
    arena: Arena<Node>,
    depth: u32,
}

impl Tree {
    /// Check that `depth` can produce a tree and return how many leaves it has.
    pub fn leaf_count_for(depth: u32) -> Result<usize, TreeError> {
        if depth < 1 || depth > MAX_DEPTH {
            return Err(TreeError::InvalidDepth {
                depth,
                max: MAX_DEPTH,
            });
        }
        Ok(1usize << depth)
    }

    /// Build the complete binary tree whose leaves carry `rewards` from left to right.
    pub fn from_leaf_rewards(rewards: &[f64]) -> Result<Self, TreeError> {
        let count = rewards.len();
        if count < 2 || !count.is_power_of_two() {
            return Err(TreeError::InvalidLeafCount { count });
        }
        let depth = count.trailing_zeros();
        Self::leaf_count_for(depth)?;

        let mut arena = Arena::with_capacity(2 * count - 1);
        build(&mut arena, rewards, 0, None);
        Ok(Tree { arena, depth })
    }

    /// Deep copy with identical ids, shape and rewards but every statistic reset to zero.
    /// Copies of the same tree never share statistics.
    pub fn fresh_copy(&self) -> Self {
        Tree {
            arena: self.arena.map(Node::reset),
            depth: self.depth,
        }
    }

    /// Return the root node id.
    pub fn root_id(&self) -> NodeId {
        NodeId::from(0)
    }

    /// Number of edges on every root-to-leaf path.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Return how many nodes exist in the tree arena.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Return an immutable node handle.
    pub fn node(&self, node_id: NodeId) -> Result<&Node, TreeError> {
        self.arena
            .get(node_id)
            .ok_or(TreeError::MissingNode { node_id })
    }

    /// Return a mutable node handle.
    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Result<&mut Node, TreeError> {
        self.arena
            .get_mut(node_id)
            .ok_or(TreeError::MissingNode { node_id })
    }

    /// Iterate every node with its id, in pre-order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.arena
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId::from(index), node))
    }

    /// Leaf ids from left to right.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.is_leaf())
            .map(|(id, _)| id)
            .collect()
    }

    /// Mean of the fixed leaf rewards below `node_id` (the node's own reward for a leaf).
    /// Subtrees are complete, so every leaf carries the same weight.
    pub fn subtree_mean_reward(&self, node_id: NodeId) -> Result<f64, TreeError> {
        let mut stack = vec![node_id];
        let mut sum = 0.0;
        let mut count = 0usize;

        while let Some(current) = stack.pop() {
            let node = self.node(current)?;
            match node.reward() {
                Some(reward) => {
                    sum += reward;
                    count += 1;
                }
                None => stack.extend(node.children().iter().rev()),
            }
        }

        Ok(sum / count as f64)
    }

    /// Largest fixed leaf reward in the tree.
    pub fn max_leaf_reward(&self) -> f64 {
        self.nodes()
            .filter_map(|(_, node)| node.reward())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Average reward backed up through the root, `None` before the first iteration.
    pub fn root_mean(&self) -> Option<f64> {
        self.arena.get(self.root_id())?.stats().mean()
    }

    /// Root child with the most visits (first wins ties), `None` before any visit.
    pub fn most_visited_root_child(&self) -> Result<Option<NodeId>, TreeError> {
        let root = self.node(self.root_id())?;
        let mut best: Option<(NodeId, u64)> = None;

        for &child_id in root.children() {
            let visits = self.node(child_id)?.visits();
            if visits == 0 {
                continue;
            }
            best = match best {
                Some((_, best_visits)) if best_visits >= visits => best,
                _ => Some((child_id, visits)),
            };
        }

        Ok(best.map(|(id, _)| id))
    }
}

/// Allocate the subtree for `rewards` in pre-order and return its root id.
fn build(arena: &mut Arena<Node>, rewards: &[f64], depth: u32, parent: Option<NodeId>) -> NodeId {
    if let [reward] = rewards {
        return arena.allocate(Node::leaf(depth, parent, *reward));
    }

    let id = arena.allocate(Node::internal(depth, parent));
    let (left_rewards, right_rewards) = rewards.split_at(rewards.len() / 2);
    let left = build(arena, left_rewards, depth + 1, Some(id));
    let right = build(arena, right_rewards, depth + 1, Some(id));
    if let Some(node) = arena.get_mut(id) {
        node.attach_children(left, right);
    }
    id
}
