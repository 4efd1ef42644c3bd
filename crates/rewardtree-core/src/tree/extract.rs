use serde::{Deserialize, Serialize};

use crate::tree::{error::TreeError, ids::NodeId, reward_tree::Tree};

/// How the final answer is read off a searched tree.
/// Pick one per run; the two rules can disagree on the same statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionRule {
    /// Robust child: descend into the child with the most visits.
    #[default]
    MostVisited,
    /// Descend into the visited child with the highest mean backed-up reward.
    HighestMean,
}

/// Leaf recommended by a searched tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestLeaf {
    pub leaf: NodeId,
    pub reward: f64,
    /// Root-to-leaf descent, both endpoints included.
    pub path: Vec<NodeId>,
    /// Levels where the choice was backed by visited children. Below that the
    /// descent had no statistics and took the first child.
    pub informed_steps: u32,
}

impl Tree {
    /// Descend from the root using `rule` at every level and return the leaf reached.
    ///
    /// Ties go to the first child scanned. When a level has no visited child the
    /// descent falls back to the first child, so a shallow search still yields a
    /// leaf; `informed_steps` records how far the statistics reached.
    pub fn extract_best_leaf(&self, rule: ExtractionRule) -> Result<BestLeaf, TreeError> {
        let root_id = self.root_id();
        if self.node(root_id)?.visits() == 0 {
            return Err(TreeError::Unsearched);
        }

        let mut current = root_id;
        let mut path = vec![root_id];
        let mut informed_steps = 0;

        loop {
            let node = self.node(current)?;
            if let Some(reward) = node.reward() {
                return Ok(BestLeaf {
                    leaf: current,
                    reward,
                    path,
                    informed_steps,
                });
            }

            current = match self.best_child(current, rule)? {
                Some(child) => {
                    informed_steps += 1;
                    child
                }
                None => match node.children().first() {
                    Some(&first) => first,
                    None => return Err(TreeError::MissingNode { node_id: current }),
                },
            };
            path.push(current);
        }
    }

    /// Best visited child of `node_id` under `rule`, `None` if no child was visited yet.
    pub fn best_child(
        &self,
        node_id: NodeId,
        rule: ExtractionRule,
    ) -> Result<Option<NodeId>, TreeError> {
        let mut best: Option<(NodeId, f64)> = None;

        for &child_id in self.node(node_id)?.children() {
            let stats = self.node(child_id)?.stats();
            let Some(mean) = stats.mean() else {
                continue;
            };
            let key = match rule {
                ExtractionRule::MostVisited => stats.visits() as f64,
                ExtractionRule::HighestMean => mean,
            };
            // strict comparison keeps the first child on ties
            if best.is_none_or(|(_, best_key)| key > best_key) {
                best = Some((child_id, key));
            }
        }

        Ok(best.map(|(id, _)| id))
    }
}
