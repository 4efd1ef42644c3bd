/// Stores the numbers MCTS updates constantly.
/// Only backpropagation writes here, so `visits == 0` always implies `total_reward == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStats {
    visits: u64,
    total_reward: f64,
}

impl NodeStats {
    pub fn new() -> Self {
        NodeStats {
            visits: 0,
            total_reward: 0.0,
        }
    }

    /// Retrieve the amount of visits to a certain node
    pub fn visits(&self) -> u64 {
        self.visits
    }

    /// Retrieve the running sum of backed-up rewards.
    pub fn total_reward(&self) -> f64 {
        self.total_reward
    }

    /// Function to be used for backpropagation.
    /// Immediately records the rollout reward and increments the visits.
    pub(crate) fn record(&mut self, reward: f64) {
        self.visits += 1;
        self.total_reward += reward;
    }

    /// Helper function just to check if the node has been visisted or not
    pub fn is_unvisited(&self) -> bool {
        self.visits == 0
    }

    /// Average backed-up reward, `None` while unvisited.
    pub fn mean(&self) -> Option<f64> {
        if self.is_unvisited() {
            None
        } else {
            Some(self.total_reward / self.visits as f64)
        }
    }

    /// UCB1 score of a visited child under a parent with `parent_visits` visits.
    /// Returns `None` for an unvisited child; callers must prefer those before scoring.
    pub fn ucb1(&self, parent_visits: u64, c: f64) -> Option<f64> {
        let mean = self.mean()?;
        let exploration = f64::sqrt(f64::ln(parent_visits as f64) / self.visits as f64);
        Some(mean + c * exploration)
    }
}
