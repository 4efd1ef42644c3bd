//! Presentation-side state for revealing an iteration one phase at a time.
//!
//! Nothing in here is read by the engine. A renderer owns an [`AnnotationMap`]
//! and a [`PhaseStepper`]; the engine only ever runs whole iterations.

use std::collections::HashMap;

use rand::Rng;
use serde::Serialize;

use crate::tree::{
    error::TreeError,
    ids::NodeId,
    mcts::{IterationMetrics, MctsEngine},
};

/// The four steps of one MCTS iteration, in display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Select,
    Expand,
    Simulate,
    Backpropagate,
}

impl Phase {
    /// Phase revealed after this one; wraps back to `Select`.
    pub fn next(self) -> Phase {
        match self {
            Phase::Select => Phase::Expand,
            Phase::Expand => Phase::Simulate,
            Phase::Simulate => Phase::Backpropagate,
            Phase::Backpropagate => Phase::Select,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Select => "Select",
            Phase::Expand => "Expand",
            Phase::Simulate => "Simulate",
            Phase::Backpropagate => "Backpropagate",
        }
    }
}

/// Highlight flags for one node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub selected: bool,
    pub expanded: bool,
    pub simulated: bool,
    pub backpropagated: bool,
}

/// Highlights keyed by node id. Unlisted nodes carry no highlight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationMap {
    marks: HashMap<NodeId, Highlight>,
}

impl AnnotationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn get(&self, node_id: NodeId) -> Highlight {
        self.marks.get(&node_id).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Highlight)> + '_ {
        self.marks.iter().map(|(id, highlight)| (*id, *highlight))
    }

    fn mark(&mut self, node_id: NodeId) -> &mut Highlight {
        self.marks.entry(node_id).or_default()
    }

    /// Update highlights to show `phase` of an already completed iteration.
    pub fn reveal(&mut self, metrics: &IterationMetrics, phase: Phase) {
        match phase {
            Phase::Select => {
                self.clear();
                for &node_id in &metrics.path {
                    self.mark(node_id).selected = true;
                }
            }
            Phase::Expand => {
                let selected = self.mark(metrics.selected);
                selected.expanded = true;
                selected.selected = false;
            }
            Phase::Simulate => {
                for &node_id in &metrics.rollout_path {
                    self.mark(node_id).simulated = true;
                }
                self.mark(metrics.selected).expanded = false;
            }
            Phase::Backpropagate => {
                self.clear();
                for &node_id in &metrics.path {
                    self.mark(node_id).backpropagated = true;
                }
            }
        }
    }
}

/// Paces an engine one phase per call.
///
/// The `Select` call runs a whole `iterate()`; the three calls after it only
/// reveal that iteration's remaining phases. Stopping anywhere leaves the
/// engine between iterations.
#[derive(Debug, Clone, Default)]
pub struct PhaseStepper {
    next: Phase,
    pending: Option<IterationMetrics>,
}

impl PhaseStepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase the next `advance` call will reveal.
    pub fn next_phase(&self) -> Phase {
        self.next
    }

    /// Iteration currently being revealed.
    pub fn pending(&self) -> Option<&IterationMetrics> {
        self.pending.as_ref()
    }

    /// Reveal the next phase, running a fresh iteration when that phase is `Select`.
    /// Returns the phase that was revealed, or `None` once the engine's budget is
    /// spent and no iteration is left to reveal.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        engine: &mut MctsEngine,
        rng: &mut R,
        annotations: &mut AnnotationMap,
    ) -> Result<Option<Phase>, TreeError> {
        let metrics = match self.pending.take() {
            Some(metrics) if self.next != Phase::Select => metrics,
            _ => {
                self.next = Phase::Select;
                if engine.is_finished() {
                    return Ok(None);
                }
                engine.iterate(rng)?
            }
        };

        let revealed = self.next;
        annotations.reveal(&metrics, revealed);
        self.next = revealed.next();
        if revealed != Phase::Backpropagate {
            self.pending = Some(metrics);
        }
        Ok(Some(revealed))
    }
}
