//! Parent/child bookkeeping for traversal branches
//!
//! The tree is owned by the coordinator loop alone, so it needs no locking.
//! A branch reaches `Done` only once its own work has finished and every
//! child it spawned has reached a terminal state; completion then propagates
//! to its ancestors. The run is complete when the root is terminal.

use crate::state::BranchState;
use crate::HarvestError;

/// Index of a branch inside a [`BranchTree`]
pub type BranchId = usize;

#[derive(Debug, Clone)]
struct BranchNode {
    url: String,
    depth: u32,
    parent: Option<BranchId>,
    state: BranchState,
    outstanding_children: usize,
    work_finished: bool,
}

/// Join bookkeeping for every branch spawned in one run
#[derive(Debug, Default)]
pub struct BranchTree {
    nodes: Vec<BranchNode>,
}

impl BranchTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the seed branch
    pub fn add_root(&mut self, url: &str, depth: u32) -> BranchId {
        self.push(url, depth, None)
    }

    /// Registers a child branch and counts it against its parent's join
    pub fn add_child(&mut self, parent: BranchId, url: &str, depth: u32) -> BranchId {
        self.nodes[parent].outstanding_children += 1;
        self.push(url, depth, Some(parent))
    }

    fn push(&mut self, url: &str, depth: u32, parent: Option<BranchId>) -> BranchId {
        self.nodes.push(BranchNode {
            url: url.to_string(),
            depth,
            parent,
            state: BranchState::Pending,
            outstanding_children: 0,
            work_finished: false,
        });
        self.nodes.len() - 1
    }

    /// Moves a branch to a new state, checking the transition
    pub fn set_state(&mut self, id: BranchId, next: BranchState) -> Result<(), HarvestError> {
        let node = &mut self.nodes[id];
        node.state = node.state.transition(next)?;
        Ok(())
    }

    /// Records that a branch finished its own fetch/extract/expand work
    ///
    /// The branch must be in `Expanding` (children already registered) or
    /// `Failed`. Returns every branch that reached a terminal state as a
    /// result, in the order they completed.
    pub fn finish_work(&mut self, id: BranchId) -> Result<Vec<BranchId>, HarvestError> {
        self.nodes[id].work_finished = true;

        let mut completed = Vec::new();
        let mut current = Some(id);

        while let Some(branch) = current.take() {
            let node = &self.nodes[branch];
            if !node.work_finished || node.outstanding_children > 0 {
                break;
            }

            let state = node.state;
            if state == BranchState::Expanding {
                self.set_state(branch, BranchState::Done)?;
            } else if !state.is_terminal() {
                // Work cannot finish from an active non-expanding state
                return Err(HarvestError::InvalidTransition {
                    from: state,
                    to: BranchState::Done,
                });
            }
            completed.push(branch);

            if let Some(parent) = self.nodes[branch].parent {
                self.nodes[parent].outstanding_children -= 1;
                current = Some(parent);
            }
        }

        Ok(completed)
    }

    pub fn state(&self, id: BranchId) -> BranchState {
        self.nodes[id].state
    }

    pub fn url(&self, id: BranchId) -> &str {
        &self.nodes[id].url
    }

    pub fn depth(&self, id: BranchId) -> u32 {
        self.nodes[id].depth
    }

    /// Returns true once the given branch and all its descendants are terminal
    pub fn is_complete(&self, id: BranchId) -> bool {
        let node = &self.nodes[id];
        node.state.is_terminal() && node.outstanding_children == 0
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of branches currently in the given state
    pub fn count_in_state(&self, state: BranchState) -> usize {
        self.nodes.iter().filter(|n| n.state == state).count()
    }
}
