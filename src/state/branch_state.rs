/// Branch state definitions for tracking traversal progress
///
/// Every branch (one URL to fetch, extract and expand) walks through these
/// states. Failures are only reachable from the fetching and extracting steps.
use crate::HarvestError;
use std::fmt;

/// Represents the current state of one traversal branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchState {
    // ===== Active States =====
    /// Branch created with a target URL and a depth budget
    Pending,

    /// Target URL is being fetched
    Fetching,

    /// Records are being extracted from the fetched document
    Extracting,

    /// Successor URLs are being claimed and spawned
    Expanding,

    // ===== Terminal States =====
    /// Own work finished and every child branch is done
    Done,

    /// Fetch or extraction failed; the branch contributes nothing further
    Failed,
}

impl BranchState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if the transition `self -> next` is allowed
    ///
    /// `Expanding -> Expanding` is allowed: a branch stays in the expanding
    /// state while it waits for its children to join.
    pub fn can_transition_to(&self, next: BranchState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fetching)
                | (Self::Fetching, Self::Extracting)
                | (Self::Fetching, Self::Failed)
                | (Self::Extracting, Self::Expanding)
                | (Self::Extracting, Self::Failed)
                | (Self::Expanding, Self::Expanding)
                | (Self::Expanding, Self::Done)
        )
    }

    /// Performs a checked transition
    ///
    /// # Returns
    ///
    /// * `Ok(BranchState)` - The new state
    /// * `Err(HarvestError::InvalidTransition)` - The transition is not allowed
    pub fn transition(self, next: BranchState) -> Result<BranchState, HarvestError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Expanding => "expanding",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for BranchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
