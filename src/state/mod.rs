//! State module for tracking traversal progress
//!
//! # Components
//!
//! - `BranchState`: The state machine every traversal branch walks through
//! - `BranchTree`: Parent/child join bookkeeping for one run
//! - `HostState`: Per-host request pacing
//! - `VisitedSet` / `ResultCollection`: The mutable state shared by branches

mod branch_state;
mod branch_tree;
mod collections;
mod host_state;

// Re-export main types
pub use branch_state::BranchState;
pub use branch_tree::{BranchId, BranchTree};
pub use collections::{Claim, ResultCollection, VisitedSet};
pub use host_state::HostState;
