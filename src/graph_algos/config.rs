#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};


/// Open list implementation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FrontierKind {
    /// Re-sort the whole list on every pop, f values are read at pop time
    #[default]
    Sorted,
    /// Binary heap keyed on the f value at push time
    Heap,
}


/// How a neighbor that already has a record is treated
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReopenPolicy {
    /// Neighbor discovery skips visited nodes. If the graph hands one back anyway,
    /// its parent and g value are overwritten and it is queued again.
    /// This is not a shortest path re-optimization.
    #[default]
    Overwrite,
    /// Neighbor discovery skips expanded nodes, a record is only updated
    /// (and re-queued) when the new g value is strictly lower.
    Relax,
}


/// Planner settings
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlannerConfig {
    pub frontier: FrontierKind,
    pub reopen: ReopenPolicy,
    /// Applied to the start/end coordinates handed to the planner
    pub coordinate_scale: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            frontier: FrontierKind::default(),
            reopen: ReopenPolicy::default(),
            coordinate_scale: 0.01, // percent -> normalized
        }
    }
}

impl PlannerConfig {

    pub fn with_frontier(mut self, frontier: FrontierKind) -> Self {
        self.frontier = frontier;
        self
    }

    pub fn with_reopen_policy(mut self, reopen: ReopenPolicy) -> Self {
        self.reopen = reopen;
        self
    }

    pub fn with_coordinate_scale(mut self, coordinate_scale: f64) -> Self {
        self.coordinate_scale = coordinate_scale;
        self
    }
}
