pub mod a_star;
pub mod config;
pub mod frontier;
mod shortest_path;

pub use shortest_path::Route;
use shortest_path::construct_final_path;

use crate::collections::FxIndexMap;
use crate::route_model::NodeId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};


/// Search-local bookkeeping for a single node
/// Kept outside the graph so one graph can serve many searches
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodeRecord {
    pub g_value: f64, // cost from the start along the current parent chain
    pub h_value: f64, // straight line estimate to the goal
    pub visited: bool, // discovered at least once
    pub expanded: bool, // neighbors have been added to the open list
    pub parent: Option<usize>, // index of the parent record, None for the start
}

impl NodeRecord {

    /// Priority on the open list
    pub fn f_value(&self) -> f64 {
        self.g_value + self.h_value
    }
}


/// Type alias for the node map used while searching
/// Node id -> record, the map index doubles as the arena index used by `parent`
pub(crate) type GraphNodeMap = FxIndexMap<NodeId, NodeRecord>;
