use thiserror::Error;

use crate::route_model::NodeId;


/// Result alias used across the planner
pub type Result<T> = std::result::Result<T, PathPlannerError>;

#[derive(Debug, Error, PartialEq)]
pub enum PathPlannerError {
    /// Frontier ran dry before the goal was reached
    #[error("no path found from node {start} to node {goal}")]
    NoPathFound { start: NodeId, goal: NodeId },

    /// Graph cannot be searched (empty, dangling road, bad scale, ...)
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    #[error("invalid coordinate ({x}, {y})")]
    InvalidCoordinate { x: f64, y: f64 },

    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Parent links from this node do not lead back to the start
    #[error("parent chain broken at node {0}")]
    BrokenParentChain(NodeId),

    #[error("kd-tree error: {0}")]
    KdTree(String),
}


impl From<kdtree::ErrorKind> for PathPlannerError {
    fn from(error: kdtree::ErrorKind) -> Self {
        PathPlannerError::KdTree(error.to_string())
    }
}
