//! A* route planning over road networks.
//!
//! A `RouteModel` holds the road network (nodes in normalized map space plus
//! roads running through them). A `RoutePlanner` snaps start and end
//! coordinates to the closest nodes and runs A* between them with a
//! straight line heuristic, producing a `Route`: node copies from start to
//! goal and the total distance in meters.
//!
//! ```
//! use route_planner::{RouteModel, RoutePlanner};
//!
//! let mut builder = RouteModel::builder();
//! let a = builder.add_node(0.0, 0.0);
//! let b = builder.add_node(0.5, 0.5);
//! let c = builder.add_node(1.0, 1.0);
//! builder.add_road(&[a, b, c]).metric_scale(1000.0);
//! let model = builder.build()?;
//!
//! let route = RoutePlanner::new(&model, 0.0, 0.0, 100.0, 100.0)?.a_star_search()?;
//! assert_eq!(route.len(), 3);
//! # Ok::<(), route_planner::PathPlannerError>(())
//! ```

pub mod errors;
pub mod geometry;
pub mod graph_algos;
pub mod route_model;
mod collections;

pub use errors::{PathPlannerError, Result};
pub use geometry::Point;
pub use graph_algos::Route;
pub use graph_algos::NodeRecord;
pub use graph_algos::a_star::{RoutePlanner, Search, SearchStatus};
pub use graph_algos::config::{FrontierKind, PlannerConfig, ReopenPolicy};
pub use route_model::{Node, NodeId, RoadGraph, RouteModel, RouteModelBuilder};
