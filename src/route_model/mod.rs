//! Road network consumed by the planner.
//!
//! `RoadGraph` is the boundary the search talks to: nearest node lookup,
//! neighbor discovery, distances and the metric scale of the map.
//! `RouteModel` is the in-memory implementation built from nodes and roads
//! (ordered polylines of nodes). The model is immutable once built; all search
//! bookkeeping lives in `graph_algos`.

use std::fmt;

use kdtree::KdTree;
use kdtree::distance::squared_euclidean as kt_squared_euclidean;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{PathPlannerError, Result};
use crate::geometry::{Point, euclidean, squared_euclidean};


/// Index of a node inside its graph
pub type NodeId = usize;


/// Vertex of the road network (intersection or point along a road)
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    pub id: NodeId,
    pub x: f64, // normalized, 0.0 - 1.0
    pub y: f64, // normalized, 0.0 - 1.0
}

impl Node {

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Euclidean distance in normalized map space
    pub fn distance(&self, other: &Node) -> f64 {
        euclidean(self.x, self.y, other.x, other.y)
    }

    /// Same position, regardless of identity
    pub fn same_position(&self, other: &Node) -> bool {
        self.x == other.x && self.y == other.y
    }
}


/// Graph operations the A* search relies on
pub trait RoadGraph {

    fn node_count(&self) -> usize;

    fn node(&self, id: NodeId) -> Option<Node>;

    /// Nearest node to a normalized coordinate
    fn find_closest_node(&self, x: f64, y: f64) -> Result<NodeId>;

    /// Nodes reachable from `id`, skipping every node `exclude` returns true for
    fn find_neighbors(&self, id: NodeId, exclude: &dyn Fn(NodeId) -> bool) -> Vec<NodeId>;

    /// Conversion factor from normalized distance to meters
    fn metric_scale(&self) -> f64;

    fn distance(&self, a: NodeId, b: NodeId) -> Result<f64> {
        let a = self.node(a).ok_or(PathPlannerError::UnknownNode(a))?;
        let b = self.node(b).ok_or(PathPlannerError::UnknownNode(b))?;
        Ok(a.distance(&b))
    }
}


/// Road network held in memory
pub struct RouteModel {
    nodes: Vec<Node>,
    roads: Vec<Vec<NodeId>>,
    node_to_road: Vec<Vec<usize>>, // node id -> indexes into roads
    metric_scale: f64,
    tree: KdTree<f64, NodeId, [f64; 2]>, // point -> node id
}

impl RouteModel {

    pub fn builder() -> RouteModelBuilder {
        RouteModelBuilder::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn roads(&self) -> &[Vec<NodeId>] {
        &self.roads
    }

    /// Roads passing through a node
    pub fn roads_of(&self, id: NodeId) -> &[usize] {
        self.node_to_road.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl fmt::Debug for RouteModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteModel")
            .field("nodes", &self.nodes.len())
            .field("roads", &self.roads.len())
            .field("metric_scale", &self.metric_scale)
            .finish()
    }
}

impl RoadGraph for RouteModel {

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, id: NodeId) -> Option<Node> {
        self.nodes.get(id).copied()
    }

    fn find_closest_node(&self, x: f64, y: f64) -> Result<NodeId> {
        if !Point::new(x, y).is_finite() {
            return Err(PathPlannerError::InvalidCoordinate { x, y });
        }

        let closest: Vec<(f64, &NodeId)> = self.tree.nearest(&[x, y], 1, &kt_squared_euclidean)?;
        closest
            .first()
            .map(|(_, id)| **id)
            .ok_or_else(|| PathPlannerError::InvalidGraph("graph has no nodes".to_string()))
    }

    /// For every road through the node, pick the closest eligible node on that road.
    /// Nodes sitting on the exact same position as `id` are never neighbors.
    fn find_neighbors(&self, id: NodeId, exclude: &dyn Fn(NodeId) -> bool) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };

        let mut neighbors: Vec<NodeId> = Vec::new();
        for &road_idx in self.roads_of(id) {
            let closest = self.roads[road_idx]
                .iter()
                .copied()
                .filter(|&other| other != id && !exclude(other))
                .filter(|&other| !node.same_position(&self.nodes[other]))
                .min_by(|&a, &b| {
                    let (a, b) = (&self.nodes[a], &self.nodes[b]);
                    squared_euclidean(node.x, node.y, a.x, a.y)
                        .total_cmp(&squared_euclidean(node.x, node.y, b.x, b.y))
                });

            if let Some(closest) = closest {
                if !neighbors.contains(&closest) {
                    neighbors.push(closest);
                }
            }
        }
        neighbors
    }

    fn metric_scale(&self) -> f64 {
        self.metric_scale
    }
}


/// Incrementally assembles a `RouteModel`
#[derive(Debug)]
pub struct RouteModelBuilder {
    points: Vec<Point>,
    roads: Vec<Vec<NodeId>>,
    metric_scale: f64,
}

impl Default for RouteModelBuilder {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            roads: Vec::new(),
            metric_scale: 1.0,
        }
    }
}

impl RouteModelBuilder {

    /// Add a node at a normalized position, returns its id
    pub fn add_node(&mut self, x: f64, y: f64) -> NodeId {
        self.points.push(Point::new(x, y));
        self.points.len() - 1
    }

    /// Add a road running through the given nodes in order
    pub fn add_road(&mut self, nodes: &[NodeId]) -> &mut Self {
        self.roads.push(nodes.to_vec());
        self
    }

    pub fn metric_scale(&mut self, scale: f64) -> &mut Self {
        self.metric_scale = scale;
        self
    }

    pub fn build(&self) -> Result<RouteModel> {
        if self.points.is_empty() {
            return Err(PathPlannerError::InvalidGraph("graph has no nodes".to_string()));
        }
        if !self.metric_scale.is_finite() || self.metric_scale <= 0.0 {
            return Err(PathPlannerError::InvalidGraph(format!(
                "metric scale must be positive, got {}", self.metric_scale
            )));
        }

        let mut nodes = Vec::with_capacity(self.points.len());
        let mut tree = KdTree::new(2);
        for (id, point) in self.points.iter().enumerate() {
            if !point.is_finite() {
                return Err(PathPlannerError::InvalidGraph(format!(
                    "node {id} has a non-finite position"
                )));
            }
            tree.add([point.x, point.y], id)?;
            nodes.push(Node { id, x: point.x, y: point.y });
        }

        let mut roads = Vec::with_capacity(self.roads.len());
        let mut node_to_road: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for road in &self.roads {
            if let Some(&missing) = road.iter().find(|&&id| id >= nodes.len()) {
                return Err(PathPlannerError::InvalidGraph(format!(
                    "road references unknown node {missing}"
                )));
            }
            if road.len() < 2 {
                debug!(len = road.len(), "skipping road with fewer than two nodes");
                continue;
            }

            let road_idx = roads.len();
            for &id in road {
                // a looping road lists a node more than once
                if node_to_road[id].last() != Some(&road_idx) {
                    node_to_road[id].push(road_idx);
                }
            }
            roads.push(road.clone());
        }

        debug!(nodes = nodes.len(), roads = roads.len(), "built route model");

        Ok(RouteModel {
            nodes,
            roads,
            node_to_road,
            metric_scale: self.metric_scale,
            tree,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    // 0 --- 1 --- 2
    //       |
    //       3
    fn create_test_model() -> RouteModel {
        let mut builder = RouteModel::builder();
        let a = builder.add_node(0.0, 0.0);
        let b = builder.add_node(0.5, 0.0);
        let c = builder.add_node(1.0, 0.0);
        let d = builder.add_node(0.5, 0.5);
        builder.add_road(&[a, b, c]).add_road(&[b, d]).metric_scale(100.0);
        builder.build().unwrap()
    }

    #[test]
    fn test_find_closest_node() {
        let model = create_test_model();
        assert_eq!(model.find_closest_node(0.1, 0.1).unwrap(), 0);
        assert_eq!(model.find_closest_node(0.9, -0.2).unwrap(), 2);
        assert_eq!(model.find_closest_node(0.5, 0.4).unwrap(), 3);
    }

    #[test]
    fn test_find_closest_node_rejects_nan() {
        let model = create_test_model();
        let result = model.find_closest_node(f64::NAN, 0.5);
        assert!(matches!(result, Err(PathPlannerError::InvalidCoordinate { .. })));
    }

    #[test]
    fn test_find_neighbors_one_per_road() {
        let model = create_test_model();

        // node 1 sits on both roads, 0 and 2 tie so the earlier node on the road wins
        assert_eq!(model.find_neighbors(1, &|_| false), vec![0, 3]);

        // node 0 only sees the closest node on its road
        assert_eq!(model.find_neighbors(0, &|_| false), vec![1]);
    }

    #[test]
    fn test_find_neighbors_skips_excluded() {
        let model = create_test_model();

        // with 1 excluded, 2 is the closest remaining node on the road
        assert_eq!(model.find_neighbors(0, &|id| id == 1), vec![2]);
        assert!(model.find_neighbors(3, &|id| id == 1).is_empty());
    }

    #[test]
    fn test_find_neighbors_skips_same_position() {
        let mut builder = RouteModel::builder();
        let a = builder.add_node(0.2, 0.2);
        let b = builder.add_node(0.2, 0.2);
        let c = builder.add_node(0.4, 0.2);
        builder.add_road(&[a, b, c]);
        let model = builder.build().unwrap();

        assert_eq!(model.find_neighbors(a, &|_| false), vec![c]);
    }

    #[test]
    fn test_distance_and_scale() {
        let model = create_test_model();
        assert_eq!(model.distance(0, 2).unwrap(), 1.0);
        assert_eq!(model.metric_scale(), 100.0);
        assert_eq!(model.distance(0, 42), Err(PathPlannerError::UnknownNode(42)));
    }

    #[test]
    fn test_roads_of_dedupes_looping_road() {
        let mut builder = RouteModel::builder();
        let a = builder.add_node(0.0, 0.0);
        let b = builder.add_node(1.0, 0.0);
        let c = builder.add_node(1.0, 1.0);
        builder.add_road(&[a, b, c, a]);
        let model = builder.build().unwrap();

        assert_eq!(model.roads_of(a), &[0]);
    }

    #[test]
    fn test_build_rejects_invalid_graphs() {
        let empty = RouteModel::builder().build();
        assert!(matches!(empty, Err(PathPlannerError::InvalidGraph(_))));

        let mut dangling = RouteModel::builder();
        let a = dangling.add_node(0.0, 0.0);
        dangling.add_road(&[a, 7]);
        assert!(matches!(dangling.build(), Err(PathPlannerError::InvalidGraph(_))));

        let mut bad_scale = RouteModel::builder();
        bad_scale.add_node(0.0, 0.0);
        bad_scale.metric_scale(0.0);
        assert!(matches!(bad_scale.build(), Err(PathPlannerError::InvalidGraph(_))));

        let mut bad_node = RouteModel::builder();
        bad_node.add_node(f64::INFINITY, 0.0);
        assert!(matches!(bad_node.build(), Err(PathPlannerError::InvalidGraph(_))));
    }

    #[test]
    fn test_short_roads_are_ignored() {
        let mut builder = RouteModel::builder();
        let a = builder.add_node(0.0, 0.0);
        builder.add_node(1.0, 0.0);
        builder.add_road(&[a]);
        let model = builder.build().unwrap();

        assert!(model.roads().is_empty());
        assert!(model.find_neighbors(a, &|_| false).is_empty());
    }
}
