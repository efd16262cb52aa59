use crate::errors::{PathPlannerError, Result};
use crate::route_model::{Node, RoadGraph};
use super::GraphNodeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};


/// Path found by the planner
/// Nodes are copies, ordered start -> goal, detached from the graph
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    pub nodes: Vec<Node>,
    pub distance: f64, // meters, normalized distance times the metric scale
}

impl Route {

    pub fn start(&self) -> Option<&Node> {
        self.nodes.first()
    }

    pub fn goal(&self) -> Option<&Node> {
        self.nodes.last()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consecutive node pairs along the route
    pub fn segments(&self) -> impl Iterator<Item = (&Node, &Node)> {
        self.nodes.windows(2).map(|pair| (&pair[0], &pair[1]))
    }
}


/// Construct the final path from the goal node back to the start node
/// Returns the ordered path from start to goal along with its scaled distance
/// node_map: GraphNodeMap - search records with their parent index
/// goal_index: usize - index of the goal node in the node_map
pub(crate) fn construct_final_path<G>(node_map: &GraphNodeMap, goal_index: usize, graph: &G) -> Result<Route>
where
    G: RoadGraph + ?Sized,
{

    let mut nodes: Vec<Node> = Vec::new();
    let mut distance = 0.0;
    let mut current_index = Some(goal_index);
    let mut broken_at = node_map.get_index(goal_index).map(|(&id, _)| id).unwrap_or(goal_index);

    // Trace back from goal to start
    while let Some(index) = current_index {

        // a parent chain can never be longer than the number of records
        if nodes.len() >= node_map.len() {
            return Err(PathPlannerError::BrokenParentChain(broken_at));
        }

        let Some((&id, record)) = node_map.get_index(index) else {
            return Err(PathPlannerError::BrokenParentChain(broken_at));
        };
        let node = graph.node(id).ok_or(PathPlannerError::UnknownNode(id))?;

        if let Some(previous) = nodes.last() {
            distance += previous.distance(&node);
        }
        nodes.push(node);
        broken_at = id;
        current_index = record.parent;
    }

    // The path is in reverse order, so reverse it
    nodes.reverse();

    Ok(Route {
        nodes,
        distance: distance * graph.metric_scale(),
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph_algos::NodeRecord;
    use crate::route_model::RouteModel;

    fn record(parent: Option<usize>) -> NodeRecord {
        NodeRecord { g_value: 0.0, h_value: 0.0, visited: true, expanded: false, parent }
    }

    // 0 (0,0) -> 1 (0.3,0.4) -> 2 (0.3,1.0), scale 10
    fn create_test_model() -> RouteModel {
        let mut builder = RouteModel::builder();
        let a = builder.add_node(0.0, 0.0);
        let b = builder.add_node(0.3, 0.4);
        let c = builder.add_node(0.3, 1.0);
        builder.add_road(&[a, b, c]).metric_scale(10.0);
        builder.build().unwrap()
    }

    #[test]
    fn test_construct_final_path() {
        let model = create_test_model();

        // records inserted out of id order on purpose
        let mut node_map = GraphNodeMap::default();
        let a_index = node_map.insert_full(0, record(None)).0;
        let c_index = node_map.insert_full(2, record(None)).0;
        let b_index = node_map.insert_full(1, record(Some(a_index))).0;
        node_map[c_index].parent = Some(b_index);

        let route = construct_final_path(&node_map, c_index, &model).unwrap();
        let ids: Vec<_> = route.nodes.iter().map(|node| node.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!((route.distance - 11.0).abs() < 1e-9); // (0.5 + 0.6) * 10
        assert_eq!(route.start().map(|n| n.id), Some(0));
        assert_eq!(route.goal().map(|n| n.id), Some(2));
        assert_eq!(route.segments().count(), 2);
    }

    #[test]
    fn test_goal_without_parent_is_single_node() {
        let model = create_test_model();
        let mut node_map = GraphNodeMap::default();
        let index = node_map.insert_full(1, record(None)).0;

        let route = construct_final_path(&node_map, index, &model).unwrap();
        assert_eq!(route.len(), 1);
        assert_eq!(route.distance, 0.0);
        assert_eq!(route.segments().count(), 0);
    }

    #[test]
    fn test_cyclic_parent_chain_is_an_error() {
        let model = create_test_model();
        let mut node_map = GraphNodeMap::default();
        node_map.insert(0, record(Some(1)));
        node_map.insert(1, record(Some(0)));

        let result = construct_final_path(&node_map, 1, &model);
        assert!(matches!(result, Err(PathPlannerError::BrokenParentChain(_))));
    }

    #[test]
    fn test_dangling_parent_index_is_an_error() {
        let model = create_test_model();
        let mut node_map = GraphNodeMap::default();
        node_map.insert(2, record(Some(9)));

        let result = construct_final_path(&node_map, 0, &model);
        assert_eq!(result, Err(PathPlannerError::BrokenParentChain(2)));
    }
}
