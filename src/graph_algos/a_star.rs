use crate::errors::{PathPlannerError, Result};
use crate::route_model::{Node, NodeId, RoadGraph};
use super::config::{PlannerConfig, ReopenPolicy};
use super::frontier::OpenList;
use super::{GraphNodeMap, NodeRecord, Route, construct_final_path};

use indexmap::map::Entry::{Occupied, Vacant};
use tracing::{debug, info, trace, warn};


/// Lifecycle of a search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    /// Start is on the open list, nothing popped yet
    Initialized,
    Running,
    /// Goal popped from the open list
    Found,
    /// Open list ran dry before reaching the goal
    Exhausted,
}


/// A* Algorithm over a road network
/// https://en.wikipedia.org/wiki/A*_search_algorithm
///
/// Picks the start and end nodes closest to the requested coordinates, then
/// hands out searches between them. The graph is only borrowed, so several
/// planners (or searches) can share one graph.
pub struct RoutePlanner<'g, G: RoadGraph + ?Sized> {
    graph: &'g G,
    config: PlannerConfig,
    start_node: Node,
    end_node: Node,
}

impl<'g, G: RoadGraph + ?Sized> RoutePlanner<'g, G> {

    /// Coordinates are percentages (0 - 100) of the map extent
    pub fn new(graph: &'g G, start_x: f64, start_y: f64, end_x: f64, end_y: f64) -> Result<Self> {
        Self::with_config(graph, start_x, start_y, end_x, end_y, PlannerConfig::default())
    }

    pub fn with_config(
        graph: &'g G,
        start_x: f64,
        start_y: f64,
        end_x: f64,
        end_y: f64,
        config: PlannerConfig,
    ) -> Result<Self> {

        if graph.node_count() == 0 {
            return Err(PathPlannerError::InvalidGraph("graph has no nodes".to_string()));
        }

        let scale = config.coordinate_scale;
        let start_node = closest_node(graph, start_x * scale, start_y * scale)?;
        let end_node = closest_node(graph, end_x * scale, end_y * scale)?;

        debug!(start = start_node.id, end = end_node.id, "route planner initialized");

        Ok(Self { graph, config, start_node, end_node })
    }

    pub fn start_node(&self) -> Node {
        self.start_node
    }

    pub fn end_node(&self) -> Node {
        self.end_node
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Straight line distance from the node to the end node
    pub fn calculate_h_value(&self, node: &Node) -> f64 {
        node.distance(&self.end_node)
    }

    /// Fresh search between the start and end nodes
    pub fn search(&self) -> Search<'g, G> {
        Search::from_nodes(self.graph, self.start_node, self.end_node, self.config)
    }

    /// Run A* to completion
    pub fn a_star_search(&self) -> Result<Route> {
        self.search().run()
    }
}

fn closest_node<G: RoadGraph + ?Sized>(graph: &G, x: f64, y: f64) -> Result<Node> {
    let id = graph.find_closest_node(x, y)?;
    graph.node(id).ok_or(PathPlannerError::UnknownNode(id))
}


/// A single A* run
/// Owns its bookkeeping (records + open list) and only borrows the graph.
pub struct Search<'g, G: RoadGraph + ?Sized> {
    graph: &'g G,
    config: PlannerConfig,
    start: Node,
    goal: Node,
    nodes: GraphNodeMap,
    open_list: OpenList,
    status: SearchStatus,
    goal_index: Option<usize>,
    expanded: usize,
}

impl<'g, G: RoadGraph + ?Sized> Search<'g, G> {

    /// Search between two node ids
    pub fn new(graph: &'g G, start: NodeId, goal: NodeId, config: PlannerConfig) -> Result<Self> {
        let start = graph.node(start).ok_or(PathPlannerError::UnknownNode(start))?;
        let goal = graph.node(goal).ok_or(PathPlannerError::UnknownNode(goal))?;
        Ok(Self::from_nodes(graph, start, goal, config))
    }

    fn from_nodes(graph: &'g G, start: Node, goal: Node, config: PlannerConfig) -> Self {
        let mut search = Self {
            graph,
            config,
            start,
            goal,
            nodes: GraphNodeMap::default(),
            open_list: OpenList::new(config.frontier),
            status: SearchStatus::Initialized,
            goal_index: None,
            expanded: 0,
        };

        // start node: g = 0, no parent, visited, queued
        let h_value = search.calculate_h_value(&start);
        let start_index = search.nodes.insert_full(start.id, NodeRecord {
            g_value: 0.0,
            h_value,
            visited: true,
            expanded: false,
            parent: None,
        }).0;
        search.open_list.push(start_index, h_value);

        search
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }

    pub fn start(&self) -> Node {
        self.start
    }

    pub fn goal(&self) -> Node {
        self.goal
    }

    /// Number of nodes whose neighbors have been added
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// Entries currently on the open list, duplicates included
    pub fn open_len(&self) -> usize {
        self.open_list.len()
    }

    /// Bookkeeping for a node, None if the search never discovered it
    pub fn node_record(&self, id: NodeId) -> Option<NodeRecord> {
        self.nodes.get(&id).copied()
    }

    /// Node the search reached `id` from
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.nodes.get(&id)?.parent?;
        self.nodes.get_index(parent).map(|(&parent_id, _)| parent_id)
    }

    pub fn calculate_h_value(&self, node: &Node) -> f64 {
        node.distance(&self.goal)
    }

    /// Pop the next node and either finish or expand it
    pub fn step(&mut self) -> Result<SearchStatus> {
        if matches!(self.status, SearchStatus::Found | SearchStatus::Exhausted) {
            return Ok(self.status);
        }
        self.status = SearchStatus::Running;

        let Some(index) = self.next_node() else {
            warn!(start = self.start.id, goal = self.goal.id, expanded = self.expanded, "no path found");
            self.status = SearchStatus::Exhausted;
            return Ok(self.status);
        };

        let (id, record) = self.record_at(index)?;

        // stale duplicate, the node was expanded through a cheaper entry
        if self.config.reopen == ReopenPolicy::Relax && record.expanded {
            return Ok(self.status);
        }

        let current = self.graph.node(id).ok_or(PathPlannerError::UnknownNode(id))?;

        // goal is matched on position, not identity
        if current.same_position(&self.goal) {
            self.goal_index = Some(index);
            self.status = SearchStatus::Found;
            return Ok(self.status);
        }

        self.add_neighbors(index, &current)?;
        Ok(self.status)
    }

    /// Step until the search finishes
    pub fn run(&mut self) -> Result<Route> {
        loop {
            match self.step()? {
                SearchStatus::Found => break,
                SearchStatus::Exhausted => {
                    return Err(PathPlannerError::NoPathFound {
                        start: self.start.id,
                        goal: self.goal.id,
                    });
                }
                SearchStatus::Initialized | SearchStatus::Running => {}
            }
        }

        let goal_index = self.goal_index.ok_or(PathPlannerError::UnknownNode(self.goal.id))?;
        let route = construct_final_path(&self.nodes, goal_index, self.graph)?;

        info!(nodes = route.len(), distance = route.distance, expanded = self.expanded, "route found");
        Ok(route)
    }

    /// Lowest f value node on the open list
    fn next_node(&mut self) -> Option<usize> {
        self.open_list.pop(&self.nodes)
    }

    fn record_at(&self, index: usize) -> Result<(NodeId, NodeRecord)> {
        self.nodes
            .get_index(index)
            .map(|(&id, &record)| (id, record))
            .ok_or(PathPlannerError::BrokenParentChain(index))
    }

    /// Discover the neighbors of `current` and queue them
    fn add_neighbors(&mut self, current_index: usize, current: &Node) -> Result<()> {
        let (_, current_record) = self.record_at(current_index)?;
        self.nodes[current_index].expanded = true;
        self.expanded += 1;

        let graph = self.graph;
        let reopen = self.config.reopen;
        let neighbors = {
            let nodes = &self.nodes;
            let exclude = |id: NodeId| match nodes.get(&id) {
                Some(record) => match reopen {
                    ReopenPolicy::Overwrite => record.visited,
                    ReopenPolicy::Relax => record.expanded,
                },
                None => false,
            };
            graph.find_neighbors(current.id, &exclude)
        };

        trace!(node = current.id, neighbors = neighbors.len(), "expanding");

        for neighbor_id in neighbors {
            let neighbor = graph.node(neighbor_id).ok_or(PathPlannerError::UnknownNode(neighbor_id))?;

            // new cost to reach this node = node cost + edge length
            let g_value = current_record.g_value + current.distance(&neighbor);
            let h_value = self.calculate_h_value(&neighbor);
            let record = NodeRecord {
                g_value,
                h_value,
                visited: true,
                expanded: false,
                parent: Some(current_index),
            };

            let neighbor_index = match self.nodes.entry(neighbor_id) {
                Vacant(e) => {
                    // This is the first time we're seeing this neighbor
                    let index = e.index();
                    e.insert(record);
                    index
                }
                Occupied(mut e) => {
                    let previous = *e.get();
                    match reopen {
                        ReopenPolicy::Overwrite => {
                            warn!(node = neighbor_id, previous_g = previous.g_value, g = g_value, "overwriting visited node");
                        }
                        ReopenPolicy::Relax if previous.g_value <= g_value => {
                            // The existing path is at least as good, do nothing
                            continue;
                        }
                        ReopenPolicy::Relax => {}
                    }
                    e.insert(NodeRecord { expanded: previous.expanded, ..record });
                    e.index()
                }
            };

            self.open_list.push(neighbor_index, g_value + h_value);
        }
        Ok(())
    }
}
