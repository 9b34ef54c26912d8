//! Maximum Flow Algorithm Implementation
//!
//! This module implements the Edmonds-Karp maximum flow algorithm: repeated
//! shortest augmenting path search by breadth-first traversal of the residual
//! graph. Once no augmenting path remains, the set of vertices reached by the
//! final (failed) search is the source side of a minimum cut.
//!
//! Capacities are integers. Callers that need an "unbounded" edge must pick a
//! finite sentinel strictly greater than any finite cut in their network.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use crate::algorithm::{Algorithm, AlgorithmError};
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::time::Instant;

/// Vertex identifier inside a flow network
pub type VertexId = usize;

/// Flow capacity type
pub type Capacity = i64;

/// Flow value type
pub type Flow = i64;

/// Flow edge representation with residual capacity tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    /// Source vertex
    pub from: VertexId,
    /// Target vertex
    pub to: VertexId,
    /// Original edge capacity (zero for residual twins)
    pub capacity: Capacity,
    /// Current flow through edge, negative on residual twins
    pub flow: Flow,
    /// Index of the paired edge in the residual graph
    pub reverse_edge_index: usize,
}

impl FlowEdge {
    /// Create new flow edge with specified capacity
    pub fn new(from: VertexId, to: VertexId, capacity: Capacity, reverse_edge_index: usize) -> Self {
        Self {
            from,
            to,
            capacity,
            flow: 0,
            reverse_edge_index,
        }
    }

    /// Get residual capacity for forward direction
    pub fn residual_capacity(&self) -> Capacity {
        self.capacity - self.flow
    }

    /// Whether the edge has no residual capacity left
    pub fn is_saturated(&self) -> bool {
        self.residual_capacity() == 0
    }
}

/// Flow network representation with residual graph
///
/// Every call to `add_edge` stores a forward edge at an even index followed
/// by its zero-capacity residual twin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowNetwork {
    /// Number of vertices in network
    vertex_count: usize,
    /// Adjacency list of edge indices, residual twins included
    adjacency: Vec<Vec<usize>>,
    /// All edges in the network
    edges: Vec<FlowEdge>,
}

impl FlowNetwork {
    /// Create new flow network with specified vertex count
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            adjacency: vec![Vec::new(); vertex_count],
            edges: Vec::new(),
        }
    }

    /// Add edge to flow network with its residual twin, returning the
    /// forward edge index.
    ///
    /// # Panics
    /// Panics when either endpoint is out of range or the capacity is
    /// negative.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, capacity: Capacity) -> usize {
        self.check_vertex(from);
        self.check_vertex(to);
        assert!(capacity >= 0, "negative capacity {} on edge {} -> {}", capacity, from, to);

        let forward_edge_index = self.edges.len();
        let reverse_edge_index = forward_edge_index + 1;

        self.adjacency[from].push(forward_edge_index);
        self.adjacency[to].push(reverse_edge_index);

        self.edges.push(FlowEdge::new(from, to, capacity, reverse_edge_index));
        self.edges.push(FlowEdge::new(to, from, 0, forward_edge_index));

        forward_edge_index
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of edges added through `add_edge`
    pub fn edge_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// Forward edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &FlowEdge> + '_ {
        self.edges.iter().step_by(2)
    }

    /// Edge by the index returned from `add_edge`
    pub fn edge(&self, index: usize) -> &FlowEdge {
        &self.edges[index]
    }

    /// Forward edges leaving `vertex`
    pub fn outgoing(&self, vertex: VertexId) -> impl Iterator<Item = &FlowEdge> + '_ {
        self.check_vertex(vertex);
        self.adjacency[vertex]
            .iter()
            .filter(|&&index| index % 2 == 0)
            .map(move |&index| &self.edges[index])
    }

    /// Sum of original capacities leaving `vertex`
    pub fn capacity_out_of(&self, vertex: VertexId) -> Capacity {
        self.outgoing(vertex).map(|edge| edge.capacity).sum()
    }

    /// Net flow leaving `vertex` over forward edges
    pub fn net_outflow(&self, vertex: VertexId) -> Flow {
        self.edges()
            .map(|edge| {
                if edge.from == vertex && edge.to != vertex {
                    edge.flow
                } else if edge.to == vertex && edge.from != vertex {
                    -edge.flow
                } else {
                    0
                }
            })
            .sum()
    }

    fn push_flow(&mut self, edge_index: usize, delta: Flow) {
        debug_assert!(delta <= self.edges[edge_index].residual_capacity());
        let reverse_index = self.edges[edge_index].reverse_edge_index;
        self.edges[edge_index].flow += delta;
        self.edges[reverse_index].flow -= delta;
    }

    fn check_vertex(&self, vertex: VertexId) {
        assert!(
            vertex < self.vertex_count,
            "vertex {} out of range for network with {} vertices",
            vertex,
            self.vertex_count
        );
    }
}

/// Outcome of one breadth-first search over the residual graph
struct ResidualSearch {
    /// Edge used to first reach each vertex
    parent_edge: Vec<Option<usize>>,
    /// Vertices reached from the source
    visited: Vec<bool>,
    visited_count: usize,
}

/// Maximum flow solver (Edmonds-Karp)
#[derive(Debug, Clone)]
pub struct MaxFlowSolver {
    /// Algorithm parameters
    parameters: HashMap<String, String>,
    /// Upper bound on augmenting paths per solve
    max_augmentations: Option<usize>,
}

impl Default for MaxFlowSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MaxFlowSolver {
    pub fn new() -> Self {
        let mut parameters = HashMap::new();
        parameters.insert("max_augmentations".to_string(), "unlimited".to_string());

        Self {
            parameters,
            max_augmentations: None,
        }
    }

    /// Solver refusing to run more than `limit` augmentations
    pub fn with_augmentation_limit(mut self, limit: Option<usize>) -> Self {
        self.max_augmentations = limit;
        let value = limit.map_or_else(|| "unlimited".to_string(), |l| l.to_string());
        self.parameters.insert("max_augmentations".to_string(), value);
        self
    }

    pub fn augmentation_limit(&self) -> Option<usize> {
        self.max_augmentations
    }

    /// Compute a maximum flow from `source` to `sink`, leaving the final flow
    /// assignment in `network`.
    ///
    /// # Panics
    /// Panics when `source` or `sink` is not a vertex of `network`.
    pub fn solve(
        &self,
        network: &mut FlowNetwork,
        source: VertexId,
        sink: VertexId,
    ) -> Result<MaxFlowResult, FlowError> {
        network.check_vertex(source);
        network.check_vertex(sink);

        let start = Instant::now();
        let mut metrics = FlowMetrics::default();

        if source == sink {
            metrics.execution_time_ms = start.elapsed().as_secs_f64() * 1000.0;
            return Ok(MaxFlowResult {
                max_flow: 0,
                in_cut: vec![true; network.vertex_count()],
                metrics,
            });
        }

        let mut max_flow: Flow = 0;

        let in_cut = loop {
            let search = Self::search_residual(network, source, sink);
            metrics.vertices_visited += search.visited_count;

            if !search.visited[sink] {
                break search.visited;
            }

            if let Some(limit) = self.max_augmentations {
                if metrics.augmentations >= limit {
                    return Err(FlowError::AugmentationLimit {
                        limit,
                        performed: metrics.augmentations,
                    });
                }
            }

            let path = Self::trace_path(&search.parent_edge, network, source, sink);
            let bottleneck = path
                .iter()
                .map(|&index| network.edges[index].residual_capacity())
                .min()
                .unwrap_or(0);

            for &index in &path {
                network.push_flow(index, bottleneck);
            }

            max_flow += bottleneck;
            metrics.augmentations += 1;
            trace!(
                "augmentation {}: {} units along {} edges, total {}",
                metrics.augmentations,
                bottleneck,
                path.len(),
                max_flow
            );
        };

        metrics.execution_time_ms = start.elapsed().as_secs_f64() * 1000.0;

        Ok(MaxFlowResult {
            max_flow,
            in_cut,
            metrics,
        })
    }

    /// Breadth-first search over edges with positive residual capacity,
    /// stopping as soon as the sink is reached.
    fn search_residual(network: &FlowNetwork, source: VertexId, sink: VertexId) -> ResidualSearch {
        let n = network.vertex_count();
        let mut parent_edge = vec![None; n];
        let mut visited = vec![false; n];
        let mut queue = VecDeque::new();

        visited[source] = true;
        let mut visited_count = 1;
        queue.push_back(source);

        'search: while let Some(vertex) = queue.pop_front() {
            for &edge_index in &network.adjacency[vertex] {
                let edge = &network.edges[edge_index];
                if visited[edge.to] || edge.residual_capacity() <= 0 {
                    continue;
                }
                visited[edge.to] = true;
                visited_count += 1;
                parent_edge[edge.to] = Some(edge_index);
                if edge.to == sink {
                    break 'search;
                }
                queue.push_back(edge.to);
            }
        }

        ResidualSearch {
            parent_edge,
            visited,
            visited_count,
        }
    }

    /// Edge indices of the augmenting path, sink back to source
    fn trace_path(
        parent_edge: &[Option<usize>],
        network: &FlowNetwork,
        source: VertexId,
        sink: VertexId,
    ) -> Vec<usize> {
        let mut path = Vec::new();
        let mut vertex = sink;
        while vertex != source {
            // Every visited vertex other than the source has a parent edge.
            let Some(edge_index) = parent_edge[vertex] else {
                unreachable!("vertex {} reached without a parent edge", vertex);
            };
            path.push(edge_index);
            vertex = network.edges[edge_index].from;
        }
        path
    }
}

/// Flow algorithm errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// Another augmenting path was found after `performed` augmentations
    #[error("Augmentation limit of {limit} paths exceeded after {performed} augmentations")]
    AugmentationLimit { limit: usize, performed: usize },
}

impl Algorithm for MaxFlowSolver {
    fn name(&self) -> &'static str {
        "Edmonds-Karp"
    }

    fn category(&self) -> &'static str {
        "max_flow"
    }

    fn description(&self) -> &'static str {
        "Maximum flow by shortest augmenting paths (BFS on the residual graph), O(V E^2), \
         with minimum cut extraction from the final residual reachability set."
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        match name {
            "max_augmentations" => {
                let limit = if value == "unlimited" {
                    None
                } else {
                    let limit = value.parse::<usize>().map_err(|_| AlgorithmError::InvalidParameter {
                        name: name.to_string(),
                        reason: "max_augmentations must be a positive integer or \"unlimited\"".to_string(),
                    })?;
                    if limit == 0 {
                        return Err(AlgorithmError::InvalidParameter {
                            name: name.to_string(),
                            reason: "max_augmentations must be > 0".to_string(),
                        });
                    }
                    Some(limit)
                };
                self.max_augmentations = limit;
                self.parameters.insert(name.to_string(), value.to_string());
                Ok(())
            }
            _ => Err(AlgorithmError::InvalidParameter {
                name: name.to_string(),
                reason: "unknown parameter".to_string(),
            }),
        }
    }

    fn get_parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(|s| s.as_str())
    }

    fn get_parameters(&self) -> HashMap<String, String> {
        self.parameters.clone()
    }
}

/// Maximum flow result with minimum cut information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxFlowResult {
    /// Maximum flow value
    pub max_flow: Flow,
    /// Residual reachability from the source, per vertex
    pub in_cut: Vec<bool>,
    /// Algorithm performance metrics
    pub metrics: FlowMetrics,
}

impl MaxFlowResult {
    /// Whether `vertex` lies on the source side of the minimum cut
    pub fn in_cut(&self, vertex: VertexId) -> bool {
        self.in_cut[vertex]
    }

    /// Source side vertices in ascending order
    pub fn source_side(&self) -> Vec<VertexId> {
        self.in_cut
            .iter()
            .enumerate()
            .filter_map(|(vertex, &reachable)| reachable.then_some(vertex))
            .collect()
    }

    /// Total original capacity of edges crossing from the source side to the
    /// sink side.
    pub fn cut_capacity(&self, network: &FlowNetwork) -> Capacity {
        network
            .edges()
            .filter(|edge| self.in_cut[edge.from] && !self.in_cut[edge.to])
            .map(|edge| edge.capacity)
            .sum()
    }
}

/// Flow algorithm performance metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowMetrics {
    /// Number of augmenting paths applied
    pub augmentations: usize,
    /// Vertices discovered across all residual searches
    pub vertices_visited: usize,
    /// Algorithm execution time
    pub execution_time_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Classic six-vertex network with maximum flow 23.
    fn textbook_network() -> FlowNetwork {
        let mut network = FlowNetwork::new(6);
        network.add_edge(0, 1, 16);
        network.add_edge(0, 2, 13);
        network.add_edge(1, 3, 12);
        network.add_edge(2, 1, 4);
        network.add_edge(2, 4, 14);
        network.add_edge(3, 2, 9);
        network.add_edge(3, 5, 20);
        network.add_edge(4, 3, 7);
        network.add_edge(4, 5, 4);
        network
    }

    #[test]
    fn test_flow_edge_creation() {
        let edge = FlowEdge::new(0, 1, 10, 1);
        assert_eq!(edge.from, 0);
        assert_eq!(edge.to, 1);
        assert_eq!(edge.capacity, 10);
        assert_eq!(edge.flow, 0);
        assert_eq!(edge.residual_capacity(), 10);
        assert!(!edge.is_saturated());
    }

    #[test]
    fn test_flow_network_creation() {
        let mut network = FlowNetwork::new(4);
        network.add_edge(0, 1, 10);
        network.add_edge(1, 2, 5);
        let index = network.add_edge(2, 3, 8);

        assert_eq!(network.vertex_count(), 4);
        assert_eq!(network.edge_count(), 3);
        assert_eq!(network.edges.len(), 6); // 3 forward + 3 residual twins
        assert_eq!(network.edge(index).capacity, 8);
        assert_eq!(network.capacity_out_of(0), 10);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_add_edge_rejects_unknown_vertex() {
        let mut network = FlowNetwork::new(2);
        network.add_edge(0, 2, 1);
    }

    #[test]
    fn test_max_flow_solver_creation() {
        let solver = MaxFlowSolver::new();
        assert_eq!(solver.name(), "Edmonds-Karp");
        assert_eq!(solver.category(), "max_flow");
        assert_eq!(solver.augmentation_limit(), None);
    }

    #[test]
    fn test_parameter_setting() {
        let mut solver = MaxFlowSolver::new();

        assert!(solver.set_parameter("max_augmentations", "50").is_ok());
        assert_eq!(solver.get_parameter("max_augmentations"), Some("50"));
        assert_eq!(solver.augmentation_limit(), Some(50));

        assert!(solver.set_parameter("max_augmentations", "unlimited").is_ok());
        assert_eq!(solver.augmentation_limit(), None);

        // Test invalid parameters
        assert!(solver.set_parameter("invalid_param", "value").is_err());
        assert!(solver.set_parameter("max_augmentations", "invalid").is_err());
        assert!(solver.set_parameter("max_augmentations", "0").is_err());
        assert_eq!(solver.get_parameter("max_augmentations"), Some("unlimited"));
    }

    #[test]
    fn test_textbook_max_flow() {
        let mut network = textbook_network();
        let result = MaxFlowSolver::new().solve(&mut network, 0, 5).unwrap();

        assert_eq!(result.max_flow, 23);
        assert_eq!(result.cut_capacity(&network), 23);
        assert!(result.in_cut(0));
        assert!(!result.in_cut(3));
        assert!(!result.in_cut(5));
        assert_eq!(network.net_outflow(0), 23);
        for vertex in 1..5 {
            assert_eq!(network.net_outflow(vertex), 0);
        }
    }

    #[test]
    fn test_diamond_with_cross_edge() {
        let mut network = FlowNetwork::new(4);
        network.add_edge(0, 1, 1);
        network.add_edge(0, 2, 1);
        network.add_edge(1, 2, 1);
        network.add_edge(1, 3, 1);
        network.add_edge(2, 3, 1);

        let result = MaxFlowSolver::new().solve(&mut network, 0, 3).unwrap();
        assert_eq!(result.max_flow, 2);
        assert_eq!(result.source_side(), vec![0]);
    }

    #[test]
    fn test_source_equals_sink() {
        let mut network = textbook_network();
        let result = MaxFlowSolver::new().solve(&mut network, 2, 2).unwrap();

        assert_eq!(result.max_flow, 0);
        assert!(result.in_cut.iter().all(|&reachable| reachable));
        assert_eq!(result.metrics.augmentations, 0);
    }

    #[test]
    fn test_disconnected_sink() {
        let mut network = FlowNetwork::new(4);
        network.add_edge(0, 1, 5);
        network.add_edge(2, 3, 5);

        let result = MaxFlowSolver::new().solve(&mut network, 0, 3).unwrap();
        assert_eq!(result.max_flow, 0);
        assert_eq!(result.source_side(), vec![0, 1]);
        assert_eq!(result.cut_capacity(&network), 0);
    }

    #[test]
    fn test_zero_capacity_edges_are_ignored() {
        let mut network = FlowNetwork::new(3);
        network.add_edge(0, 1, 0);
        network.add_edge(1, 2, 7);

        let result = MaxFlowSolver::new().solve(&mut network, 0, 2).unwrap();
        assert_eq!(result.max_flow, 0);
        assert!(!result.in_cut(1));
    }

    #[test]
    fn test_augmentation_limit() {
        let mut network = textbook_network();
        let solver = MaxFlowSolver::new().with_augmentation_limit(Some(1));

        let error = solver.solve(&mut network, 0, 5).unwrap_err();
        assert_eq!(error, FlowError::AugmentationLimit { limit: 1, performed: 1 });
        assert_eq!(solver.get_parameter("max_augmentations"), Some("1"));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_solve_rejects_unknown_sink() {
        let mut network = FlowNetwork::new(2);
        let _ = MaxFlowSolver::new().solve(&mut network, 0, 9);
    }
}
