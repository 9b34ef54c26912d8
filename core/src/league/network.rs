//! Flow network encoding one elimination query
//!
//! Vertex layout for a query team `t` with `m` other teams:
//!
//! ```text
//! 0              source
//! 1 ..= m        one vertex per other team, in load order
//! m + 1 ..       one vertex per unordered pair of other teams
//! last           sink
//! ```
//!
//! Source edges carry the games left between a pair, team edges to the sink
//! carry how many more wins that team can take without passing the query
//! team's best possible total. Game to team edges are "unbounded", modelled
//! as a finite sentinel one larger than the sum of every finite capacity so
//! no minimum cut can ever cross them.

use log::debug;

use crate::algorithm::{Capacity, FlowNetwork, MaxFlowResult, VertexId};

use super::{EliminationError, LeagueSnapshot, TeamId};

/// Network instance together with the bookkeeping needed to read it back
#[derive(Debug, Clone)]
pub struct EliminationNetwork {
    pub network: FlowNetwork,
    pub source: VertexId,
    pub sink: VertexId,
    query: TeamId,
    /// Team vertex per team index, `None` for the query team
    team_vertices: Vec<Option<VertexId>>,
    game_count: usize,
    total_source_capacity: Capacity,
    unbounded_capacity: Capacity,
}

impl EliminationNetwork {
    pub fn query_team(&self) -> TeamId {
        self.query
    }

    pub fn team_vertex(&self, team: TeamId) -> Option<VertexId> {
        self.team_vertices[team]
    }

    pub fn game_count(&self) -> usize {
        self.game_count
    }

    /// Games left among the other teams
    pub fn total_source_capacity(&self) -> Capacity {
        self.total_source_capacity
    }

    pub fn unbounded_capacity(&self) -> Capacity {
        self.unbounded_capacity
    }

    /// Other teams whose vertex lies on the source side of the cut, in load
    /// order.
    pub fn teams_on_source_side(&self, result: &MaxFlowResult) -> Vec<TeamId> {
        self.team_vertices
            .iter()
            .enumerate()
            .filter_map(|(team, &vertex)| vertex.filter(|&v| result.in_cut(v)).map(|_| team))
            .collect()
    }
}

/// Builds the elimination network for a query team
#[derive(Debug, Clone)]
pub struct EliminationNetworkBuilder<'a> {
    snapshot: &'a LeagueSnapshot,
    max_vertices: Option<usize>,
}

impl<'a> EliminationNetworkBuilder<'a> {
    pub fn new(snapshot: &'a LeagueSnapshot) -> Self {
        Self {
            snapshot,
            max_vertices: None,
        }
    }

    pub fn with_vertex_limit(mut self, limit: Option<usize>) -> Self {
        self.max_vertices = limit;
        self
    }

    /// Vertices needed for a league of `team_count` teams
    pub fn vertex_count_for(team_count: usize) -> usize {
        let others = team_count.saturating_sub(1);
        2 + others + others * others.saturating_sub(1) / 2
    }

    pub fn build(&self, query: TeamId) -> Result<EliminationNetwork, EliminationError> {
        let snapshot = self.snapshot;
        let n = snapshot.team_count();
        assert!(query < n, "team {} out of range for league of {} teams", query, n);

        let vertex_count = Self::vertex_count_for(n);
        if let Some(limit) = self.max_vertices {
            if vertex_count > limit {
                return Err(EliminationError::ResourceLimitExceeded {
                    resource: "network vertices",
                    limit,
                    actual: vertex_count,
                });
            }
        }

        let others: Vec<TeamId> = (0..n).filter(|&team| team != query).collect();
        let m = others.len();
        let game_count = m * m.saturating_sub(1) / 2;
        let source = 0;
        let sink = vertex_count - 1;

        let mut team_vertices = vec![None; n];
        for (offset, &team) in others.iter().enumerate() {
            team_vertices[team] = Some(1 + offset);
        }

        let ceiling = snapshot.max_possible_wins(query) as Capacity;
        let headroom: Vec<Capacity> = others
            .iter()
            .map(|&team| (ceiling - Capacity::from(snapshot.wins_of(team))).max(0))
            .collect();

        let mut pairs = Vec::with_capacity(game_count);
        for (a, &first) in others.iter().enumerate() {
            for &second in &others[a + 1..] {
                pairs.push((first, second, Capacity::from(snapshot.against_of(first, second))));
            }
        }

        let total_source_capacity: Capacity = pairs.iter().map(|&(_, _, games)| games).sum();
        let unbounded_capacity = total_source_capacity + headroom.iter().sum::<Capacity>() + 1;

        let mut network = FlowNetwork::new(vertex_count);
        for (offset, &capacity) in headroom.iter().enumerate() {
            network.add_edge(1 + offset, sink, capacity);
        }
        for (index, &(first, second, games)) in pairs.iter().enumerate() {
            let game = 1 + m + index;
            network.add_edge(source, game, games);
            for team in [first, second] {
                if let Some(vertex) = team_vertices[team] {
                    network.add_edge(game, vertex, unbounded_capacity);
                }
            }
        }

        debug!(
            "built elimination network for {}: {} vertices, {} edges, {} games left",
            snapshot.name_of(query),
            vertex_count,
            network.edge_count(),
            total_source_capacity
        );

        Ok(EliminationNetwork {
            network,
            source,
            sink,
            query,
            team_vertices,
            game_count,
            total_source_capacity,
            unbounded_capacity,
        })
    }
}
