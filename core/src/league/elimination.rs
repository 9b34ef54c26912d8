//! Elimination engine
//!
//! Answers per-team elimination queries against one immutable snapshot:
//!
//! 1. a resolved certificate is returned from the cache as is;
//! 2. a team whose best possible total is below the leader's current wins is
//!    eliminated by the leader alone, without building a network;
//! 3. otherwise the elimination network is solved, and the team survives iff
//!    every remaining game among the other teams can be routed to the sink.
//!    If not, the teams on the source side of the minimum cut form the
//!    certificate.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::algorithm::{FlowError, MaxFlowSolver};

use super::{
    Certificate, CertificateCache, EliminationError, EliminationNetworkBuilder, LeagueSnapshot, TeamId,
    Witness,
};

/// Resource caps for hostile or oversized leagues
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EliminationConfig {
    /// Largest league the engine will analyse
    pub max_teams: Option<usize>,
    /// Largest flow network the engine will build
    pub max_vertices: Option<usize>,
    /// Augmenting paths allowed per flow computation
    pub max_augmentations: Option<usize>,
}

impl From<FlowError> for EliminationError {
    fn from(error: FlowError) -> Self {
        match error {
            FlowError::AugmentationLimit { limit, performed } => EliminationError::ResourceLimitExceeded {
                resource: "augmenting paths",
                limit,
                actual: performed,
            },
        }
    }
}

/// Leader-based fast path: `Some` when the current leader alone already has
/// more wins than `team` can reach. Ties for the lead go to the earliest
/// loaded team.
pub fn trivial_elimination(snapshot: &LeagueSnapshot, team: TeamId) -> Option<Witness> {
    let leader = snapshot.leader();
    (snapshot.max_possible_wins(team) < u64::from(snapshot.wins_of(leader))).then(|| Witness::leader(leader))
}

/// Outcome for one team, with names resolved for presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub team: String,
    /// Certificate members in load order, `None` when still alive
    pub eliminated_by: Option<Vec<String>>,
}

impl Verdict {
    fn new(snapshot: &LeagueSnapshot, team: TeamId, certificate: &Certificate) -> Self {
        Self {
            team: snapshot.name_of(team).to_string(),
            eliminated_by: certificate.witness().map(|witness| witness.names(snapshot)),
        }
    }

    pub fn is_eliminated(&self) -> bool {
        self.eliminated_by.is_some()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.eliminated_by {
            Some(teams) => write!(f, "{} is eliminated by the subset R = {{ {} }}", self.team, teams.join(" ")),
            None => write!(f, "{} is not eliminated", self.team),
        }
    }
}

/// Query layer owning the snapshot and its certificate cache
#[derive(Debug)]
pub struct EliminationEngine {
    snapshot: LeagueSnapshot,
    config: EliminationConfig,
    solver: MaxFlowSolver,
    cache: CertificateCache,
}

impl EliminationEngine {
    pub fn new(snapshot: LeagueSnapshot) -> Self {
        Self::with_config(snapshot, EliminationConfig::default())
    }

    pub fn with_config(snapshot: LeagueSnapshot, config: EliminationConfig) -> Self {
        let solver = MaxFlowSolver::new().with_augmentation_limit(config.max_augmentations);
        Self {
            snapshot,
            config,
            solver,
            cache: CertificateCache::new(),
        }
    }

    pub fn snapshot(&self) -> &LeagueSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &EliminationConfig {
        &self.config
    }

    /// Swap in a new snapshot, discarding every cached certificate
    pub fn reload(&mut self, snapshot: LeagueSnapshot) {
        info!("replacing league snapshot ({} teams)", snapshot.team_count());
        self.snapshot = snapshot;
        self.cache.clear();
    }

    pub fn team_count(&self) -> usize {
        self.snapshot.team_count()
    }

    pub fn team_names(&self) -> &[String] {
        self.snapshot.team_names()
    }

    pub fn wins(&self, team: &str) -> Result<u32, EliminationError> {
        self.snapshot.wins(team)
    }

    pub fn losses(&self, team: &str) -> Result<u32, EliminationError> {
        self.snapshot.losses(team)
    }

    pub fn remaining(&self, team: &str) -> Result<u32, EliminationError> {
        self.snapshot.remaining(team)
    }

    pub fn against(&self, first: &str, second: &str) -> Result<u32, EliminationError> {
        self.snapshot.against(first, second)
    }

    pub fn is_eliminated(&self, team: &str) -> Result<bool, EliminationError> {
        let team = self.snapshot.team_id(team)?;
        Ok(self.decide(team)?.is_eliminated())
    }

    /// Names of the teams proving `team` is out, `None` while it is alive
    pub fn certificate_of(&self, team: &str) -> Result<Option<Vec<String>>, EliminationError> {
        let team = self.snapshot.team_id(team)?;
        let certificate = self.decide(team)?;
        Ok(certificate.witness().map(|witness| witness.names(&self.snapshot)))
    }

    /// Resolve the certificate for `team`, computing it at most once.
    ///
    /// # Panics
    /// Panics when `team` is not a valid team index.
    pub fn decide(&self, team: TeamId) -> Result<Arc<Certificate>, EliminationError> {
        assert!(
            team < self.snapshot.team_count(),
            "team {} out of range for league of {} teams",
            team,
            self.snapshot.team_count()
        );
        self.cache.get_or_try_insert_with(team, || self.compute(team))
    }

    /// Decide every team, in parallel across teams, in load order
    pub fn evaluate_all(&self) -> Result<Vec<Verdict>, EliminationError> {
        let verdicts = (0..self.snapshot.team_count())
            .into_par_iter()
            .map(|team| {
                self.decide(team)
                    .map(|certificate| Verdict::new(&self.snapshot, team, &certificate))
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "evaluated {} teams, {} eliminated",
            verdicts.len(),
            verdicts.iter().filter(|verdict| verdict.is_eliminated()).count()
        );
        Ok(verdicts)
    }

    /// Verdicts resolved so far, in load order
    pub fn cached(&self) -> Vec<Verdict> {
        self.cache
            .resolved()
            .into_iter()
            .map(|(team, certificate)| Verdict::new(&self.snapshot, team, &certificate))
            .collect()
    }

    fn compute(&self, team: TeamId) -> Result<Certificate, EliminationError> {
        let snapshot = &self.snapshot;
        let name = snapshot.name_of(team);

        if let Some(limit) = self.config.max_teams {
            if snapshot.team_count() > limit {
                warn!("refusing {}: league has {} teams, limit {}", name, snapshot.team_count(), limit);
                return Err(EliminationError::ResourceLimitExceeded {
                    resource: "teams",
                    limit,
                    actual: snapshot.team_count(),
                });
            }
        }

        if let Some(witness) = trivial_elimination(snapshot, team) {
            debug!("{} trails leader {} outright", name, snapshot.name_of(witness.teams()[0]));
            return Ok(Certificate::Eliminated(witness));
        }

        let mut built = EliminationNetworkBuilder::new(snapshot)
            .with_vertex_limit(self.config.max_vertices)
            .build(team)
            .map_err(|error| {
                warn!("refusing {}: {}", name, error);
                error
            })?;

        let result = self
            .solver
            .solve(&mut built.network, built.source, built.sink)
            .map_err(|error| {
                warn!("flow computation for {} aborted: {}", name, error);
                EliminationError::from(error)
            })?;

        debug!(
            "{}: max flow {} of {} games after {} augmentations",
            name,
            result.max_flow,
            built.total_source_capacity(),
            result.metrics.augmentations
        );

        if result.max_flow == built.total_source_capacity() {
            return Ok(Certificate::NotEliminated);
        }

        let witness = Witness::from_cut(built.teams_on_source_side(&result));
        debug_assert!(witness.is_sound(snapshot, team), "unsound certificate for {}", name);
        Ok(Certificate::Eliminated(witness))
    }
}
