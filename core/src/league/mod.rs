//! League elimination analysis
//!
//! Decides whether a team can still finish with at least as many wins as
//! every other team, reducing the question to a maximum flow problem and
//! reading a certificate of elimination off the minimum cut.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod snapshot;
pub mod network;
pub mod certificate;
pub mod cache;
pub mod elimination;

pub use self::cache::CertificateCache;
pub use self::certificate::{Certificate, Witness, WitnessKind};
pub use self::elimination::{trivial_elimination, EliminationConfig, EliminationEngine, Verdict};
pub use self::network::{EliminationNetwork, EliminationNetworkBuilder};
pub use self::snapshot::{LeagueSnapshot, SnapshotBuilder, TeamId, TeamRecord};

/// Errors surfaced by league queries
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EliminationError {
    /// Query named a team that is not part of the league
    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    /// Records handed to the snapshot builder break the league invariants
    #[error("Invalid league snapshot: {0}")]
    InvalidSnapshot(String),

    /// A configured size cap rejected the query. `actual` is the size that
    /// was measured when the cap tripped.
    #[error("Resource limit exceeded: {resource} reached {actual}, limit {limit}")]
    ResourceLimitExceeded {
        resource: &'static str,
        limit: usize,
        actual: usize,
    },
}
