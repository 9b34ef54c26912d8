//! PENNANT core - league elimination analysis
//!
//! Decides, for a snapshot of league standings, whether each team can still
//! finish with at least as many wins as every other team. The question is
//! reduced to a maximum flow problem; when a team is out, the minimum cut
//! yields a certificate naming the teams that block it.
//!
//! ```no_run
//! use pennant_core::league::{EliminationEngine, LeagueSnapshot, TeamRecord};
//!
//! let snapshot = LeagueSnapshot::from_records(vec![
//!     TeamRecord::new("Atlanta", 83, 71, 1, vec![0, 1]),
//!     TeamRecord::new("Montreal", 77, 82, 1, vec![1, 0]),
//! ])?;
//! let engine = EliminationEngine::new(snapshot);
//! for verdict in engine.evaluate_all()? {
//!     println!("{}", verdict);
//! }
//! # Ok::<(), pennant_core::league::EliminationError>(())
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod league;

pub use crate::league::{Certificate, EliminationEngine, EliminationError, LeagueSnapshot};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
