//! Certificates of elimination
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use super::{LeagueSnapshot, TeamId};

/// How a witness set was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WitnessKind {
    /// The current leader already has more wins than the team can reach
    Leader,
    /// Teams on the source side of a minimum cut
    MinCut,
}

/// Non-empty set of teams that forecloses a team's chances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    /// Members in load order
    teams: Vec<TeamId>,
    kind: WitnessKind,
}

impl Witness {
    pub fn leader(team: TeamId) -> Self {
        Self {
            teams: vec![team],
            kind: WitnessKind::Leader,
        }
    }

    /// # Panics
    /// Panics when `teams` is empty.
    pub fn from_cut(mut teams: Vec<TeamId>) -> Self {
        assert!(!teams.is_empty(), "a cut witness needs at least one team");
        teams.sort_unstable();
        teams.dedup();
        Self {
            teams,
            kind: WitnessKind::MinCut,
        }
    }

    pub fn teams(&self) -> &[TeamId] {
        &self.teams
    }

    pub fn kind(&self) -> WitnessKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn contains(&self, team: TeamId) -> bool {
        self.teams.binary_search(&team).is_ok()
    }

    /// Member names in load order
    pub fn names(&self, snapshot: &LeagueSnapshot) -> Vec<String> {
        self.teams
            .iter()
            .map(|&team| snapshot.name_of(team).to_string())
            .collect()
    }

    /// Checks the elimination inequality for `team`: the members' current
    /// wins plus the games left among themselves exceed what `|R|` copies of
    /// `team`'s best total could absorb, so some member must finish ahead.
    pub fn is_sound(&self, snapshot: &LeagueSnapshot, team: TeamId) -> bool {
        if self.teams.is_empty() || self.contains(team) {
            return false;
        }

        let wins: u64 = self.teams.iter().map(|&member| u64::from(snapshot.wins_of(member))).sum();
        let games: u64 = self
            .teams
            .iter()
            .enumerate()
            .flat_map(|(a, &first)| {
                self.teams[a + 1..]
                    .iter()
                    .map(move |&second| u64::from(snapshot.against_of(first, second)))
            })
            .sum();

        wins + games > snapshot.max_possible_wins(team) * self.teams.len() as u64
    }
}

/// Resolved answer for one team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Certificate {
    NotEliminated,
    Eliminated(Witness),
}

impl Certificate {
    pub fn is_eliminated(&self) -> bool {
        matches!(self, Certificate::Eliminated(_))
    }

    pub fn witness(&self) -> Option<&Witness> {
        match self {
            Certificate::NotEliminated => None,
            Certificate::Eliminated(witness) => Some(witness),
        }
    }
}
