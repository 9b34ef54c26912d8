//! Immutable league standings
//!
//! A `LeagueSnapshot` is assembled once from per-team records and never
//! mutated afterwards. Teams are addressed internally by their position in
//! load order; the name to index mapping is a bijection.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::EliminationError;

/// Team index in load order
pub type TeamId = usize;

/// One row of standings as handed over by a loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub remaining: u32,
    /// Remaining games against every team, in load order
    pub against: Vec<u32>,
}

impl TeamRecord {
    pub fn new(name: impl Into<String>, wins: u32, losses: u32, remaining: u32, against: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            wins,
            losses,
            remaining,
            against,
        }
    }
}

/// Read-only league state for a query session
#[derive(Debug, Clone, Serialize)]
pub struct LeagueSnapshot {
    names: Vec<String>,
    #[serde(skip)]
    ids: HashMap<String, TeamId>,
    wins: Vec<u32>,
    losses: Vec<u32>,
    remaining: Vec<u32>,
    against: Vec<Vec<u32>>,
}

impl LeagueSnapshot {
    /// Build and validate a snapshot from records in load order
    pub fn from_records(records: impl IntoIterator<Item = TeamRecord>) -> Result<Self, EliminationError> {
        records
            .into_iter()
            .fold(SnapshotBuilder::new(), SnapshotBuilder::with_team)
            .build()
    }

    pub fn team_count(&self) -> usize {
        self.names.len()
    }

    /// Team names in load order
    pub fn team_names(&self) -> &[String] {
        &self.names
    }

    /// Resolve a team name to its index
    pub fn team_id(&self, name: &str) -> Result<TeamId, EliminationError> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| EliminationError::UnknownTeam(name.to_string()))
    }

    pub fn name_of(&self, team: TeamId) -> &str {
        &self.names[team]
    }

    pub fn wins(&self, name: &str) -> Result<u32, EliminationError> {
        Ok(self.wins_of(self.team_id(name)?))
    }

    pub fn losses(&self, name: &str) -> Result<u32, EliminationError> {
        Ok(self.losses_of(self.team_id(name)?))
    }

    pub fn remaining(&self, name: &str) -> Result<u32, EliminationError> {
        Ok(self.remaining_of(self.team_id(name)?))
    }

    pub fn against(&self, first: &str, second: &str) -> Result<u32, EliminationError> {
        let first = self.team_id(first)?;
        let second = self.team_id(second)?;
        Ok(self.against_of(first, second))
    }

    #[inline]
    pub fn wins_of(&self, team: TeamId) -> u32 {
        self.wins[team]
    }

    #[inline]
    pub fn losses_of(&self, team: TeamId) -> u32 {
        self.losses[team]
    }

    #[inline]
    pub fn remaining_of(&self, team: TeamId) -> u32 {
        self.remaining[team]
    }

    #[inline]
    pub fn against_of(&self, first: TeamId, second: TeamId) -> u32 {
        self.against[first][second]
    }

    /// Most wins any team can still finish with
    pub fn max_possible_wins(&self, team: TeamId) -> u64 {
        u64::from(self.wins[team]) + u64::from(self.remaining[team])
    }

    /// Team with the most wins so far; the earliest loaded team wins ties.
    pub fn leader(&self) -> TeamId {
        let mut leader = 0;
        for (team, &wins) in self.wins.iter().enumerate().skip(1) {
            if wins > self.wins[leader] {
                leader = team;
            }
        }
        leader
    }
}

/// Collects team records and enforces the snapshot invariants once
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    records: Vec<TeamRecord>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_team(mut self, record: TeamRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn push(&mut self, record: TeamRecord) {
        self.records.push(record);
    }

    pub fn build(self) -> Result<LeagueSnapshot, EliminationError> {
        let n = self.records.len();
        if n == 0 {
            return Err(EliminationError::InvalidSnapshot("league has no teams".to_string()));
        }

        let mut ids = HashMap::with_capacity(n);
        for (team, record) in self.records.iter().enumerate() {
            if ids.insert(record.name.clone(), team).is_some() {
                return Err(EliminationError::InvalidSnapshot(format!(
                    "duplicate team name {}",
                    record.name
                )));
            }
            if record.against.len() != n {
                return Err(EliminationError::InvalidSnapshot(format!(
                    "team {} lists {} opponents, expected {}",
                    record.name,
                    record.against.len(),
                    n
                )));
            }
        }

        for (i, record) in self.records.iter().enumerate() {
            if record.against[i] != 0 {
                return Err(EliminationError::InvalidSnapshot(format!(
                    "team {} has {} games against itself",
                    record.name, record.against[i]
                )));
            }
            for (j, other) in self.records.iter().enumerate().skip(i + 1) {
                if record.against[j] != other.against[i] {
                    return Err(EliminationError::InvalidSnapshot(format!(
                        "games between {} and {} disagree: {} vs {}",
                        record.name, other.name, record.against[j], other.against[i]
                    )));
                }
            }
            let scheduled: u64 = record.against.iter().map(|&games| u64::from(games)).sum();
            if scheduled != u64::from(record.remaining) {
                return Err(EliminationError::InvalidSnapshot(format!(
                    "team {} has {} remaining games but {} scheduled",
                    record.name, record.remaining, scheduled
                )));
            }
        }

        let mut snapshot = LeagueSnapshot {
            names: Vec::with_capacity(n),
            ids,
            wins: Vec::with_capacity(n),
            losses: Vec::with_capacity(n),
            remaining: Vec::with_capacity(n),
            against: Vec::with_capacity(n),
        };
        for record in self.records {
            snapshot.names.push(record.name);
            snapshot.wins.push(record.wins);
            snapshot.losses.push(record.losses);
            snapshot.remaining.push(record.remaining);
            snapshot.against.push(record.against);
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::test_support::four_team_division;

    #[test]
    fn test_accessors_by_name() {
        let snapshot = four_team_division();

        assert_eq!(snapshot.team_count(), 4);
        assert_eq!(snapshot.team_names(), ["Atlanta", "Philadelphia", "New_York", "Montreal"]);
        assert_eq!(snapshot.wins("Atlanta").unwrap(), 83);
        assert_eq!(snapshot.losses("Philadelphia").unwrap(), 79);
        assert_eq!(snapshot.remaining("Montreal").unwrap(), 3);
        assert_eq!(snapshot.against("Atlanta", "New_York").unwrap(), 6);
        assert_eq!(snapshot.against("New_York", "Atlanta").unwrap(), 6);
        assert_eq!(snapshot.name_of(3), "Montreal");
        assert_eq!(snapshot.max_possible_wins(3), 80);
    }

    #[test]
    fn test_unknown_team_is_reported() {
        let snapshot = four_team_division();

        assert_eq!(
            snapshot.wins("Boston").unwrap_err(),
            EliminationError::UnknownTeam("Boston".to_string())
        );
        assert!(snapshot.against("Atlanta", "Boston").is_err());
        assert!(snapshot.against("", "Atlanta").is_err());
    }

    #[test]
    fn test_leader_prefers_first_loaded_on_ties() {
        let snapshot = LeagueSnapshot::from_records(vec![
            TeamRecord::new("A", 10, 0, 0, vec![0, 0, 0]),
            TeamRecord::new("B", 12, 0, 0, vec![0, 0, 0]),
            TeamRecord::new("C", 12, 0, 0, vec![0, 0, 0]),
        ])
        .unwrap();

        assert_eq!(snapshot.leader(), 1);
    }

    #[test]
    fn test_builder_push_keeps_load_order() {
        let mut builder = SnapshotBuilder::new();
        builder.push(TeamRecord::new("Detroit", 49, 86, 27, vec![0, 27]));
        builder.push(TeamRecord::new("Toronto", 60, 75, 27, vec![27, 0]));
        let snapshot = builder.build().unwrap();

        assert_eq!(snapshot.team_names(), ["Detroit", "Toronto"]);
        assert_eq!(snapshot.team_id("Detroit").unwrap(), 0);
        assert_eq!(snapshot.leader(), 1);
    }

    #[test]
    fn test_builder_rejects_empty_league() {
        assert!(matches!(
            SnapshotBuilder::new().build(),
            Err(EliminationError::InvalidSnapshot(_))
        ));
    }

    #[test]
    fn test_builder_rejects_broken_invariants() {
        let asymmetric = LeagueSnapshot::from_records(vec![
            TeamRecord::new("A", 1, 1, 2, vec![0, 2]),
            TeamRecord::new("B", 1, 1, 1, vec![1, 0]),
        ]);
        assert!(matches!(asymmetric, Err(EliminationError::InvalidSnapshot(_))));

        let self_games = LeagueSnapshot::from_records(vec![TeamRecord::new("A", 1, 1, 1, vec![1])]);
        assert!(matches!(self_games, Err(EliminationError::InvalidSnapshot(_))));

        let wrong_total = LeagueSnapshot::from_records(vec![
            TeamRecord::new("A", 1, 1, 3, vec![0, 2]),
            TeamRecord::new("B", 1, 1, 2, vec![2, 0]),
        ]);
        assert!(matches!(wrong_total, Err(EliminationError::InvalidSnapshot(_))));

        let short_row = LeagueSnapshot::from_records(vec![
            TeamRecord::new("A", 1, 1, 0, vec![0]),
            TeamRecord::new("B", 1, 1, 0, vec![0, 0]),
        ]);
        assert!(matches!(short_row, Err(EliminationError::InvalidSnapshot(_))));

        let duplicate = LeagueSnapshot::from_records(vec![
            TeamRecord::new("A", 1, 1, 0, vec![0, 0]),
            TeamRecord::new("A", 1, 1, 0, vec![0, 0]),
        ]);
        assert!(matches!(duplicate, Err(EliminationError::InvalidSnapshot(_))));
    }

    #[test]
    fn test_records_from_json() {
        let json = r#"[
            {"name": "Detroit", "wins": 49, "losses": 86, "remaining": 27, "against": [0, 27]},
            {"name": "Toronto", "wins": 60, "losses": 75, "remaining": 27, "against": [27, 0]}
        ]"#;
        let records: Vec<TeamRecord> = serde_json::from_str(json).unwrap();
        let snapshot = LeagueSnapshot::from_records(records).unwrap();

        assert_eq!(snapshot.team_id("Toronto").unwrap(), 1);
        assert_eq!(snapshot.against_of(0, 1), 27);
    }
}
