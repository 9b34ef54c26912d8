//! Compute-once certificate cache
//!
//! Each team owns a slot guarded by its own lock. The first caller for a
//! team computes while holding that slot; concurrent callers for the same
//! team wait and then observe the very same `Arc<Certificate>`. Queries for
//! different teams only contend on the short map lookup.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Certificate, TeamId};

type Slot = Arc<Mutex<Option<Arc<Certificate>>>>;

#[derive(Debug, Default)]
pub struct CertificateCache {
    slots: Mutex<BTreeMap<TeamId, Slot>>,
}

impl CertificateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolved certificate for `team`, if any
    pub fn get(&self, team: TeamId) -> Option<Arc<Certificate>> {
        let slot = self.slots.lock().get(&team).cloned()?;
        let entry = slot.lock();
        entry.clone()
    }

    /// Return the cached certificate for `team`, running `compute` at most
    /// once across all callers. A failed computation leaves the slot
    /// unresolved.
    pub fn get_or_try_insert_with<F, E>(&self, team: TeamId, compute: F) -> Result<Arc<Certificate>, E>
    where
        F: FnOnce() -> Result<Certificate, E>,
    {
        let slot = Arc::clone(self.slots.lock().entry(team).or_default());

        let mut entry = slot.lock();
        if let Some(certificate) = entry.as_ref() {
            return Ok(Arc::clone(certificate));
        }

        let certificate = Arc::new(compute()?);
        *entry = Some(Arc::clone(&certificate));
        Ok(certificate)
    }

    /// Resolved entries in ascending team order
    pub fn resolved(&self) -> Vec<(TeamId, Arc<Certificate>)> {
        let slots: Vec<(TeamId, Slot)> = self
            .slots
            .lock()
            .iter()
            .map(|(&team, slot)| (team, Arc::clone(slot)))
            .collect();

        slots
            .into_iter()
            .filter_map(|(team, slot)| {
                let entry = slot.lock();
                entry.as_ref().map(|certificate| (team, Arc::clone(certificate)))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resolved().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry; only valid when the snapshot is replaced.
    pub fn clear(&mut self) {
        self.slots.get_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::Witness;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_computes_once_per_team() {
        let cache = CertificateCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let certificate = cache
                .get_or_try_insert_with(1, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(Certificate::NotEliminated)
                })
                .unwrap();
            assert_eq!(*certificate, Certificate::NotEliminated);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_computation_stays_unresolved() {
        let cache = CertificateCache::new();

        let failed = cache.get_or_try_insert_with(0, || Err("limit"));
        assert_eq!(failed.unwrap_err(), "limit");
        assert!(cache.get(0).is_none());
        assert!(cache.is_empty());

        let resolved = cache
            .get_or_try_insert_with(0, || Ok::<_, &str>(Certificate::Eliminated(Witness::leader(2))))
            .unwrap();
        assert!(resolved.is_eliminated());
    }

    #[test]
    fn test_concurrent_callers_share_one_instance() {
        let cache = Arc::new(CertificateCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    cache
                        .get_or_try_insert_with(3, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(5));
                            Ok::<_, ()>(Certificate::Eliminated(Witness::from_cut(vec![0, 1])))
                        })
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<Arc<Certificate>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|c| Arc::ptr_eq(c, &results[0])));
    }

    #[test]
    fn test_resolved_order_and_clear() {
        let mut cache = CertificateCache::new();
        for team in [2, 0, 1] {
            cache
                .get_or_try_insert_with(team, || Ok::<_, ()>(Certificate::NotEliminated))
                .unwrap();
        }

        let teams: Vec<TeamId> = cache.resolved().into_iter().map(|(team, _)| team).collect();
        assert_eq!(teams, vec![0, 1, 2]);

        cache.clear();
        assert!(cache.is_empty());
    }
}
