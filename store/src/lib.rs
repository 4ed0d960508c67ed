//! Bounded, per-id latest-value store.
//!
//! Holds, for every measurement id, a timestamp-ordered history capped at a
//! configurable length. Used for the latest-value query path (spec §4.9)
//! and for the downstream TCP fan-out demo.
//!
//! The original Python implementation (`utils/datastorage.py`) hand-rolled a
//! reader lock and a writer lock around a plain `dict`/`list`; that pairing
//! is exactly what [`std::sync::RwLock`] already gives a single Rust type,
//! so the port collapses the two locks into one `RwLock` over the map,
//! preserving the invariant that concurrent readers never block each other
//! and a writer sees no readers in progress. Per-id limit overrides live in
//! a second, independent `RwLock` since they change far less often than the
//! data itself.

use std::sync::RwLock;

use procem_wire::Value;
use rustc_hash::FxHashMap;

/// One stored (value, timestamp) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueTs {
    pub v: Value,
    pub ts: i64,
}

/// Thread-safe collection of bounded, timestamp-ordered per-id histories.
pub struct Store {
    default_limit: usize,
    data: RwLock<FxHashMap<i64, Vec<ValueTs>>>,
    limits: RwLock<FxHashMap<i64, usize>>,
}

impl Store {
    /// Creates a store whose per-id cap defaults to `default_limit`.
    #[must_use]
    pub fn new(default_limit: usize) -> Self {
        Store {
            default_limit: default_limit.max(1),
            data: RwLock::new(FxHashMap::default()),
            limits: RwLock::new(FxHashMap::default()),
        }
    }

    /// Overrides the cap for one id, trimming its existing history to the
    /// new limit immediately if it is now over it.
    pub fn set_id_limit(&self, id: i64, limit: usize) {
        let limit = limit.max(1);
        self.limits.write().unwrap().insert(id, limit);

        let mut data = self.data.write().unwrap();
        if let Some(entries) = data.get_mut(&id) {
            if entries.len() > limit {
                let excess = entries.len() - limit;
                entries.drain(0..excess);
            }
        }
    }

    fn limit_for(&self, id: i64) -> usize {
        self.limits
            .read()
            .unwrap()
            .get(&id)
            .copied()
            .unwrap_or(self.default_limit)
    }

    /// Inserts or overwrites a (value, timestamp) pair for `id`.
    ///
    /// A duplicate `(value, timestamp)` pair already present is a no-op. A
    /// new timestamp matching an existing entry overwrites that entry's
    /// value in place. Otherwise the pair is inserted in timestamp order
    /// and the oldest entries are evicted once the cap is exceeded.
    pub fn add_value(&self, id: i64, v: Value, ts: i64) {
        let limit = self.limit_for(id);
        let mut data = self.data.write().unwrap();
        let entries = data.entry(id).or_default();

        match entries.binary_search_by_key(&ts, |e| e.ts) {
            Ok(idx) => {
                if entries[idx].v != v {
                    entries[idx] = ValueTs { v, ts };
                }
            }
            Err(idx) => {
                entries.insert(idx, ValueTs { v, ts });
                if entries.len() > limit {
                    let excess = entries.len() - limit;
                    entries.drain(0..excess);
                }
            }
        }
    }

    /// Returns every id currently tracked, sorted ascending.
    #[must_use]
    pub fn get_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.data.read().unwrap().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns a snapshot of the most recent value for `id`, if any.
    #[must_use]
    pub fn get_value(&self, id: i64) -> Option<ValueTs> {
        self.get_values(id, Some(1)).and_then(|v| v.last().copied())
    }

    /// Returns a snapshot of up to `max_values` most recent entries for
    /// `id`, oldest first. `None` means "return everything stored".
    #[must_use]
    pub fn get_values(&self, id: i64, max_values: Option<usize>) -> Option<Vec<ValueTs>> {
        let data = self.data.read().unwrap();
        let entries = data.get(&id)?;
        match max_values {
            None => Some(entries.clone()),
            Some(n) => {
                let start = entries.len().saturating_sub(n);
                Some(entries[start..].to_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_id_is_inserted() {
        let store = Store::new(10);
        store.add_value(1, Value::Double(1.0), 100);
        assert_eq!(
            store.get_value(1),
            Some(ValueTs {
                v: Value::Double(1.0),
                ts: 100
            })
        );
    }

    #[test]
    fn duplicate_value_and_timestamp_is_not_reinserted() {
        let store = Store::new(10);
        store.add_value(1, Value::Long(5), 100);
        store.add_value(1, Value::Long(5), 100);
        assert_eq!(store.get_values(1, None).unwrap().len(), 1);
    }

    #[test]
    fn existing_timestamp_overwrites_value() {
        let store = Store::new(10);
        store.add_value(1, Value::Long(5), 100);
        store.add_value(1, Value::Long(9), 100);
        let values = store.get_values(1, None).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].v, Value::Long(9));
    }

    #[test]
    fn late_arrival_is_inserted_in_order() {
        let store = Store::new(10);
        store.add_value(1, Value::Long(1), 200);
        store.add_value(1, Value::Long(2), 100);
        let values = store.get_values(1, None).unwrap();
        assert_eq!(values.iter().map(|v| v.ts).collect::<Vec<_>>(), vec![100, 200]);
    }

    #[test]
    fn cap_evicts_oldest() {
        let store = Store::new(3);
        for ts in 0..10 {
            store.add_value(1, Value::Long(ts), ts);
        }
        let values = store.get_values(1, None).unwrap();
        assert_eq!(values.iter().map(|v| v.ts).collect::<Vec<_>>(), vec![7, 8, 9]);
    }

    #[test]
    fn per_id_limit_override_trims_immediately() {
        let store = Store::new(100);
        for ts in 0..10 {
            store.add_value(1, Value::Long(ts), ts);
        }
        store.set_id_limit(1, 2);
        let values = store.get_values(1, None).unwrap();
        assert_eq!(values.iter().map(|v| v.ts).collect::<Vec<_>>(), vec![8, 9]);
    }

    #[test]
    fn get_values_respects_max() {
        let store = Store::new(100);
        for ts in 0..5 {
            store.add_value(1, Value::Long(ts), ts);
        }
        let values = store.get_values(1, Some(2)).unwrap();
        assert_eq!(values.iter().map(|v| v.ts).collect::<Vec<_>>(), vec![3, 4]);
    }

    #[test]
    fn unknown_id_returns_none() {
        let store = Store::new(10);
        assert_eq!(store.get_value(42), None);
        assert_eq!(store.get_values(42, None), None);
    }

    #[test]
    fn get_ids_is_sorted() {
        let store = Store::new(10);
        store.add_value(5, Value::Long(1), 1);
        store.add_value(1, Value::Long(1), 1);
        store.add_value(3, Value::Long(1), 1);
        assert_eq!(store.get_ids(), vec![1, 3, 5]);
    }
}
