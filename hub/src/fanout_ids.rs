//! Mutable set of measurement ids fanned out to the battery-demo TCP
//! bridge, published as an atomic snapshot so the runtime command parser
//! (§18) is the only writer. Mirrors [`crate::flags::FlagsHandle`] -- see
//! spec §9 "Runtime feature flags" / "Global singletons".

use std::sync::Arc;

use arc_swap::ArcSwap;
use rustc_hash::FxHashSet;

#[derive(Clone)]
pub struct FanoutIdsHandle(Arc<ArcSwap<FxHashSet<i64>>>);

impl FanoutIdsHandle {
    #[must_use]
    pub fn new(initial: &[i64]) -> Self {
        let set: FxHashSet<i64> = initial.iter().copied().collect();
        FanoutIdsHandle(Arc::new(ArcSwap::from_pointee(set)))
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<FxHashSet<i64>> {
        self.0.load_full()
    }

    pub fn add(&self, ids: &[i64]) {
        self.update(|set| {
            for id in ids {
                set.insert(*id);
            }
        });
    }

    pub fn remove(&self, ids: &[i64]) {
        self.update(|set| {
            for id in ids {
                set.remove(id);
            }
        });
    }

    fn update(&self, f: impl FnOnce(&mut FxHashSet<i64>)) {
        let mut next = (*self.snapshot()).clone();
        f(&mut next);
        self.0.store(Arc::new(next));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_are_visible_to_other_handles() {
        let handle = FanoutIdsHandle::new(&[1, 2]);
        let reader = handle.clone();
        handle.add(&[3]);
        assert!(reader.snapshot().contains(&3));

        handle.remove(&[1]);
        assert!(!reader.snapshot().contains(&1));
        assert!(reader.snapshot().contains(&2));
    }
}
