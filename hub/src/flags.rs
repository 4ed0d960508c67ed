//! Runtime feature flags, published as an atomic snapshot. See spec §9
//! "Runtime feature flags".
//!
//! The original mutated module-level globals (`DB_STORAGE_CHECK`, etc.)
//! directly from its stdin command parser; every other module read them
//! directly too. Here the command parser is the only writer, publishing a
//! new [`FeatureFlags`] snapshot into an `ArcSwap`, and every reader takes
//! an immutable point-in-time copy via [`FlagsHandle::snapshot`].

use std::sync::Arc;

use arc_swap::ArcSwap;

#[derive(Debug, Clone, Copy)]
pub struct FeatureFlags {
    pub db_storage_on: bool,
    pub iotticket_send_on: bool,
    pub battery_demo_on: bool,
}

impl FeatureFlags {
    #[must_use]
    pub fn from_config(config: &crate::config::Config) -> Self {
        FeatureFlags {
            db_storage_on: config.db_storage_on,
            iotticket_send_on: config.iotticket_send_on,
            battery_demo_on: config.battery_demo_on,
        }
    }
}

#[derive(Clone)]
pub struct FlagsHandle(Arc<ArcSwap<FeatureFlags>>);

impl FlagsHandle {
    #[must_use]
    pub fn new(initial: FeatureFlags) -> Self {
        FlagsHandle(Arc::new(ArcSwap::from_pointee(initial)))
    }

    #[must_use]
    pub fn snapshot(&self) -> FeatureFlags {
        **self.0.load()
    }

    pub fn set_db_storage(&self, on: bool) {
        self.update(|f| f.db_storage_on = on);
    }

    pub fn set_iotticket_send(&self, on: bool) {
        self.update(|f| f.iotticket_send_on = on);
    }

    pub fn set_battery_demo(&self, on: bool) {
        self.update(|f| f.battery_demo_on = on);
    }

    fn update(&self, f: impl FnOnce(&mut FeatureFlags)) {
        let mut next = self.snapshot();
        f(&mut next);
        self.0.store(Arc::new(next));
    }
}
