//! Process-wide link table
//!
//! Maps an implementation identifier to the reporter instance published
//! under it. This is the only way sibling instances find each other: a
//! follower reads the leader's identifier from the marker file and resolves
//! it here.
//!
//! Entries are held weakly. An identifier whose instance has been dropped
//! no longer resolves, which is how a marker left behind by a removed plugin
//! is recognised as stale.
//!
//! ## Lifecycle
//!
//! [`LinkTable::process_wide`] is created on first use and lives until the
//! process exits. Hosts that want isolation (tests, simulators) build their
//! own table and inject it through `ReporterBuilder::link_table`.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, Weak};

use plugmetrics_core::ports::IReporterLink;
use tracing::debug;

static PROCESS_WIDE: OnceLock<Arc<LinkTable>> = OnceLock::new();

/// Name-addressed lookup of live reporter instances
#[derive(Default)]
pub struct LinkTable {
    links: RwLock<HashMap<String, Weak<dyn IReporterLink>>>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table shared by every reporter in this process.
    pub fn process_wide() -> Arc<LinkTable> {
        Arc::clone(PROCESS_WIDE.get_or_init(|| Arc::new(LinkTable::new())))
    }

    /// Publishes `instance` under its implementation identifier.
    ///
    /// Publishing an identifier again replaces the previous entry.
    pub fn publish(&self, instance: &Arc<dyn IReporterLink>) {
        let id = instance.implementation_id().to_string();
        debug!(implementation_id = %id, "Publishing reporter link");
        self.links
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::downgrade(instance));
    }

    /// Resolves `implementation_id` to a live instance.
    pub fn resolve(&self, implementation_id: &str) -> Option<Arc<dyn IReporterLink>> {
        self.links
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(implementation_id)
            .and_then(Weak::upgrade)
    }

    /// Identifiers of instances that are still alive, sorted.
    pub fn live_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .links
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, link)| link.strong_count() > 0)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}
