//! Instance registry
//!
//! The active sender keeps one [`InstanceRegistry`] for the lifetime of the
//! process: created when the reporter is built, appended to as siblings
//! register, never torn down. Entries are never removed, even if the plugin
//! behind one is unloaded later; the snapshot builder copes with entries
//! that stop answering.
//!
//! Thread safety is a property of the type: `register` and `all_registered`
//! may be called from any thread at any time.

use std::sync::{Arc, PoisonError, RwLock};

use plugmetrics_core::ports::IReporterLink;

/// Append-only, thread-safe list of registered reporter instances
#[derive(Default)]
pub struct InstanceRegistry {
    entries: RwLock<Vec<Arc<dyn IReporterLink>>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `instance`. Never fails.
    pub fn register(&self, instance: Arc<dyn IReporterLink>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(instance);
    }

    /// Snapshot of every instance registered so far, in registration order.
    ///
    /// Later registrations do not affect an already returned snapshot.
    pub fn all_registered(&self) -> RegisteredInstances {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect();
        RegisteredInstances { entries }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for InstanceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("len", &self.len())
            .finish()
    }
}

/// Point-in-time view returned by [`InstanceRegistry::all_registered`]
///
/// Cheap to clone and can be iterated any number of times.
#[derive(Clone)]
pub struct RegisteredInstances {
    entries: Arc<[Arc<dyn IReporterLink>]>,
}

impl RegisteredInstances {
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn IReporterLink>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Implementation identifiers in registration order
    pub fn implementation_ids(&self) -> Vec<String> {
        self.iter()
            .map(|entry| entry.implementation_id().to_string())
            .collect()
    }
}

impl<'a> IntoIterator for &'a RegisteredInstances {
    type Item = &'a Arc<dyn IReporterLink>;
    type IntoIter = std::slice::Iter<'a, Arc<dyn IReporterLink>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
