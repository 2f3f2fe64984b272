//! C1 — the OP store: the canonical, de-duplicated set of Operating Points.

use std::collections::HashMap;
use std::sync::Arc;

use super::operating_point::{ConfigKey, OperatingPoint};
use crate::types::Segment;

/// Owns the canonical set of Operating Points, keyed by configuration.
///
/// Insertion is idempotent: inserting an OP whose configuration already
/// exists is a no-op. No ordering is defined over the stored OPs — ordering
/// is the rank's and the constraints' views' job.
#[derive(Debug, Default)]
pub struct OpStore {
    by_config: HashMap<ConfigKey, Arc<OperatingPoint>>,
}

impl OpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `op` if its configuration is new. Returns the newly shared OP,
    /// or `None` if the configuration already existed.
    pub fn add(&mut self, op: OperatingPoint) -> Option<Arc<OperatingPoint>> {
        let key = op.config_key();
        if self.by_config.contains_key(&key) {
            return None;
        }
        let shared = Arc::new(op);
        self.by_config.insert(key, Arc::clone(&shared));
        Some(shared)
    }

    /// Remove the OP with the given configuration, if present.
    pub fn remove(&mut self, configuration: &Segment) -> Option<Arc<OperatingPoint>> {
        let key = ConfigKey::from_segment(configuration);
        self.by_config.remove(&key)
    }

    pub fn get(&self, configuration: &Segment) -> Option<&Arc<OperatingPoint>> {
        let key = ConfigKey::from_segment(configuration);
        self.by_config.get(&key)
    }

    pub fn enumerate(&self) -> impl Iterator<Item = &Arc<OperatingPoint>> {
        self.by_config.values()
    }

    pub fn size(&self) -> usize {
        self.by_config.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_config.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_config.clear();
    }
}
