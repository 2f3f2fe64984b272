//! C9 — data-aware AS-RTM: a named, insertion-ordered collection of engines,
//! one per feature cluster, with the currently active one selected by
//! runtime feature vector.
//!
//! State management, constraints, rank, and monitor registration are
//! broadcast to *every* cluster so the optimization-problem shape stays
//! identical across them — only the knowledge base (and hence what each
//! cluster's `solve()` actually returns) differs per cluster. `Rank` is not
//! `Clone` (it owns a per-cluster scored set), so broadcasting it takes a
//! factory closure invoked once per cluster rather than one shared value.
//! `get_best_configuration`, `get_mean`, `configuration_applied`, and
//! `configuration_rejected` target only the active cluster.

use std::collections::HashMap;

use crate::knowledge_base::OperatingPoint;
use crate::monitor::Monitor;
use crate::types::{ClusterComparisonKind, ComparisonKind, FieldId, Segment};

use super::cluster_key::{ClusterAxis, ClusterKey};
use super::engine::AsRtm;
use crate::optimization::Rank;

pub struct DataAwareAsRtm {
    config_len: usize,
    clusters: HashMap<String, (ClusterKey, AsRtm)>,
    order: Vec<String>,
    active: Option<String>,
    normalize_distance: bool,
}

impl DataAwareAsRtm {
    pub fn new(config_len: usize) -> Self {
        Self {
            config_len,
            clusters: HashMap::new(),
            order: Vec::new(),
            active: None,
            normalize_distance: crate::config::get().normalize_cluster_distance,
        }
    }

    /// Add a cluster keyed by `key`. Inserting under a name already present
    /// replaces that cluster's key, keeping its engine and insertion-order
    /// position. The first cluster ever added becomes active; every later
    /// cluster is built as a sibling of the first one, so every cluster
    /// shares the same named states, constraints, rank, and monitor
    /// registrations — only their knowledge bases differ, as the broadcast
    /// methods below assume.
    pub fn add_cluster(&mut self, name: impl Into<String>, key: ClusterKey) {
        let name = name.into();
        if let Some(entry) = self.clusters.get_mut(&name) {
            entry.0 = key;
            return;
        }
        let engine = match self.order.first() {
            Some(first_name) => self.clusters[first_name].1.sibling(),
            None => AsRtm::new(self.config_len),
        };
        self.order.push(name.clone());
        self.clusters.insert(name.clone(), (key, engine));
        if self.active.is_none() {
            self.active = Some(name);
        }
    }

    /// Remove a cluster. Disallowed (returns `false`) on the currently
    /// active cluster.
    pub fn remove_cluster(&mut self, name: &str) -> bool {
        if self.active.as_deref() == Some(name) {
            return false;
        }
        if self.clusters.remove(name).is_some() {
            self.order.retain(|n| n != name);
            true
        } else {
            false
        }
    }

    /// Switch to the cluster whose key is valid for `features` and closest
    /// to it by Euclidean distance. If no cluster's key is valid, falls back
    /// to the closest cluster overall — a runtime feature vector never
    /// leaves the data-aware engine without an active cluster. Ties (within
    /// either tier) break toward whichever cluster was inserted first.
    /// Clusters whose key dimensionality doesn't match `features` take no
    /// part in either tier. Returns the newly (or still) active cluster's
    /// name, or `None` only when every cluster's key has a different
    /// dimensionality than `features`. A cluster switch resets the newly
    /// active engine's application status — its previously
    /// proposed/applied configuration belonged to a different feature
    /// region.
    pub fn select_cluster(&mut self, features: &[f64]) -> Option<String> {
        let mut best_valid: Option<(String, f64)> = None;
        let mut best_any: Option<(String, f64)> = None;
        for name in &self.order {
            let (key, _) = &self.clusters[name];
            if key.len() != features.len() {
                continue;
            }
            let distance = key.distance(features, self.normalize_distance);
            if best_any.as_ref().map_or(true, |(_, d)| distance < *d) {
                best_any = Some((name.clone(), distance));
            }
            if key.is_valid(features) && best_valid.as_ref().map_or(true, |(_, d)| distance < *d) {
                best_valid = Some((name.clone(), distance));
            }
        }
        let chosen = best_valid.or(best_any).map(|(name, _)| name)?;
        if self.active.as_deref() != Some(chosen.as_str()) {
            self.active = Some(chosen.clone());
            if let Some((_, engine)) = self.clusters.get(&chosen) {
                engine.reset_status();
            }
        }
        Some(chosen)
    }

    pub fn which_active_cluster(&self) -> Option<String> {
        self.active.clone()
    }

    pub fn cluster_engine(&self, name: &str) -> Option<&AsRtm> {
        self.clusters.get(name).map(|(_, engine)| engine)
    }

    pub fn active_engine(&self) -> Option<&AsRtm> {
        let name = self.active.as_ref()?;
        self.cluster_engine(name)
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    fn engines(&self) -> impl Iterator<Item = &AsRtm> {
        self.order.iter().map(move |name| &self.clusters[name].1)
    }

    /// Install a wholly new clustered knowledge base: every existing
    /// cluster is discarded and replaced by one cluster per feature key,
    /// each built as a sibling of the engine that was active beforehand (so
    /// every new cluster shares its named states, constraints, rank, and
    /// monitor registrations) and populated with its OPs. The wire payload
    /// carries no axis data, so every inserted cluster gets a don't-care
    /// key of the same dimensionality the previous clusters used — every
    /// cluster is valid for any runtime feature vector of that length until
    /// a later `add_cluster` supplies real axes. The first feature key
    /// becomes the active cluster; the next `select_cluster` re-chooses
    /// among them by distance, which with every key don't-care ties toward
    /// that same first-inserted cluster.
    pub fn install_model(&mut self, clusters: Vec<(String, Vec<OperatingPoint>)>) {
        let template = match self.active_engine() {
            Some(engine) => engine.sibling(),
            None => AsRtm::new(self.config_len),
        };
        let axis_count = self
            .active
            .as_ref()
            .map(|name| self.clusters[name].0.len())
            .unwrap_or(0);

        self.clusters.clear();
        self.order.clear();
        self.active = None;

        for (feature_key, ops) in clusters {
            let engine = template.sibling();
            engine.add_ops(ops);
            engine.mark_model_installed();
            let key = ClusterKey::new(
                (0..axis_count)
                    .map(|_| ClusterAxis::new(0.0, ClusterComparisonKind::DontCare))
                    .collect(),
            );
            self.order.push(feature_key.clone());
            self.clusters.insert(feature_key.clone(), (key, engine));
            if self.active.is_none() {
                self.active = Some(feature_key);
            }
        }
    }

    // -- broadcast to every cluster ---------------------------------------

    /// Insert `ops` into every cluster's knowledge base. Returns the count
    /// actually inserted into the active cluster, representative of what
    /// the caller would see solving right now.
    pub fn add_ops(&self, ops: Vec<OperatingPoint>) -> usize {
        let mut active_count = 0;
        for (name, engine) in self.order.iter().map(|n| (n.as_str(), &self.clusters[n].1)) {
            let count = engine.add_ops(ops.clone());
            if Some(name) == self.active.as_deref() {
                active_count = count;
            }
        }
        active_count
    }

    /// Remove OPs matching `configs` from every cluster's knowledge base.
    /// Returns the count actually removed from the active cluster.
    pub fn remove_ops(&self, configs: &[Segment]) -> usize {
        let mut active_count = 0;
        for (name, engine) in self.order.iter().map(|n| (n.as_str(), &self.clusters[n].1)) {
            let count = engine.remove_ops(configs);
            if Some(name) == self.active.as_deref() {
                active_count = count;
            }
        }
        active_count
    }

    /// Clear every cluster's knowledge base.
    pub fn clear_ops(&self) {
        for engine in self.engines() {
            engine.clear_ops();
        }
    }

    /// Create a state under `name` in every cluster, building each
    /// cluster's rank fresh from `rank_factory` so no two clusters share
    /// the same `Rank`'s internal scored set.
    pub fn create_state(&self, name: impl Into<String>, rank_factory: impl Fn() -> Rank) {
        let name = name.into();
        for engine in self.engines() {
            engine.create_state(name.clone(), rank_factory());
        }
    }

    /// Remove a state from every cluster. Disallowed (per cluster) on that
    /// cluster's active state; returns whether at least one cluster removed
    /// it.
    pub fn remove_state(&self, name: &str) -> bool {
        self.engines()
            .map(|engine| engine.remove_state(name))
            .fold(false, |acc, removed| acc || removed)
    }

    pub fn change_active_state(&self, name: &str) {
        for engine in self.engines() {
            engine.change_active_state(name);
        }
    }

    pub fn add_constraint(
        &self,
        priority: i64,
        field: FieldId,
        sigma: f64,
        comparator: ComparisonKind,
        goal: f64,
    ) {
        for engine in self.engines() {
            engine.add_constraint(priority, field, sigma, comparator, goal);
        }
    }

    pub fn remove_constraint(&self, priority: i64) -> bool {
        self.engines()
            .map(|engine| engine.remove_constraint(priority))
            .fold(false, |acc, removed| acc || removed)
    }

    /// Replace the rank in every cluster's active state, built fresh per
    /// cluster from `rank_factory`.
    pub fn set_rank(&self, rank_factory: impl Fn() -> Rank) {
        for engine in self.engines() {
            engine.set_rank(rank_factory());
        }
    }

    /// Register a monitor against a field in every cluster's knowledge
    /// adaptor. The same monitor handle is shared across clusters — it is
    /// the same underlying runtime measurement, just read by whichever
    /// cluster's adaptor happens to be active.
    pub fn register_monitor_for_field(&self, field: FieldId, inertia: usize, monitor: Monitor) {
        for engine in self.engines() {
            engine.register_monitor_for_field(field, inertia, monitor.clone());
        }
    }

    pub fn clear_monitors(&self) {
        for engine in self.engines() {
            engine.clear_monitors();
        }
    }

    // -- active cluster only ----------------------------------------------

    pub fn find_best_configuration(&self) {
        if let Some(engine) = self.active_engine() {
            engine.find_best_configuration();
        }
    }

    pub fn get_best_configuration(&self) -> Option<(Segment, bool)> {
        self.active_engine().and_then(|e| e.get_best_configuration())
    }

    pub fn configuration_applied(&self) {
        if let Some(engine) = self.active_engine() {
            engine.configuration_applied();
        }
    }

    pub fn configuration_rejected(&self) {
        if let Some(engine) = self.active_engine() {
            engine.configuration_rejected();
        }
    }

    pub fn get_mean(&self, field: FieldId) -> Option<f64> {
        self.active_engine().and_then(|e| e.get_mean(field))
    }
}
