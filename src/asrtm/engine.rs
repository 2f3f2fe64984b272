//! C8 — AS-RTM: one mutex-guarded decision engine, tying the knowledge base,
//! knowledge adaptor, and a named collection of states into the lifecycle an
//! application drives every control cycle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::knowledge_base::{OperatingPoint, OpStore};
use crate::monitor::Monitor;
use crate::optimization::{Constraint, KnowledgeAdaptor, Rank, State};
use crate::types::{ComparisonKind, FieldId, Segment};

/// Where the application stands relative to the engine's proposed best.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    /// The application is not known to be running the proposed best.
    Undefined,
    /// The application has confirmed it is running the proposed best.
    Tuned,
    /// Design-space exploration is in progress; monitor-driven runtime
    /// adaptation (constraint relaxation via the knowledge adaptor) is
    /// suppressed until DSE ends.
    Dse,
    /// A knowledge base was just installed; the next `configuration_applied`
    /// leaves DSE off rather than re-entering `Tuned` directly.
    WithModel,
}

struct Inner {
    knowledge_base: OpStore,
    knowledge_adaptor: KnowledgeAdaptor,
    states: HashMap<String, State>,
    active_state: Option<String>,
    monitor_clearers: Vec<Monitor>,
    status: ApplicationStatus,
    application_configuration: Option<Arc<OperatingPoint>>,
    proposed_best: Option<Arc<OperatingPoint>>,
}

/// One application's runtime decision engine: a knowledge base of Operating
/// Points, a bank of per-field error adaptors, and a named collection of
/// states the application can switch between. Every operation locks the same
/// mutex — the engine is meant to be called from one control thread at a
/// time, with monitor pushes happening concurrently from measurement code.
pub struct AsRtm {
    config_len: usize,
    inner: Mutex<Inner>,
}

impl AsRtm {
    /// `config_len` is the number of configuration-segment fields every
    /// Operating Point this engine manages carries — needed to place metric
    /// fields after configuration fields in the knowledge adaptor's dense
    /// array.
    pub fn new(config_len: usize) -> Self {
        Self {
            config_len,
            inner: Mutex::new(Inner {
                knowledge_base: OpStore::new(),
                knowledge_adaptor: KnowledgeAdaptor::new(config_len),
                states: HashMap::new(),
                active_state: None,
                monitor_clearers: Vec::new(),
                status: ApplicationStatus::Undefined,
                application_configuration: None,
                proposed_best: None,
            }),
        }
    }

    /// Build a sibling engine: the same named states — each with the same
    /// constraints (goals, sigmas, adaptor bindings) and the same rank
    /// shape — and the same monitor registrations, but an empty knowledge
    /// base and freshly reset adaptor windows. Used by the data-aware
    /// AS-RTM so every feature cluster shares an identical
    /// optimization-problem shape; see spec §4.9/§4.10.
    pub fn sibling(&self) -> AsRtm {
        let inner = self.lock();
        let sibling = AsRtm::new(self.config_len);
        {
            let mut sibling_inner = sibling.lock();
            for (name, state) in &inner.states {
                sibling_inner
                    .states
                    .insert(name.clone(), state.empty_clone());
            }
            sibling_inner.active_state = inner.active_state.clone();
            for (field, inertia, monitor) in inner.knowledge_adaptor.registrations() {
                sibling_inner
                    .knowledge_adaptor
                    .register(field, inertia, monitor.clone());
                sibling_inner.monitor_clearers.push(monitor);
            }
        }
        sibling
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("asrtm mutex poisoned")
    }

    // -- knowledge base -----------------------------------------------------

    /// Insert every OP in `ops` whose configuration is new, cascading each
    /// into every state's constraints and rank. Returns the number actually
    /// inserted.
    pub fn add_ops(&self, ops: Vec<OperatingPoint>) -> usize {
        let mut inner = self.lock();
        let mut count = 0;
        for op in ops {
            if let Some(shared) = inner.knowledge_base.add(op) {
                for state in inner.states.values_mut() {
                    state.add_op(Arc::clone(&shared));
                }
                count += 1;
            }
        }
        count
    }

    /// Remove every OP whose configuration matches one in `configs`, cascading
    /// the removal into every state. Returns the number actually removed.
    pub fn remove_ops(&self, configs: &[Segment]) -> usize {
        let mut inner = self.lock();
        let mut count = 0;
        for configuration in configs {
            if let Some(removed) = inner.knowledge_base.remove(configuration) {
                for state in inner.states.values_mut() {
                    state.remove_op(&removed);
                }
                count += 1;
            }
        }
        count
    }

    /// Remove every OP from the knowledge base and every state.
    pub fn clear_ops(&self) {
        let mut inner = self.lock();
        let ops: Vec<Arc<OperatingPoint>> = inner.knowledge_base.enumerate().cloned().collect();
        inner.knowledge_base.clear();
        for op in &ops {
            for state in inner.states.values_mut() {
                state.remove_op(op);
            }
        }
    }

    pub fn size(&self) -> usize {
        self.lock().knowledge_base.size()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().knowledge_base.is_empty()
    }

    // -- states ---------------------------------------------------------

    /// Create a new named state, seeded with the knowledge base's current
    /// contents. The first state created becomes the active one.
    pub fn create_state(&self, name: impl Into<String>, rank: Rank) {
        let mut inner = self.lock();
        let name = name.into();
        let mut state = State::new(rank);
        for op in inner.knowledge_base.enumerate() {
            state.add_op(Arc::clone(op));
        }
        let is_first = inner.states.is_empty();
        inner.states.insert(name.clone(), state);
        if is_first {
            inner.active_state = Some(name);
        }
    }

    /// Remove a named state. Disallowed on the currently active state.
    pub fn remove_state(&self, name: &str) -> bool {
        let mut inner = self.lock();
        if inner.active_state.as_deref() == Some(name) {
            return false;
        }
        inner.states.remove(name).is_some()
    }

    /// Switch the active state. No-op (returns `false`) if `name` is not a
    /// known state.
    pub fn change_active_state(&self, name: &str) -> bool {
        let mut inner = self.lock();
        if !inner.states.contains_key(name) {
            return false;
        }
        inner.active_state = Some(name.to_string());
        true
    }

    pub fn which_active_state(&self) -> Option<String> {
        self.lock().active_state.clone()
    }

    // -- monitors / knowledge adaptor ------------------------------------

    /// Register a monitor against a field and append it to the list cleared
    /// by `configuration_applied` on a configuration change. The knowledge
    /// adaptor's "outside the band" test uses a fixed crate-wide sigma,
    /// independent of any constraint bound to the same field — see
    /// `config::defaults::ADAPTOR_BAND_SIGMA`.
    pub fn register_monitor_for_field(&self, field: FieldId, inertia: usize, monitor: Monitor) {
        let mut inner = self.lock();
        inner.knowledge_adaptor.register(field, inertia, monitor.clone());
        inner.monitor_clearers.push(monitor);
    }

    /// Clear every registered monitor's buffer.
    pub fn clear_monitors(&self) {
        let inner = self.lock();
        for monitor in &inner.monitor_clearers {
            monitor.clear();
        }
    }

    // -- constraints / rank, active state only ---------------------------

    /// Add a constraint to the active state at `priority`, bound to the
    /// knowledge adaptor (a no-op scaling if no monitor is registered for
    /// `field`).
    pub fn add_constraint(
        &self,
        priority: i64,
        field: FieldId,
        sigma: f64,
        comparator: ComparisonKind,
        goal: f64,
    ) {
        let mut inner = self.lock();
        let Some(active) = inner.active_state.clone() else {
            return;
        };
        let mut constraint = Constraint::new(field, sigma, comparator, goal);
        constraint.set_adaptor(true);
        if let Some(state) = inner.states.get_mut(&active) {
            state.add_constraint(priority, constraint);
        }
    }

    /// Remove a constraint from the active state. Returns `false` if no
    /// constraint exists at that priority or there is no active state.
    pub fn remove_constraint(&self, priority: i64) -> bool {
        let mut inner = self.lock();
        let Some(active) = inner.active_state.clone() else {
            return false;
        };
        inner
            .states
            .get_mut(&active)
            .map(|state| state.remove_constraint(priority))
            .unwrap_or(false)
    }

    /// Replace the active state's rank.
    pub fn set_rank(&self, rank: Rank) {
        let mut inner = self.lock();
        let Some(active) = inner.active_state.clone() else {
            return;
        };
        if let Some(state) = inner.states.get_mut(&active) {
            state.set_rank(rank);
        }
    }

    // -- decision lifecycle -----------------------------------------------

    /// Re-evaluate the active state and store a new proposed best. If the
    /// application is confirmed `Tuned`, the currently-applied configuration
    /// is fed to the knowledge adaptor first, so drift observed while
    /// running the old configuration informs this round's relaxation.
    pub fn find_best_configuration(&self) {
        let mut guard = self.lock();
        let Inner {
            knowledge_adaptor,
            states,
            active_state,
            application_configuration,
            proposed_best,
            status,
            ..
        } = &mut *guard;

        if *status == ApplicationStatus::Tuned {
            if let Some(applied) = application_configuration.clone() {
                knowledge_adaptor.evaluate_error(&applied);
            }
        }

        let Some(active) = active_state.clone() else {
            return;
        };
        if let Some(state) = states.get_mut(&active) {
            state.update(knowledge_adaptor);
            *proposed_best = state.solve();
        }
    }

    /// The proposed best's configuration, and whether it differs from the
    /// currently applied one. A differing configuration moves the status to
    /// `Undefined` unless DSE (or a just-installed model) is in progress —
    /// the application must confirm the switch via `configuration_applied`.
    pub fn get_best_configuration(&self) -> Option<(Segment, bool)> {
        let mut inner = self.lock();
        let best = inner.proposed_best.clone()?;
        let changed = match &inner.application_configuration {
            Some(applied) => applied.config_key() != best.config_key(),
            None => true,
        };
        if changed
            && !matches!(
                inner.status,
                ApplicationStatus::Dse | ApplicationStatus::WithModel
            )
        {
            inner.status = ApplicationStatus::Undefined;
        }
        Some((best.configuration.clone(), changed))
    }

    /// Confirm the application is now running the proposed best. Clears
    /// registered monitors if the configuration actually changed and the
    /// status was not DSE/WithModel (a configuration switch invalidates
    /// observations collected under the old one). Leaves DSE engaged if it
    /// was already engaged; otherwise settles on `Tuned`.
    pub fn configuration_applied(&self) {
        let mut inner = self.lock();
        let proposed = inner.proposed_best.clone();
        let changed = match (&proposed, &inner.application_configuration) {
            (Some(p), Some(a)) => p.config_key() != a.config_key(),
            (Some(_), None) => true,
            (None, _) => false,
        };
        if changed
            && !matches!(
                inner.status,
                ApplicationStatus::Dse | ApplicationStatus::WithModel
            )
        {
            for monitor in &inner.monitor_clearers {
                monitor.clear();
            }
        }
        inner.application_configuration = proposed;
        inner.status = match inner.status {
            ApplicationStatus::Dse => ApplicationStatus::Dse,
            _ => ApplicationStatus::Tuned,
        };
    }

    /// Revert the proposed best back to the currently applied configuration,
    /// e.g. because the application could not actually switch.
    pub fn configuration_rejected(&self) {
        let mut inner = self.lock();
        inner.proposed_best = inner.application_configuration.clone();
    }

    /// Discard the proposed best with no replacement, e.g. when `/explore`
    /// or `/model` installs a knowledge base the old proposal no longer
    /// describes.
    pub fn clear_proposed_best(&self) {
        self.lock().proposed_best = None;
    }

    // -- reading the applied configuration --------------------------------

    /// The mean value of `field` in the currently applied Operating Point,
    /// or `None` if no configuration has been applied yet.
    pub fn get_mean(&self, field: FieldId) -> Option<f64> {
        let inner = self.lock();
        let applied = inner.application_configuration.as_ref()?;
        let segment = match field.segment {
            crate::types::SegmentKind::Configuration => &applied.configuration,
            crate::types::SegmentKind::Metrics => &applied.metrics,
        };
        segment.get(field.index).map(|knob| knob.mean)
    }

    /// Alias for [`Self::get_mean`] under the name an application reaching
    /// for a single parameter's value would look for.
    pub fn get_parameter_value(&self, field: FieldId) -> Option<f64> {
        self.get_mean(field)
    }

    pub fn is_in_dse(&self) -> bool {
        self.lock().status == ApplicationStatus::Dse
    }

    pub fn status(&self) -> ApplicationStatus {
        self.lock().status
    }

    /// Enter design-space exploration: runtime adaptation via the knowledge
    /// adaptor's monitor-driven scaling is suppressed until a matching
    /// `end_dse`.
    pub fn begin_dse(&self) {
        self.lock().status = ApplicationStatus::Dse;
    }

    /// Leave design-space exploration, returning to `Undefined` so the next
    /// `get_best_configuration` forces a confirmation round-trip.
    pub fn end_dse(&self) {
        let mut inner = self.lock();
        if inner.status == ApplicationStatus::Dse {
            inner.status = ApplicationStatus::Undefined;
        }
    }

    /// Reset to `Undefined`, e.g. because a data-aware cluster switch made
    /// this engine newly active and its prior status no longer applies.
    pub fn reset_status(&self) {
        self.lock().status = ApplicationStatus::Undefined;
    }

    /// Mark that a knowledge base (or model) was just installed wholesale —
    /// see the remote-learning liaison's `/model` handling. The next
    /// `configuration_applied` settles on `Tuned` without having gone
    /// through a DSE round.
    pub fn mark_model_installed(&self) {
        self.lock().status = ApplicationStatus::WithModel;
    }
}
