//! C4 — knowledge adaptor: a dense array of field adaptors indexed by
//! global field id.

use crate::knowledge_base::OperatingPoint;
use crate::monitor::Monitor;
use crate::types::FieldId;

use super::field_adaptor::FieldAdaptor;

/// Maps Operating Point fields to monitors and computes per-field error
/// coefficients.
#[derive(Default)]
pub struct KnowledgeAdaptor {
    slots: Vec<Option<FieldAdaptor>>,
    config_len: usize,
}

impl KnowledgeAdaptor {
    pub fn new(config_len: usize) -> Self {
        Self {
            slots: Vec::new(),
            config_len,
        }
    }

    fn ensure_len(&mut self, at_least: usize) {
        if self.slots.len() < at_least {
            self.slots.resize_with(at_least, || None);
        }
    }

    /// Emplace a field adaptor bound to `monitor`; replaces any previous
    /// binding for the same field.
    pub fn register(&mut self, field: FieldId, inertia: usize, monitor: Monitor) {
        let idx = field.global(self.config_len);
        self.ensure_len(idx + 1);
        self.slots[idx] = Some(FieldAdaptor::new(field, inertia, monitor));
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn reset_observations(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.reset_observations();
        }
    }

    pub fn get_field_adaptor(&self, field: FieldId) -> Option<&FieldAdaptor> {
        let idx = field.global(self.config_len);
        self.slots.get(idx).and_then(|s| s.as_ref())
    }

    /// Every currently-registered (field, inertia, monitor) binding, in slot
    /// order. Used to replicate a knowledge adaptor's monitor registrations
    /// onto a sibling engine without copying its accumulated coefficients.
    pub fn registrations(&self) -> impl Iterator<Item = (FieldId, usize, Monitor)> + '_ {
        self.slots
            .iter()
            .flatten()
            .map(|fa| (fa.field(), fa.inertia(), fa.monitor()))
    }

    /// Current error coefficient for `field`, or `1.0` if no adaptor is
    /// registered for it.
    pub fn coefficient(&self, field: FieldId) -> f64 {
        self.get_field_adaptor(field)
            .map(|fa| fa.coefficient())
            .unwrap_or(1.0)
    }

    /// Read every bound field's monitor against `current_op` and update
    /// each field adaptor's coefficient window.
    pub fn evaluate_error(&mut self, current_op: &OperatingPoint) {
        for slot in self.slots.iter_mut().flatten() {
            slot.observe(current_op);
        }
    }
}
