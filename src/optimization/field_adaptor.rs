//! Field adaptor: one field's bridge between a monitor and an error
//! coefficient, and C4's dense array of them.

use std::collections::VecDeque;

use crate::config::defaults::ADAPTOR_BAND_SIGMA;
use crate::knowledge_base::OperatingPoint;
use crate::monitor::Monitor;
use crate::types::{FieldId, SegmentKind};

/// One field's binding to a monitor plus the short window of previously
/// computed per-observation error coefficients.
pub struct FieldAdaptor {
    field: FieldId,
    monitor: Monitor,
    inertia: usize,
    coefficients: VecDeque<f64>,
}

impl FieldAdaptor {
    pub fn new(field: FieldId, inertia: usize, monitor: Monitor) -> Self {
        debug_assert!(inertia > 0, "inertia must be non-zero");
        Self {
            field,
            monitor,
            inertia: inertia.max(1),
            coefficients: VecDeque::with_capacity(inertia.max(1)),
        }
    }

    pub fn field(&self) -> FieldId {
        self.field
    }

    pub fn inertia(&self) -> usize {
        self.inertia
    }

    /// The monitor this adaptor reads from. Cheap to call — `Monitor` is an
    /// `Arc`-backed handle.
    pub fn monitor(&self) -> Monitor {
        self.monitor.clone()
    }

    /// Current error coefficient: the arithmetic mean of the coefficient
    /// window, defaulting to `1.0` when empty.
    pub fn coefficient(&self) -> f64 {
        if self.coefficients.is_empty() {
            return 1.0;
        }
        self.coefficients.iter().sum::<f64>() / self.coefficients.len() as f64
    }

    pub fn reset_observations(&mut self) {
        self.coefficients.clear();
    }

    fn push_coefficient(&mut self, value: f64) {
        if self.coefficients.len() == self.inertia {
            self.coefficients.pop_front();
        }
        self.coefficients.push_back(value);
    }

    /// Read the monitor's current reading and, if it lies outside the OP's
    /// expected `mean ± band_sigma * stddev`, push `expected / observed`
    /// into the coefficient window; otherwise push `1.0`. Contributes
    /// nothing (transient monitor absence) if the monitor has no reading or
    /// the reading is zero (would divide by zero).
    pub fn observe(&mut self, op: &OperatingPoint) {
        let Some(observed) = self.monitor.last() else {
            return;
        };
        if observed == 0.0 {
            return;
        }
        let segment = match self.field.segment {
            SegmentKind::Configuration => &op.configuration,
            SegmentKind::Metrics => &op.metrics,
        };
        let expected = &segment[self.field.index];
        let lower = expected.lower_bound(ADAPTOR_BAND_SIGMA);
        let upper = expected.upper_bound(ADAPTOR_BAND_SIGMA);
        let coefficient = if observed < lower || observed > upper {
            expected.mean / observed
        } else {
            1.0
        };
        self.push_coefficient(coefficient);
    }
}
