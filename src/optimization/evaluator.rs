//! C3 — evaluator: computes a scalar from an Operating Point.
//!
//! The original mARGOt framework composes evaluators from compile-time
//! template parameters; here the same information is a small runtime
//! enumeration of (field, sigma, bound kind, coefficient) terms — see
//! "Compile-time vs runtime composition" in the design notes.

use crate::knowledge_base::OperatingPoint;
use crate::types::{FieldId, SegmentKind};

/// Which bound of a field's `mean ± sigma * stddev` band a term extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Lower,
    Upper,
}

/// One (field, sigma, bound, coefficient) term of a linear or geometric
/// evaluator.
#[derive(Debug, Clone, Copy)]
pub struct Term {
    pub field: FieldId,
    pub sigma: f64,
    pub bound: BoundKind,
    pub coefficient: f64,
}

impl Term {
    pub fn new(field: FieldId, sigma: f64, bound: BoundKind, coefficient: f64) -> Self {
        Self {
            field,
            sigma,
            bound,
            coefficient,
        }
    }

    fn bound_value(&self, op: &OperatingPoint) -> f64 {
        let segment = match self.field.segment {
            SegmentKind::Configuration => &op.configuration,
            SegmentKind::Metrics => &op.metrics,
        };
        let knob = &segment[self.field.index];
        match self.bound {
            BoundKind::Lower => knob.lower_bound(self.sigma),
            BoundKind::Upper => knob.upper_bound(self.sigma),
        }
    }
}

/// A pure function of one Operating Point, fixed at construction.
#[derive(Debug, Clone)]
pub enum Evaluator {
    /// `bound(sigma)` of a single field.
    Single(Term),
    /// `Σ coef_i * bound_i(sigma_i)`, terms traversed in declaration order.
    Linear(Vec<Term>),
    /// `Π bound_i(sigma_i)^coef_i`, terms traversed in declaration order.
    Geometric(Vec<Term>),
}

impl Evaluator {
    pub fn single(term: Term) -> Self {
        Evaluator::Single(term)
    }

    pub fn linear(terms: Vec<Term>) -> Self {
        debug_assert!(!terms.is_empty(), "linear evaluator needs at least one term");
        Evaluator::Linear(terms)
    }

    pub fn geometric(terms: Vec<Term>) -> Self {
        debug_assert!(
            !terms.is_empty(),
            "geometric evaluator needs at least one term"
        );
        Evaluator::Geometric(terms)
    }

    /// Evaluate the scalar score for one Operating Point.
    pub fn evaluate(&self, op: &OperatingPoint) -> f64 {
        match self {
            Evaluator::Single(term) => term.bound_value(op),
            Evaluator::Linear(terms) => terms
                .iter()
                .map(|t| t.coefficient * t.bound_value(op))
                .sum(),
            Evaluator::Geometric(terms) => terms
                .iter()
                .map(|t| t.bound_value(op).powf(t.coefficient))
                .product(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_base::KnobValue;

    fn op(knobs: &[f64], metrics: &[f64]) -> OperatingPoint {
        OperatingPoint::new(
            knobs.iter().map(|v| KnobValue::exact(*v)).collect(),
            metrics.iter().map(|v| KnobValue::exact(*v)).collect(),
        )
    }

    #[test]
    fn single_returns_the_bound() {
        let eval = Evaluator::single(Term::new(
            FieldId::configuration(0),
            0.0,
            BoundKind::Lower,
            1.0,
        ));
        assert_eq!(eval.evaluate(&op(&[5.0], &[])), 5.0);
    }

    #[test]
    fn linear_sums_weighted_terms() {
        let eval = Evaluator::linear(vec![
            Term::new(FieldId::configuration(0), 0.0, BoundKind::Lower, 2.0),
            Term::new(FieldId::metric(0), 0.0, BoundKind::Lower, 3.0),
        ]);
        // 2*4 + 3*5 = 23
        assert_eq!(eval.evaluate(&op(&[4.0], &[5.0])), 23.0);
    }

    #[test]
    fn geometric_multiplies_powered_terms() {
        let eval = Evaluator::geometric(vec![
            Term::new(FieldId::configuration(0), 0.0, BoundKind::Lower, 2.0),
            Term::new(FieldId::metric(0), 0.0, BoundKind::Lower, 1.0),
        ]);
        // 2^2 * 5^1 = 20
        assert_eq!(eval.evaluate(&op(&[2.0], &[5.0])), 20.0);
    }
}
