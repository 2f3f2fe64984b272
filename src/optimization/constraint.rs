//! C5 — constraint: one prioritized filter.

use std::sync::Arc;

use crate::knowledge_base::OperatingPoint;
use crate::types::{ComparisonKind, FieldId};

use super::evaluator::{BoundKind, Evaluator, Term};
use super::knowledge_adaptor::KnowledgeAdaptor;
use super::view::ScoredSet;

/// What happened to a constraint's effective threshold during `update()`.
pub enum UpdateOutcome {
    /// The effective threshold did not change.
    Unchanged,
    /// The threshold got stricter; these OPs newly fail and must be
    /// re-blocked downstream.
    Worsened(Vec<Arc<OperatingPoint>>),
    /// The threshold got looser; these OPs were released from this
    /// constraint's blocked set and must cascade downstream.
    Improved(Vec<Arc<OperatingPoint>>),
}

/// One prioritized filter: an evaluator bound to a single field, a
/// comparator, a mutable goal, an optional link to a field adaptor, and the
/// set of OPs it currently blocks.
pub struct Constraint {
    field: FieldId,
    comparator: ComparisonKind,
    goal: f64,
    has_adaptor: bool,
    last_effective_threshold: f64,
    evaluator: Evaluator,
    /// Every OP ever added to this constraint, by score — a superset of
    /// `blocked`, kept for `update()`'s range queries.
    view: ScoredSet,
    /// Currently-failing OPs.
    blocked: ScoredSet,
}

impl Constraint {
    pub fn new(field: FieldId, sigma: f64, comparator: ComparisonKind, goal: f64) -> Self {
        let bound = if comparator.is_greater_family() {
            BoundKind::Lower
        } else {
            BoundKind::Upper
        };
        Self {
            field,
            comparator,
            goal,
            has_adaptor: false,
            last_effective_threshold: goal,
            evaluator: Evaluator::single(Term::new(field, sigma, bound, 1.0)),
            view: ScoredSet::new(),
            blocked: ScoredSet::new(),
        }
    }

    pub fn field(&self) -> FieldId {
        self.field
    }

    pub fn goal(&self) -> f64 {
        self.goal
    }

    pub fn set_goal(&mut self, goal: f64) {
        self.goal = goal;
    }

    pub fn last_effective_threshold(&self) -> f64 {
        self.last_effective_threshold
    }

    pub fn set_adaptor(&mut self, enabled: bool) {
        self.has_adaptor = enabled;
    }

    /// A fresh constraint with the same field, evaluator, comparator, goal,
    /// and adaptor binding, but no view and no blocked OPs — the effective
    /// threshold resets to the goal. Used to build a sibling state that
    /// shares a problem shape but starts with an empty knowledge base.
    pub fn empty_clone(&self) -> Constraint {
        Self {
            field: self.field,
            comparator: self.comparator,
            goal: self.goal,
            has_adaptor: self.has_adaptor,
            last_effective_threshold: self.goal,
            evaluator: self.evaluator.clone(),
            view: ScoredSet::new(),
            blocked: ScoredSet::new(),
        }
    }

    fn score(&self, op: &OperatingPoint) -> f64 {
        self.evaluator.evaluate(op)
    }

    fn passes_at(&self, op: &OperatingPoint, threshold: f64) -> bool {
        self.comparator.holds(self.score(op), threshold)
    }

    fn passes_now(&self, op: &OperatingPoint) -> bool {
        self.passes_at(op, self.last_effective_threshold)
    }

    /// Re-initialize this constraint's view from a full snapshot of OPs
    /// (e.g. on knowledge-base replacement). Does not classify pass/fail —
    /// the caller is expected to run `initial_filter` afterward if it wants
    /// a fresh blocked set.
    pub fn set(&mut self, ops: impl IntoIterator<Item = Arc<OperatingPoint>>) {
        self.view.clear();
        self.blocked.clear();
        for op in ops {
            self.add(op);
        }
    }

    pub fn add(&mut self, op: Arc<OperatingPoint>) {
        let score = self.score(&op);
        self.view.insert(op, score);
    }

    pub fn remove(&mut self, op: &OperatingPoint) {
        self.view.remove(op);
        self.blocked.remove(op);
    }

    pub fn clear(&mut self) {
        self.view.clear();
        self.blocked.clear();
    }

    pub fn blocked_len(&self) -> usize {
        self.blocked.len()
    }

    pub fn is_blocked(&self, op: &OperatingPoint) -> bool {
        self.blocked.contains(op)
    }

    /// Currently blocked OPs, in no particular order relative to callers.
    pub fn blocked_stream(&self) -> Vec<Arc<OperatingPoint>> {
        self.blocked.iter().cloned().collect()
    }

    /// OPs currently passing this constraint (view minus blocked).
    pub fn to_stream(&self) -> Vec<Arc<OperatingPoint>> {
        self.view
            .iter()
            .filter(|op| !self.blocked.contains(op))
            .cloned()
            .collect()
    }

    pub fn append_to(&self, target: &mut Vec<Arc<OperatingPoint>>) {
        target.extend(self.to_stream());
    }

    /// Classify every OP of `input` against this constraint's current
    /// effective threshold, moving failures into the blocked set. Returns
    /// the moved (invalidated) OPs.
    pub fn initial_filter(
        &mut self,
        input: Vec<Arc<OperatingPoint>>,
    ) -> Vec<Arc<OperatingPoint>> {
        let mut invalidated = Vec::new();
        for op in input {
            let score = self.score(&op);
            self.view.insert(Arc::clone(&op), score);
            if !self.passes_now(&op) {
                self.blocked.insert(Arc::clone(&op), score);
                invalidated.push(op);
            }
        }
        invalidated
    }

    /// Classify each OP of `input`: block it here if it fails, otherwise
    /// pass it on. Returns the passing OPs.
    pub fn add_filter(&mut self, input: Vec<Arc<OperatingPoint>>) -> Vec<Arc<OperatingPoint>> {
        let mut passing = Vec::new();
        for op in input {
            let score = self.score(&op);
            self.view.insert(Arc::clone(&op), score);
            if self.passes_now(&op) {
                passing.push(op);
            } else {
                self.blocked.insert(Arc::clone(&op), score);
            }
        }
        passing
    }

    /// For each OP of `input` currently in this constraint's blocked set,
    /// remove it; otherwise pass it through unchanged. Returns the passing
    /// OPs.
    pub fn remove_filter(&mut self, input: Vec<Arc<OperatingPoint>>) -> Vec<Arc<OperatingPoint>> {
        let mut passing = Vec::new();
        for op in input {
            if self.blocked.contains(&op) {
                self.blocked.remove(&op);
            } else {
                passing.push(op);
            }
        }
        passing
    }

    /// True if `new` is a stricter threshold than `old` under this
    /// constraint's comparator.
    fn worsened(&self, old: f64, new: f64) -> bool {
        if self.comparator.is_greater_family() {
            new > old
        } else {
            new < old
        }
    }

    /// Recompute the effective threshold from the current goal and (if
    /// bound) the adaptor's coefficient.
    ///
    /// On a worsening threshold the candidate OPs are reported but *not*
    /// yet moved into this constraint's blocked set — the caller (the
    /// state, which alone knows what other constraints already block them)
    /// must prune and then re-admit survivors via `add_filter`.
    pub fn update(&mut self, adaptor: &KnowledgeAdaptor) -> UpdateOutcome {
        let coefficient = if self.has_adaptor {
            adaptor.coefficient(self.field)
        } else {
            1.0
        };
        let new_threshold = self.goal * coefficient;
        let old_threshold = self.last_effective_threshold;
        if new_threshold == old_threshold {
            return UpdateOutcome::Unchanged;
        }
        self.last_effective_threshold = new_threshold;

        if self.worsened(old_threshold, new_threshold) {
            let candidates = self.view.range_between(old_threshold, new_threshold);
            let invalidated: Vec<_> = candidates
                .into_iter()
                .filter(|op| !self.blocked.contains(op))
                .filter(|op| !self.passes_at(op, new_threshold))
                .collect();
            UpdateOutcome::Worsened(invalidated)
        } else {
            let released: Vec<_> = self
                .blocked
                .iter()
                .filter(|op| self.passes_at(op, new_threshold))
                .cloned()
                .collect();
            for op in &released {
                self.blocked.remove(op);
            }
            UpdateOutcome::Improved(released)
        }
    }

    /// Among currently blocked OPs, those whose score is closest to the
    /// effective threshold. Never a singleton chosen arbitrarily.
    pub fn closest(&self) -> Vec<Arc<OperatingPoint>> {
        self.blocked.closest_to(self.last_effective_threshold)
    }

    /// Of `stream`, return the ones that currently pass this constraint, if
    /// any; else those tied on the score closest to the effective
    /// threshold (least violation).
    pub fn narrow(&self, stream: Vec<Arc<OperatingPoint>>) -> Vec<Arc<OperatingPoint>> {
        let valid: Vec<_> = stream
            .iter()
            .filter(|op| self.passes_now(op))
            .cloned()
            .collect();
        if !valid.is_empty() {
            return valid;
        }
        if stream.is_empty() {
            return stream;
        }
        let mut best_distance = f64::INFINITY;
        let mut out = Vec::new();
        for op in &stream {
            let distance = (self.score(op) - self.last_effective_threshold).abs();
            if distance < best_distance - f64::EPSILON {
                best_distance = distance;
                out.clear();
                out.push(Arc::clone(op));
            } else if (distance - best_distance).abs() <= f64::EPSILON {
                out.push(Arc::clone(op));
            }
        }
        out
    }
}
