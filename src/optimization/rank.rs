//! C6 — rank: an ordered multiset of currently-valid OPs by evaluator
//! score, the scalar objective function.

use std::sync::Arc;

use crate::knowledge_base::OperatingPoint;

use super::evaluator::Evaluator;
use super::view::ScoredSet;

/// Whether the rank prefers the smallest or largest evaluator score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankDirection {
    Minimize,
    Maximize,
}

/// The rank: valid OPs ordered by evaluator score, ascending for minimize,
/// descending for maximize.
pub struct Rank {
    evaluator: Evaluator,
    direction: RankDirection,
    set: ScoredSet,
}

impl Rank {
    pub fn new(evaluator: Evaluator, direction: RankDirection) -> Self {
        Self {
            evaluator,
            direction,
            set: ScoredSet::new(),
        }
    }

    pub fn direction(&self) -> RankDirection {
        self.direction
    }

    /// A fresh rank with the same evaluator and direction but an empty
    /// scored set. Used to build a sibling state sharing a problem shape.
    pub fn empty_clone(&self) -> Rank {
        Rank::new(self.evaluator.clone(), self.direction)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn add(&mut self, op: Arc<OperatingPoint>) {
        let score = self.evaluator.evaluate(&op);
        self.set.insert(op, score);
    }

    pub fn remove(&mut self, op: &OperatingPoint) -> Option<Arc<OperatingPoint>> {
        self.set.remove(op)
    }

    pub fn clear(&mut self) {
        self.set.clear();
    }

    pub fn to_stream(&self) -> Vec<Arc<OperatingPoint>> {
        self.set.iter().cloned().collect()
    }

    /// The front element under this rank's direction.
    pub fn best(&self) -> Option<Arc<OperatingPoint>> {
        match self.direction {
            RankDirection::Minimize => self.set.front().cloned(),
            RankDirection::Maximize => self.set.back().cloned(),
        }
    }

    /// The best element of an externally supplied non-empty stream, scored
    /// by this rank's evaluator and broken toward the first occurrence on
    /// ties. Used during constraint relaxation, where the stream is not
    /// necessarily the rank's own set.
    pub fn best_of(&self, stream: &[Arc<OperatingPoint>]) -> Option<Arc<OperatingPoint>> {
        let mut best: Option<(f64, &Arc<OperatingPoint>)> = None;
        for op in stream {
            let score = self.evaluator.evaluate(op);
            let better = match (&best, self.direction) {
                (None, _) => true,
                (Some((b, _)), RankDirection::Minimize) => score < *b,
                (Some((b, _)), RankDirection::Maximize) => score > *b,
            };
            if better {
                best = Some((score, op));
            }
        }
        best.map(|(_, op)| Arc::clone(op))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge_base::KnobValue;
    use crate::optimization::evaluator::{BoundKind, Term};
    use crate::types::FieldId;

    fn op(knob: f64) -> Arc<OperatingPoint> {
        Arc::new(OperatingPoint::new(
            vec![KnobValue::exact(knob)],
            vec![KnobValue::exact(0.0)],
        ))
    }

    fn minimize_knob0() -> Rank {
        Rank::new(
            Evaluator::single(Term::new(
                FieldId::configuration(0),
                0.0,
                BoundKind::Lower,
                1.0,
            )),
            RankDirection::Minimize,
        )
    }

    #[test]
    fn minimize_returns_smallest_score() {
        let mut rank = minimize_knob0();
        for k in [3.0, 4.0, 5.0, 6.0, 7.0] {
            rank.add(op(k));
        }
        assert_eq!(rank.best().unwrap().configuration[0].mean, 3.0);
    }

    #[test]
    fn maximize_returns_largest_score() {
        let mut rank = Rank::new(
            Evaluator::single(Term::new(
                FieldId::configuration(0),
                0.0,
                BoundKind::Lower,
                1.0,
            )),
            RankDirection::Maximize,
        );
        for k in [3.0, 4.0, 5.0] {
            rank.add(op(k));
        }
        assert_eq!(rank.best().unwrap().configuration[0].mean, 5.0);
    }

    #[test]
    fn best_of_stream_uses_rank_direction() {
        let rank = minimize_knob0();
        let stream = vec![op(9.0), op(2.0), op(5.0)];
        assert_eq!(rank.best_of(&stream).unwrap().configuration[0].mean, 2.0);
    }

    #[test]
    fn empty_rank_has_no_best() {
        let rank = minimize_knob0();
        assert!(rank.best().is_none());
    }
}
