//! C7 — state: a priority-ordered stack of constraints plus one rank,
//! tying them into a single constrained multi-objective solver.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::knowledge_base::OperatingPoint;

use super::constraint::{Constraint, UpdateOutcome};
use super::knowledge_adaptor::KnowledgeAdaptor;
use super::rank::Rank;

/// A priority (lower numeric value = higher logical priority, relaxed
/// last), a strictly ordered stack of constraints, a rank, and a memoized
/// best OP valid until the next mutation marks the problem dirty.
pub struct State {
    constraints: BTreeMap<i64, Constraint>,
    rank: Rank,
    dirty: bool,
    memoized_best: Option<Arc<OperatingPoint>>,
}

impl State {
    pub fn new(rank: Rank) -> Self {
        Self {
            constraints: BTreeMap::new(),
            rank,
            dirty: true,
            memoized_best: None,
        }
    }

    pub fn rank(&self) -> &Rank {
        &self.rank
    }

    /// A fresh state with the same named constraints (goals, sigmas,
    /// adaptor bindings) and the same rank shape, but no OPs and no blocked
    /// sets — the starting point for a sibling engine's states.
    pub fn empty_clone(&self) -> State {
        State {
            constraints: self
                .constraints
                .iter()
                .map(|(&priority, c)| (priority, c.empty_clone()))
                .collect(),
            rank: self.rank.empty_clone(),
            dirty: true,
            memoized_best: None,
        }
    }

    pub fn constraint(&self, priority: i64) -> Option<&Constraint> {
        self.constraints.get(&priority)
    }

    pub fn constraint_mut(&mut self, priority: i64) -> Option<&mut Constraint> {
        self.constraints.get_mut(&priority)
    }

    pub fn has_constraint(&self, priority: i64) -> bool {
        self.constraints.contains_key(&priority)
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Insert `constraint` at `priority`, replacing any constraint already
    /// there. See spec §4.7 "Adding a constraint at priority P".
    pub fn add_constraint(&mut self, priority: i64, mut constraint: Constraint) {
        if self.constraints.contains_key(&priority) {
            self.remove_constraint(priority);
        }

        let mut gathered: Vec<Arc<OperatingPoint>> = self.rank.to_stream();
        for (&p, c) in self.constraints.iter() {
            if p >= priority {
                gathered.extend(c.blocked_stream());
            }
        }

        let invalidated = constraint.initial_filter(gathered);

        for (&p, c) in self.constraints.iter_mut() {
            if p > priority {
                for op in &invalidated {
                    c.remove(op);
                }
            }
        }
        for op in &invalidated {
            self.rank.remove(op);
        }

        self.constraints.insert(priority, constraint);
        self.mark_dirty();
    }

    /// Remove the constraint at `priority`, cascading its blocked OPs
    /// through every lower-priority constraint and the rank.
    pub fn remove_constraint(&mut self, priority: i64) -> bool {
        let Some(removed) = self.constraints.remove(&priority) else {
            return false;
        };
        let mut pool = removed.blocked_stream();
        for (&p, c) in self.constraints.iter_mut() {
            if p > priority && !pool.is_empty() {
                pool = c.add_filter(pool);
            }
        }
        for op in pool {
            self.rank.add(op);
        }
        self.mark_dirty();
        true
    }

    pub fn add_op(&mut self, op: Arc<OperatingPoint>) {
        for c in self.constraints.values_mut() {
            c.add(Arc::clone(&op));
        }
        let mut stream = vec![op];
        for c in self.constraints.values_mut() {
            if stream.is_empty() {
                break;
            }
            stream = c.add_filter(stream);
        }
        for op in stream {
            self.rank.add(op);
        }
        self.mark_dirty();
    }

    pub fn remove_op(&mut self, op: &OperatingPoint) {
        for c in self.constraints.values_mut() {
            c.remove(op);
        }
        self.rank.remove(op);
        self.mark_dirty();
    }

    /// Replace the rank, carrying over every OP currently valid under the
    /// old one.
    pub fn set_rank(&mut self, mut new_rank: Rank) {
        for op in self.rank.to_stream() {
            new_rank.add(op);
        }
        self.rank = new_rank;
        self.mark_dirty();
    }

    /// Recompute every constraint's effective threshold, high to low
    /// priority, cascading invalidated/released OPs. Must run before
    /// `solve()` whenever a goal or an adaptor coefficient may have moved.
    pub fn update(&mut self, adaptor: &KnowledgeAdaptor) {
        let priorities: Vec<i64> = self.constraints.keys().copied().collect();
        for (i, &p) in priorities.iter().enumerate() {
            let outcome = self
                .constraints
                .get_mut(&p)
                .expect("priority collected from this map")
                .update(adaptor);
            match outcome {
                UpdateOutcome::Unchanged => {}
                UpdateOutcome::Worsened(invalidated) => {
                    let survivors: Vec<_> = invalidated
                        .into_iter()
                        .filter(|op| {
                            !priorities[..i]
                                .iter()
                                .any(|hp| self.constraints[hp].is_blocked(op))
                        })
                        .collect();
                    if survivors.is_empty() {
                        self.mark_dirty();
                        continue;
                    }
                    let leftover = self
                        .constraints
                        .get_mut(&p)
                        .expect("priority collected from this map")
                        .add_filter(survivors.clone());
                    debug_assert!(
                        leftover.is_empty(),
                        "a survivor of the new threshold must still fail it"
                    );
                    for &lp in &priorities[i + 1..] {
                        self.constraints
                            .get_mut(&lp)
                            .expect("priority collected from this map")
                            .remove_filter(survivors.clone());
                    }
                    for op in &survivors {
                        self.rank.remove(op);
                    }
                    self.mark_dirty();
                }
                UpdateOutcome::Improved(released) => {
                    let mut stream = released;
                    for &lp in &priorities[i + 1..] {
                        if stream.is_empty() {
                            break;
                        }
                        stream = self
                            .constraints
                            .get_mut(&lp)
                            .expect("priority collected from this map")
                            .add_filter(stream);
                    }
                    for op in stream {
                        self.rank.add(op);
                    }
                    self.mark_dirty();
                }
            }
        }
    }

    /// Solve for the best OP under the current constraints and rank,
    /// memoizing the result until the next mutation.
    pub fn solve(&mut self) -> Option<Arc<OperatingPoint>> {
        if !self.dirty {
            return self.memoized_best.clone();
        }
        self.dirty = false;

        if let Some(best) = self.rank.best() {
            self.memoized_best = Some(Arc::clone(&best));
            return Some(best);
        }

        let priorities: Vec<i64> = self.constraints.keys().copied().collect();
        for &p in priorities.iter().rev() {
            let closest = self.constraints[&p].closest();
            if closest.is_empty() {
                continue;
            }
            let mut stream = closest;
            for &lp in priorities.iter().filter(|&&lp| lp > p) {
                stream = self.constraints[&lp].narrow(stream);
            }
            let best = self.rank.best_of(&stream);
            self.memoized_best = best.clone();
            return best;
        }

        self.memoized_best = None;
        None
    }
}
