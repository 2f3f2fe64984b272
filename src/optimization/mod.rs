//! Constraint-filtering, rank-evaluating decision engine (C3–C7).
//!
//! An evaluator reduces an Operating Point to a scalar (C3). A knowledge
//! adaptor tracks how far reality drifts from the knowledge base's
//! predictions, per field (C4). A constraint is one prioritized filter over
//! Operating Points (C5); a rank orders the survivors (C6). A state ties a
//! priority-ordered stack of constraints to one rank and solves it (C7).

pub mod constraint;
pub mod evaluator;
pub mod field_adaptor;
pub mod knowledge_adaptor;
pub mod rank;
pub mod state;
mod view;

pub use constraint::{Constraint, UpdateOutcome};
pub use evaluator::{BoundKind, Evaluator, Term};
pub use field_adaptor::FieldAdaptor;
pub use knowledge_adaptor::KnowledgeAdaptor;
pub use rank::{Rank, RankDirection};
pub use state::State;
