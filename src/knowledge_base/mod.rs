//! Knowledge base: the canonical, shared store of Operating Points (C1).
//!
//! OPs are reference-counted and immutable once created; the same instance
//! is shared across the store, every constraint's view and blocked set, and
//! the rank, so identity (not deep copy) is what moves between containers.

pub mod layout;
pub mod op_store;
pub mod operating_point;

pub use op_store::OpStore;
pub use operating_point::{ConfigKey, KnobValue, OperatingPoint};
