//! AS-RTM: an application-specific runtime manager.
//!
//! A mutex-guarded decision engine that, from a knowledge base of measured
//! or predicted Operating Points, picks the best configuration satisfying a
//! priority-ordered stack of constraints and an application-chosen scalar
//! rank — relaxing constraints under a fixed budget when nothing survives
//! unrelaxed. [`DataAwareAsRtm`] extends this to a runtime feature space by
//! keeping one engine per feature cluster. [`Liaison`] drives either from a
//! remote learning service over an injected, transport-agnostic channel.
//!
//! ## Modules
//!
//! - [`knowledge_base`]: the canonical store of Operating Points (C1).
//! - [`monitor`]: sliding-window runtime observation buffers (C2).
//! - [`optimization`]: evaluators, the knowledge adaptor, constraints, rank,
//!   and the per-state solver (C3-C7).
//! - [`asrtm`]: the engine itself and its data-aware, cluster-keyed
//!   collection (C8-C9).
//! - [`liaison`]: the remote-learning message loop (C10).
//! - [`types`]: field identifiers, segment shape, comparison kinds shared
//!   across the above.
//! - [`config`]: engine-wide tunables (monitor window, adaptor inertia,
//!   cluster-distance normalization), loaded via [`config::EngineConfig`].
//! - [`error`]: the crate's fallible-surface error type.

pub mod asrtm;
pub mod config;
pub mod error;
pub mod knowledge_base;
pub mod liaison;
pub mod monitor;
pub mod optimization;
pub mod types;

pub use asrtm::{ApplicationStatus, AsRtm, ClusterAxis, ClusterKey, DataAwareAsRtm};
pub use config::EngineConfig;
pub use error::AsrtmError;
pub use knowledge_base::{KnobValue, OperatingPoint, OpStore};
pub use liaison::{Liaison, LiaisonMessage, RemoteChannel, Topic};
pub use monitor::Monitor;
pub use optimization::{
    BoundKind, Constraint, Evaluator, FieldAdaptor, KnowledgeAdaptor, Rank, RankDirection, State,
    Term, UpdateOutcome,
};
pub use types::{ClusterComparisonKind, ComparisonKind, FieldId, Segment, SegmentKind};
