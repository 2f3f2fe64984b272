//! Shared data types for the decision engine: field identifiers, segment
//! shape, and comparison kinds used by constraints and cluster keys.

mod comparison;
mod field;
mod segment;

pub use comparison::{ClusterComparisonKind, ComparisonKind};
pub use field::FieldId;
pub use segment::{Segment, SegmentKind};
