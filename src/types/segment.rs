//! Configuration/metrics segment shape shared by every Operating Point.

use crate::knowledge_base::KnobValue;

/// An ordered tuple of knob values. Used for both the configuration segment
/// (software knobs) and the metrics segment (observed/predicted metrics) of
/// an Operating Point — the two share the same shape, only the semantics of
/// "what segment" a field id points into differs.
pub type Segment = Vec<KnobValue>;

/// Which half of an Operating Point a [`crate::types::FieldId`] points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SegmentKind {
    Configuration,
    Metrics,
}
