//! Engine-wide default constants.
//!
//! Centralises the magic numbers the original mARGOt framework scattered
//! across template parameters, so they can be tuned without touching call
//! sites. Grouped by subsystem for easy discovery.

// ============================================================================
// Monitor
// ============================================================================

/// Default sliding-window size for a monitor when the application does not
/// specify one explicitly.
pub const DEFAULT_MONITOR_WINDOW: usize = 16;

// ============================================================================
// Knowledge adaptor
// ============================================================================

/// Default inertia (per-field error-coefficient window size) used by
/// `register_monitor_for_field` when the caller accepts crate defaults.
pub const DEFAULT_INERTIA: usize = 1;

/// Sigma used by `KnowledgeAdaptor::evaluate_error` to decide whether an
/// observed value lies "outside the band" of an OP's expectation.
///
/// Fixed independently of any constraint's own sigma — see Open Question 1
/// in DESIGN.md.
pub const ADAPTOR_BAND_SIGMA: f64 = 1.0;

// ============================================================================
// Constraint / evaluator
// ============================================================================

/// Default sigma (number of standard deviations) used by a constraint's
/// bound evaluator when the caller does not specify one.
pub const DEFAULT_CONSTRAINT_SIGMA: f64 = 0.0;

// ============================================================================
// Data-aware clustering
// ============================================================================

/// Default distance metric normalization: whether to min-max normalize each
/// axis before computing Euclidean distance between cluster keys.
pub const DEFAULT_NORMALIZE_CLUSTER_DISTANCE: bool = false;
