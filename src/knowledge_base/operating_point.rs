//! Operating Point: the immutable (configuration, metrics) record the
//! solver reasons about.

use std::hash::{Hash, Hasher};

use crate::types::Segment;

/// One tunable value with an optional measured spread.
///
/// `stddev` of `None` behaves as `0.0` for bound computation — a value
/// known exactly, with no observed variance.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct KnobValue {
    pub mean: f64,
    pub stddev: Option<f64>,
}

impl KnobValue {
    pub fn exact(mean: f64) -> Self {
        Self { mean, stddev: None }
    }

    pub fn with_stddev(mean: f64, stddev: f64) -> Self {
        Self {
            mean,
            stddev: Some(stddev),
        }
    }

    /// `mean - sigma * stddev`.
    pub fn lower_bound(&self, sigma: f64) -> f64 {
        self.mean - sigma * self.stddev.unwrap_or(0.0)
    }

    /// `mean + sigma * stddev`.
    pub fn upper_bound(&self, sigma: f64) -> f64 {
        self.mean + sigma * self.stddev.unwrap_or(0.0)
    }
}

/// Hashable, equality-as-identity key over a configuration segment's mean
/// values. Two configurations with the same means collide, regardless of
/// their stddevs — the configuration segment is the OP's identity.
#[derive(Debug, Clone)]
pub struct ConfigKey {
    means_bits: Vec<u64>,
    hash: u64,
}

impl ConfigKey {
    pub fn from_segment(segment: &Segment) -> Self {
        let means_bits: Vec<u64> = segment.iter().map(|k| k.mean.to_bits()).collect();
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        means_bits.hash(&mut hasher);
        let hash = hasher.finish();
        Self { means_bits, hash }
    }
}

impl PartialEq for ConfigKey {
    fn eq(&self, other: &Self) -> bool {
        self.means_bits == other.means_bits
    }
}
impl Eq for ConfigKey {}

impl Hash for ConfigKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Use the precomputed hash directly rather than re-folding the
        // vector — cheap lookups are the whole point of caching it.
        state.write_u64(self.hash);
    }
}

/// One measured or predicted application behaviour: a configuration paired
/// with the metrics it produces.
///
/// Logically immutable once created; shared by reference (`Arc`) across the
/// knowledge base, every constraint's view, every constraint's blocked set,
/// and the rank.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct OperatingPoint {
    pub configuration: Segment,
    pub metrics: Segment,
    /// Human-readable names, purely for logging — never part of equality.
    pub knob_names: Option<Vec<String>>,
    pub metric_names: Option<Vec<String>>,
}

impl OperatingPoint {
    pub fn new(configuration: Segment, metrics: Segment) -> Self {
        Self {
            configuration,
            metrics,
            knob_names: None,
            metric_names: None,
        }
    }

    pub fn config_key(&self) -> ConfigKey {
        ConfigKey::from_segment(&self.configuration)
    }
}

impl PartialEq for OperatingPoint {
    fn eq(&self, other: &Self) -> bool {
        self.config_key() == other.config_key()
    }
}
impl Eq for OperatingPoint {}
