//! C8/C9 — the AS-RTM engine and its data-aware, cluster-keyed collection.

pub mod cluster_key;
pub mod data_aware;
pub mod engine;

pub use cluster_key::{ClusterAxis, ClusterKey};
pub use data_aware::DataAwareAsRtm;
pub use engine::{ApplicationStatus, AsRtm};
