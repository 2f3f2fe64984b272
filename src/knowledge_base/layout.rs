//! CSV/filesystem path layout for the external learning service.
//!
//! The core never reads or writes these files — the remote learning service
//! ("agora") and its CLI own that persistence layer entirely. This module
//! exists only so the path grammar the wire contract implicitly assumes
//! (the `<app>/<version>/<block>` triple threaded through every topic) is
//! written down once, in one place, rather than re-derived at each call
//! site that needs to describe it in a log line or an error message.

/// Path templates the external learning service's CSV layer follows.
///
/// Every constant is a template string with `{root}`, `{app}`, `{version}`,
/// `{block}` and, where relevant, `{metric}` placeholders — purely
/// descriptive. No path is ever joined or touched by this crate; formatting
/// and I/O belong to the learning service's own CLI.
pub struct LayoutPaths;

impl LayoutPaths {
    /// Per-block description files: knob/feature/metric/agora-property
    /// metadata, the design of experiments, per-metric model parameters, and
    /// clustering parameters.
    pub const DESCRIPTIONS: &'static str =
        "{root}/descriptions/{app}/{version}/{block}/{{knobs,features,metrics,agora_properties,doe_parameters,<metric>_model_parameters,clustering_parameters}}.csv";

    /// Per-block generated configuration files: the design-of-experiments
    /// configuration set and the full enumerated configuration space.
    pub const CONFIGURATIONS: &'static str =
        "{root}/configurations/{app}/{version}/{block}/{{doe_configs,total_configs}}.csv";

    /// Per-block observation log, one row per reported measurement.
    pub const OBSERVATIONS: &'static str = "{root}/observations/{app}/{version}/{block}/observations.csv";

    /// Per-block data-feature cluster centroids.
    pub const CLUSTERS: &'static str = "{root}/clusters/{app}/{version}/{block}/centroids.csv";

    /// Per-block, per-metric trained model blob pushed over `/model`.
    pub const MODELS: &'static str = "{root}/models/{app}/{version}/{block}/{metric}_model.data";
}
