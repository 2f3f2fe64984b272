//! Engine configuration module.
//!
//! Provides crate-wide tunables loaded from a TOML file, replacing
//! hardcoded defaults for monitor window sizes, adaptor inertia, and
//! cluster-distance normalization.
//!
//! ## Loading order
//!
//! 1. `AS_RTM_CONFIG` environment variable (path to TOML file)
//! 2. `as_rtm.toml` in the current working directory
//! 3. Built-in defaults ([`defaults`])
//!
//! ## Usage
//!
//! Call [`init`] once at startup, then [`get`] anywhere:
//!
//! ```ignore
//! config::init(EngineConfig::load());
//! let window = config::get().monitor_window;
//! ```
//!
//! This module governs the *engine's own* tunables. It has no bearing on
//! the knowledge base, constraints, or ranks an application registers at
//! runtime through the AS-RTM API — those are supplied by the caller, not
//! read from a file.

pub mod defaults;

use crate::error::AsrtmError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Root configuration for one AS-RTM deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default sliding-window size for monitors registered without an
    /// explicit size.
    #[serde(default = "defaults_monitor_window")]
    pub monitor_window: usize,

    /// Default inertia for field adaptors registered without an explicit
    /// inertia.
    #[serde(default = "defaults_inertia")]
    pub inertia: usize,

    /// Sigma used by the knowledge adaptor's "outside the band" test.
    #[serde(default = "defaults_band_sigma")]
    pub adaptor_band_sigma: f64,

    /// Whether data-aware cluster selection normalizes each axis before
    /// computing Euclidean distance.
    #[serde(default = "defaults_normalize")]
    pub normalize_cluster_distance: bool,
}

fn defaults_monitor_window() -> usize {
    defaults::DEFAULT_MONITOR_WINDOW
}
fn defaults_inertia() -> usize {
    defaults::DEFAULT_INERTIA
}
fn defaults_band_sigma() -> f64 {
    defaults::ADAPTOR_BAND_SIGMA
}
fn defaults_normalize() -> bool {
    defaults::DEFAULT_NORMALIZE_CLUSTER_DISTANCE
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            monitor_window: defaults::DEFAULT_MONITOR_WINDOW,
            inertia: defaults::DEFAULT_INERTIA,
            adaptor_band_sigma: defaults::ADAPTOR_BAND_SIGMA,
            normalize_cluster_distance: defaults::DEFAULT_NORMALIZE_CLUSTER_DISTANCE,
        }
    }
}

impl EngineConfig {
    /// Load following the order documented on the module.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("AS_RTM_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        tracing::info!(path = %p.display(), "loaded engine config from AS_RTM_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!(path = %p.display(), error = %e, "failed to load config from AS_RTM_CONFIG, falling back");
                    }
                }
            } else {
                tracing::warn!(path = %path, "AS_RTM_CONFIG points to a non-existent file, falling back");
            }
        }

        let local = PathBuf::from("as_rtm.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    tracing::info!("loaded engine config from ./as_rtm.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load ./as_rtm.toml, using defaults");
                }
            }
        }

        tracing::info!("no as_rtm.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, AsrtmError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AsrtmError::ConfigIo(path.to_path_buf(), e))?;
        toml::from_str(&contents).map_err(|e| AsrtmError::ConfigParse(path.to_path_buf(), e))
    }
}

/// Global engine configuration, initialized once at startup.
static ENGINE_CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Initialize the global engine configuration.
///
/// Safe to call more than once — subsequent calls are ignored with a
/// warning, matching the "first writer wins" semantics of `OnceLock`.
pub fn init(config: EngineConfig) {
    if ENGINE_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once — ignoring");
    }
}

/// Get a reference to the global engine configuration, falling back to
/// built-in defaults if `init()` was never called.
///
/// Unlike a caller-supplied knowledge base, the engine config has a
/// sensible default, so this never panics.
pub fn get() -> &'static EngineConfig {
    ENGINE_CONFIG.get_or_init(EngineConfig::default)
}

/// Check whether the config has been initialized explicitly.
pub fn is_initialized() -> bool {
    ENGINE_CONFIG.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_defaults_module() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.monitor_window, defaults::DEFAULT_MONITOR_WINDOW);
        assert_eq!(cfg.inertia, defaults::DEFAULT_INERTIA);
    }

    #[test]
    fn load_from_file_parses_partial_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("as_rtm.toml");
        std::fs::write(&path, "monitor_window = 32\n").expect("write");
        let cfg = EngineConfig::load_from_file(&path).expect("load");
        assert_eq!(cfg.monitor_window, 32);
        assert_eq!(cfg.inertia, defaults::DEFAULT_INERTIA);
    }

    #[test]
    fn load_from_file_missing_is_error() {
        let path = PathBuf::from("/nonexistent/as_rtm.toml");
        assert!(EngineConfig::load_from_file(&path).is_err());
    }
}
