//! Crate-wide error taxonomy.
//!
//! The solver itself never surfaces an error: an unsatisfiable problem
//! returns `None`, and precondition violations (misuse) are asserts, not
//! `Result`s — see module docs on `asrtm` for the rationale. `AsrtmError`
//! covers the remaining genuinely fallible public surfaces: config loading
//! and remote-learning payload parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the crate's fallible public operations.
#[derive(Error, Debug)]
pub enum AsrtmError {
    #[error("config I/O error ({0}): {1}")]
    ConfigIo(PathBuf, std::io::Error),

    #[error("config parse error ({0}): {1}")]
    ConfigParse(PathBuf, toml::de::Error),

    #[error("malformed remote-learning message: {0}")]
    MessageParse(String),

    #[error("unknown remote-learning topic suffix: {0}")]
    UnknownTopic(String),
}
