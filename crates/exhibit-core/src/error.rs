//! # Error Types — Structured Error Hierarchy
//!
//! Store operations are total and have no error type. The errors here cover
//! the fallible edges around them: configuration loading, catalog
//! validation, and durable storage backends.

use thiserror::Error;

/// Top-level error type for the exhibition.
#[derive(Error, Debug)]
pub enum ExhibitError {
    /// A mechanism identifier string did not name one of the six mechanisms.
    #[error("unknown mechanism: {0:?}")]
    UnknownMechanism(String),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The artwork catalog is inconsistent.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Durable storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Error loading or validating an [`ExhibitionConfig`](crate::ExhibitionConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path that was read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file extension does not map to a supported format.
    #[error("unsupported config format for {path}: expected .yaml, .yml or .json")]
    UnsupportedFormat {
        /// Offending path.
        path: String,
    },

    /// YAML parse failure.
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parse failure.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// A setting is out of range.
    #[error("invalid setting {field}: {reason}")]
    Invalid {
        /// Dotted path of the setting, e.g. `autoplay.clue_secs`.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Error validating an artwork [`Catalog`](crate::Catalog).
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    /// Two artworks share an id.
    #[error("duplicate artwork id {0:?}")]
    DuplicateArtwork(String),

    /// Two artworks are bound to the same mechanism.
    #[error("mechanism {mechanism} bound to both {first:?} and {second:?}")]
    MechanismBoundTwice {
        /// The doubly-bound mechanism.
        mechanism: String,
        /// First artwork bound to it.
        first: String,
        /// Second artwork bound to it.
        second: String,
    },

    /// A mechanism gates no artwork.
    #[error("mechanism {0} is not bound to any artwork")]
    MechanismUnbound(String),

    /// The catalog document could not be parsed.
    #[error("invalid catalog document: {0}")]
    Parse(String),
}

/// Error reading or writing durable per-profile storage.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend is unavailable (disabled, missing profile, quota).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// IO failure in a file-backed store.
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be encoded or decoded.
    #[error("storage serialization error for key {key:?}: {source}")]
    Serialization {
        /// The storage key involved.
        key: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}
