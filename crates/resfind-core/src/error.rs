use thiserror::Error;

/// Failures while loading configuration or the static lookup tables.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read taxonomy file {path}: {source}")]
    TaxonomyFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse taxonomy file: {0}")]
    TaxonomyFileParse(#[from] serde_yaml::Error),

    #[error("failed to read ZIP table {path}: {source}")]
    ZipTableIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed ZIP table row at line {line}: {reason}")]
    ZipTableParse { line: usize, reason: String },

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// Failures resolving an application category into an upstream search term.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    /// The category id is not declared in the taxonomy table.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}
