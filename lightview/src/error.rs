use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read lighting config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("lighting config parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid lighting config value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}
