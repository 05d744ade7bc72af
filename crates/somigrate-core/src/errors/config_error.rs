/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {reason}")]
    Parse { reason: String },

    #[error("config read failed: {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}
