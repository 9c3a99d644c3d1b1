/// Errors raised while loading or validating run configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading a configuration file
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// TOML syntax or type error (e.g. a non-numeric tolerance)
    #[error("Failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value is present but outside its accepted range
    #[error("Invalid configuration value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable reason
        reason: String,
    },
}
