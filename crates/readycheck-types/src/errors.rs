/// Unified error type for the readycheck crates.
///
/// Timeouts and cancellations of a ready check are outcomes, not errors.
/// Anything surfacing here is a failure outside the wait-loop's control.
#[derive(Debug, thiserror::Error)]
pub enum ReadyCheckError {
    /// Error from a reaction source or the transport behind it.
    #[error("channel error: {0}")]
    Channel(String),

    /// Error from configuration loading or validation.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_yaml::Error> for ReadyCheckError {
    fn from(err: serde_yaml::Error) -> Self {
        ReadyCheckError::Serialization(err.to_string())
    }
}
