use thiserror::Error;

/// Failures raised by the registration core.
///
/// User input problems are never reported through this type: they are
/// recorded as field validity instead. These variants cover broken contracts
/// with the presentation surface and environment failures (config, catalog
/// files).
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Element not found: {0}")]
    ElementNotFound(String),
    #[error("Unknown activity: {0}")]
    UnknownActivity(String),
    #[error("Invalid option `{value}` for {field}")]
    InvalidOption { field: &'static str, value: String },
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RegistrationError>;
