use thiserror::Error;

#[derive(Error, Debug)]
pub enum JrcError {
    #[error("Missing environment variable {name}")]
    MissingEnvVar { name: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("HTTP {status} ({reason}) from {url}")]
    HttpStatus {
        status: u16,
        reason: String,
        url: String,
    },

    #[error("Could not decode response from {url} : {message}")]
    DecodeError { url: String, message: String },

    #[error("Could not decode XML response from {url} : {message}")]
    XmlError { url: String, message: String },

    #[error("Could not get response from {url}: {body}")]
    ConfigServerError { url: String, body: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{message}")]
    PmidNotFound { message: String, details: String },

    #[error("Unsupported database type: {kind}")]
    UnsupportedDatabase { kind: String },

    #[error("Database type {kind} requires the `{feature}` feature")]
    DriverNotEnabled { kind: String, feature: String },

    #[error("Database error: {message}")]
    DatabaseError { message: String },

    #[error("There was a error and the email was not sent: {message}")]
    EmailError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl JrcError {
    pub fn missing_env(name: impl Into<String>) -> Self {
        Self::MissingEnvVar { name: name.into() }
    }

    /// Transport timeouts are the only failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::ApiError(e) => e.is_timeout(),
            _ => false,
        }
    }
}

impl From<lettre::error::Error> for JrcError {
    fn from(e: lettre::error::Error) -> Self {
        Self::EmailError {
            message: e.to_string(),
        }
    }
}

impl From<lettre::address::AddressError> for JrcError {
    fn from(e: lettre::address::AddressError) -> Self {
        Self::EmailError {
            message: format!("invalid address: {}", e),
        }
    }
}

impl From<lettre::transport::smtp::Error> for JrcError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        Self::EmailError {
            message: e.to_string(),
        }
    }
}

impl From<toml::de::Error> for JrcError {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("TOML parsing error: {}", e),
        }
    }
}

#[cfg(any(feature = "mysql", feature = "postgres"))]
impl From<sqlx::Error> for JrcError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError {
            message: crate::adapters::database::sql_error(&e),
        }
    }
}

#[cfg(feature = "mongo")]
impl From<mongodb::error::Error> for JrcError {
    fn from(e: mongodb::error::Error) -> Self {
        Self::DatabaseError {
            message: format!("MongoDB error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, JrcError>;
