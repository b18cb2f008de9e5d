//! Error types for DashStash

use thiserror::Error;

/// A URL failed client-side validation before any request was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("URL is required")]
    EmptyUrl,

    #[error("Please enter a valid URL: {url}")]
    InvalidUrl { url: String },
}

/// Rejection from the auth collaborator (sign in, sign up, sign out, OAuth).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{0}")]
    Rejected(String),

    #[error("Network error during authentication: {0}")]
    Network(String),

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password is required")]
    EmptyPassword,
}

impl AuthError {
    pub fn rejected(message: impl Into<String>) -> Self {
        AuthError::Rejected(message.into())
    }
}

/// Error reported by the remote article store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        StoreError {
            message: message.into(),
        }
    }
}

/// Link-preview enrichment failed. Never fatal for the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("metadata request failed: {0}")]
    Transport(String),

    #[error("unrecognized metadata response: {0}")]
    UnrecognizedResponse(String),

    #[error("metadata lookup failed with status '{0}'")]
    Unsuccessful(String),
}

/// Build-time configuration is missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing configuration value {0}")]
    Missing(&'static str),

    #[error("invalid URL for {key}: {value}")]
    InvalidUrl { key: &'static str, value: String },
}

/// Reading or writing extension local storage failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("storage error: {0}")]
pub struct StorageError(pub String);

/// The tab query against the browser failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to get tabs: {0}")]
pub struct TabSourceError(pub String);

/// Everything a user action can fail with. Caught at the action boundary and
/// rendered inline through [`AppError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("You must be logged in to save articles")]
    NotAuthenticated,

    #[error("Failed to save: {0}")]
    Persistence(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    MetadataFetch(#[from] MetadataError),

    #[error(transparent)]
    TabSource(#[from] TabSourceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Text shown in the inline error banner.
    ///
    /// Metadata failures hide their technical detail; it is logged instead.
    pub fn user_message(&self) -> String {
        match self {
            AppError::MetadataFetch(_) => {
                "Could not fetch page details. You can still fill them in manually.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}
