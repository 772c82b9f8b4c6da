use std::{fmt, io};

use http::status::StatusCode;
use regex::Error as RegexError;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use url::ParseError as UrlParseError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum SiteMapError {
    /// A required parameter was missing or malformed. `param` names it.
    #[error("Invalid argument '{param}': {reason}")]
    InvalidArgument { param: String, reason: String },
    /// The site map was set up incorrectly (no root registered, root filtered away, ...).
    #[error("Site map configuration error: {0}")]
    Configuration(String),
    #[error(
        "Context metadata '{key}' was not set by any ancestor builder. \
         Expected it to be provided upstream by {hint}"
    )]
    MissingMetadata { key: String, hint: String },
    #[error("URL resolution failed: {0}")]
    UrlResolution(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl SiteMapError {
    pub fn invalid_argument(param: &str, reason: impl Into<String>) -> Self {
        SiteMapError::InvalidArgument {
            param: param.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing_metadata(key: &str, hint: &str) -> Self {
        SiteMapError::MissingMetadata {
            key: key.to_string(),
            hint: hint.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            SiteMapError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            SiteMapError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SiteMapError::MissingMetadata { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            SiteMapError::UrlResolution(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SiteMapError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SiteMapError::NotFound(_) => StatusCode::NOT_FOUND,
            SiteMapError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<toml::de::Error> for SiteMapError {
    fn from(src: toml::de::Error) -> SiteMapError {
        SiteMapError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for SiteMapError {
    fn from(src: toml::ser::Error) -> SiteMapError {
        SiteMapError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for SiteMapError {
    fn from(src: JsonError) -> SiteMapError {
        SiteMapError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<UrlParseError> for SiteMapError {
    fn from(src: UrlParseError) -> SiteMapError {
        SiteMapError::UrlResolution(format!("Invalid URL: {src}"))
    }
}

impl From<RegexError> for SiteMapError {
    fn from(x: RegexError) -> Self {
        SiteMapError::Serialization(format!("Regex parse failed: {x}"))
    }
}

impl From<io::Error> for SiteMapError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => SiteMapError::NotFound(format!("{x}")),
            _ => SiteMapError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for SiteMapError {
    fn from(x: fmt::Error) -> Self {
        SiteMapError::Serialization(format!("{x}"))
    }
}
