use std::{fmt, io, path::StripPrefixError};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use tokio::task::JoinError;
use url::ParseError as UrlParseError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum IrefError {
    #[error("Build configuration error: {0}")]
    Config(String),
    #[error("Inline reference codec error: {0}")]
    Codec(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Malformed reference '{0}': expected 'Display text<signature>'")]
    MalformedReference(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("Render error: {0}")]
    Render(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Build worker failed: {0}")]
    Worker(String),
}

impl From<StripPrefixError> for IrefError {
    fn from(src: StripPrefixError) -> IrefError {
        IrefError::NotFound(format!("Strip prefix failed for path. Error: {src}"))
    }
}

impl From<toml::de::Error> for IrefError {
    fn from(src: toml::de::Error) -> IrefError {
        IrefError::Config(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for IrefError {
    fn from(src: toml::ser::Error) -> IrefError {
        IrefError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for IrefError {
    fn from(src: JsonError) -> IrefError {
        IrefError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<UrlParseError> for IrefError {
    fn from(src: UrlParseError) -> IrefError {
        IrefError::Serialization(format!("Invalid URL: {src}"))
    }
}

impl From<io::Error> for IrefError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => IrefError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => IrefError::PermissionDenied,
            _ => IrefError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<walkdir::Error> for IrefError {
    fn from(x: walkdir::Error) -> Self {
        match x.into_io_error() {
            Some(io_error) => io_error.into(),
            None => IrefError::Io("directory walk hit a filesystem loop".to_string()),
        }
    }
}

impl From<fmt::Error> for IrefError {
    fn from(x: fmt::Error) -> Self {
        IrefError::Render(format!("{x}"))
    }
}

impl From<JoinError> for IrefError {
    fn from(x: JoinError) -> Self {
        IrefError::Worker(format!("{x}"))
    }
}
