// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for city model access

use thiserror::Error;

/// Result type alias for model and object operations
pub type Result<T> = std::result::Result<T, Error>;

/// Non-success status reported by a backend call
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NativeStatus {
    /// Unclassified failure inside the backend
    #[error("unknown error")]
    Unknown,
    /// The requested value does not exist
    #[error("value not found")]
    ValueNotFound,
    /// The backend failed while loading the city model
    #[error("error loading CityGML")]
    LoadingCityGml,
    /// An index passed to the backend was out of bounds
    #[error("index out of bounds")]
    IndexOutOfBounds,
    /// A file system operation failed inside the backend
    #[error("file system error")]
    FileSystem,
    /// An argument (buffer size, name, ...) was rejected
    #[error("invalid argument")]
    InvalidArgument,
    /// The handle does not identify a live resource
    #[error("invalid handle")]
    InvalidHandle,
}

/// Errors surfaced by [`CityModel`](crate::CityModel) and [`CityObject`](crate::CityObject)
#[derive(Error, Debug)]
pub enum Error {
    /// A backend call reported a non-success status
    #[error("backend call `{call}` failed: {status}")]
    NativeCall {
        call: &'static str,
        status: NativeStatus,
    },

    /// The owning city model has already been released
    #[error("city model has already been released")]
    UseAfterRelease,

    /// Positional access past the end of a sequence
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Loading the city model failed
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl Error {
    /// Wrap a backend status with the name of the call that produced it
    pub fn native(call: &'static str, status: NativeStatus) -> Self {
        Error::NativeCall { call, status }
    }
}

/// Errors that can occur while a backend loads a city model
#[derive(Error, Debug)]
pub enum ParseError {
    /// The content is not in the format the backend understands
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The document declares a type or version the backend cannot load
    #[error("Unsupported document type: {0}")]
    UnsupportedType(String),

    /// A city object refers to an object that does not exist or is not a tree edge
    #[error("Invalid reference from {object} to {target}")]
    InvalidReference { object: String, target: String },

    /// JSON decoding failed
    #[error("JSON error: {0}")]
    Json(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl ParseError {
    /// Create a new format error
    pub fn format(msg: impl Into<String>) -> Self {
        ParseError::InvalidFormat(msg.into())
    }

    /// Create a new reference error
    pub fn reference(object: impl Into<String>, target: impl Into<String>) -> Self {
        ParseError::InvalidReference {
            object: object.into(),
            target: target.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        ParseError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_error_display() {
        let err = Error::native("get_root_city_objects", NativeStatus::InvalidHandle);
        assert_eq!(
            err.to_string(),
            "backend call `get_root_city_objects` failed: invalid handle"
        );
    }

    #[test]
    fn test_parse_error_converts() {
        let err: Error = ParseError::format("missing CityObjects").into();
        assert!(matches!(err, Error::Parse(ParseError::InvalidFormat(_))));
        assert_eq!(err.to_string(), "Invalid format: missing CityObjects");
    }
}
