// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for metadata requests

use thiserror::Error;

/// Result type for network operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching or reading dataset metadata
#[derive(Error, Debug)]
pub enum Error {
    /// The request could not be sent or the body could not be read
    #[error("http request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// The server answered with a non-success status code
    #[error("http request to {url} returned status {status}")]
    Server { url: String, status: u16 },

    /// The response body is not the expected metadata document
    #[error("invalid metadata response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    /// Positional access past the end of a metadata sequence
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
