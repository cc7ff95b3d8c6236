// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport abstraction for metadata requests
//!
//! [`HttpTransport`] talks to a real server with reqwest; tests swap in their
//! own [`MetadataTransport`] to serve canned groups.

use crate::error::{Error, Result};
use crate::types::{DatasetMetadataGroup, MetadataList};
use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;

/// Path of the dataset listing, relative to the server URL
pub const METADATA_PATH: &str = "/api/sdk/data";

/// Future type for metadata fetches
pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<MetadataList<DatasetMetadataGroup>>> + Send + 'a>>;

/// Parameters of one metadata request
#[derive(Clone, Copy, Debug)]
pub struct MetadataRequest<'a> {
    /// Server URL exactly as configured on the client
    pub url: &'a str,
    /// Bearer token, if the server requires one
    pub api_token: Option<&'a str>,
}

/// Something that can fetch the dataset metadata listing from a server
pub trait MetadataTransport: Send + Sync {
    /// Fetch all dataset groups, in server order
    fn fetch_metadata<'a>(&'a self, request: MetadataRequest<'a>) -> FetchFuture<'a>;
}

#[derive(Deserialize)]
struct MetadataResponse {
    data: Vec<DatasetMetadataGroup>,
}

/// Decode the JSON body of a metadata response
pub fn decode_metadata(url: &str, body: &[u8]) -> Result<MetadataList<DatasetMetadataGroup>> {
    let response: MetadataResponse =
        serde_json::from_slice(body).map_err(|e| Error::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })?;
    Ok(MetadataList::from(response.data))
}

/// reqwest-backed transport
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a default reqwest client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport around an existing reqwest client
    pub fn with_http(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl MetadataTransport for HttpTransport {
    fn fetch_metadata<'a>(&'a self, request: MetadataRequest<'a>) -> FetchFuture<'a> {
        Box::pin(async move {
            let url = format!("{}{METADATA_PATH}", request.url.trim_end_matches('/'));
            tracing::debug!(url = %url, "fetching dataset metadata");

            let mut builder = self.http.get(&url);
            if let Some(token) = request.api_token {
                builder = builder.bearer_auth(token);
            }

            let response = builder.send().await.map_err(|e| Error::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::Server {
                    url,
                    status: status.as_u16(),
                });
            }

            let body = response.bytes().await.map_err(|e| Error::Transport {
                url: url.clone(),
                message: e.to_string(),
            })?;

            let groups = decode_metadata(&url, &body)?;
            tracing::debug!(url = %url, groups = groups.len(), "decoded dataset metadata");
            Ok(groups)
        })
    }
}
