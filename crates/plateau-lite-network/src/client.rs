// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client for the PLATEAU dataset metadata service

use crate::error::Result;
use crate::transport::{HttpTransport, MetadataRequest, MetadataTransport};
use crate::types::{DatasetMetadataGroup, MetadataList};
use serde::Deserialize;
use std::sync::Arc;

/// Production server URL
pub const DEFAULT_URL: &str = "https://api.plateau.reearth.io";

/// Client settings, e.g. loaded from a config file
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server URL
    pub url: String,
    /// Bearer token sent with every request
    pub api_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            api_token: None,
        }
    }
}

/// Metadata client
///
/// The server URL is stored exactly as set; the transport decides how to
/// build request URLs from it.
///
/// # Example
///
/// ```ignore
/// let mut client = Client::new();
/// client.set_url("https://example.com");
/// let groups = client.fetch_dataset_metadata_groups().await?;
/// println!("{}", groups.at(0)?.title);
/// ```
pub struct Client<T: MetadataTransport = HttpTransport> {
    transport: Arc<T>,
    url: String,
    api_token: Option<String>,
}

impl Client<HttpTransport> {
    /// Create a client for the production server
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(ClientConfig::default())
    }

    /// Create a client from settings
    #[must_use]
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            transport: Arc::new(HttpTransport::new()),
            url: config.url,
            api_token: config.api_token,
        }
    }
}

impl Default for Client<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: MetadataTransport> Client<T> {
    /// Create a client for the production server using a custom transport
    #[must_use]
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            url: DEFAULT_URL.to_string(),
            api_token: None,
        }
    }

    /// Set the server URL, builder style
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the bearer token, builder style
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// The configured server URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replace the server URL
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    /// The configured bearer token
    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    /// Fetch all dataset groups from the configured server
    ///
    /// # Errors
    ///
    /// Transport and server failures are returned as reported by the transport.
    pub async fn fetch_dataset_metadata_groups(
        &self,
    ) -> Result<MetadataList<DatasetMetadataGroup>> {
        self.transport
            .fetch_metadata(MetadataRequest {
                url: &self.url,
                api_token: self.api_token.as_deref(),
            })
            .await
    }
}
