// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PLATEAU-Lite Network - Dataset metadata client
//!
//! Fetches the list of downloadable PLATEAU datasets, grouped by region.
//! Requests go through a [`MetadataTransport`]; the default is a reqwest
//! based [`HttpTransport`], and any executor can drive the returned futures.
//!
//! # Example
//!
//! ```ignore
//! use plateau_lite_network::Client;
//!
//! let client = Client::new();
//! let groups = client.fetch_dataset_metadata_groups().await?;
//! for group in &groups {
//!     println!("{} ({} datasets)", group.title, group.datasets.len());
//! }
//! ```

mod client;
mod error;
pub mod transport;
pub mod types;

pub use client::{Client, ClientConfig, DEFAULT_URL};
pub use error::{Error, Result};
pub use transport::{HttpTransport, MetadataRequest, MetadataTransport};
pub use types::{DatasetMetadata, DatasetMetadataGroup, MetadataList};
