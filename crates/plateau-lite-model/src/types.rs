// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types shared between the accessors and backends
//!
//! Handles are plain integer tokens issued by a backend. They carry no
//! meaning on this side of the boundary beyond identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque token identifying one loaded city model inside a backend
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct ModelHandle(pub u64);

impl fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model:{}", self.0)
    }
}

impl From<u64> for ModelHandle {
    fn from(raw: u64) -> Self {
        ModelHandle(raw)
    }
}

impl From<ModelHandle> for u64 {
    fn from(handle: ModelHandle) -> Self {
        handle.0
    }
}

/// Opaque token identifying one city object inside a loaded model
///
/// The default value is only used to pre-size fetch buffers; backends
/// overwrite every slot before returning success.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct ObjectHandle(pub u64);

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object:{}", self.0)
    }
}

impl From<u64> for ObjectHandle {
    fn from(raw: u64) -> Self {
        ObjectHandle(raw)
    }
}

impl From<ObjectHandle> for u64 {
    fn from(handle: ObjectHandle) -> Self {
        handle.0
    }
}

/// Options passed to a backend when loading a city model
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Skip geometry while loading; only the object tree and attributes are kept
    pub ignore_geometries: bool,
}

impl LoadOptions {
    /// Set whether geometry is skipped
    pub fn with_ignore_geometries(mut self, ignore: bool) -> Self {
        self.ignore_geometries = ignore;
        self
    }
}

/// Populate state of a lazily enumerated sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// No enumeration query has succeeded yet
    Unpopulated,
    /// The sequence has been fetched and is fixed for the owner's lifetime
    Populated,
}
