// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Owning wrapper around a loaded city model
//!
//! [`CityModel`] owns exactly one backend model handle. The handle is freed
//! once, either by [`CityModel::release`] or when the model is dropped,
//! whichever happens first. Root city objects are enumerated on first access
//! and cached for the model's lifetime.

use crate::cache::PopulateOnce;
use crate::city_object::{fetch_objects, CityObject};
use crate::{CacheState, CityModelBackend, Error, LoadOptions, ModelHandle, ParseError, Result};
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// State shared between a model and the objects derived from it
///
/// Objects only hold a `Weak` to this, so the model stays the sole owner.
pub(crate) struct ModelShared {
    pub(crate) handle: ModelHandle,
    pub(crate) backend: Arc<dyn CityModelBackend>,
    released: AtomicBool,
}

impl ModelShared {
    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.released.load(Ordering::Acquire) {
            return Err(Error::UseAfterRelease);
        }
        Ok(())
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Free the backend model unless another caller already did
    fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        match self.backend.free(self.handle) {
            Ok(()) => tracing::debug!(handle = %self.handle, "released city model"),
            // Release also runs from Drop, so a failed free is only reported.
            Err(status) => tracing::warn!(
                handle = %self.handle,
                %status,
                "failed to free city model"
            ),
        }
    }
}

impl Drop for ModelShared {
    fn drop(&mut self) {
        self.release();
    }
}

/// A parsed city model holding zero or more root [`CityObject`]s
///
/// # Example
///
/// ```ignore
/// let model = CityModel::load(backend, content, &LoadOptions::default())?;
/// let roots = model.root_city_objects()?;
/// println!("{} root objects", roots.len());
/// model.release();
/// ```
pub struct CityModel {
    shared: Arc<ModelShared>,
    root_city_objects: PopulateOnce<Vec<CityObject>>,
}

impl CityModel {
    /// Wrap a handle the backend has already produced
    ///
    /// The handle must be live; ownership of it moves into the returned model.
    pub fn wrap(backend: Arc<dyn CityModelBackend>, handle: ModelHandle) -> Self {
        Self {
            shared: Arc::new(ModelShared {
                handle,
                backend,
                released: AtomicBool::new(false),
            }),
            root_city_objects: PopulateOnce::new(),
        }
    }

    /// Load a city model from in-memory content
    pub fn load(
        backend: Arc<dyn CityModelBackend>,
        content: &[u8],
        options: &LoadOptions,
    ) -> std::result::Result<Self, ParseError> {
        let handle = backend.load(content, options)?;
        tracing::debug!(%handle, bytes = content.len(), "loaded city model");
        Ok(Self::wrap(backend, handle))
    }

    /// Load a city model from a file on disk
    pub fn load_file(
        backend: Arc<dyn CityModelBackend>,
        path: impl AsRef<Path>,
        options: &LoadOptions,
    ) -> std::result::Result<Self, ParseError> {
        let content = std::fs::read(path.as_ref())?;
        Self::load(backend, &content, options)
    }

    /// The backend handle owned by this model
    pub fn handle(&self) -> ModelHandle {
        self.shared.handle
    }

    /// Whether the backend model has been freed
    pub fn is_released(&self) -> bool {
        self.shared.is_released()
    }

    /// Populate state of the root object cache
    pub fn root_state(&self) -> CacheState {
        self.root_city_objects.state()
    }

    /// Top-level city objects, in document order
    ///
    /// The first successful call enumerates the backend; every later call
    /// returns the same cached slice. A failed enumeration leaves the cache
    /// empty so the call can be retried.
    pub fn root_city_objects(&self) -> Result<&[CityObject]> {
        self.shared.ensure_live()?;
        let objects = self.root_city_objects.get_or_try_populate(|| {
            let backend = &self.shared.backend;
            let handle = self.shared.handle;
            let objects = fetch_objects(
                &self.shared,
                || {
                    backend
                        .root_city_object_count(handle)
                        .map_err(|status| Error::native("get_root_city_object_count", status))
                },
                |buffer| {
                    backend
                        .root_city_objects(handle, buffer)
                        .map_err(|status| Error::native("get_root_city_objects", status))
                },
            )?;
            tracing::debug!(%handle, count = objects.len(), "populated root city objects");
            Ok::<_, Error>(objects)
        })?;
        Ok(objects.as_slice())
    }

    /// Root city object at `index`
    pub fn root_city_object_at(&self, index: usize) -> Result<&CityObject> {
        let objects = self.root_city_objects()?;
        objects.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: objects.len(),
        })
    }

    /// Free the backend model
    ///
    /// Only the first call (including the implicit one on drop) reaches the
    /// backend; later calls do nothing. Objects derived from this model fail
    /// with [`Error::UseAfterRelease`] afterwards.
    pub fn release(&self) {
        self.shared.release();
    }
}

impl fmt::Debug for CityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CityModel")
            .field("handle", &self.shared.handle)
            .field("released", &self.is_released())
            .field("root_state", &self.root_state())
            .finish()
    }
}
