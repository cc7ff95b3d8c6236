// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handle registry implementing `CityModelBackend` over CityJSON documents

use crate::document::{Document, DocumentObject};
use parking_lot::RwLock;
use plateau_lite_model::{
    CityModelBackend, LoadOptions, ModelHandle, NativeResult, NativeStatus, ObjectHandle,
    ParseError,
};
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// CityJSON backend that keeps loaded documents behind integer handles
///
/// Object handles pack the model handle into the upper 32 bits and the
/// object's document index into the lower 32 bits.
pub struct CityJsonParser {
    models: RwLock<FxHashMap<u32, Arc<Document>>>,
    next_handle: AtomicU32,
}

impl CityJsonParser {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            models: RwLock::new(FxHashMap::default()),
            next_handle: AtomicU32::new(1),
        }
    }

    /// Number of models currently loaded
    pub fn loaded_count(&self) -> usize {
        self.models.read().len()
    }

    fn model_key(model: ModelHandle) -> NativeResult<u32> {
        u32::try_from(model.0).map_err(|_| NativeStatus::InvalidHandle)
    }

    fn document(&self, model: ModelHandle) -> NativeResult<Arc<Document>> {
        let key = Self::model_key(model)?;
        self.models
            .read()
            .get(&key)
            .cloned()
            .ok_or(NativeStatus::InvalidHandle)
    }

    fn object_handle(model: u32, index: usize) -> ObjectHandle {
        ObjectHandle((u64::from(model) << 32) | index as u64)
    }

    /// Resolve an object handle and run `f` on the object
    fn with_object<T>(
        &self,
        object: ObjectHandle,
        f: impl FnOnce(&Document, &DocumentObject) -> T,
    ) -> NativeResult<T> {
        let model = (object.0 >> 32) as u32;
        let index = (object.0 & u64::from(u32::MAX)) as usize;
        let document = self.document(ModelHandle(u64::from(model)))?;
        let entry = document
            .objects
            .get(index)
            .ok_or(NativeStatus::InvalidHandle)?;
        Ok(f(&document, entry))
    }

    fn fill(model: u32, source: &[usize], buffer: &mut [ObjectHandle]) -> NativeResult<()> {
        if buffer.len() != source.len() {
            return Err(NativeStatus::InvalidArgument);
        }
        for (slot, &index) in buffer.iter_mut().zip(source) {
            *slot = Self::object_handle(model, index);
        }
        Ok(())
    }
}

impl Default for CityJsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CityModelBackend for CityJsonParser {
    fn load(&self, content: &[u8], options: &LoadOptions) -> Result<ModelHandle, ParseError> {
        let document = Document::parse(content, options)?;
        let mut models = self.models.write();
        // Keys wrap around; 0 is never issued and live keys are skipped
        let key = loop {
            if models.len() >= u32::MAX as usize {
                return Err(ParseError::other("model handle space exhausted"));
            }
            let key = self.next_handle.fetch_add(1, Ordering::Relaxed);
            if key != 0 && !models.contains_key(&key) {
                break key;
            }
        };
        tracing::debug!(
            handle = key,
            objects = document.len(),
            roots = document.roots.len(),
            "registered CityJSON document"
        );
        models.insert(key, Arc::new(document));
        Ok(ModelHandle(u64::from(key)))
    }

    fn root_city_object_count(&self, model: ModelHandle) -> NativeResult<usize> {
        Ok(self.document(model)?.roots.len())
    }

    fn root_city_objects(
        &self,
        model: ModelHandle,
        buffer: &mut [ObjectHandle],
    ) -> NativeResult<()> {
        let document = self.document(model)?;
        Self::fill(Self::model_key(model)?, &document.roots, buffer)
    }

    fn child_count(&self, object: ObjectHandle) -> NativeResult<usize> {
        self.with_object(object, |_, entry| entry.children.len())
    }

    fn children(&self, object: ObjectHandle, buffer: &mut [ObjectHandle]) -> NativeResult<()> {
        let model = (object.0 >> 32) as u32;
        self.with_object(object, |_, entry| Self::fill(model, &entry.children, buffer))?
    }

    fn title(&self, object: ObjectHandle) -> NativeResult<String> {
        self.with_object(object, |_, entry| entry.title().to_string())
    }

    fn gml_id(&self, object: ObjectHandle) -> NativeResult<String> {
        self.with_object(object, |_, entry| entry.id.clone())
    }

    fn object_type(&self, object: ObjectHandle) -> NativeResult<String> {
        self.with_object(object, |_, entry| entry.object_type.clone())
    }

    fn attribute(&self, object: ObjectHandle, name: &str) -> NativeResult<Option<String>> {
        self.with_object(object, |_, entry| entry.attribute(name))
    }

    fn free(&self, model: ModelHandle) -> NativeResult<()> {
        let key = Self::model_key(model)?;
        match self.models.write().remove(&key) {
            Some(_) => Ok(()),
            None => Err(NativeStatus::InvalidHandle),
        }
    }

    fn attributes_immutable(&self) -> bool {
        true
    }
}
