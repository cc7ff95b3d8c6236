// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Accessor for one node in a city model's object tree

use crate::cache::PopulateOnce;
use crate::city_model::ModelShared;
use crate::{CacheState, Error, ObjectHandle, Result};
use std::fmt;
use std::sync::{Arc, Weak};

/// Count, allocate, fill, then wrap every handle as a [`CityObject`]
pub(crate) fn fetch_objects(
    shared: &Arc<ModelShared>,
    count: impl FnOnce() -> Result<usize>,
    fill: impl FnOnce(&mut [ObjectHandle]) -> Result<()>,
) -> Result<Vec<CityObject>> {
    let count = count()?;
    let mut handles = vec![ObjectHandle::default(); count];
    fill(&mut handles)?;
    Ok(handles
        .into_iter()
        .map(|handle| CityObject::wrap(Arc::downgrade(shared), handle))
        .collect())
}

/// One city object (building, building part, ...) inside a [`CityModel`](crate::CityModel)
///
/// An object does not keep its model alive. Once the model is released or
/// dropped, every accessor returns [`Error::UseAfterRelease`].
#[derive(Clone)]
pub struct CityObject {
    handle: ObjectHandle,
    model: Weak<ModelShared>,
    children: PopulateOnce<Vec<CityObject>>,
    title: PopulateOnce<String>,
}

impl CityObject {
    pub(crate) fn wrap(model: Weak<ModelShared>, handle: ObjectHandle) -> Self {
        Self {
            handle,
            model,
            children: PopulateOnce::new(),
            title: PopulateOnce::new(),
        }
    }

    /// Upgrade the back-reference and check the model has not been released
    fn live(&self) -> Result<Arc<ModelShared>> {
        let shared = self.model.upgrade().ok_or(Error::UseAfterRelease)?;
        shared.ensure_live()?;
        Ok(shared)
    }

    /// The backend handle of this object
    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    /// Populate state of the child cache
    pub fn child_state(&self) -> CacheState {
        self.children.state()
    }

    /// Display title
    ///
    /// Queried on every call unless the backend declares attributes immutable.
    pub fn title(&self) -> Result<String> {
        let shared = self.live()?;
        let query = || {
            shared
                .backend
                .title(self.handle)
                .map_err(|status| Error::native("city_object_get_title", status))
        };
        if shared.backend.attributes_immutable() {
            return self.title.get_or_try_populate(query).cloned();
        }
        query()
    }

    /// Document identifier (gml:id)
    pub fn id(&self) -> Result<String> {
        let shared = self.live()?;
        shared
            .backend
            .gml_id(self.handle)
            .map_err(|status| Error::native("city_object_get_id", status))
    }

    /// Type name such as "Building" or "BuildingPart"
    pub fn object_type(&self) -> Result<String> {
        let shared = self.live()?;
        shared
            .backend
            .object_type(self.handle)
            .map_err(|status| Error::native("city_object_get_type", status))
    }

    /// String value of a named attribute
    pub fn attribute(&self, name: &str) -> Result<Option<String>> {
        let shared = self.live()?;
        shared
            .backend
            .attribute(self.handle, name)
            .map_err(|status| Error::native("city_object_get_attribute", status))
    }

    /// Direct children, in document order
    ///
    /// Enumerated on first access and cached for the object's lifetime, so a
    /// large model is only materialized as far as it is walked.
    pub fn children(&self) -> Result<&[CityObject]> {
        let shared = self.live()?;
        let children = self.children.get_or_try_populate(|| {
            let backend = &shared.backend;
            let children = fetch_objects(
                &shared,
                || {
                    backend
                        .child_count(self.handle)
                        .map_err(|status| Error::native("city_object_get_child_count", status))
                },
                |buffer| {
                    backend
                        .children(self.handle, buffer)
                        .map_err(|status| Error::native("city_object_get_children", status))
                },
            )?;
            tracing::debug!(handle = %self.handle, count = children.len(), "populated children");
            Ok::<_, Error>(children)
        })?;
        Ok(children.as_slice())
    }

    /// Child at `index`
    pub fn child_at(&self, index: usize) -> Result<&CityObject> {
        let children = self.children()?;
        children.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: children.len(),
        })
    }
}

impl fmt::Debug for CityObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CityObject")
            .field("handle", &self.handle)
            .field("child_state", &self.child_state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::mock::MockBackend;
    use crate::{CacheState, CityModel, Error, LoadOptions, NativeStatus};
    use std::sync::Arc;

    fn load(backend: &Arc<MockBackend>) -> CityModel {
        CityModel::load(backend.clone(), b"mock", &LoadOptions::default()).unwrap()
    }

    #[test]
    fn test_children_lazy_and_cached() {
        let backend = Arc::new(MockBackend::new());
        backend.add_root("東京都", &["千代田区", "港区"]);
        let model = load(&backend);

        let tokyo = model.root_city_object_at(0).unwrap();
        assert_eq!(tokyo.child_state(), CacheState::Unpopulated);
        assert_eq!(backend.child_count_calls(), 0);

        let first = tokyo.children().unwrap();
        let second = tokyo.children().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(backend.child_count_calls(), 1);
        assert_eq!(first[1].title().unwrap(), "港区");
        assert_eq!(tokyo.child_state(), CacheState::Populated);
    }

    #[test]
    fn test_failed_child_count_leaves_cache_empty() {
        let backend = Arc::new(MockBackend::new());
        backend.add_root("東京都", &["千代田区", "港区"]);
        let model = load(&backend);
        let tokyo = model.root_city_object_at(0).unwrap();

        backend.fail_next_child_count(NativeStatus::IndexOutOfBounds);
        assert!(matches!(
            tokyo.children(),
            Err(Error::NativeCall {
                call: "city_object_get_child_count",
                status: NativeStatus::IndexOutOfBounds
            })
        ));
        assert_eq!(tokyo.child_state(), CacheState::Unpopulated);

        assert_eq!(tokyo.children().unwrap().len(), 2);
        assert_eq!(tokyo.child_state(), CacheState::Populated);
        assert_eq!(backend.child_count_calls(), 2);
    }

    #[test]
    fn test_failed_child_fetch_can_retry() {
        let backend = Arc::new(MockBackend::new());
        backend.add_root("東京都", &["千代田区", "港区"]);
        let model = load(&backend);
        let tokyo = model.root_city_object_at(0).unwrap();

        backend.fail_next_child_fetch(NativeStatus::Unknown);
        assert!(matches!(
            tokyo.children(),
            Err(Error::NativeCall {
                call: "city_object_get_children",
                status: NativeStatus::Unknown
            })
        ));
        assert_eq!(tokyo.child_state(), CacheState::Unpopulated);

        let children = tokyo.children().unwrap();
        assert_eq!(children[0].title().unwrap(), "千代田区");
        assert_eq!(children[1].title().unwrap(), "港区");
        assert_eq!(tokyo.child_state(), CacheState::Populated);
    }

    #[test]
    fn test_title_queried_each_call() {
        let backend = Arc::new(MockBackend::new());
        backend.add_root("大阪府", &[]);
        let model = load(&backend);

        let osaka = model.root_city_object_at(0).unwrap();
        osaka.title().unwrap();
        osaka.title().unwrap();
        assert_eq!(backend.title_calls(), 2);
    }

    #[test]
    fn test_title_cached_when_immutable() {
        let backend = Arc::new(MockBackend::new().with_immutable_attributes());
        backend.add_root("大阪府", &[]);
        let model = load(&backend);

        let osaka = model.root_city_object_at(0).unwrap();
        assert_eq!(osaka.title().unwrap(), "大阪府");
        assert_eq!(osaka.title().unwrap(), "大阪府");
        assert_eq!(backend.title_calls(), 1);
    }

    #[test]
    fn test_scalar_attributes() {
        let backend = Arc::new(MockBackend::new());
        backend.add_root("東京都", &[]);
        let model = load(&backend);

        let tokyo = model.root_city_object_at(0).unwrap();
        assert_eq!(tokyo.id().unwrap(), "obj-0");
        assert_eq!(tokyo.object_type().unwrap(), "Building");
        assert_eq!(tokyo.attribute("name").unwrap().as_deref(), Some("東京都"));
        assert_eq!(tokyo.attribute("height").unwrap(), None);
    }

    #[test]
    fn test_backend_error_propagates() {
        let backend = Arc::new(MockBackend::new());
        backend.add_root("東京都", &[]);
        let model = load(&backend);

        let tokyo = model.root_city_object_at(0).unwrap();
        backend.fail_titles(NativeStatus::ValueNotFound);
        assert!(matches!(
            tokyo.title(),
            Err(Error::NativeCall {
                call: "city_object_get_title",
                status: NativeStatus::ValueNotFound
            })
        ));
    }

    #[test]
    fn test_objects_fail_after_release() {
        let backend = Arc::new(MockBackend::new());
        backend.add_root("東京都", &["千代田区"]);
        let model = load(&backend);

        let tokyo = model.root_city_object_at(0).unwrap().clone();
        let chiyoda = tokyo.child_at(0).unwrap().clone();
        model.release();

        assert!(matches!(tokyo.title(), Err(Error::UseAfterRelease)));
        assert!(matches!(tokyo.children(), Err(Error::UseAfterRelease)));
        assert!(matches!(chiyoda.id(), Err(Error::UseAfterRelease)));
        assert!(matches!(chiyoda.attribute("name"), Err(Error::UseAfterRelease)));
        assert!(matches!(chiyoda.object_type(), Err(Error::UseAfterRelease)));
    }

    #[test]
    fn test_objects_fail_after_model_dropped() {
        let backend = Arc::new(MockBackend::new());
        backend.add_root("東京都", &[]);
        let model = load(&backend);

        let tokyo = model.root_city_object_at(0).unwrap().clone();
        drop(model);

        assert_eq!(backend.free_calls(), 1);
        assert!(matches!(tokyo.title(), Err(Error::UseAfterRelease)));
        assert!(matches!(tokyo.child_at(0), Err(Error::UseAfterRelease)));
    }

    #[test]
    fn test_child_at_out_of_range() {
        let backend = Arc::new(MockBackend::new());
        backend.add_root("東京都", &["千代田区"]);
        let model = load(&backend);

        let tokyo = model.root_city_object_at(0).unwrap();
        assert!(matches!(
            tokyo.child_at(1),
            Err(Error::IndexOutOfRange { index: 1, len: 1 })
        ));
    }
}
