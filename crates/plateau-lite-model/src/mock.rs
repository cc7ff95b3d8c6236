// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory backend with call counters for accessor tests

use crate::{
    CityModelBackend, LoadOptions, ModelHandle, NativeResult, NativeStatus, ObjectHandle,
    ParseError,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

const MODEL: ModelHandle = ModelHandle(1);

struct MockObject {
    title: String,
    children: Vec<usize>,
}

#[derive(Default)]
struct Failures {
    next_count: Option<NativeStatus>,
    next_fetch: Option<NativeStatus>,
    next_child_count: Option<NativeStatus>,
    next_child_fetch: Option<NativeStatus>,
    titles: Option<NativeStatus>,
    free: Option<NativeStatus>,
}

#[derive(Default)]
pub(crate) struct MockBackend {
    objects: Mutex<Vec<MockObject>>,
    roots: Mutex<Vec<usize>>,
    failures: Mutex<Failures>,
    immutable: bool,
    root_count_calls: AtomicUsize,
    root_fetch_calls: AtomicUsize,
    child_count_calls: AtomicUsize,
    title_calls: AtomicUsize,
    free_calls: AtomicUsize,
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_immutable_attributes(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Add a root object with leaf children
    pub(crate) fn add_root(&self, title: &str, children: &[&str]) {
        let mut objects = self.objects.lock();
        let root = objects.len();
        objects.push(MockObject {
            title: title.to_string(),
            children: Vec::new(),
        });
        for child in children {
            let index = objects.len();
            objects.push(MockObject {
                title: (*child).to_string(),
                children: Vec::new(),
            });
            objects[root].children.push(index);
        }
        self.roots.lock().push(root);
    }

    pub(crate) fn fail_next_count(&self, status: NativeStatus) {
        self.failures.lock().next_count = Some(status);
    }

    pub(crate) fn fail_next_fetch(&self, status: NativeStatus) {
        self.failures.lock().next_fetch = Some(status);
    }

    pub(crate) fn fail_next_child_count(&self, status: NativeStatus) {
        self.failures.lock().next_child_count = Some(status);
    }

    pub(crate) fn fail_next_child_fetch(&self, status: NativeStatus) {
        self.failures.lock().next_child_fetch = Some(status);
    }

    pub(crate) fn fail_titles(&self, status: NativeStatus) {
        self.failures.lock().titles = Some(status);
    }

    pub(crate) fn fail_free(&self, status: NativeStatus) {
        self.failures.lock().free = Some(status);
    }

    pub(crate) fn root_count_calls(&self) -> usize {
        self.root_count_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn root_fetch_calls(&self) -> usize {
        self.root_fetch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn child_count_calls(&self) -> usize {
        self.child_count_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn title_calls(&self) -> usize {
        self.title_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn free_calls(&self) -> usize {
        self.free_calls.load(Ordering::SeqCst)
    }

    fn index(&self, object: ObjectHandle) -> NativeResult<usize> {
        let index = usize::try_from(object.0).map_err(|_| NativeStatus::InvalidHandle)?;
        if index < self.objects.lock().len() {
            Ok(index)
        } else {
            Err(NativeStatus::InvalidHandle)
        }
    }

    fn fill(source: &[usize], buffer: &mut [ObjectHandle]) -> NativeResult<()> {
        if buffer.len() != source.len() {
            return Err(NativeStatus::InvalidArgument);
        }
        for (slot, index) in buffer.iter_mut().zip(source) {
            *slot = ObjectHandle(*index as u64);
        }
        Ok(())
    }
}

impl CityModelBackend for MockBackend {
    fn load(&self, _content: &[u8], _options: &LoadOptions) -> Result<ModelHandle, ParseError> {
        Ok(MODEL)
    }

    fn root_city_object_count(&self, _model: ModelHandle) -> NativeResult<usize> {
        self.root_count_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.failures.lock().next_count.take() {
            return Err(status);
        }
        Ok(self.roots.lock().len())
    }

    fn root_city_objects(
        &self,
        _model: ModelHandle,
        buffer: &mut [ObjectHandle],
    ) -> NativeResult<()> {
        self.root_fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.failures.lock().next_fetch.take() {
            return Err(status);
        }
        Self::fill(&self.roots.lock(), buffer)
    }

    fn child_count(&self, object: ObjectHandle) -> NativeResult<usize> {
        self.child_count_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.failures.lock().next_child_count.take() {
            return Err(status);
        }
        let index = self.index(object)?;
        Ok(self.objects.lock()[index].children.len())
    }

    fn children(&self, object: ObjectHandle, buffer: &mut [ObjectHandle]) -> NativeResult<()> {
        if let Some(status) = self.failures.lock().next_child_fetch.take() {
            return Err(status);
        }
        let index = self.index(object)?;
        Self::fill(&self.objects.lock()[index].children, buffer)
    }

    fn title(&self, object: ObjectHandle) -> NativeResult<String> {
        self.title_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.failures.lock().titles {
            return Err(status);
        }
        let index = self.index(object)?;
        Ok(self.objects.lock()[index].title.clone())
    }

    fn gml_id(&self, object: ObjectHandle) -> NativeResult<String> {
        Ok(format!("obj-{}", self.index(object)?))
    }

    fn object_type(&self, object: ObjectHandle) -> NativeResult<String> {
        self.index(object)?;
        Ok("Building".to_string())
    }

    fn attribute(&self, object: ObjectHandle, name: &str) -> NativeResult<Option<String>> {
        let index = self.index(object)?;
        Ok((name == "name").then(|| self.objects.lock()[index].title.clone()))
    }

    fn free(&self, _model: ModelHandle) -> NativeResult<()> {
        self.free_calls.fetch_add(1, Ordering::SeqCst);
        match self.failures.lock().free {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }

    fn attributes_immutable(&self) -> bool {
        self.immutable
    }
}
