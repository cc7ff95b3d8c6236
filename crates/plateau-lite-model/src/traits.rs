// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Backend trait for loading city models and walking their object trees
//!
//! A backend owns the actual parsed data. The accessors in this crate only
//! ever see integer handles and status codes coming back across this trait.

use crate::{LoadOptions, ModelHandle, NativeStatus, ObjectHandle, ParseError};

/// Result of a single backend call
pub type NativeResult<T> = std::result::Result<T, NativeStatus>;

/// Loader and tree-walking interface implemented by a city model backend
///
/// Every call is synchronous and assumed to complete promptly. Enumeration
/// follows a count-then-fill protocol: the caller asks for a count, allocates
/// a buffer of exactly that many handles, and asks the backend to fill it.
///
/// # Example
///
/// ```ignore
/// use plateau_lite_model::{CityModel, CityModelBackend, LoadOptions};
///
/// let backend: Arc<dyn CityModelBackend> = get_backend();
/// let model = CityModel::load(backend, content, &LoadOptions::default())?;
/// for object in model.root_city_objects()? {
///     println!("{}", object.title()?);
/// }
/// ```
pub trait CityModelBackend: Send + Sync {
    /// Parse content and register the resulting city model
    ///
    /// # Returns
    /// A handle that stays valid until [`free`](Self::free) is called with it
    fn load(&self, content: &[u8], options: &LoadOptions) -> Result<ModelHandle, ParseError>;

    /// Number of top-level city objects in a model
    fn root_city_object_count(&self, model: ModelHandle) -> NativeResult<usize>;

    /// Fill `buffer` with the model's top-level object handles, in document order
    ///
    /// `buffer.len()` must equal the count reported by
    /// [`root_city_object_count`](Self::root_city_object_count).
    fn root_city_objects(&self, model: ModelHandle, buffer: &mut [ObjectHandle])
        -> NativeResult<()>;

    /// Number of direct children of a city object
    fn child_count(&self, object: ObjectHandle) -> NativeResult<usize>;

    /// Fill `buffer` with the object's direct children, in document order
    fn children(&self, object: ObjectHandle, buffer: &mut [ObjectHandle]) -> NativeResult<()>;

    /// Display title of a city object
    fn title(&self, object: ObjectHandle) -> NativeResult<String>;

    /// Document identifier (gml:id) of a city object
    fn gml_id(&self, object: ObjectHandle) -> NativeResult<String>;

    /// Type name of a city object (e.g. "Building")
    fn object_type(&self, object: ObjectHandle) -> NativeResult<String>;

    /// String value of a named attribute, `None` if the object has no such attribute
    fn attribute(&self, object: ObjectHandle, name: &str) -> NativeResult<Option<String>>;

    /// Destroy a loaded model
    ///
    /// Called at most once per handle by [`CityModel`](crate::CityModel).
    fn free(&self, model: ModelHandle) -> NativeResult<()>;

    /// Whether attribute values can never change after load
    ///
    /// When true, accessors may cache attribute values after the first read.
    fn attributes_immutable(&self) -> bool {
        false
    }
}
