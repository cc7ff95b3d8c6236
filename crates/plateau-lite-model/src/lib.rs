// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PLATEAU-Lite Model - Handle-owning accessors for 3D city models
//!
//! This crate wraps city models produced by a backend (a parser living behind
//! the [`CityModelBackend`] trait) and exposes their object trees safely.
//!
//! # Architecture
//!
//! - [`CityModelBackend`] - Loader and tree-walking interface a backend implements
//! - [`CityModel`] - Owns one model handle and frees it exactly once
//! - [`CityObject`] - One node of the object tree, lazily enumerated
//! - [`polygon_mesh`] - Owned node/mesh hierarchy for engine export
//! - [`dataset`] - Grid square mesh codes and GML file naming
//!
//! # Example
//!
//! ```ignore
//! use plateau_lite_model::{CityModel, LoadOptions};
//!
//! let model = CityModel::load(backend, content, &LoadOptions::default())?;
//! for object in model.root_city_objects()? {
//!     println!("{}: {}", object.object_type()?, object.title()?);
//!     for child in object.children()? {
//!         println!("  {}", child.title()?);
//!     }
//! }
//! ```

pub mod cache;
pub mod city_model;
pub mod city_object;
pub mod dataset;
pub mod error;
pub mod polygon_mesh;
pub mod traits;
pub mod types;

#[cfg(test)]
mod mock;

pub use cache::PopulateOnce;
pub use city_model::CityModel;
pub use city_object::CityObject;
pub use dataset::{Extent, GmlFile, MeshCode};
pub use error::*;
pub use traits::*;
pub use types::*;
