// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PLATEAU-Lite Parser - CityJSON backend
//!
//! This crate loads CityJSON documents and serves them through the
//! `CityModelBackend` trait from `plateau-lite-model`, so they can be walked
//! with `CityModel` and `CityObject`.
//!
//! # Example
//!
//! ```ignore
//! use plateau_lite_parser::CityJsonParser;
//! use plateau_lite_model::{CityModel, LoadOptions};
//!
//! let parser = Arc::new(CityJsonParser::new());
//! let model = CityModel::load(parser, content, &LoadOptions::default())?;
//! println!("Found {} root objects", model.root_city_objects()?.len());
//! ```

mod document;
mod mesh;
mod registry;

pub use document::Document;
pub use registry::CityJsonParser;

use plateau_lite_model::polygon_mesh::Model;
use plateau_lite_model::{LoadOptions, ParseError};

/// Decode CityJSON content straight into a polygon mesh hierarchy
pub fn mesh_model(content: &[u8], options: &LoadOptions) -> Result<Model, ParseError> {
    let document = Document::parse(content, options)?;
    Ok(mesh::build_model(&document))
}

#[cfg(test)]
pub(crate) const SAMPLE: &str = r#"{
    "type": "CityJSON",
    "version": "1.1",
    "transform": { "scale": [0.5, 0.5, 1.0], "translate": [100.0, 200.0, 0.0] },
    "CityObjects": {
        "tokyo": {
            "type": "Building",
            "attributes": { "name": "東京都", "measuredHeight": 12.5 },
            "children": ["tokyo-part"]
        },
        "osaka": { "type": "Building", "attributes": { "name": "大阪府" } },
        "tokyo-part": { "type": "BuildingPart", "parents": ["tokyo"],
            "geometry": [{ "type": "MultiSurface", "lod": "2", "boundaries": [[[0, 1, 2, 3]]] }] }
    },
    "vertices": [[0, 0, 0], [2, 0, 0], [2, 2, 0], [0, 2, 0]]
}"#;
