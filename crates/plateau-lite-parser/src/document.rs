// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CityJSON document decoding into an indexed object tree

use plateau_lite_model::{LoadOptions, ParseError};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Deserialize)]
struct RawDocument {
    #[serde(rename = "type")]
    doc_type: String,
    #[serde(rename = "CityObjects")]
    city_objects: Map<String, Value>,
    #[serde(default)]
    vertices: Vec<[f64; 3]>,
    #[serde(default)]
    transform: Option<Transform>,
}

#[derive(Deserialize)]
struct Transform {
    scale: [f64; 3],
    translate: [f64; 3],
}

#[derive(Deserialize)]
struct RawCityObject {
    #[serde(rename = "type")]
    object_type: String,
    #[serde(default)]
    attributes: Map<String, Value>,
    #[serde(default)]
    children: Vec<String>,
    #[serde(default)]
    parents: Vec<String>,
    #[serde(default)]
    geometry: Vec<RawGeometry>,
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    geometry_type: String,
    #[serde(default)]
    boundaries: Value,
}

type Ring = Vec<u32>;
type Surface = Vec<Ring>;
type Shell = Vec<Surface>;
type Solid = Vec<Shell>;

/// One decoded city object
#[derive(Debug)]
pub(crate) struct DocumentObject {
    pub(crate) id: String,
    pub(crate) object_type: String,
    pub(crate) attributes: Map<String, Value>,
    pub(crate) children: Vec<usize>,
    /// Outer rings of every surface, as indices into the document vertices
    pub(crate) outer_rings: Vec<Ring>,
}

impl DocumentObject {
    /// The `name` attribute when it is a string, otherwise the object id
    pub(crate) fn title(&self) -> &str {
        match self.attributes.get("name") {
            Some(Value::String(name)) => name,
            _ => &self.id,
        }
    }

    /// Attribute value rendered as a string; `None` for missing or null values
    pub(crate) fn attribute(&self, name: &str) -> Option<String> {
        match self.attributes.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// A CityJSON document decoded into a tree of objects
#[derive(Debug)]
pub struct Document {
    pub(crate) objects: Vec<DocumentObject>,
    pub(crate) roots: Vec<usize>,
    pub(crate) vertices: Vec<[f64; 3]>,
}

impl Document {
    /// Decode CityJSON content
    ///
    /// Root objects are the objects without a parent, in document order.
    /// Every object may have at most one parent and every reference must
    /// resolve; anything else is rejected.
    pub fn parse(content: &[u8], options: &LoadOptions) -> Result<Self, ParseError> {
        let raw: RawDocument =
            serde_json::from_slice(content).map_err(|e| ParseError::Json(e.to_string()))?;
        if raw.doc_type != "CityJSON" {
            return Err(ParseError::UnsupportedType(raw.doc_type));
        }

        let index: FxHashMap<&str, usize> = raw
            .city_objects
            .keys()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();
        let lookup = |object: &str, target: &str| {
            index
                .get(target)
                .copied()
                .ok_or_else(|| ParseError::reference(object, target))
        };

        let mut objects = Vec::with_capacity(raw.city_objects.len());
        let mut parent_of: Vec<Option<usize>> = vec![None; raw.city_objects.len()];
        let mut child_links = Vec::new();

        for (i, (id, value)) in raw.city_objects.iter().enumerate() {
            let object: RawCityObject = serde_json::from_value(value.clone())
                .map_err(|e| ParseError::format(format!("city object {id}: {e}")))?;

            for child in &object.children {
                child_links.push((i, lookup(id, child)?));
            }
            for parent in &object.parents {
                child_links.push((lookup(id, parent)?, i));
            }

            let outer_rings = if options.ignore_geometries {
                Vec::new()
            } else {
                outer_rings(id, &object.geometry, raw.vertices.len())?
            };

            objects.push(DocumentObject {
                id: id.clone(),
                object_type: object.object_type,
                attributes: object.attributes,
                children: Vec::new(),
                outer_rings,
            });
        }

        // `children` and `parents` usually describe the same edge twice
        for (parent, child) in child_links {
            match parent_of[child] {
                Some(existing) if existing == parent => continue,
                Some(_) => {
                    return Err(ParseError::reference(
                        &objects[child].id,
                        &objects[parent].id,
                    ))
                }
                None => {
                    parent_of[child] = Some(parent);
                    objects[parent].children.push(child);
                }
            }
        }

        let roots: Vec<usize> = (0..objects.len())
            .filter(|&i| parent_of[i].is_none())
            .collect();
        check_reachable(&objects, &roots)?;

        let vertices = match raw.transform {
            Some(t) => raw
                .vertices
                .iter()
                .map(|v| {
                    [
                        v[0] * t.scale[0] + t.translate[0],
                        v[1] * t.scale[1] + t.translate[1],
                        v[2] * t.scale[2] + t.translate[2],
                    ]
                })
                .collect(),
            None => raw.vertices,
        };

        Ok(Self {
            objects,
            roots,
            vertices,
        })
    }

    /// Number of city objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the document has no city objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Ids of the root objects, in document order
    pub fn root_ids(&self) -> Vec<&str> {
        self.roots
            .iter()
            .map(|&i| self.objects[i].id.as_str())
            .collect()
    }
}

/// Objects that hang off a parent cycle are never reached from a root
fn check_reachable(objects: &[DocumentObject], roots: &[usize]) -> Result<(), ParseError> {
    let mut visited = vec![false; objects.len()];
    let mut stack: Vec<usize> = roots.to_vec();
    while let Some(i) = stack.pop() {
        visited[i] = true;
        stack.extend(objects[i].children.iter().copied());
    }
    match visited.iter().position(|seen| !seen) {
        Some(i) => Err(ParseError::reference(&objects[i].id, "parent cycle")),
        None => Ok(()),
    }
}

fn outer_rings(
    id: &str,
    geometries: &[RawGeometry],
    vertex_count: usize,
) -> Result<Vec<Ring>, ParseError> {
    let bad = |e: serde_json::Error| ParseError::format(format!("geometry of {id}: {e}"));
    let mut rings = Vec::new();

    for geometry in geometries {
        let surfaces: Vec<Surface> = match geometry.geometry_type.as_str() {
            "MultiSurface" | "CompositeSurface" => {
                serde_json::from_value(geometry.boundaries.clone()).map_err(bad)?
            }
            "Solid" => {
                let solid: Solid =
                    serde_json::from_value(geometry.boundaries.clone()).map_err(bad)?;
                solid.into_iter().take(1).flatten().collect()
            }
            "MultiSolid" | "CompositeSolid" => {
                let solids: Vec<Solid> =
                    serde_json::from_value(geometry.boundaries.clone()).map_err(bad)?;
                solids
                    .into_iter()
                    .flat_map(|solid| solid.into_iter().take(1).flatten())
                    .collect()
            }
            // Points and lines carry no polygons
            _ => continue,
        };

        for surface in surfaces {
            if let Some(outer) = surface.into_iter().next() {
                if let Some(&v) = outer.iter().find(|&&v| v as usize >= vertex_count) {
                    return Err(ParseError::format(format!(
                        "geometry of {id} references vertex {v} of {vertex_count}"
                    )));
                }
                rings.push(outer);
            }
        }
    }
    Ok(rings)
}
