// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion of a decoded document into a polygon mesh hierarchy

use crate::document::{Document, DocumentObject};
use plateau_lite_model::polygon_mesh::{Mesh, Model, Node};
use rustc_hash::FxHashMap;

/// Build a node hierarchy mirroring the document's object tree
///
/// Each node is named after its object id. Surfaces are fan-triangulated
/// from their outer ring, so only convex planar rings come out exact.
pub fn build_model(document: &Document) -> Model {
    let mut model = Model::new();
    for &root in &document.roots {
        model.add_node(build_node(document, root));
    }
    model
}

fn build_node(document: &Document, index: usize) -> Node {
    let object = &document.objects[index];
    let mut node = match triangulate(document, object) {
        Some(mesh) => Node::with_mesh(&object.id, mesh),
        None => Node::new(&object.id),
    };
    for &child in &object.children {
        node.add_child(build_node(document, child));
    }
    node
}

fn triangulate(document: &Document, object: &DocumentObject) -> Option<Mesh> {
    if object.outer_rings.is_empty() {
        return None;
    }

    let mut mesh = Mesh::default();
    // Document vertex index -> mesh-local index
    let mut local: FxHashMap<u32, u32> = FxHashMap::default();

    for ring in &object.outer_rings {
        if ring.len() < 3 {
            continue;
        }
        let mut ids = Vec::with_capacity(ring.len());
        for &v in ring {
            let id = *local.entry(v).or_insert_with(|| {
                mesh.vertices.push(document.vertices[v as usize]);
                (mesh.vertices.len() - 1) as u32
            });
            ids.push(id);
        }
        for i in 1..ids.len() - 1 {
            mesh.indices.extend_from_slice(&[ids[0], ids[i], ids[i + 1]]);
        }
    }
    Some(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SAMPLE;
    use plateau_lite_model::LoadOptions;

    #[test]
    fn test_hierarchy_and_fan() {
        let document = Document::parse(SAMPLE.as_bytes(), &LoadOptions::default()).unwrap();
        let model = build_model(&document);

        assert_eq!(model.root_node_count(), 2);
        let tokyo = model.root_node_at(0).unwrap();
        assert_eq!(tokyo.name, "tokyo");
        assert!(tokyo.mesh.is_none());

        let part = tokyo.child_at(0).unwrap();
        let mesh = part.mesh.as_ref().unwrap();
        assert_eq!(mesh.vertices.len(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.vertices[1], [101.0, 200.0, 0.0]);
    }

    #[test]
    fn test_erase_empty_after_build() {
        let document = Document::parse(SAMPLE.as_bytes(), &LoadOptions::default()).unwrap();
        let mut model = build_model(&document);

        // osaka has neither geometry nor children
        model.erase_empty_nodes();
        assert_eq!(model.root_node_count(), 1);
        assert_eq!(model.root_node_at(0).unwrap().name, "tokyo");
    }
}
