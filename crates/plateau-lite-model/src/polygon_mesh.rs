// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Owned polygon mesh hierarchy
//!
//! A [`Model`] holds root [`Node`]s; each node has a name, an optional
//! [`Mesh`] and zero or more child nodes. Game engines map nodes to game
//! objects and meshes to their renderable geometry.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Triangle mesh attached to a node
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions
    pub vertices: Vec<[f64; 3]>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a mesh from vertices and triangle indices
    pub fn new(vertices: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append another mesh, offsetting its indices
    pub fn merge(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }
}

/// Node in the polygon mesh hierarchy
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Display name, typically the city object id
    pub name: String,
    /// Mesh owned by this node
    pub mesh: Option<Mesh>,
    /// Child nodes
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node without a mesh
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: None,
            children: Vec::new(),
        }
    }

    /// Create a node owning a mesh
    pub fn with_mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self {
            name: name.into(),
            mesh: Some(mesh),
            children: Vec::new(),
        }
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Add an empty child node and return it for further building
    pub fn add_empty_child(&mut self, name: impl Into<String>) -> &mut Node {
        self.children.push(Node::new(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Child at `index`
    pub fn child_at(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// True when this node has a mesh with at least one vertex and one index
    pub fn polygon_exists(&self) -> bool {
        self.mesh
            .as_ref()
            .is_some_and(|m| !m.vertices.is_empty() && !m.indices.is_empty())
    }

    /// Recursively remove children that have no children and no polygons
    ///
    /// Children are pruned bottom-up, so a subtree that only contains empty
    /// nodes disappears entirely.
    pub fn erase_empty_children(&mut self) {
        self.children.retain_mut(|child| {
            child.erase_empty_children();
            child.child_count() > 0 || child.polygon_exists()
        });
    }

    /// Iterate all nodes in this subtree (depth-first)
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter { stack: vec![self] }
    }

    /// Write an indented description of this subtree
    pub fn debug_string(&self, out: &mut String, indent: usize) {
        push_indent(out, indent);
        let _ = writeln!(out, "Node: {}", self.name);
        push_indent(out, indent + 1);
        match &self.mesh {
            Some(mesh) => {
                let _ = writeln!(
                    out,
                    "Mesh: {} vertices, {} triangles",
                    mesh.vertices.len(),
                    mesh.triangle_count()
                );
            }
            None => out.push_str("No Mesh\n"),
        }
        for child in &self.children {
            child.debug_string(out, indent + 1);
        }
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("    ");
    }
}

/// Iterator over nodes (depth-first)
pub struct NodeIter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reverse so the first child comes out first
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

/// Root of a polygon mesh hierarchy
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Top-level nodes
    pub root_nodes: Vec<Node>,
}

impl Model {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a root node
    pub fn add_node(&mut self, node: Node) {
        self.root_nodes.push(node);
    }

    /// Number of root nodes
    pub fn root_node_count(&self) -> usize {
        self.root_nodes.len()
    }

    /// Root node at `index`
    pub fn root_node_at(&self, index: usize) -> Option<&Node> {
        self.root_nodes.get(index)
    }

    /// Remove empty nodes everywhere, including empty roots
    pub fn erase_empty_nodes(&mut self) {
        self.root_nodes.retain_mut(|node| {
            node.erase_empty_children();
            node.child_count() > 0 || node.polygon_exists()
        });
    }

    /// Iterate every node of every root (depth-first)
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.root_nodes.iter().flat_map(Node::iter)
    }

    /// Indented description of the whole hierarchy
    pub fn debug_string(&self) -> String {
        let mut out = String::new();
        for node in &self.root_nodes {
            node.debug_string(&mut out, 0);
        }
        out
    }
}
