//! Scene graph: a tree of named nodes, each placed relative to its parent.
//!
//! Node 0 is the root and is always present. Observers and primitives are
//! attached to nodes; their world placement is the composition of every
//! transform on the path to the root.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use lumen_math::{Mat4, Quat, Vec3};
use thiserror::Error;

/// Errors raised by scene graph lookups and edits.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    #[error("node {0} does not exist in this scene graph")]
    UnknownNode(NodeId),

    #[error("transform of node {0} is not invertible")]
    SingularTransform(NodeId),
}

/// Source of `SceneGraph` identities.
static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

/// Handle to a node in a `SceneGraph`.
///
/// Handles remember which graph issued them; another graph rejects them
/// even when it has a node at the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    graph: u64,
    index: usize,
}

impl NodeId {
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)
    }
}

/// Transform components that can be composed into a matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        Self {
            translation,
            rotation,
            ..Default::default()
        }
    }

    /// Place an object at `eye` with its +Z axis aimed at `target`.
    ///
    /// `up` picks the roll; it must not be parallel to the viewing axis.
    pub fn looking_at(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - eye).normalize();
        let right = up.cross(forward).normalize();
        let true_up = forward.cross(right);
        let basis = glam::Mat3::from_cols(right, true_up, forward);
        Self::from_rotation_translation(Quat::from_mat3(&basis), eye)
    }

    /// Scale, then rotate, then translate.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Clone, Debug)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    transform: Mat4,
}

/// A tree of placed nodes rooted at node 0.
///
/// Clones share the original's identity, so handles stay valid in both.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    id: u64,
    nodes: Vec<Node>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph containing only the root node.
    pub fn new() -> Self {
        Self {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            nodes: vec![Node {
                name: "root".to_string(),
                parent: None,
                transform: Mat4::IDENTITY,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        self.handle(0)
    }

    fn handle(&self, index: usize) -> NodeId {
        NodeId { graph: self.id, index }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root cannot be removed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.graph == self.id && id.index < self.nodes.len()
    }

    fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes
            .get(id.index)
            .filter(|_| id.graph == self.id)
            .ok_or(SceneError::UnknownNode(id))
    }

    /// Add a child of `parent`, placed by `transform` in the parent's space.
    pub fn add_node(&mut self, parent: NodeId, transform: &Transform, name: impl Into<String>) -> Result<NodeId, SceneError> {
        self.node(parent)?;
        let id = self.handle(self.nodes.len());
        self.nodes.push(Node {
            name: name.into(),
            parent: Some(parent),
            transform: transform.to_matrix(),
        });
        Ok(id)
    }

    pub fn name(&self, id: NodeId) -> Result<&str, SceneError> {
        Ok(&self.node(id)?.name)
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(id)?.parent)
    }

    /// Local transform relative to the parent.
    pub fn transform(&self, id: NodeId) -> Result<Mat4, SceneError> {
        Ok(self.node(id)?.transform)
    }

    pub fn set_transform(&mut self, id: NodeId, transform: &Transform) -> Result<(), SceneError> {
        let graph = self.id;
        let node = self
            .nodes
            .get_mut(id.index)
            .filter(|_| id.graph == graph)
            .ok_or(SceneError::UnknownNode(id))?;
        node.transform = transform.to_matrix();
        Ok(())
    }

    /// Matrix taking coordinates in `id`'s space to root (world) space.
    pub fn to_root(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id)?;
            matrix = node.transform * matrix;
            current = node.parent;
        }
        Ok(matrix)
    }

    /// Matrix taking world coordinates into `id`'s space.
    pub fn to_local(&self, id: NodeId) -> Result<Mat4, SceneError> {
        let matrix = self.to_root(id)?;
        if matrix.determinant().abs() <= f32::EPSILON {
            return Err(SceneError::SingularTransform(id));
        }
        Ok(matrix.inverse())
    }
}
