//! Authored scene description.
//!
//! Zones are authored as a node tree saved to JSON: groups for structure,
//! static collision bodies carrying one or more collision shapes, CSG solids
//! with an on/off collision flag, and point markers (spawn points). The
//! tree is loaded into memory for extraction and dropped when the zone is
//! done, so peak memory stays at one zone's worth of scene data.
//!
//! Rotation is carried for completeness but footprint extraction ignores it;
//! only translation and scale participate in world-transform accumulation.

use std::error::Error;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// One node in the authored scene tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
    #[serde(default)]
    pub rotation_degrees: [f64; 3],
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

/// What a node is, beyond its transform and children.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Pure grouping node
    Group,
    /// Static collision body with attached shapes
    StaticBody { shapes: Vec<CollisionShape> },
    /// Solid-geometry node; contributes collision only when enabled
    CsgSolid {
        shape: CollisionShape,
        collision_enabled: bool,
    },
    /// Point of interest (spawn points use this)
    Marker,
}

/// Collision shape primitives attached to bodies and CSG solids.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum CollisionShape {
    Box { half_extents: [f64; 3] },
    Sphere { radius: f64 },
    Cylinder { radius: f64, height: f64 },
    Capsule { radius: f64, height: f64 },
    ConvexMesh { points: Vec<[f64; 3]> },
    ConcaveMesh { vertices: Vec<[f64; 3]> },
    /// Infinite plane, no meaningful 2D footprint
    Plane,
}

impl SceneNode {
    /// Load a scene tree from a JSON file.
    pub fn load(path: &Path) -> Result<SceneNode, Box<dyn Error>> {
        let json = std::fs::read_to_string(path)?;
        let root = serde_json::from_str(&json)?;
        Ok(root)
    }
}

/// Accumulated translation and scale along a path from the root.
///
/// Child world position is `parent_pos + parent_scale * local_pos`
/// (component-wise); scales multiply component-wise.
#[derive(Clone, Copy, Debug)]
pub struct WorldTransform {
    pub position: [f64; 3],
    pub scale: [f64; 3],
}

impl WorldTransform {
    pub fn identity() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    /// Apply a child node's local transform on top of this one
    pub fn child(&self, node: &SceneNode) -> Self {
        Self {
            position: [
                self.position[0] + self.scale[0] * node.position[0],
                self.position[1] + self.scale[1] * node.position[1],
                self.position[2] + self.scale[2] * node.position[2],
            ],
            scale: [
                self.scale[0] * node.scale[0],
                self.scale[1] * node.scale[1],
                self.scale[2] * node.scale[2],
            ],
        }
    }
}
