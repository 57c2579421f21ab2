//! Spawn point extraction.
//!
//! Spawn points are authored as marker nodes following a naming convention:
//! a marker named exactly `SpawnPoint` is the zone's default spawn, and
//! markers like `SpawnPoint North Gate` or `boss_spawn_point` become named
//! spawns. Every zone ends up with exactly one default spawn, synthesizing
//! one at the origin if the scene has no markers at all.

use serde::{Deserialize, Serialize};

use crate::scene::{NodeKind, SceneNode, WorldTransform};

/// One resolved spawn location in world coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub is_default: bool,
}

/// Collect spawn markers from a zone's scene tree.
pub fn extract_spawn_points(root: &SceneNode) -> Vec<SpawnPoint> {
    let mut points = Vec::new();
    walk(root, WorldTransform::identity(), &mut points);

    if points.is_empty() {
        // Guarantee at least one valid spawn, lifted off the ground
        return vec![SpawnPoint {
            name: "default".to_string(),
            x: 0.0,
            y: 1.0,
            z: 0.0,
            is_default: true,
        }];
    }

    // Exactly one default: promote the first entry when none is marked,
    // demote everything after the first marked one
    match points.iter().position(|p| p.is_default) {
        None => points[0].is_default = true,
        Some(first) => {
            for p in &mut points[first + 1..] {
                p.is_default = false;
            }
        }
    }
    points
}

fn walk(node: &SceneNode, parent: WorldTransform, out: &mut Vec<SpawnPoint>) {
    let world = parent.child(node);
    if matches!(node.kind, NodeKind::Marker) && is_spawn_name(&node.name) {
        out.push(SpawnPoint {
            name: spawn_name(&node.name),
            x: world.position[0],
            y: world.position[1],
            z: world.position[2],
            is_default: node.name == "SpawnPoint",
        });
    }
    for child in &node.children {
        walk(child, world, out);
    }
}

fn is_spawn_name(name: &str) -> bool {
    name.contains("SpawnPoint") || name.to_lowercase().contains("spawn_point")
}

/// Derive the spawn name by stripping the literal marker prefix; markers
/// carrying no extra text become `"default"`
fn spawn_name(node_name: &str) -> String {
    let stripped = node_name.replace("SpawnPoint", "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        "default".to_string()
    } else {
        trimmed.to_string()
    }
}
