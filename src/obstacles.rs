//! Obstacle footprint extraction.
//!
//! Walks a zone's scene tree and flattens 3D collision volumes into 2D
//! footprints (boxes and circles) for coarse server-side avoidance. A
//! second pass filters out ground-sized and sub-visual volumes and
//! deduplicates near-identical positions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::scene::{CollisionShape, NodeKind, SceneNode, WorldTransform};

/// Footprints with both half-extents (boxes) or a radius (circles) below
/// this are decoration clutter and dropped
pub const MIN_OBSTACLE_SIZE: f64 = 0.5;

/// Footprints with any half-extent or radius above this are ground-plane
/// sized volumes and dropped
pub const MAX_OBSTACLE_SIZE: f64 = 40.0;

// =============================================================================
// FOOTPRINT TYPES
// =============================================================================

/// A 2D obstacle footprint in world coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Obstacle {
    Box {
        center_x: f64,
        center_z: f64,
        half_width: f64,
        half_depth: f64,
    },
    Circle {
        center_x: f64,
        center_z: f64,
        radius: f64,
    },
}

// =============================================================================
// EXTRACTION
// =============================================================================

/// Recursive scene walk collecting obstacle footprints.
pub struct ObstacleExtractor {
    /// Shapes with no meaningful 2D footprint, skipped with a warning
    pub skipped_shapes: usize,
}

impl ObstacleExtractor {
    pub fn new() -> Self {
        Self { skipped_shapes: 0 }
    }

    pub fn extract(&mut self, root: &SceneNode) -> Vec<Obstacle> {
        let mut obstacles = Vec::new();
        self.walk(root, WorldTransform::identity(), &mut obstacles);
        obstacles
    }

    fn walk(&mut self, node: &SceneNode, parent: WorldTransform, out: &mut Vec<Obstacle>) {
        let world = parent.child(node);
        match &node.kind {
            NodeKind::StaticBody { shapes } => {
                // Terrain-scale bodies are handled by the heightmap, not
                // the obstacle list
                if !is_ground_name(&node.name) {
                    for shape in shapes {
                        self.project(&node.name, shape, &world, out);
                    }
                }
            }
            NodeKind::CsgSolid {
                shape,
                collision_enabled,
            } => {
                if *collision_enabled {
                    self.project(&node.name, shape, &world, out);
                }
            }
            NodeKind::Group | NodeKind::Marker => {}
        }
        for child in &node.children {
            self.walk(child, world, out);
        }
    }

    fn project(
        &mut self,
        name: &str,
        shape: &CollisionShape,
        world: &WorldTransform,
        out: &mut Vec<Obstacle>,
    ) {
        let sx = world.scale[0].abs();
        let sz = world.scale[2].abs();
        match shape {
            CollisionShape::Box { half_extents } => {
                out.push(Obstacle::Box {
                    center_x: world.position[0],
                    center_z: world.position[2],
                    half_width: half_extents[0] * sx,
                    half_depth: half_extents[2] * sz,
                });
            }
            CollisionShape::Sphere { radius }
            | CollisionShape::Cylinder { radius, .. }
            | CollisionShape::Capsule { radius, .. } => {
                out.push(Obstacle::Circle {
                    center_x: world.position[0],
                    center_z: world.position[2],
                    radius: radius * sx.max(sz),
                });
            }
            CollisionShape::ConvexMesh { points } => {
                if let Some(obstacle) = mesh_footprint(points, world) {
                    out.push(obstacle);
                }
            }
            CollisionShape::ConcaveMesh { vertices } => {
                if let Some(obstacle) = mesh_footprint(vertices, world) {
                    out.push(obstacle);
                }
            }
            CollisionShape::Plane => {
                eprintln!("Warning: skipping unsupported collision shape on '{name}'");
                self.skipped_shapes += 1;
            }
        }
    }
}

impl Default for ObstacleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-insensitive check for terrain-carrier body names
fn is_ground_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("ground") || lower.contains("floor")
}

/// Axis-aligned bounding box of the scaled mesh points, centered at the
/// box midpoint offset by the node's world position
fn mesh_footprint(points: &[[f64; 3]], world: &WorldTransform) -> Option<Obstacle> {
    if points.is_empty() {
        return None;
    }
    let sx = world.scale[0].abs();
    let sz = world.scale[2].abs();
    let mut min_x = f64::MAX;
    let mut max_x = f64::MIN;
    let mut min_z = f64::MAX;
    let mut max_z = f64::MIN;
    for p in points {
        let x = p[0] * sx;
        let z = p[2] * sz;
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_z = min_z.min(z);
        max_z = max_z.max(z);
    }
    Some(Obstacle::Box {
        center_x: world.position[0] + (min_x + max_x) * 0.5,
        center_z: world.position[2] + (min_z + max_z) * 0.5,
        half_width: (max_x - min_x) * 0.5,
        half_depth: (max_z - min_z) * 0.5,
    })
}

// =============================================================================
// FILTER + DEDUP
// =============================================================================

/// Drop out-of-range footprints, then deduplicate by kind and rounded
/// position (one decimal place). First occurrence wins; a later obstacle at
/// the same rounded position is dropped even when its size differs.
pub fn filter_dedup(obstacles: Vec<Obstacle>) -> Vec<Obstacle> {
    let mut seen: HashSet<(u8, i64, i64)> = HashSet::new();
    let mut result = Vec::new();
    for obstacle in obstacles {
        if !size_in_range(&obstacle) {
            continue;
        }
        if seen.insert(dedup_key(&obstacle)) {
            result.push(obstacle);
        }
    }
    result
}

fn size_in_range(obstacle: &Obstacle) -> bool {
    match obstacle {
        Obstacle::Box {
            half_width,
            half_depth,
            ..
        } => {
            if *half_width > MAX_OBSTACLE_SIZE || *half_depth > MAX_OBSTACLE_SIZE {
                return false;
            }
            // Both below the minimum means sub-visual clutter; one thin
            // axis alone is fine (walls)
            !(*half_width < MIN_OBSTACLE_SIZE && *half_depth < MIN_OBSTACLE_SIZE)
        }
        Obstacle::Circle { radius, .. } => {
            *radius >= MIN_OBSTACLE_SIZE && *radius <= MAX_OBSTACLE_SIZE
        }
    }
}

fn dedup_key(obstacle: &Obstacle) -> (u8, i64, i64) {
    match obstacle {
        Obstacle::Box {
            center_x, center_z, ..
        } => (0, round_decimal(*center_x), round_decimal(*center_z)),
        Obstacle::Circle {
            center_x, center_z, ..
        } => (1, round_decimal(*center_x), round_decimal(*center_z)),
    }
}

/// Round to one decimal place, stored as tenths for exact hashing
fn round_decimal(value: f64) -> i64 {
    (value * 10.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{CollisionShape, NodeKind, SceneNode};

    fn node(name: &str, position: [f64; 3], scale: [f64; 3], kind: NodeKind) -> SceneNode {
        SceneNode {
            name: name.into(),
            position,
            scale,
            rotation_degrees: [0.0, 0.0, 0.0],
            kind,
            children: vec![],
        }
    }

    fn group(name: &str, children: Vec<SceneNode>) -> SceneNode {
        SceneNode {
            name: name.into(),
            position: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
            rotation_degrees: [0.0, 0.0, 0.0],
            kind: NodeKind::Group,
            children,
        }
    }

    #[test]
    fn test_box_footprint_scales_half_extents() {
        let root = group(
            "root",
            vec![node(
                "Crate",
                [10.0, 0.0, 5.0],
                [2.0, 1.0, 3.0],
                NodeKind::StaticBody {
                    shapes: vec![CollisionShape::Box {
                        half_extents: [1.0, 1.0, 1.0],
                    }],
                },
            )],
        );
        let obstacles = ObstacleExtractor::new().extract(&root);
        assert_eq!(
            obstacles,
            vec![Obstacle::Box {
                center_x: 10.0,
                center_z: 5.0,
                half_width: 2.0,
                half_depth: 3.0,
            }]
        );
    }

    #[test]
    fn test_ground_and_floor_bodies_excluded() {
        let shapes = vec![CollisionShape::Box {
            half_extents: [5.0, 1.0, 5.0],
        }];
        let root = group(
            "root",
            vec![
                node(
                    "GroundPlane",
                    [0.0, 0.0, 0.0],
                    [1.0, 1.0, 1.0],
                    NodeKind::StaticBody {
                        shapes: shapes.clone(),
                    },
                ),
                node(
                    "stone_Floor_03",
                    [0.0, 0.0, 0.0],
                    [1.0, 1.0, 1.0],
                    NodeKind::StaticBody {
                        shapes: shapes.clone(),
                    },
                ),
                node(
                    "Pillar",
                    [3.0, 0.0, 3.0],
                    [1.0, 1.0, 1.0],
                    NodeKind::StaticBody { shapes },
                ),
            ],
        );
        let obstacles = ObstacleExtractor::new().extract(&root);
        assert_eq!(obstacles.len(), 1);
    }

    #[test]
    fn test_csg_respects_collision_flag() {
        let root = group(
            "root",
            vec![
                node(
                    "rock_a",
                    [1.0, 0.0, 1.0],
                    [1.0, 1.0, 1.0],
                    NodeKind::CsgSolid {
                        shape: CollisionShape::Sphere { radius: 2.0 },
                        collision_enabled: true,
                    },
                ),
                node(
                    "rock_b",
                    [9.0, 0.0, 9.0],
                    [1.0, 1.0, 1.0],
                    NodeKind::CsgSolid {
                        shape: CollisionShape::Sphere { radius: 2.0 },
                        collision_enabled: false,
                    },
                ),
            ],
        );
        let obstacles = ObstacleExtractor::new().extract(&root);
        assert_eq!(
            obstacles,
            vec![Obstacle::Circle {
                center_x: 1.0,
                center_z: 1.0,
                radius: 2.0,
            }]
        );
    }

    #[test]
    fn test_round_shapes_use_larger_horizontal_scale() {
        let root = group(
            "root",
            vec![node(
                "Well",
                [0.0, 0.0, 0.0],
                [1.5, 1.0, 4.0],
                NodeKind::StaticBody {
                    shapes: vec![CollisionShape::Cylinder {
                        radius: 2.0,
                        height: 3.0,
                    }],
                },
            )],
        );
        let obstacles = ObstacleExtractor::new().extract(&root);
        assert_eq!(
            obstacles,
            vec![Obstacle::Circle {
                center_x: 0.0,
                center_z: 0.0,
                radius: 8.0,
            }]
        );
    }

    #[test]
    fn test_mesh_footprint_bounding_box() {
        let root = group(
            "root",
            vec![node(
                "Ruin",
                [100.0, 0.0, 50.0],
                [2.0, 1.0, 1.0],
                NodeKind::StaticBody {
                    shapes: vec![CollisionShape::ConvexMesh {
                        points: vec![
                            [-1.0, 0.0, -2.0],
                            [3.0, 0.0, -2.0],
                            [3.0, 5.0, 4.0],
                            [-1.0, 5.0, 4.0],
                        ],
                    }],
                },
            )],
        );
        let obstacles = ObstacleExtractor::new().extract(&root);
        // Scaled x range [-2, 6], z range [-2, 4]
        assert_eq!(
            obstacles,
            vec![Obstacle::Box {
                center_x: 102.0,
                center_z: 51.0,
                half_width: 4.0,
                half_depth: 3.0,
            }]
        );
    }

    #[test]
    fn test_unsupported_shape_skipped_not_fatal() {
        let root = group(
            "root",
            vec![node(
                "Barrier",
                [0.0, 0.0, 0.0],
                [1.0, 1.0, 1.0],
                NodeKind::StaticBody {
                    shapes: vec![
                        CollisionShape::Plane,
                        CollisionShape::Sphere { radius: 1.0 },
                    ],
                },
            )],
        );
        let mut extractor = ObstacleExtractor::new();
        let obstacles = extractor.extract(&root);
        assert_eq!(obstacles.len(), 1);
        assert_eq!(extractor.skipped_shapes, 1);
    }

    #[test]
    fn test_mirrored_scale_keeps_extents_positive() {
        let root = group(
            "root",
            vec![node(
                "MirroredWall",
                [0.0, 0.0, 0.0],
                [-2.0, 1.0, 1.0],
                NodeKind::StaticBody {
                    shapes: vec![CollisionShape::Box {
                        half_extents: [1.0, 1.0, 1.0],
                    }],
                },
            )],
        );
        let obstacles = ObstacleExtractor::new().extract(&root);
        match &obstacles[0] {
            Obstacle::Box { half_width, .. } => assert_eq!(*half_width, 2.0),
            other => panic!("unexpected obstacle: {other:?}"),
        }
    }

    #[test]
    fn test_filter_size_window() {
        let obstacles = vec![
            // Ground-plane sized, dropped
            Obstacle::Box {
                center_x: 0.0,
                center_z: 0.0,
                half_width: 50.0,
                half_depth: 3.0,
            },
            // Sub-visual on both axes, dropped
            Obstacle::Box {
                center_x: 1.0,
                center_z: 1.0,
                half_width: 0.2,
                half_depth: 0.3,
            },
            // Thin wall: one axis below minimum is fine
            Obstacle::Box {
                center_x: 2.0,
                center_z: 2.0,
                half_width: 0.2,
                half_depth: 6.0,
            },
            // Tiny circle, dropped
            Obstacle::Circle {
                center_x: 3.0,
                center_z: 3.0,
                radius: 0.1,
            },
            // In-range circle
            Obstacle::Circle {
                center_x: 4.0,
                center_z: 4.0,
                radius: 2.0,
            },
        ];
        let kept = filter_dedup(obstacles);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_filter_min_boundary() {
        let obstacles = vec![
            // Both half-extents just below the minimum: rejected
            Obstacle::Box {
                center_x: 0.0,
                center_z: 0.0,
                half_width: MIN_OBSTACLE_SIZE - 0.01,
                half_depth: MIN_OBSTACLE_SIZE - 0.01,
            },
            // One half-extent just above, the other zero: retained
            Obstacle::Box {
                center_x: 5.0,
                center_z: 5.0,
                half_width: MIN_OBSTACLE_SIZE + 0.01,
                half_depth: 0.0,
            },
        ];
        let kept = filter_dedup(obstacles);
        assert_eq!(kept.len(), 1);
        match &kept[0] {
            Obstacle::Box { center_x, .. } => assert_eq!(*center_x, 5.0),
            other => panic!("unexpected obstacle: {other:?}"),
        }
    }

    #[test]
    fn test_filter_dedup_idempotent() {
        let obstacles = vec![
            Obstacle::Box {
                center_x: 1.0,
                center_z: 1.0,
                half_width: 2.0,
                half_depth: 2.0,
            },
            Obstacle::Circle {
                center_x: 8.0,
                center_z: 8.0,
                radius: 3.0,
            },
            Obstacle::Circle {
                center_x: 8.02,
                center_z: 8.01,
                radius: 1.0,
            },
        ];
        let once = filter_dedup(obstacles);
        let twice = filter_dedup(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_dedup_first_occurrence_wins() {
        let obstacles = vec![
            Obstacle::Box {
                center_x: 10.01,
                center_z: 5.02,
                half_width: 2.0,
                half_depth: 2.0,
            },
            // Same rounded position, different size: dropped
            Obstacle::Box {
                center_x: 10.04,
                center_z: 4.98,
                half_width: 8.0,
                half_depth: 8.0,
            },
            // Same position but different kind: kept
            Obstacle::Circle {
                center_x: 10.0,
                center_z: 5.0,
                radius: 2.0,
            },
        ];
        let kept = filter_dedup(obstacles);
        assert_eq!(kept.len(), 2);
        match &kept[0] {
            Obstacle::Box { half_width, .. } => assert_eq!(*half_width, 2.0),
            other => panic!("unexpected obstacle: {other:?}"),
        }
    }

    #[test]
    fn test_obstacle_json_shape() {
        let json = serde_json::to_value(Obstacle::Circle {
            center_x: 1.0,
            center_z: 2.0,
            radius: 3.0,
        })
        .unwrap();
        assert_eq!(json["type"], "circle");
        assert_eq!(json["radius"], 3.0);
    }
}
