//! World data export library
//!
//! Bakes game-world zones into static server-side data: per-zone terrain
//! heightmaps (synthesized from empire profiles or loaded from region
//! tiles) plus aggregate obstacle and spawn point files extracted from
//! authored scene descriptions.

pub mod config;
pub mod empire;
pub mod grid;
pub mod height_profile;
pub mod heightmap;
pub mod heightmap_export;
pub mod obstacles;
pub mod pipeline;
pub mod region;
pub mod scene;
pub mod seeds;
pub mod spawn_points;
