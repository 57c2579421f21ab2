//! Heightmap sampling.
//!
//! Turns an elevation source (synthesized profile or loaded tiles) into a
//! fixed-resolution grid of f32 samples covering a zone's world bounds.
//! Rows are sampled in parallel; each row is independent so the output is
//! deterministic for a given source and bounds.

use rayon::prelude::*;

use crate::grid::HeightGrid;
use crate::height_profile::HeightProfile;
use crate::region::{TileSet, WorldBounds};

// =============================================================================
// RESOLUTION SELECTION
// =============================================================================

/// Default heightmap resolution (samples per side)
pub const BASE_RESOLUTION: usize = 256;

/// Resolution used for large zones
pub const HIGH_RESOLUTION: usize = 1024;

/// Zones whose larger axis extent exceeds this use HIGH_RESOLUTION, keeping
/// world-unit sample density roughly constant
pub const LARGE_ZONE_THRESHOLD: f64 = 2048.0;

/// Pick the sample resolution for a zone's bounds
pub fn select_resolution(bounds: &WorldBounds) -> usize {
    if bounds.largest_extent() > LARGE_ZONE_THRESHOLD {
        HIGH_RESOLUTION
    } else {
        BASE_RESOLUTION
    }
}

// =============================================================================
// HEIGHT SOURCES
// =============================================================================

/// Anything that can answer an elevation query at a world coordinate.
///
/// Implementations return NaN for coordinates outside their valid data;
/// the sampler coerces those to 0.0 and counts them.
pub trait HeightSource: Sync {
    fn height_at(&self, x: f64, z: f64) -> f64;
}

impl HeightSource for HeightProfile {
    fn height_at(&self, x: f64, z: f64) -> f64 {
        self.height(x, z)
    }
}

impl HeightSource for TileSet {
    fn height_at(&self, x: f64, z: f64) -> f64 {
        TileSet::height_at(self, x, z)
    }
}

// =============================================================================
// SAMPLER
// =============================================================================

/// A sampled heightmap plus the metadata needed to export it.
pub struct HeightmapAsset {
    pub grid: HeightGrid,
    pub bounds: WorldBounds,
    /// Samples that fell outside the source's valid data and were coerced
    /// to 0.0
    pub nan_coerced: usize,
}

impl HeightmapAsset {
    /// Derived square terrain size, the larger of the two axis extents
    pub fn terrain_size(&self) -> f64 {
        self.bounds.largest_extent()
    }
}

/// Sample a height source over `bounds` at `resolution` samples per side.
///
/// Cell `(ix, iz)` maps to the world coordinate at its center,
/// `min + (idx + 0.5) * step`, so samples never land exactly on the bounds
/// edges. Output is row-major by increasing z then increasing x.
pub fn sample_heightmap(
    source: &dyn HeightSource,
    bounds: WorldBounds,
    resolution: usize,
) -> HeightmapAsset {
    let step_x = bounds.width() / resolution as f64;
    let step_z = bounds.depth() / resolution as f64;

    let rows: Vec<(Vec<f32>, usize)> = (0..resolution)
        .into_par_iter()
        .map(|iz| {
            let z = bounds.min_z + (iz as f64 + 0.5) * step_z;
            let mut row = Vec::with_capacity(resolution);
            let mut coerced = 0;
            for ix in 0..resolution {
                let x = bounds.min_x + (ix as f64 + 0.5) * step_x;
                let h = source.height_at(x, z);
                if h.is_nan() {
                    coerced += 1;
                    row.push(0.0);
                } else {
                    row.push(h as f32);
                }
            }
            (row, coerced)
        })
        .collect();

    let mut samples = Vec::with_capacity(resolution * resolution);
    let mut nan_coerced = 0;
    for (row, coerced) in rows {
        samples.extend_from_slice(&row);
        nan_coerced += coerced;
    }

    let grid = HeightGrid::from_samples(resolution, resolution, samples)
        .unwrap_or_else(|| HeightGrid::new(resolution, resolution));

    HeightmapAsset {
        grid,
        bounds,
        nan_coerced,
    }
}
