//! Heightmap artifact writing.
//!
//! Each exported heightmap is two files with a shared base name: a JSON
//! metadata file and a raw binary sample buffer. The pair is only usable
//! together, so both are written by one call. An optional PNG preview
//! renders the samples through a spectral colormap for quick visual checks.

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::heightmap::HeightmapAsset;

/// Bumped whenever the artifact layout changes
pub const HEIGHTMAP_FORMAT_VERSION: u32 = 1;

/// Metadata written beside the binary sample buffer.
///
/// `width * height` little-endian f32 samples follow in the `.bin` file,
/// row-major by increasing z then increasing x.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HeightmapMetadata {
    pub version: u32,
    pub width: usize,
    pub height: usize,
    pub world_min_x: f64,
    pub world_max_x: f64,
    pub world_min_z: f64,
    pub world_max_z: f64,
    pub terrain_size: f64,
}

/// Paths of the artifact pair written for one heightmap
pub struct HeightmapArtifacts {
    pub metadata_path: PathBuf,
    pub binary_path: PathBuf,
}

/// Write `<base_name>_heightmap.json` and `<base_name>_heightmap.bin`.
pub fn export_heightmap(
    asset: &HeightmapAsset,
    out_dir: &Path,
    base_name: &str,
) -> Result<HeightmapArtifacts, Box<dyn Error>> {
    let metadata = HeightmapMetadata {
        version: HEIGHTMAP_FORMAT_VERSION,
        width: asset.grid.width,
        height: asset.grid.height,
        world_min_x: asset.bounds.min_x,
        world_max_x: asset.bounds.max_x,
        world_min_z: asset.bounds.min_z,
        world_max_z: asset.bounds.max_z,
        terrain_size: asset.terrain_size(),
    };

    let metadata_path = out_dir.join(format!("{base_name}_heightmap.json"));
    let binary_path = out_dir.join(format!("{base_name}_heightmap.bin"));

    let json = serde_json::to_string_pretty(&metadata)?;
    std::fs::write(&metadata_path, json)?;

    let mut writer = BufWriter::new(File::create(&binary_path)?);
    for &sample in asset.grid.samples() {
        writer.write_all(&sample.to_le_bytes())?;
    }
    writer.flush()?;

    Ok(HeightmapArtifacts {
        metadata_path,
        binary_path,
    })
}

/// Write `<base_name>_heightmap.png`, samples normalized to the asset's own
/// elevation range and rendered through the spectral colormap.
pub fn export_preview(
    asset: &HeightmapAsset,
    out_dir: &Path,
    base_name: &str,
) -> Result<(), image::ImageError> {
    let grid = &asset.grid;
    let mut min_h = f32::MAX;
    let mut max_h = f32::MIN;
    for &h in grid.samples() {
        if h < min_h {
            min_h = h;
        }
        if h > max_h {
            max_h = h;
        }
    }
    let range = (max_h - min_h).max(1e-6);

    let mut img: RgbImage = ImageBuffer::new(grid.width as u32, grid.height as u32);
    for (x, z, h) in grid.iter() {
        let t = (h - min_h) / range;
        let color = spectral_colormap(t.clamp(0.0, 1.0));
        img.put_pixel(x as u32, z as u32, Rgb(color));
    }

    img.save(out_dir.join(format!("{base_name}_heightmap.png")))
}

/// Spectral colormap (matplotlib style): dark blue -> cyan -> green -> yellow -> orange -> red
fn spectral_colormap(t: f32) -> [u8; 3] {
    let colors: [[f32; 3]; 11] = [
        [0.37, 0.31, 0.64],  // Dark blue/purple (low)
        [0.20, 0.53, 0.74],  // Blue
        [0.40, 0.76, 0.65],  // Teal
        [0.67, 0.87, 0.64],  // Light green
        [0.90, 0.96, 0.60],  // Yellow-green
        [1.00, 1.00, 0.75],  // Light yellow / white
        [1.00, 0.88, 0.55],  // Yellow
        [0.99, 0.68, 0.38],  // Light orange
        [0.96, 0.43, 0.26],  // Orange
        [0.84, 0.24, 0.31],  // Red
        [0.62, 0.00, 0.26],  // Dark red (high)
    ];

    let t_scaled = t * 10.0;
    let idx = (t_scaled as usize).min(9);
    let frac = t_scaled - idx as f32;

    let c1 = colors[idx];
    let c2 = colors[idx + 1];

    [
        ((c1[0] + (c2[0] - c1[0]) * frac) * 255.0) as u8,
        ((c1[1] + (c2[1] - c1[1]) * frac) * 255.0) as u8,
        ((c1[2] + (c2[2] - c1[2]) * frac) * 255.0) as u8,
    ]
}
