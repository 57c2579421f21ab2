//! Region tile discovery and loading.
//!
//! Pre-generated terrain is stored as fixed-size square tiles, one file per
//! tile, named by signed integer coordinates (`<rx>_<rz>.tile`). Tile `(rx,
//! rz)` covers the world rectangle `[rx*region_size, (rx+1)*region_size) x
//! [rz*region_size, (rz+1)*region_size)`. Samples inside a tile are
//! corner-aligned: the last row/column of one tile shares world positions
//! with the first row/column of its neighbor.
//!
//! Name parsing uses a single regular expression with two signed-integer
//! capture groups. Splitting on `_` also works, but a leading `-` on the
//! second coordinate makes that approach easy to get wrong; the regex
//! handles all four sign combinations uniformly.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::grid::HeightGrid;

/// Samples per tile side
pub const TILE_RESOLUTION: usize = 64;

/// File extension for region tile files
pub const TILE_EXTENSION: &str = "tile";

// =============================================================================
// WORLD BOUNDS
// =============================================================================

/// Axis-aligned world-space rectangle covered by a zone's terrain
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl WorldBounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f64 {
        self.max_z - self.min_z
    }

    /// The larger of the two axis extents
    pub fn largest_extent(&self) -> f64 {
        self.width().max(self.depth())
    }
}

// =============================================================================
// TILE LOCATOR
// =============================================================================

/// Finds and parses region tile files in a directory.
pub struct RegionTileLocator {
    tiles_dir: PathBuf,
    region_size: f64,
    pattern: Regex,
}

impl RegionTileLocator {
    pub fn new(tiles_dir: impl Into<PathBuf>, region_size: f64) -> Self {
        Self {
            tiles_dir: tiles_dir.into(),
            region_size,
            pattern: Regex::new(r"^(-?\d+)_(-?\d+)$").expect("tile name pattern is valid"),
        }
    }

    /// Parse a tile file stem (no extension) into `(rx, rz)`.
    /// Returns None for names that do not match the coordinate pattern.
    pub fn parse_tile_name(&self, stem: &str) -> Option<(i64, i64)> {
        let caps = self.pattern.captures(stem)?;
        let rx = caps.get(1)?.as_str().parse().ok()?;
        let rz = caps.get(2)?.as_str().parse().ok()?;
        Some((rx, rz))
    }

    /// Scan the tiles directory for tile files and parse their coordinates.
    ///
    /// Files with the wrong extension or an unparsable stem are ignored.
    /// Fails when the directory cannot be read or contains no tiles.
    pub fn scan(&self) -> io::Result<Vec<(i64, i64)>> {
        let mut coords = Vec::new();
        for entry in std::fs::read_dir(&self.tiles_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TILE_EXTENSION) {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s,
                None => continue,
            };
            if let Some(coord) = self.parse_tile_name(stem) {
                coords.push(coord);
            }
        }
        if coords.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no region tiles found in {}", self.tiles_dir.display()),
            ));
        }
        Ok(coords)
    }

    /// World bounds covering a set of tile coordinates
    pub fn bounds_for(&self, coords: &[(i64, i64)]) -> WorldBounds {
        let min_rx = coords.iter().map(|c| c.0).min().unwrap_or(0);
        let max_rx = coords.iter().map(|c| c.0).max().unwrap_or(0);
        let min_rz = coords.iter().map(|c| c.1).min().unwrap_or(0);
        let max_rz = coords.iter().map(|c| c.1).max().unwrap_or(0);
        WorldBounds {
            min_x: min_rx as f64 * self.region_size,
            max_x: (max_rx + 1) as f64 * self.region_size,
            min_z: min_rz as f64 * self.region_size,
            max_z: (max_rz + 1) as f64 * self.region_size,
        }
    }

    /// Scan the directory and load every tile into memory.
    pub fn load(&self) -> io::Result<TileSet> {
        let coords = self.scan()?;
        let bounds = self.bounds_for(&coords);
        let mut tiles = HashMap::new();
        for (rx, rz) in coords {
            let path = self.tiles_dir.join(format!("{rx}_{rz}.{TILE_EXTENSION}"));
            let grid = read_tile(&path)?;
            tiles.insert((rx, rz), grid);
        }
        Ok(TileSet {
            region_size: self.region_size,
            bounds,
            tiles,
        })
    }
}

// =============================================================================
// TILE FILE I/O
// =============================================================================

/// Write a tile grid as consecutive little-endian f32 samples, row-major.
pub fn write_tile(path: &Path, grid: &HeightGrid) -> io::Result<()> {
    if grid.width != TILE_RESOLUTION || grid.height != TILE_RESOLUTION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "tile grid must be {TILE_RESOLUTION}x{TILE_RESOLUTION}, got {}x{}",
                grid.width, grid.height
            ),
        ));
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for &sample in grid.samples() {
        writer.write_all(&sample.to_le_bytes())?;
    }
    writer.flush()
}

/// Read a tile file back into a grid. The file must hold exactly
/// `TILE_RESOLUTION^2` little-endian f32 samples.
pub fn read_tile(path: &Path) -> io::Result<HeightGrid> {
    let expected = TILE_RESOLUTION * TILE_RESOLUTION * 4;
    let mut bytes = Vec::with_capacity(expected);
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
    if bytes.len() != expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "tile {} holds {} bytes, expected {expected}",
                path.display(),
                bytes.len()
            ),
        ));
    }
    let samples: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    HeightGrid::from_samples(TILE_RESOLUTION, TILE_RESOLUTION, samples).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "tile sample count mismatch")
    })
}

// =============================================================================
// TILE SET
// =============================================================================

/// A loaded set of region tiles queryable by world coordinate.
pub struct TileSet {
    region_size: f64,
    bounds: WorldBounds,
    tiles: HashMap<(i64, i64), HeightGrid>,
}

impl TileSet {
    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Elevation at a world coordinate, bilinearly interpolated within the
    /// covering tile. Returns NaN when no tile covers the coordinate.
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        let rx = (x / self.region_size).floor() as i64;
        let rz = (z / self.region_size).floor() as i64;
        let grid = match self.tiles.get(&(rx, rz)) {
            Some(g) => g,
            None => return f64::NAN,
        };
        let step = self.region_size / (TILE_RESOLUTION - 1) as f64;
        let u = (x - rx as f64 * self.region_size) / step;
        let v = (z - rz as f64 * self.region_size) / step;
        grid.sample_bilinear(u as f32, v as f32) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator(region_size: f64) -> RegionTileLocator {
        RegionTileLocator::new("unused", region_size)
    }

    #[test]
    fn test_parse_all_sign_combinations() {
        let loc = locator(128.0);
        assert_eq!(loc.parse_tile_name("00_01"), Some((0, 1)));
        assert_eq!(loc.parse_tile_name("-01_00"), Some((-1, 0)));
        assert_eq!(loc.parse_tile_name("01_-01"), Some((1, -1)));
        assert_eq!(loc.parse_tile_name("-01_-01"), Some((-1, -1)));
    }

    #[test]
    fn test_parse_multi_digit_and_padding() {
        let loc = locator(128.0);
        assert_eq!(loc.parse_tile_name("-12_340"), Some((-12, 340)));
        assert_eq!(loc.parse_tile_name("007_-0042"), Some((7, -42)));
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        let loc = locator(128.0);
        assert_eq!(loc.parse_tile_name("a_b"), None);
        assert_eq!(loc.parse_tile_name("1_2_3"), None);
        assert_eq!(loc.parse_tile_name("01"), None);
        assert_eq!(loc.parse_tile_name("1_"), None);
        assert_eq!(loc.parse_tile_name("--1_2"), None);
    }

    #[test]
    fn test_bounds_span_tile_extremes() {
        let loc = locator(128.0);
        let bounds = loc.bounds_for(&[(0, 0), (1, 0), (0, -1)]);
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.max_x, 256.0);
        assert_eq!(bounds.min_z, -128.0);
        assert_eq!(bounds.max_z, 128.0);
        assert_eq!(bounds.largest_extent(), 256.0);
    }

    #[test]
    fn test_scan_missing_directory_fails() {
        let loc = RegionTileLocator::new("/nonexistent/tiles", 128.0);
        assert!(loc.scan().is_err());
    }

    #[test]
    fn test_tile_round_trip_and_sampling() {
        let dir = std::env::temp_dir().join(format!(
            "world_export_tiles_{}_{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();

        // Flat tile at (0,0), sloped tile at (1,0)
        let mut flat = HeightGrid::new(TILE_RESOLUTION, TILE_RESOLUTION);
        for z in 0..TILE_RESOLUTION {
            for x in 0..TILE_RESOLUTION {
                flat.set(x, z, 5.0);
            }
        }
        let mut sloped = HeightGrid::new(TILE_RESOLUTION, TILE_RESOLUTION);
        for z in 0..TILE_RESOLUTION {
            for x in 0..TILE_RESOLUTION {
                sloped.set(x, z, x as f32);
            }
        }
        write_tile(&dir.join("0_0.tile"), &flat).unwrap();
        write_tile(&dir.join("1_0.tile"), &sloped).unwrap();
        // Distractor files that must be ignored
        std::fs::write(dir.join("readme.txt"), b"notes").unwrap();
        std::fs::write(dir.join("bad_name.tile"), b"junk").unwrap();

        let loc = RegionTileLocator::new(&dir, 126.0);
        let set = loc.load().unwrap();
        assert_eq!(set.tile_count(), 2);
        assert_eq!(set.bounds().min_x, 0.0);
        assert_eq!(set.bounds().max_x, 252.0);

        // Inside the flat tile
        assert!((set.height_at(60.0, 60.0) - 5.0).abs() < 1e-5);
        // Sloped tile: step is 2.0 world units per sample, so x=126+10 is
        // sample coordinate 5 with value 5.0
        assert!((set.height_at(136.0, 10.0) - 5.0).abs() < 1e-5);
        // Outside coverage
        assert!(set.height_at(-10.0, 10.0).is_nan());
        assert!(set.height_at(10.0, 300.0).is_nan());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_read_tile_rejects_truncated_file() {
        let dir = std::env::temp_dir().join(format!(
            "world_export_trunc_{}_{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("0_0.tile");
        std::fs::write(&path, vec![0u8; 100]).unwrap();
        assert!(read_tile(&path).is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
