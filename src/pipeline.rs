//! Per-zone export orchestration.
//!
//! Runs the configured zones in declaration order: resolve the zone's
//! elevation source (synthesize or load tiles), export the heightmap pair,
//! then load the authored scene and extract obstacles and spawn points.
//! Zone failures are logged and the run continues; after the last zone the
//! per-zone geometry is aggregated into `obstacles.json` and
//! `spawn_points.json` keyed by zone id.
//!
//! Each zone's scene tree and heightmap buffer are dropped before the next
//! zone starts, so peak memory stays at roughly one zone's working set.

use std::collections::BTreeMap;
use std::error::Error;
use std::io;
use std::path::Path;

use crate::config::{ExportConfig, TerrainMode, ZoneConfig};
use crate::grid::HeightGrid;
use crate::height_profile::HeightProfile;
use crate::heightmap::{sample_heightmap, select_resolution, HeightSource};
use crate::heightmap_export::{export_heightmap, export_preview};
use crate::obstacles::{filter_dedup, Obstacle, ObstacleExtractor};
use crate::region::{write_tile, RegionTileLocator, WorldBounds, TILE_RESOLUTION};
use crate::scene::SceneNode;
use crate::seeds::ExportSeeds;
use crate::spawn_points::{extract_spawn_points, SpawnPoint};

// =============================================================================
// PER-ZONE RESULT
// =============================================================================

/// Everything one zone contributes to the aggregate artifacts.
pub struct ZoneExportBundle {
    pub zone_id: String,
    pub obstacles: Vec<Obstacle>,
    pub spawn_points: Vec<SpawnPoint>,
}

/// Counters reported at the end of a run.
#[derive(Default)]
pub struct RunSummary {
    pub zones_exported: usize,
    pub heightmaps_skipped: usize,
    pub scenes_skipped: usize,
    pub tiles_written: usize,
    pub obstacles_raw: usize,
    pub obstacles_kept: usize,
    pub spawn_points: usize,
    pub nan_coerced: usize,
    pub shapes_skipped: usize,
}

// =============================================================================
// RUN
// =============================================================================

/// Export every configured zone, then write the aggregate geometry files.
pub fn run_export(config: &ExportConfig, seeds: ExportSeeds) -> Result<RunSummary, Box<dyn Error>> {
    std::fs::create_dir_all(&config.output_dir)?;

    let mut summary = RunSummary::default();
    let mut bundles = Vec::new();

    for zone in &config.zones {
        println!("Zone '{}' ({} empire)...", zone.id, zone.empire);
        let bundle = export_zone(zone, config, seeds, &mut summary);
        if let Some(bundle) = bundle {
            bundles.push(bundle);
        }
        summary.zones_exported += 1;
    }

    write_aggregates(&bundles, &config.output_dir);
    Ok(summary)
}

/// Process one zone. Returns None when the zone has no scene to extract
/// geometry from; terrain artifacts are still written either way.
fn export_zone(
    zone: &ZoneConfig,
    config: &ExportConfig,
    seeds: ExportSeeds,
    summary: &mut RunSummary,
) -> Option<ZoneExportBundle> {
    export_zone_terrain(zone, config, seeds, summary);

    let scene_path = zone.scene_path.as_ref()?;
    let scene = match SceneNode::load(scene_path) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!(
                "Error: zone '{}': cannot load scene {}: {e}",
                zone.id,
                scene_path.display()
            );
            summary.scenes_skipped += 1;
            return None;
        }
    };

    let mut extractor = ObstacleExtractor::new();
    let raw = extractor.extract(&scene);
    summary.obstacles_raw += raw.len();
    summary.shapes_skipped += extractor.skipped_shapes;

    let obstacles = filter_dedup(raw);
    summary.obstacles_kept += obstacles.len();

    let spawn_points = extract_spawn_points(&scene);
    summary.spawn_points += spawn_points.len();

    println!(
        "  {} obstacles kept, {} spawn points",
        obstacles.len(),
        spawn_points.len()
    );

    Some(ZoneExportBundle {
        zone_id: zone.id.clone(),
        obstacles,
        spawn_points,
    })
}

fn export_zone_terrain(
    zone: &ZoneConfig,
    config: &ExportConfig,
    seeds: ExportSeeds,
    summary: &mut RunSummary,
) {
    let result = match &zone.terrain {
        TerrainMode::Generate => generate_terrain(zone, config, seeds, summary),
        TerrainMode::Load { tiles_dir } => load_terrain(zone, config, tiles_dir, summary),
    };
    if let Err(e) = result {
        eprintln!("Error: zone '{}': heightmap export failed: {e}", zone.id);
        summary.heightmaps_skipped += 1;
    }
}

fn generate_terrain(
    zone: &ZoneConfig,
    config: &ExportConfig,
    seeds: ExportSeeds,
    summary: &mut RunSummary,
) -> Result<(), Box<dyn Error>> {
    let profile = zone.empire.profile();
    let extent = profile.zone_extent;
    let height_profile = HeightProfile::new(profile, &seeds);

    let tiles_dir = config.output_dir.join("tiles").join(&zone.id);
    summary.tiles_written +=
        write_zone_tiles(&height_profile, extent, config.region_size, &tiles_dir)?;

    let bounds = WorldBounds {
        min_x: 0.0,
        max_x: extent,
        min_z: 0.0,
        max_z: extent,
    };
    export_terrain_artifacts(zone, config, &height_profile, bounds, summary)
}

fn load_terrain(
    zone: &ZoneConfig,
    config: &ExportConfig,
    tiles_dir: &Path,
    summary: &mut RunSummary,
) -> Result<(), Box<dyn Error>> {
    let locator = RegionTileLocator::new(tiles_dir, config.region_size);
    let tiles = locator.load()?;
    println!("  loaded {} region tiles", tiles.tile_count());
    let bounds = tiles.bounds();
    export_terrain_artifacts(zone, config, &tiles, bounds, summary)
}

fn export_terrain_artifacts(
    zone: &ZoneConfig,
    config: &ExportConfig,
    source: &dyn HeightSource,
    bounds: WorldBounds,
    summary: &mut RunSummary,
) -> Result<(), Box<dyn Error>> {
    let resolution = select_resolution(&bounds);
    let asset = sample_heightmap(source, bounds, resolution);
    if asset.nan_coerced > 0 {
        eprintln!(
            "Warning: zone '{}': {} samples outside terrain coverage set to 0.0",
            zone.id, asset.nan_coerced
        );
    }
    summary.nan_coerced += asset.nan_coerced;

    export_heightmap(&asset, &config.output_dir, zone.empire.name())?;
    println!(
        "  heightmap {}x{} exported as '{}'",
        resolution,
        resolution,
        zone.empire.name()
    );

    if config.preview {
        if let Err(e) = export_preview(&asset, &config.output_dir, zone.empire.name()) {
            eprintln!("Error: zone '{}': preview failed: {e}", zone.id);
        }
    }
    Ok(())
}

/// Write the square of region tiles covering `[0, extent)` on both axes,
/// sampling the profile at corner-aligned tile positions.
fn write_zone_tiles(
    profile: &HeightProfile,
    extent: f64,
    region_size: f64,
    dir: &Path,
) -> io::Result<usize> {
    std::fs::create_dir_all(dir)?;
    let tiles_per_side = (extent / region_size).ceil().max(1.0) as i64;
    let step = region_size / (TILE_RESOLUTION - 1) as f64;

    for rz in 0..tiles_per_side {
        for rx in 0..tiles_per_side {
            let mut grid = HeightGrid::new(TILE_RESOLUTION, TILE_RESOLUTION);
            for iz in 0..TILE_RESOLUTION {
                for ix in 0..TILE_RESOLUTION {
                    let x = rx as f64 * region_size + ix as f64 * step;
                    let z = rz as f64 * region_size + iz as f64 * step;
                    grid.set(ix, iz, profile.height(x, z) as f32);
                }
            }
            write_tile(&dir.join(format!("{rx}_{rz}.tile")), &grid)?;
        }
    }
    Ok((tiles_per_side * tiles_per_side) as usize)
}

/// Write `obstacles.json` and `spawn_points.json`, each a map from zone id
/// to that zone's entries. Write failures are logged; the other aggregate
/// is still attempted.
fn write_aggregates(bundles: &[ZoneExportBundle], out_dir: &Path) {
    let mut obstacles: BTreeMap<&str, &[Obstacle]> = BTreeMap::new();
    let mut spawns: BTreeMap<&str, &[SpawnPoint]> = BTreeMap::new();
    for bundle in bundles {
        obstacles.insert(&bundle.zone_id, &bundle.obstacles);
        spawns.insert(&bundle.zone_id, &bundle.spawn_points);
    }

    if let Err(e) = write_json(&out_dir.join("obstacles.json"), &obstacles) {
        eprintln!("Error: writing obstacles.json failed: {e}");
    }
    if let Err(e) = write_json(&out_dir.join("spawn_points.json"), &spawns) {
        eprintln!("Error: writing spawn_points.json failed: {e}");
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use crate::empire::Empire;
    use std::path::PathBuf;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "world_export_pipeline_{tag}_{}_{:?}",
            std::process::id(),
            std::thread::current().id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn flat_tile(value: f32) -> HeightGrid {
        let mut grid = HeightGrid::new(TILE_RESOLUTION, TILE_RESOLUTION);
        for z in 0..TILE_RESOLUTION {
            for x in 0..TILE_RESOLUTION {
                grid.set(x, z, value);
            }
        }
        grid
    }

    #[test]
    fn test_load_scenario_bounds_and_sample_centers() {
        // Two tiles (0,0) and (1,0) at region size 256 cover 0..512 x 0..256
        let dir = temp_dir("scenario");
        write_tile(&dir.join("0_0.tile"), &flat_tile(1.0)).unwrap();
        write_tile(&dir.join("1_0.tile"), &flat_tile(2.0)).unwrap();

        let locator = RegionTileLocator::new(&dir, 256.0);
        let tiles = locator.load().unwrap();
        let bounds = tiles.bounds();
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.max_x, 512.0);
        assert_eq!(bounds.min_z, 0.0);
        assert_eq!(bounds.max_z, 256.0);

        let asset = sample_heightmap(&tiles, bounds, 4);
        // x centers 64, 192, 320, 448; z centers 32, 96, 160, 224
        assert_eq!(asset.grid.samples().len(), 16);
        assert_eq!(asset.nan_coerced, 0);
        assert_eq!(asset.grid.get(0, 0), 1.0);
        assert_eq!(asset.grid.get(1, 0), 1.0);
        assert_eq!(asset.grid.get(2, 3), 2.0);
        assert_eq!(asset.grid.get(3, 3), 2.0);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_run_export_writes_all_artifacts() {
        let out = temp_dir("run");
        let scene_path = out.join("zone.json");
        std::fs::write(
            &scene_path,
            r#"{
                "name": "root",
                "kind": "group",
                "children": [
                    {
                        "name": "Tower",
                        "kind": "static_body",
                        "position": [100.0, 0.0, 100.0],
                        "shapes": [{"shape": "box", "half_extents": [3.0, 10.0, 3.0]}]
                    },
                    {
                        "name": "SpawnPoint",
                        "kind": "marker",
                        "position": [256.0, 8.0, 256.0]
                    }
                ]
            }"#,
        )
        .unwrap();

        let config = ExportConfig::builder()
            .zone(crate::config::ZoneConfig {
                id: "vale".into(),
                empire: Empire::Highland,
                terrain: TerrainMode::Generate,
                scene_path: Some(scene_path),
            })
            .output_dir(&out)
            .region_size(256.0)
            .seed(7)
            .build();

        let summary = run_export(&config, ExportSeeds::from_master(7)).unwrap();
        assert_eq!(summary.zones_exported, 1);
        assert_eq!(summary.heightmaps_skipped, 0);
        assert_eq!(summary.tiles_written, 4);
        assert_eq!(summary.obstacles_kept, 1);
        assert_eq!(summary.spawn_points, 1);

        assert!(out.join("highland_heightmap.json").exists());
        assert!(out.join("highland_heightmap.bin").exists());
        assert!(out.join("tiles/vale/0_0.tile").exists());
        assert!(out.join("tiles/vale/1_1.tile").exists());

        let obstacles: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("obstacles.json")).unwrap())
                .unwrap();
        assert_eq!(obstacles["vale"][0]["type"], "box");

        let spawns: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("spawn_points.json")).unwrap())
                .unwrap();
        assert_eq!(spawns["vale"][0]["name"], "default");
        assert_eq!(spawns["vale"][0]["is_default"], true);

        std::fs::remove_dir_all(&out).unwrap();
    }

    #[test]
    fn test_missing_tiles_skips_heightmap_not_zone() {
        let out = temp_dir("missing");
        let scene_path = out.join("zone.json");
        std::fs::write(
            &scene_path,
            r#"{"name": "root", "kind": "group", "children": []}"#,
        )
        .unwrap();

        let config = ExportConfig::builder()
            .zone(crate::config::ZoneConfig {
                id: "ghost".into(),
                empire: Empire::Desert,
                terrain: TerrainMode::Load {
                    tiles_dir: out.join("no_such_tiles"),
                },
                scene_path: Some(scene_path),
            })
            .output_dir(&out)
            .build();

        let summary = run_export(&config, ExportSeeds::from_master(1)).unwrap();
        assert_eq!(summary.heightmaps_skipped, 1);
        assert_eq!(summary.zones_exported, 1);
        // Geometry still exported: empty scene yields the synthetic spawn
        let spawns: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("spawn_points.json")).unwrap())
                .unwrap();
        assert_eq!(spawns["ghost"][0]["name"], "default");

        std::fs::remove_dir_all(&out).unwrap();
    }
}
