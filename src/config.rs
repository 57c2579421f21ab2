//! Export run configuration.
//!
//! A run is described by a JSON config file: the zones to export, each
//! zone's terrain mode (synthesize from an empire profile or load
//! pre-generated tiles), the scene description path, and output settings.
//! CLI flags override the master seed and the output directory.

use std::error::Error;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::empire::Empire;
use crate::region::TILE_RESOLUTION;

/// Where a zone's elevation data comes from.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TerrainMode {
    /// Synthesize from the zone's empire profile, writing region tiles and
    /// sampling the profile directly
    Generate,
    /// Load pre-generated region tiles from a directory
    Load { tiles_dir: PathBuf },
}

/// One zone to export.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Zone id string used as the key in the aggregate artifacts
    pub id: String,
    pub empire: Empire,
    pub terrain: TerrainMode,
    /// Authored scene description; optional, zones without geometry still
    /// export terrain
    #[serde(default)]
    pub scene_path: Option<PathBuf>,
}

/// Full run configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    pub zones: Vec<ZoneConfig>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// World units covered by one region tile side
    #[serde(default = "default_region_size")]
    pub region_size: f64,
    /// Master seed; None means the CLI picks one
    #[serde(default)]
    pub seed: Option<u64>,
    /// Write a PNG preview beside each heightmap pair
    #[serde(default)]
    pub preview: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("export")
}

/// Default gives exactly one world unit between tile samples
fn default_region_size() -> f64 {
    (TILE_RESOLUTION - 1) as f64
}

impl ExportConfig {
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let json = std::fs::read_to_string(path)?;
        let config: ExportConfig = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Start a config from scratch
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::new()
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            output_dir: default_output_dir(),
            region_size: default_region_size(),
            seed: None,
            preview: false,
        }
    }
}

/// Builder used by tests and embedding callers.
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ExportConfig::default(),
        }
    }

    pub fn zone(mut self, zone: ZoneConfig) -> Self {
        self.config.zones.push(zone);
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn region_size(mut self, size: f64) -> Self {
        self.config.region_size = size;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn preview(mut self, preview: bool) -> Self {
        self.config.preview = preview;
        self
    }

    pub fn build(self) -> ExportConfig {
        self.config
    }
}

impl Default for ExportConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_json() {
        let json = r#"{
            "zones": [
                {
                    "id": "highland_vale",
                    "empire": "highland",
                    "terrain": {"mode": "generate"},
                    "scene_path": "scenes/highland_vale.json"
                },
                {
                    "id": "old_harbor",
                    "empire": "coastal",
                    "terrain": {"mode": "load", "tiles_dir": "tiles/old_harbor"}
                }
            ],
            "output_dir": "out",
            "seed": 42
        }"#;
        let config: ExportConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.zones.len(), 2);
        assert_eq!(config.zones[0].id, "highland_vale");
        assert_eq!(config.zones[0].empire, Empire::Highland);
        assert!(matches!(config.zones[0].terrain, TerrainMode::Generate));
        assert!(config.zones[1].scene_path.is_none());
        assert_eq!(config.seed, Some(42));
        // Defaults applied where omitted
        assert_eq!(config.region_size, 63.0);
        assert!(!config.preview);
    }

    #[test]
    fn test_builder() {
        let config = ExportConfig::builder()
            .zone(ZoneConfig {
                id: "test".into(),
                empire: Empire::Desert,
                terrain: TerrainMode::Generate,
                scene_path: None,
            })
            .output_dir("custom_out")
            .region_size(128.0)
            .seed(7)
            .build();
        assert_eq!(config.zones.len(), 1);
        assert_eq!(config.output_dir, PathBuf::from("custom_out"));
        assert_eq!(config.region_size, 128.0);
        assert_eq!(config.seed, Some(7));
    }
}
