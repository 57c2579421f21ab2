//! Empire terrain profiles.
//!
//! Each empire is one of a small fixed set of terrain styles. A profile
//! carries the noise-layer parameters and the shaping constants (village
//! plateau, carving features) for that style. Profiles are immutable and
//! defined at configuration time; the same profile always synthesizes the
//! same terrain for a given seed set.

use serde::{Deserialize, Serialize};

// =============================================================================
// EMPIRE SELECTION
// =============================================================================

/// One of the fixed terrain/theme styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Empire {
    /// Mountainous forest terrain, ridged peaks toward the north edge
    Highland,
    /// Dune plains with an oasis depression
    Desert,
    /// Cliffed shoreline with a harbor cut to sea level
    Coastal,
}

impl Empire {
    /// All empires in declaration order
    pub fn all() -> &'static [Empire] {
        &[Empire::Highland, Empire::Desert, Empire::Coastal]
    }

    /// Lowercase name used for artifact base names and cross-references
    pub fn name(&self) -> &'static str {
        match self {
            Empire::Highland => "highland",
            Empire::Desert => "desert",
            Empire::Coastal => "coastal",
        }
    }

    /// The terrain profile for this empire
    pub fn profile(&self) -> EmpireProfile {
        match self {
            Empire::Highland => highland_profile(),
            Empire::Desert => desert_profile(),
            Empire::Coastal => coastal_profile(),
        }
    }
}

impl std::fmt::Display for Empire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// PROFILE TYPES
// =============================================================================

/// How octaves are combined for a noise layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FractalMode {
    /// Standard fractional Brownian motion
    Fbm,
    /// Ridged multifractal (sharp crests at noise zero crossings)
    Ridged,
    /// Billow (rounded, dune-like lobes)
    Billow,
}

/// Parameters for one noise layer
#[derive(Clone, Copy, Debug)]
pub struct NoiseLayer {
    /// Base frequency (lower = larger features)
    pub frequency: f64,
    /// Number of octaves
    pub octaves: u32,
    /// Amplitude decay per octave (0.0-1.0)
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
    /// Peak contribution in world height units
    pub amplitude: f64,
    pub mode: FractalMode,
}

/// Spatial gate fading a feature layer in or out across the zone.
///
/// Inputs are normalized zone coordinates in [0, 1]; the gate output is a
/// smoothstep factor in [0, 1].
#[derive(Clone, Copy, Debug)]
pub enum FeatureGate {
    /// Stronger toward the north edge (high normalized z)
    NorthEdge { start: f64, end: f64 },
    /// Stronger toward the west edge (low normalized x)
    WestEdge { start: f64, end: f64 },
    /// Stronger near the four zone corners
    Corners { radius: f64 },
}

/// Village plateau shaping constants
#[derive(Clone, Copy, Debug)]
pub struct VillagePlateau {
    /// Village center in world coordinates
    pub center: (f64, f64),
    /// Rim radius R; inner flat area ends at 0.7*R, blend-out at 2*R
    pub radius: f64,
    /// Flat build-area height
    pub base_height: f64,
    /// Peak height of the raised defensive rim above the base
    pub rim_height: f64,
}

/// A bounded carving feature that pulls terrain toward a target height
#[derive(Clone, Copy, Debug)]
pub enum Carving {
    /// River band crossing the zone along x, carved toward the bed height
    River {
        center_z: f64,
        width: f64,
        x_min: f64,
        x_max: f64,
        bed_height: f64,
    },
    /// Circular depression carved toward the floor height
    Oasis {
        center: (f64, f64),
        radius: f64,
        floor_height: f64,
    },
    /// Circular cut to height 0 (sea level) for ship access
    Harbor { center: (f64, f64), radius: f64 },
}

/// Immutable terrain style description for one empire
#[derive(Clone, Debug)]
pub struct EmpireProfile {
    pub empire: Empire,
    /// Side length of a freshly generated square zone, world units
    pub zone_extent: f64,
    /// Low-frequency base elevation layer
    pub base: NoiseLayer,
    /// Gated feature layer (mountains, dunes, cliffs)
    pub feature: NoiseLayer,
    pub feature_gate: FeatureGate,
    /// Unconditional surface roughness layer
    pub detail: NoiseLayer,
    pub village: VillagePlateau,
    pub carvings: Vec<Carving>,
}

// =============================================================================
// PER-EMPIRE CONSTANTS
// =============================================================================

/// Default side length of a generated zone, world units
pub const ZONE_EXTENT: f64 = 512.0;

fn highland_profile() -> EmpireProfile {
    EmpireProfile {
        empire: Empire::Highland,
        zone_extent: ZONE_EXTENT,
        base: NoiseLayer {
            frequency: 0.004,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            amplitude: 14.0,
            mode: FractalMode::Fbm,
        },
        feature: NoiseLayer {
            frequency: 0.010,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            amplitude: 22.0,
            mode: FractalMode::Ridged,
        },
        // Peaks rise across the northern third of the zone
        feature_gate: FeatureGate::NorthEdge {
            start: 0.55,
            end: 0.90,
        },
        detail: NoiseLayer {
            frequency: 0.08,
            octaves: 2,
            persistence: 0.5,
            lacunarity: 2.0,
            amplitude: 0.6,
            mode: FractalMode::Fbm,
        },
        village: VillagePlateau {
            center: (256.0, 256.0),
            radius: 48.0,
            base_height: 7.0,
            rim_height: 2.5,
        },
        carvings: vec![Carving::River {
            center_z: 120.0,
            width: 14.0,
            x_min: 0.0,
            x_max: ZONE_EXTENT,
            bed_height: 0.4,
        }],
    }
}

fn desert_profile() -> EmpireProfile {
    EmpireProfile {
        empire: Empire::Desert,
        zone_extent: ZONE_EXTENT,
        base: NoiseLayer {
            frequency: 0.003,
            octaves: 4,
            persistence: 0.45,
            lacunarity: 2.1,
            amplitude: 9.0,
            mode: FractalMode::Fbm,
        },
        feature: NoiseLayer {
            frequency: 0.012,
            octaves: 3,
            persistence: 0.5,
            lacunarity: 2.0,
            amplitude: 12.0,
            mode: FractalMode::Billow,
        },
        // Dune fields build up in the zone corners
        feature_gate: FeatureGate::Corners { radius: 0.45 },
        detail: NoiseLayer {
            frequency: 0.10,
            octaves: 2,
            persistence: 0.5,
            lacunarity: 2.0,
            amplitude: 0.4,
            mode: FractalMode::Fbm,
        },
        village: VillagePlateau {
            center: (256.0, 288.0),
            radius: 56.0,
            base_height: 5.0,
            rim_height: 2.0,
        },
        carvings: vec![Carving::Oasis {
            center: (140.0, 150.0),
            radius: 30.0,
            floor_height: 0.8,
        }],
    }
}

fn coastal_profile() -> EmpireProfile {
    EmpireProfile {
        empire: Empire::Coastal,
        zone_extent: ZONE_EXTENT,
        base: NoiseLayer {
            frequency: 0.005,
            octaves: 5,
            persistence: 0.5,
            lacunarity: 2.0,
            amplitude: 10.0,
            mode: FractalMode::Fbm,
        },
        feature: NoiseLayer {
            frequency: 0.008,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            amplitude: 16.0,
            mode: FractalMode::Ridged,
        },
        // Cliff line along the western shore
        feature_gate: FeatureGate::WestEdge {
            start: 0.40,
            end: 0.10,
        },
        detail: NoiseLayer {
            frequency: 0.09,
            octaves: 2,
            persistence: 0.5,
            lacunarity: 2.0,
            amplitude: 0.5,
            mode: FractalMode::Fbm,
        },
        village: VillagePlateau {
            center: (300.0, 256.0),
            radius: 44.0,
            base_height: 6.0,
            rim_height: 3.0,
        },
        carvings: vec![Carving::Harbor {
            center: (40.0, 256.0),
            radius: 60.0,
        }],
    }
}
