//! Deterministic procedural height fields.
//!
//! A `HeightProfile` maps `(x, z)` world coordinates to an elevation using
//! layered noise synthesis:
//! 1. Low-frequency base layer mapped from [-1,1] to [0, base_amplitude]
//! 2. Feature layer (mountains/dunes/cliffs) gated by zone position
//! 3. Small-amplitude detail layer for surface roughness
//! 4. Village plateau shaping (flat build area with a raised rim)
//! 5. Bounded carving features (river, oasis, harbor)
//! 6. Clamp to non-negative height
//!
//! The composition order and blend formulas are load-bearing: the server
//! samples elevation from this same function (or its baked output), so the
//! layers must combine identically across empires.

use noise::{NoiseFn, Perlin, Seedable};

use crate::empire::{Carving, EmpireProfile, FeatureGate, FractalMode, NoiseLayer};
use crate::seeds::ExportSeeds;

/// Ridge sharpening exponent for ridged layers
const RIDGE_POWER: f64 = 2.0;

// =============================================================================
// HEIGHT PROFILE
// =============================================================================

/// Pure elevation function for one empire's terrain style.
///
/// Deterministic and side-effect-free for fixed seeds.
pub struct HeightProfile {
    profile: EmpireProfile,
    base_noise: Perlin,
    feature_noise: Perlin,
    detail_noise: Perlin,
}

impl HeightProfile {
    pub fn new(profile: EmpireProfile, seeds: &ExportSeeds) -> Self {
        Self {
            base_noise: Perlin::new(1).set_seed(seeds.base as u32),
            feature_noise: Perlin::new(1).set_seed(seeds.feature as u32),
            detail_noise: Perlin::new(1).set_seed(seeds.detail as u32),
            profile,
        }
    }

    pub fn profile(&self) -> &EmpireProfile {
        &self.profile
    }

    /// Elevation at a world coordinate, always >= 0.
    pub fn height(&self, x: f64, z: f64) -> f64 {
        let p = &self.profile;

        // Base layer
        let mut height = layer_value(&self.base_noise, &p.base, x, z) * p.base.amplitude;

        // Feature layer, faded by position within the zone
        let nx = (x / p.zone_extent).clamp(0.0, 1.0);
        let nz = (z / p.zone_extent).clamp(0.0, 1.0);
        let gate = gate_factor(&p.feature_gate, nx, nz);
        if gate > 0.0 {
            height += layer_value(&self.feature_noise, &p.feature, x, z) * p.feature.amplitude * gate;
        }

        // Detail layer: signed roughness, always present
        let d = &p.detail;
        height += fbm(
            &self.detail_noise,
            x * d.frequency,
            z * d.frequency,
            d.octaves,
            d.persistence,
            d.lacunarity,
        ) * d.amplitude;

        // Village plateau replaces the natural height near the settlement
        height = self.apply_village_plateau(x, z, height);

        // Carving features pull terrain toward their targets
        height = self.apply_carvings(x, z, height);

        height.max(0.0)
    }

    /// Flat build area, sine rim bump, smoothstep blend back to natural terrain.
    fn apply_village_plateau(&self, x: f64, z: f64, natural: f64) -> f64 {
        let v = &self.profile.village;
        let d = ((x - v.center.0).powi(2) + (z - v.center.1).powi(2)).sqrt();

        let inner = v.radius * 0.7;
        let rim = v.radius;
        let outer = v.radius * 2.0;

        if d < inner {
            v.base_height
        } else if d < rim {
            let t = (d - inner) / (rim - inner);
            v.base_height + (std::f64::consts::PI * t).sin() * v.rim_height
        } else if d < outer {
            let blend = smooth_step(0.0, 1.0, (d - rim) / (outer - rim));
            v.base_height * (1.0 - blend) + natural * blend
        } else {
            natural
        }
    }

    /// Each carving interpolates toward its target height with a squared
    /// linear falloff, active only inside its bounded region.
    fn apply_carvings(&self, x: f64, z: f64, mut height: f64) -> f64 {
        for carving in &self.profile.carvings {
            match *carving {
                Carving::River {
                    center_z,
                    width,
                    x_min,
                    x_max,
                    bed_height,
                } => {
                    if x >= x_min && x <= x_max {
                        let d = (z - center_z).abs();
                        if d < width {
                            let t = 1.0 - d / width;
                            height += (bed_height - height) * t * t;
                        }
                    }
                }
                Carving::Oasis {
                    center,
                    radius,
                    floor_height,
                } => {
                    let d = ((x - center.0).powi(2) + (z - center.1).powi(2)).sqrt();
                    if d < radius {
                        let t = 1.0 - d / radius;
                        height += (floor_height - height) * t * t;
                    }
                }
                Carving::Harbor { center, radius } => {
                    let d = ((x - center.0).powi(2) + (z - center.1).powi(2)).sqrt();
                    if d < radius {
                        let t = 1.0 - d / radius;
                        height -= height * t * t;
                    }
                }
            }
        }
        height
    }
}

// =============================================================================
// NOISE FUNCTIONS
// =============================================================================

/// Evaluate a noise layer, normalized to [0, 1] for its fractal mode.
fn layer_value(noise: &Perlin, layer: &NoiseLayer, x: f64, z: f64) -> f64 {
    let fx = x * layer.frequency;
    let fz = z * layer.frequency;
    match layer.mode {
        FractalMode::Fbm => {
            (fbm(noise, fx, fz, layer.octaves, layer.persistence, layer.lacunarity) + 1.0) * 0.5
        }
        FractalMode::Ridged => ridged(noise, fx, fz, layer.octaves, layer.persistence, layer.lacunarity),
        FractalMode::Billow => billow(noise, fx, fz, layer.octaves, layer.persistence, layer.lacunarity),
    }
}

/// Fractional Brownian Motion - multi-octave noise in roughly [-1, 1]
fn fbm(noise: &Perlin, x: f64, z: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += amplitude * noise.get([x * frequency, z * frequency]);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    total / max_value
}

/// Ridged multifractal in [0, 1]: crests at noise zero crossings
fn ridged(noise: &Perlin, x: f64, z: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        let n = noise.get([x * frequency, z * frequency]);
        let ridge = (1.0 - n.abs()).powf(RIDGE_POWER);
        total += amplitude * ridge;
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    (total / max_value).max(0.0)
}

/// Billow noise in [0, 1]: rounded dune-like lobes
fn billow(noise: &Perlin, x: f64, z: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves {
        total += amplitude * noise.get([x * frequency, z * frequency]).abs();
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    total / max_value
}

/// Smooth step interpolation
fn smooth_step(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Evaluate a feature gate at a normalized zone position.
fn gate_factor(gate: &FeatureGate, nx: f64, nz: f64) -> f64 {
    match *gate {
        FeatureGate::NorthEdge { start, end } => smooth_step(start, end, nz),
        FeatureGate::WestEdge { start, end } => smooth_step(start, end, nx),
        FeatureGate::Corners { radius } => {
            let d = corner_distance(nx, nz);
            smooth_step(0.0, 1.0, (radius - d) / radius)
        }
    }
}

/// Distance to the nearest zone corner in normalized coordinates
fn corner_distance(nx: f64, nz: f64) -> f64 {
    let dx = nx.min(1.0 - nx);
    let dz = nz.min(1.0 - nz);
    (dx * dx + dz * dz).sqrt()
}
