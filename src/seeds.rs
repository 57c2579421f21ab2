//! Seed management for terrain synthesis.
//!
//! Each noise layer gets its own seed, derived from a master seed, so one
//! layer can be varied for experimentation while the others stay fixed.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeds for the terrain noise layers.
///
/// Derived deterministically from a master seed by default; individual
/// layer seeds can be overridden through the builder.
#[derive(Clone, Copy, Debug)]
pub struct ExportSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Base terrain layer (broad elevation shape)
    pub base: u64,
    /// Gated feature layer (mountains, dunes, cliffs)
    pub feature: u64,
    /// Detail layer (surface roughness)
    pub detail: u64,
}

impl ExportSeeds {
    /// Create seeds from a master seed, deriving all layer seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            base: derive_seed(master, "base"),
            feature: derive_seed(master, "feature"),
            detail: derive_seed(master, "detail"),
        }
    }

    /// Create a builder for customizing individual layer seeds
    pub fn builder(master: u64) -> ExportSeedsBuilder {
        ExportSeedsBuilder::new(master)
    }
}

impl Default for ExportSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Builder for overriding individual layer seeds while deriving the rest
pub struct ExportSeedsBuilder {
    seeds: ExportSeeds,
}

impl ExportSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: ExportSeeds::from_master(master),
        }
    }

    /// Override the base layer seed
    pub fn base(mut self, seed: u64) -> Self {
        self.seeds.base = seed;
        self
    }

    /// Override the feature layer seed
    pub fn feature(mut self, seed: u64) -> Self {
        self.seeds.feature = seed;
        self
    }

    /// Override the detail layer seed
    pub fn detail(mut self, seed: u64) -> Self {
        self.seeds.detail = seed;
        self
    }

    /// Build the final ExportSeeds
    pub fn build(self) -> ExportSeeds {
        self.seeds
    }
}

/// Derive a layer seed from the master seed and a layer name.
/// Hashing ensures different layers get different but deterministic seeds.
fn derive_seed(master: u64, layer: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    layer.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for ExportSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ExportSeeds {{ master: {}, base: {}, feature: {}, detail: {} }}",
            self.master, self.base, self.feature, self.detail,
        )
    }
}
