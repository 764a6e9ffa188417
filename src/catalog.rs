//! Compiled-in catalog of the Saharan administrative regions shown on the
//! map.
//!
//! The catalog is read-only: regions are defined as constants and handed out
//! by reference. Lookups by id go through [`RegionCatalog::get`], which
//! reports a miss as [`MapError::UnknownRegion`] instead of swallowing it.

use std::collections::HashSet;

use crate::color::Color;
use crate::error::{MapError, Result};
use crate::geo::{self, LngLat, MIN_RING_POINTS};

/// Stable region key, also used as the prefix of every layer and source
/// name registered for the region.
pub type RegionId = &'static str;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionStats {
    pub population: u64,
    /// Area in km².
    pub area_km2: f64,
    pub city_count: u32,
    /// English description, used when no localized override exists.
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub id: RegionId,
    /// Canonical, untranslated display name.
    pub name: &'static str,
    /// Camera fly-to target.
    pub center: LngLat,
    /// Shared by fill, outline and panel accent.
    pub color: Color,
    /// Closed outer ring, first point repeated at the end.
    pub polygon: &'static [LngLat],
    pub stats: RegionStats,
}

// ============================================================================
// STATIC CATALOG DATA
// ============================================================================

const LAAYOUNE_RING: &[LngLat] = &[
    LngLat::new(-13.2, 27.7),
    LngLat::new(-11.0, 27.9),
    LngLat::new(-8.7, 27.7),
    LngLat::new(-8.7, 26.0),
    LngLat::new(-12.0, 26.0),
    LngLat::new(-14.5, 26.1),
    LngLat::new(-13.2, 27.7),
];

const DAKHLA_RING: &[LngLat] = &[
    LngLat::new(-14.5, 26.1),
    LngLat::new(-12.0, 26.0),
    LngLat::new(-12.0, 23.4),
    LngLat::new(-13.0, 21.4),
    LngLat::new(-16.9, 21.3),
    LngLat::new(-15.8, 23.6),
    LngLat::new(-14.5, 26.1),
];

const GUELMIM_RING: &[LngLat] = &[
    LngLat::new(-11.5, 28.7),
    LngLat::new(-9.8, 29.6),
    LngLat::new(-7.0, 29.2),
    LngLat::new(-8.7, 27.7),
    LngLat::new(-11.0, 27.9),
    LngLat::new(-11.5, 28.7),
];

const SOUSS_RING: &[LngLat] = &[
    LngLat::new(-10.0, 30.6),
    LngLat::new(-8.0, 31.0),
    LngLat::new(-6.0, 30.5),
    LngLat::new(-7.0, 29.2),
    LngLat::new(-9.8, 29.6),
    LngLat::new(-10.0, 30.6),
];

/// The four regions, in display and registration order.
pub const REGIONS: &[Region] = &[
    Region {
        id: "laayoune",
        name: "Laâyoune-Sakia El Hamra",
        center: LngLat::new(-11.5, 26.9),
        color: Color::hex(0xE6, 0xA1, 0x5C),
        polygon: LAAYOUNE_RING,
        stats: RegionStats {
            population: 367_758,
            area_km2: 140_018.0,
            city_count: 4,
            description: "The heart of the Sakia El Hamra valley, home to nomadic camps, \
                          the great Hassani poets and the caravan trade of the northern Sahara.",
        },
    },
    Region {
        id: "dakhla",
        name: "Dakhla-Oued Ed-Dahab",
        center: LngLat::new(-14.3, 23.7),
        color: Color::hex(0x4F, 0x9D, 0xA6),
        polygon: DAKHLA_RING,
        stats: RegionStats {
            population: 142_955,
            area_km2: 130_898.0,
            city_count: 2,
            description: "A peninsula where the desert meets the Atlantic, known for its \
                          lagoon, fishing traditions and the songs of the coastal tribes.",
        },
    },
    Region {
        id: "guelmim",
        name: "Guelmim-Oued Noun",
        center: LngLat::new(-9.8, 28.7),
        color: Color::hex(0xC0, 0x6C, 0x44),
        polygon: GUELMIM_RING,
        stats: RegionStats {
            population: 433_757,
            area_km2: 46_108.0,
            city_count: 4,
            description: "The gateway to the Sahara, famous for its camel market and as the \
                          meeting point of Hassani and Amazigh cultures.",
        },
    },
    Region {
        id: "souss",
        name: "Souss-Massa",
        center: LngLat::new(-8.3, 30.1),
        color: Color::hex(0x8C, 0xA6, 0x4B),
        polygon: SOUSS_RING,
        stats: RegionStats {
            population: 2_676_847,
            area_km2: 51_642.0,
            city_count: 6,
            description: "Fertile plains and argan forests linking the Atlas mountains to the \
                          desert routes travelled by Sahrawi caravans.",
        },
    },
];

/// Read-only table of regions with insertion-ordered iteration.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: Vec<Region>,
}

impl RegionCatalog {
    /// The built-in four-region catalog.
    pub fn builtin() -> Self {
        Self {
            regions: REGIONS.to_vec(),
        }
    }

    /// Build a catalog from arbitrary regions, rejecting any that break the
    /// catalog invariants.
    pub fn new(regions: Vec<Region>) -> Result<Self> {
        let catalog = Self { regions };
        catalog.validate()?;
        Ok(catalog)
    }

    /// All regions in insertion order.
    pub fn all(&self) -> &[Region] {
        &self.regions
    }

    pub fn get(&self, id: &str) -> Result<&Region> {
        self.regions
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| MapError::UnknownRegion(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Check unique ids, closed rings of at least [`MIN_RING_POINTS`] points
    /// and positive area.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for region in &self.regions {
            let invalid = |reason: &str| MapError::InvalidRegion {
                id: region.id.to_string(),
                reason: reason.to_string(),
            };
            if !seen.insert(region.id) {
                return Err(invalid("duplicate id"));
            }
            if region.polygon.len() < MIN_RING_POINTS {
                return Err(invalid("polygon has fewer than 4 points"));
            }
            if !geo::is_closed(region.polygon) {
                return Err(invalid("polygon ring is not closed"));
            }
            if region.stats.area_km2.is_nan() || region.stats.area_km2 <= 0.0 {
                return Err(invalid("area must be positive"));
            }
        }
        Ok(())
    }
}

impl Default for RegionCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
