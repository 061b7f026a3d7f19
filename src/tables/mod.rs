//! Immutable rule tables
//!
//! The tables ship as TOML under `data/` and are embedded at compile time.
//! They are parsed once per process; `install_tables` replaces them with a
//! custom set before first use.

pub mod fumbles;
pub mod hit_zones;
pub mod injuries;
pub mod progression;

pub use fumbles::{
    category_sum, FumbleCategory, FumbleDetail, FumbleResult, FumbleRow, FumbleTables,
};
pub use hit_zones::{HitZone, HitZoneTable, HitZoneTables, Size, Topology, ZoneKind, ZoneRange};
pub use injuries::{InjuryCategory, InjuryEntry, InjuryResult, InjuryTables, SideEffect};
pub use progression::{ProgressionTables, SpeciesProfile, TechniqueProfile};

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use crate::core::{Result, RulesError};

const HIT_ZONES: &str = include_str!("../../data/hit_zones.toml");
const INJURIES: &str = include_str!("../../data/injuries.toml");
const FUMBLES: &str = include_str!("../../data/fumbles.toml");
const PROGRESSION: &str = include_str!("../../data/progression.toml");

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTables {
    pub hit_zones: HitZoneTables,
    pub injuries: InjuryTables,
    pub fumbles: FumbleTables,
    pub progression: ProgressionTables,
}

impl RuleTables {
    /// The tables embedded in the crate
    pub fn builtin() -> Result<Self> {
        Self::from_sources(HIT_ZONES, INJURIES, FUMBLES, PROGRESSION)
    }

    /// Load `hit_zones.toml`, `injuries.toml`, `fumbles.toml` and
    /// `progression.toml` from a directory
    pub fn load(dir: &Path) -> Result<Self> {
        let read = |file: &str| fs::read_to_string(dir.join(file));
        Self::from_sources(
            &read("hit_zones.toml")?,
            &read("injuries.toml")?,
            &read("fumbles.toml")?,
            &read("progression.toml")?,
        )
    }

    fn from_sources(
        hit_zones: &str,
        injuries: &str,
        fumbles: &str,
        progression: &str,
    ) -> Result<Self> {
        Ok(Self {
            hit_zones: toml::from_str(hit_zones)?,
            injuries: toml::from_str(injuries)?,
            fumbles: toml::from_str(fumbles)?,
            progression: toml::from_str(progression)?,
        })
    }

    /// Coverage check over every table
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = self.hit_zones.validate();
        errors.extend(self.injuries.validate());
        errors.extend(self.fumbles.validate());
        errors.extend(self.progression.validate());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

static TABLES: OnceLock<RuleTables> = OnceLock::new();

/// Process-wide rule tables, parsed from the embedded data on first use
///
/// # Panics
///
/// Panics if the embedded data does not parse. The data is compiled into
/// the crate, so this is a build defect rather than a runtime condition.
pub fn tables() -> &'static RuleTables {
    TABLES.get_or_init(|| {
        RuleTables::builtin()
            .unwrap_or_else(|e| panic!("embedded rule tables failed to parse: {}", e))
    })
}

/// Install custom tables; fails if tables were already initialized
pub fn install_tables(tables: RuleTables) -> Result<()> {
    if let Err(errors) = tables.validate() {
        return Err(RulesError::Table(errors.join("; ")));
    }
    TABLES
        .set(tables)
        .map_err(|_| RulesError::Table("rule tables already initialized".to_string()))
}
