//! Hit-zone selection: creature topology + size → roll table → zone

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::Side;
use crate::tables::injuries::InjuryCategory;

/// Body plan of a creature
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    #[default]
    Humanoid,
    Quadruped,
    /// Four legs, two wings and a tail (dragons, griffins)
    SixLimbed,
    Tentacled,
    /// No anatomy; every hit lands on the torso
    None,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
    Huge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Head,
    Torso,
    Arm,
    Leg,
    Foreleg,
    Hindleg,
    Wing,
    Tail,
    Tentacle,
}

impl ZoneKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "head" => Some(ZoneKind::Head),
            "torso" => Some(ZoneKind::Torso),
            "arm" => Some(ZoneKind::Arm),
            "leg" => Some(ZoneKind::Leg),
            "foreleg" => Some(ZoneKind::Foreleg),
            "hindleg" => Some(ZoneKind::Hindleg),
            "wing" => Some(ZoneKind::Wing),
            "tail" => Some(ZoneKind::Tail),
            "tentacle" => Some(ZoneKind::Tentacle),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ZoneKind::Head => "head",
            ZoneKind::Torso => "torso",
            ZoneKind::Arm => "arm",
            ZoneKind::Leg => "leg",
            ZoneKind::Foreleg => "foreleg",
            ZoneKind::Hindleg => "hindleg",
            ZoneKind::Wing => "wing",
            ZoneKind::Tail => "tail",
            ZoneKind::Tentacle => "tentacle",
        }
    }

    /// Paired zones get a left/right qualifier
    pub fn is_sided(&self) -> bool {
        matches!(
            self,
            ZoneKind::Arm | ZoneKind::Leg | ZoneKind::Foreleg | ZoneKind::Hindleg | ZoneKind::Wing
        )
    }

    pub fn is_limb(&self) -> bool {
        !matches!(self, ZoneKind::Head | ZoneKind::Torso)
    }

    /// Which injury table covers this zone
    pub fn injury_category(&self) -> InjuryCategory {
        match self {
            ZoneKind::Head => InjuryCategory::Head,
            ZoneKind::Torso => InjuryCategory::Torso,
            ZoneKind::Arm => InjuryCategory::Arm,
            ZoneKind::Leg | ZoneKind::Foreleg | ZoneKind::Hindleg => InjuryCategory::Leg,
            ZoneKind::Wing | ZoneKind::Tail | ZoneKind::Tentacle => InjuryCategory::Generic,
        }
    }

    /// Share of the character's max LE given to this zone's sub-pool
    pub fn life_share_percent(&self) -> i32 {
        match self {
            ZoneKind::Head => 30,
            ZoneKind::Torso => 50,
            ZoneKind::Arm | ZoneKind::Foreleg | ZoneKind::Wing => 25,
            ZoneKind::Leg | ZoneKind::Hindleg => 30,
            ZoneKind::Tail | ZoneKind::Tentacle => 20,
        }
    }
}

/// A concrete, possibly side-qualified zone ("left arm", "torso")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HitZone {
    pub kind: ZoneKind,
    pub side: Option<Side>,
}

impl HitZone {
    pub fn new(kind: ZoneKind, side: Option<Side>) -> Self {
        let side = if kind.is_sided() { side } else { None };
        Self { kind, side }
    }

    pub fn torso() -> Self {
        Self::new(ZoneKind::Torso, None)
    }

    /// Zone reached by a d20 roll; sided zones take their side from roll parity
    pub fn from_roll(kind: ZoneKind, roll: u32) -> Self {
        let side = kind.is_sided().then(|| Side::from_roll(roll));
        Self::new(kind, side)
    }

    /// Parse "left arm", "right hindleg", "head"
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().to_lowercase();
        let mut words = text.split_whitespace();
        let first = words.next()?;
        let side = match first {
            "left" => Some(Side::Left),
            "right" => Some(Side::Right),
            _ => None,
        };
        let kind_word = if side.is_some() { words.next()? } else { first };
        if words.next().is_some() {
            return None;
        }
        let kind = ZoneKind::from_name(kind_word)?;
        if kind.is_sided() != side.is_some() {
            return None;
        }
        Some(Self::new(kind, side))
    }
}

impl TryFrom<String> for HitZone {
    type Error = String;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::parse(&text).ok_or_else(|| format!("unknown hit zone '{}'", text))
    }
}

impl From<HitZone> for String {
    fn from(zone: HitZone) -> Self {
        zone.to_string()
    }
}

impl fmt::Display for HitZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Some(side) => write!(f, "{} {}", side, self.kind.name()),
            None => f.write_str(self.kind.name()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRange {
    pub min: u32,
    pub max: u32,
    pub zone: ZoneKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitZoneTable {
    pub topology: Topology,
    pub size: Size,
    pub ranges: Vec<ZoneRange>,
}

impl HitZoneTable {
    fn lookup(&self, roll: u32) -> Option<ZoneKind> {
        self.ranges
            .iter()
            .find(|r| (r.min..=r.max).contains(&roll))
            .map(|r| r.zone)
    }
}

/// Every topology+size roll table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitZoneTables {
    #[serde(rename = "table", default)]
    pub tables: Vec<HitZoneTable>,
}

impl HitZoneTables {
    fn exact(&self, topology: Topology, size: Size) -> Option<&HitZoneTable> {
        self.tables
            .iter()
            .find(|t| t.topology == topology && t.size == size)
    }

    /// Table for a topology/size pair; undefined pairs use humanoid-medium
    pub fn table_for(&self, topology: Topology, size: Size) -> Option<&HitZoneTable> {
        if topology == Topology::None {
            return None;
        }
        self.exact(topology, size).or_else(|| {
            tracing::warn!(?topology, ?size, "no hit-zone table, using humanoid/medium");
            self.exact(Topology::Humanoid, Size::Medium)
        })
    }

    /// Map a 1–20 roll to a zone; unmatched rolls land on the torso
    pub fn select_zone(&self, roll: u32, topology: Topology, size: Size) -> HitZone {
        let kind = self
            .table_for(topology, size)
            .and_then(|table| table.lookup(roll));
        match kind {
            Some(kind) => HitZone::from_roll(kind, roll),
            None => HitZone::torso(),
        }
    }

    /// All distinct zones of an anatomy, sided zones expanded to both sides
    pub fn zones_for(&self, topology: Topology, size: Size) -> Vec<HitZone> {
        let Some(table) = self.table_for(topology, size) else {
            return vec![HitZone::torso()];
        };
        let mut kinds: Vec<ZoneKind> = table.ranges.iter().map(|r| r.zone).collect();
        kinds.sort();
        kinds.dedup();

        let mut zones = Vec::new();
        for kind in kinds {
            if kind.is_sided() {
                zones.push(HitZone::new(kind, Some(Side::Left)));
                zones.push(HitZone::new(kind, Some(Side::Right)));
            } else {
                zones.push(HitZone::new(kind, None));
            }
        }
        zones
    }

    /// Report gaps and overlaps in the 1–20 coverage of every table
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.exact(Topology::Humanoid, Size::Medium).is_none() {
            errors.push("hit zones: humanoid/medium fallback table is missing".to_string());
        }
        for table in &self.tables {
            for roll in 1..=20 {
                let hits = table
                    .ranges
                    .iter()
                    .filter(|r| (r.min..=r.max).contains(&roll))
                    .count();
                if hits != 1 {
                    errors.push(format!(
                        "hit zones {:?}/{:?}: roll {} matched {} ranges",
                        table.topology, table.size, roll, hits
                    ));
                }
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::tables;

    #[test]
    fn test_humanoid_medium_zones() {
        let zones = &tables().hit_zones;
        assert_eq!(
            zones.select_zone(1, Topology::Humanoid, Size::Medium),
            HitZone::new(ZoneKind::Head, None)
        );
        assert_eq!(
            zones.select_zone(7, Topology::Humanoid, Size::Medium),
            HitZone::torso()
        );
    }

    #[test]
    fn test_limb_parity() {
        let zones = &tables().hit_zones;
        let even = zones.select_zone(14, Topology::Humanoid, Size::Medium);
        let odd = zones.select_zone(13, Topology::Humanoid, Size::Medium);
        assert_eq!(even.to_string(), "right arm");
        assert_eq!(odd.to_string(), "left arm");
    }

    #[test]
    fn test_quadruped_legs_are_sided() {
        let zones = &tables().hit_zones;
        let zone = zones.select_zone(14, Topology::Quadruped, Size::Medium);
        assert_eq!(zone, HitZone::new(ZoneKind::Foreleg, Some(Side::Right)));
    }

    #[test]
    fn test_no_topology_falls_back_to_torso() {
        let zones = &tables().hit_zones;
        for roll in [1, 10, 20] {
            assert_eq!(zones.select_zone(roll, Topology::None, Size::Medium), HitZone::torso());
        }
    }

    #[test]
    fn test_undefined_size_uses_humanoid_medium() {
        let zones = &tables().hit_zones;
        // Tentacled creatures define no small table
        let zone = zones.select_zone(1, Topology::Tentacled, Size::Small);
        assert_eq!(zone.kind, ZoneKind::Head);
        let zone = zones.select_zone(18, Topology::Tentacled, Size::Small);
        assert_eq!(zone.kind, ZoneKind::Leg);
    }

    #[test]
    fn test_out_of_range_roll_is_torso() {
        let zones = &tables().hit_zones;
        assert_eq!(zones.select_zone(0, Topology::Humanoid, Size::Medium), HitZone::torso());
        assert_eq!(zones.select_zone(25, Topology::Humanoid, Size::Medium), HitZone::torso());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(
            HitZone::parse("Left Arm"),
            Some(HitZone::new(ZoneKind::Arm, Some(Side::Left)))
        );
        assert_eq!(HitZone::parse("torso"), Some(HitZone::torso()));
        assert_eq!(HitZone::parse("arm"), None);
        assert_eq!(HitZone::parse("left torso"), None);
        assert_eq!(HitZone::parse("left arm extra"), None);
    }

    #[test]
    fn test_zones_for_expands_sides() {
        let zones = tables().hit_zones.zones_for(Topology::Humanoid, Size::Medium);
        assert_eq!(zones.len(), 6);
        assert!(zones.contains(&HitZone::parse("right leg").unwrap()));
    }

    #[test]
    fn test_injury_categories() {
        assert_eq!(ZoneKind::Foreleg.injury_category(), InjuryCategory::Leg);
        assert_eq!(ZoneKind::Tentacle.injury_category(), InjuryCategory::Generic);
        assert!(ZoneKind::Wing.is_limb());
        assert!(!ZoneKind::Head.is_limb());
    }

    #[test]
    fn test_hit_zone_serializes_as_name() {
        let zone = HitZone::parse("right foreleg").unwrap();
        let json = serde_json::to_string(&zone).unwrap();
        assert_eq!(json, "\"right foreleg\"");
        let back: HitZone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, zone);
        assert!(serde_json::from_str::<HitZone>("\"left head\"").is_err());
    }
}
