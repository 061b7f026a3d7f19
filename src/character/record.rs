//! The typed character record
//!
//! Sheets are parsed by serde into this schema; the rules engine never
//! touches the text form. Missing or malformed numbers degrade to 0, and
//! combat techniques to their baseline of 6.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::character::conditions::{ConditionKind, Conditions};
use crate::character::equipment::{ArmorPiece, Weapon};
use crate::character::zones::Zone;
use crate::core::lenient::{self, COMBAT_TECHNIQUE_BASELINE};
use crate::core::types::Pool;
use crate::progression::CostTier;
use crate::tables::hit_zones::{HitZone, HitZoneTables, Size, Topology};
use crate::tables::tables;

/// The eight base attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    MU,
    KL,
    IN,
    CH,
    FF,
    GE,
    KO,
    KK,
}

impl Attribute {
    pub fn all() -> [Attribute; 8] {
        use Attribute::*;
        [MU, KL, IN, CH, FF, GE, KO, KK]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Mut
    #[serde(rename = "MU", default, deserialize_with = "lenient::int")]
    pub courage: i32,
    /// Klugheit
    #[serde(rename = "KL", default, deserialize_with = "lenient::int")]
    pub cleverness: i32,
    /// Intuition
    #[serde(rename = "IN", default, deserialize_with = "lenient::int")]
    pub intuition: i32,
    /// Charisma
    #[serde(rename = "CH", default, deserialize_with = "lenient::int")]
    pub charisma: i32,
    /// Fingerfertigkeit
    #[serde(rename = "FF", default, deserialize_with = "lenient::int")]
    pub dexterity: i32,
    /// Gewandtheit
    #[serde(rename = "GE", default, deserialize_with = "lenient::int")]
    pub agility: i32,
    /// Konstitution
    #[serde(rename = "KO", default, deserialize_with = "lenient::int")]
    pub constitution: i32,
    /// Körperkraft
    #[serde(rename = "KK", default, deserialize_with = "lenient::int")]
    pub strength: i32,
}

impl Attributes {
    pub fn uniform(value: i32) -> Self {
        Self {
            courage: value,
            cleverness: value,
            intuition: value,
            charisma: value,
            dexterity: value,
            agility: value,
            constitution: value,
            strength: value,
        }
    }

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::MU => self.courage,
            Attribute::KL => self.cleverness,
            Attribute::IN => self.intuition,
            Attribute::CH => self.charisma,
            Attribute::FF => self.dexterity,
            Attribute::GE => self.agility,
            Attribute::KO => self.constitution,
            Attribute::KK => self.strength,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    /// Lebensenergie
    #[serde(rename = "LE", default)]
    pub life: Pool,
    /// Astralenergie
    #[serde(rename = "AE", default, skip_serializing_if = "Option::is_none")]
    pub arcane: Option<Pool>,
    /// Karmaenergie
    #[serde(rename = "KE", default, skip_serializing_if = "Option::is_none")]
    pub karma: Option<Pool>,
    /// Schicksalspunkte
    #[serde(rename = "SchiP", default)]
    pub fate: Pool,
}

/// A spell, ritual, liturgy or ceremony with its level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnedAbility {
    pub name: String,
    #[serde(default, deserialize_with = "lenient::level")]
    pub level: u32,
    /// Explicit cost tier; looked up by name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<CostTier>,
}

impl LearnedAbility {
    pub fn new(name: &str, level: u32) -> Self {
        Self {
            name: name.to_string(),
            level,
            tier: None,
        }
    }
}

/// An advantage, disadvantage or special ability with its signed AP value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointEntry {
    pub name: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub ap: i32,
}

impl PointEntry {
    pub fn new(name: &str, ap: i32) -> Self {
        Self {
            name: name.to_string(),
            ap,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFlags {
    #[serde(default)]
    pub dead: bool,
    /// Pain level 4 or a collapsed torso: cannot act
    #[serde(default)]
    pub incapacitated: bool,
    #[serde(default)]
    pub unconscious: bool,
    /// Zone names of limbs that can no longer be used
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unusable_limbs: BTreeSet<String>,
}

/// Creature anatomy and per-zone tracking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub topology: Topology,
    #[serde(default)]
    pub size: Size,
    /// Whether zones carry their own life sub-pools
    #[serde(default)]
    pub track_zones: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub zones: BTreeMap<String, Zone>,
}

impl Body {
    pub fn zone(&self, zone: &HitZone) -> Zone {
        self.zones.get(&zone.to_string()).copied().unwrap_or_default()
    }

    pub fn zone_mut(&mut self, zone: &HitZone) -> &mut Zone {
        self.zones.entry(zone.to_string()).or_default()
    }

    /// Give every zone of this anatomy a life sub-pool sized from `max_life`
    pub fn enable_tracking(&mut self, max_life: i32, tables: &HitZoneTables) {
        self.track_zones = true;
        for zone in tables.zones_for(self.topology, self.size) {
            let max = (max_life * zone.kind.life_share_percent() / 100).max(1);
            let entry = self.zones.entry(zone.to_string()).or_default();
            if entry.life.is_none() {
                entry.life = Some(Pool::full(max));
            }
        }
    }
}

fn default_species() -> String {
    "Mensch".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub name: String,
    #[serde(default = "default_species")]
    pub species: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tricks: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blessings: Vec<String>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub status: StatusFlags,
    #[serde(default, deserialize_with = "lenient::level_map")]
    pub skills: BTreeMap<String, u32>,
    #[serde(default, deserialize_with = "lenient::technique_map")]
    pub combat_techniques: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub spells: Vec<LearnedAbility>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rituals: Vec<LearnedAbility>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub liturgies: Vec<LearnedAbility>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ceremonies: Vec<LearnedAbility>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advantages: Vec<PointEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disadvantages: Vec<PointEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub special_abilities: Vec<PointEntry>,
    #[serde(default)]
    pub weapons: Vec<Weapon>,
    #[serde(default)]
    pub armor: Vec<ArmorPiece>,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default)]
    pub body: Body,
}

impl CharacterRecord {
    /// A human with average attributes and full life points
    pub fn new(name: &str) -> Self {
        let attributes = Attributes::uniform(10);
        Self {
            name: name.to_string(),
            species: default_species(),
            tricks: Vec::new(),
            blessings: Vec::new(),
            attributes,
            vitals: Vitals {
                life: Pool::full(5 + 2 * attributes.constitution),
                arcane: None,
                karma: None,
                fate: Pool::full(3),
            },
            status: StatusFlags::default(),
            skills: BTreeMap::new(),
            combat_techniques: BTreeMap::new(),
            spells: Vec::new(),
            rituals: Vec::new(),
            liturgies: Vec::new(),
            ceremonies: Vec::new(),
            advantages: Vec::new(),
            disadvantages: Vec::new(),
            special_abilities: Vec::new(),
            weapons: Vec::new(),
            armor: Vec::new(),
            conditions: Conditions::new(),
            body: Body::default(),
        }
    }

    /// Combat technique level, baseline 6 when not listed
    pub fn combat_technique(&self, name: &str) -> u32 {
        self.combat_techniques
            .get(name)
            .copied()
            .unwrap_or(COMBAT_TECHNIQUE_BASELINE)
    }

    /// Total Rüstungsschutz over all worn pieces
    pub fn armor_protection(&self) -> i32 {
        self.armor.iter().map(|a| a.protection.max(0)).sum()
    }

    /// Total Belastung over all worn pieces
    pub fn armor_encumbrance(&self) -> i32 {
        self.armor.iter().map(|a| a.encumbrance.max(0)).sum()
    }

    /// Damage at or above this value causes a severe injury
    pub fn wound_threshold(&self) -> i32 {
        self.attributes.constitution.max(0) / 2
    }

    pub fn pain_level(&self) -> u8 {
        self.conditions.level(ConditionKind::Pain)
    }

    pub fn can_act(&self) -> bool {
        !self.status.dead && !self.status.incapacitated && !self.status.unconscious
    }

    /// Restore the record invariants after loading hand-edited data
    pub fn normalize(&mut self) {
        self.vitals.life.normalize();
        self.vitals.fate.normalize();
        if let Some(pool) = self.vitals.arcane.as_mut() {
            pool.normalize();
        }
        if let Some(pool) = self.vitals.karma.as_mut() {
            pool.normalize();
        }
        if self.body.track_zones {
            self.body.enable_tracking(self.vitals.life.max, &tables().hit_zones);
        }
        for zone in self.body.zones.values_mut() {
            if let Some(pool) = zone.life.as_mut() {
                pool.normalize();
            }
        }
    }
}
