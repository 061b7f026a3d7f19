//! Carried weapons and worn armor

use serde::{Deserialize, Serialize};

use crate::core::lenient;

/// Combat technique that marks a weapon as a shield
pub const SHIELD_TECHNIQUE: &str = "Schilde";

/// Combat technique used for unarmed parries
pub const UNARMED_TECHNIQUE: &str = "Raufen";

/// How a ranged weapon delivers its projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangedKind {
    /// Bows, crossbows, slings
    Fired,
    /// Javelins, throwing knives, axes
    Thrown,
}

/// Ranged-only weapon fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangedProfile {
    pub kind: RangedKind,
    /// Range bands as written on the sheet, e.g. "10/50/90"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges: Option<String>,
    /// Reload time in actions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reload: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ammunition: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub technique: String,
    /// Damage formula, e.g. "1W6+4"
    #[serde(default)]
    pub damage: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub attack_mod: i32,
    #[serde(default, deserialize_with = "lenient::int")]
    pub parry_mod: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranged: Option<RangedProfile>,
}

impl Weapon {
    pub fn melee(
        name: &str,
        technique: &str,
        damage: &str,
        attack_mod: i32,
        parry_mod: i32,
    ) -> Self {
        Self {
            name: name.to_string(),
            technique: technique.to_string(),
            damage: damage.to_string(),
            attack_mod,
            parry_mod,
            ranged: None,
        }
    }

    pub fn shield(name: &str, attack_mod: i32, parry_mod: i32) -> Self {
        Self::melee(name, SHIELD_TECHNIQUE, "1W6", attack_mod, parry_mod)
    }

    pub fn is_shield(&self) -> bool {
        self.technique.eq_ignore_ascii_case(SHIELD_TECHNIQUE)
    }

    pub fn is_ranged(&self) -> bool {
        self.ranged.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorPiece {
    pub name: String,
    /// Rüstungsschutz (RS)
    #[serde(default, deserialize_with = "lenient::int")]
    pub protection: i32,
    /// Belastung (BE)
    #[serde(default, deserialize_with = "lenient::int")]
    pub encumbrance: i32,
    /// Extra penalty text, e.g. "-1 GS, -1 INI"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_penalty: Option<String>,
}

impl ArmorPiece {
    pub fn new(name: &str, protection: i32, encumbrance: i32) -> Self {
        Self {
            name: name.to_string(),
            protection,
            encumbrance,
            extra_penalty: None,
        }
    }
}
