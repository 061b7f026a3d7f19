//! Effect definitions
//!
//! Every modifier kind is a fixed field, so summing effects is a plain
//! field-by-field addition with zero for anything absent.

use derive_more::{Add, AddAssign};
use serde::{Deserialize, Serialize};

use crate::character::ConditionKind;

fn is_zero(value: &i32) -> bool {
    *value == 0
}

/// Combat modifiers carried by an effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Add, AddAssign, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierSet {
    #[serde(skip_serializing_if = "is_zero")]
    pub attack: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub parry: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub dodge: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub ranged: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub movement: i32,
}

impl ModifierSet {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Condition-level deltas carried by an effect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Add, AddAssign, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionDeltas {
    #[serde(skip_serializing_if = "is_zero")]
    pub pain: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub stun: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub fear: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub paralysis: i32,
    #[serde(skip_serializing_if = "is_zero")]
    pub confusion: i32,
}

impl ConditionDeltas {
    pub fn single(kind: ConditionKind, delta: i32) -> Self {
        let mut deltas = Self::default();
        match kind {
            ConditionKind::Pain => deltas.pain = delta,
            ConditionKind::Stun => deltas.stun = delta,
            ConditionKind::Fear => deltas.fear = delta,
            ConditionKind::Paralysis => deltas.paralysis = delta,
            ConditionKind::Confusion => deltas.confusion = delta,
        }
        deltas
    }

    pub fn get(&self, kind: ConditionKind) -> i32 {
        match kind {
            ConditionKind::Pain => self.pain,
            ConditionKind::Stun => self.stun,
            ConditionKind::Fear => self.fear,
            ConditionKind::Paralysis => self.paralysis,
            ConditionKind::Confusion => self.confusion,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A timed modifier owned by one character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub name: String,
    #[serde(default, skip_serializing_if = "ModifierSet::is_empty")]
    pub modifiers: ModifierSet,
    #[serde(default, skip_serializing_if = "ConditionDeltas::is_empty")]
    pub conditions: ConditionDeltas,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_damage: Option<String>,
    /// Remaining duration in rounds
    #[serde(default, deserialize_with = "crate::core::lenient::int")]
    pub rounds: i32,
}

impl Effect {
    pub fn new(name: &str, rounds: i32) -> Self {
        Self {
            name: name.to_string(),
            modifiers: ModifierSet::default(),
            conditions: ConditionDeltas::default(),
            status: None,
            extra_damage: None,
            rounds,
        }
    }

    pub fn with_modifiers(mut self, modifiers: ModifierSet) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_conditions(mut self, conditions: ConditionDeltas) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn with_extra_damage(mut self, formula: &str) -> Self {
        self.extra_damage = Some(formula.to_string());
        self
    }
}

/// Sum of every numeric field over a character's active effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Add, AddAssign)]
pub struct EffectTotals {
    pub modifiers: ModifierSet,
    pub conditions: ConditionDeltas,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_sets_add() {
        let a = ModifierSet {
            attack: -2,
            parry: -1,
            ..Default::default()
        };
        let b = ModifierSet {
            parry: -2,
            movement: 1,
            ..Default::default()
        };
        let sum = a + b;
        assert_eq!(sum.attack, -2);
        assert_eq!(sum.parry, -3);
        assert_eq!(sum.movement, 1);
        assert_eq!(sum.dodge, 0);
    }

    #[test]
    fn test_single_condition_delta() {
        let deltas = ConditionDeltas::single(ConditionKind::Stun, 2);
        assert_eq!(deltas.get(ConditionKind::Stun), 2);
        assert_eq!(deltas.get(ConditionKind::Pain), 0);
    }

    #[test]
    fn test_effect_record_omits_absent_fields() {
        let effect = Effect::new("Armatrutz", 5).with_modifiers(ModifierSet {
            parry: 1,
            ..Default::default()
        });
        let text = toml::to_string(&effect).unwrap();
        assert!(text.contains("parry = 1"));
        assert!(!text.contains("attack"));
        assert!(!text.contains("status"));

        let parsed: Effect = toml::from_str(&text).unwrap();
        assert_eq!(parsed, effect);
    }
}
