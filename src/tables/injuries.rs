//! Injury tables and the severe-injury escalation rule
//!
//! Each zone category owns six entries keyed by a d6 roll. Once a zone
//! has taken its threshold of severe injuries, the next one uses the
//! entry's extreme variant instead, which may be lethal.

use serde::{Deserialize, Serialize};

use crate::core::config;
use crate::effects::{ConditionDeltas, Effect, ModifierSet};
use crate::tables::hit_zones::{HitZone, ZoneKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjuryCategory {
    Head,
    Torso,
    Arm,
    Leg,
    Generic,
}

/// Mechanical consequences attached to an injury or fumble outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEffect {
    /// Damage added on top of the triggering hit, bypassing armor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_damage: Option<String>,
    #[serde(default, skip_serializing_if = "ModifierSet::is_empty")]
    pub modifiers: ModifierSet,
    #[serde(default)]
    pub modifier_rounds: i32,
    #[serde(default, skip_serializing_if = "ConditionDeltas::is_empty")]
    pub conditions: ConditionDeltas,
    /// `None` lasts until healed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_rounds: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl SideEffect {
    /// Ledger effects this side effect registers, named after their source
    pub fn to_effects(&self, source: &str) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.modifiers.is_empty() {
            let rounds = self.modifier_rounds.max(1);
            effects.push(Effect::new(source, rounds).with_modifiers(self.modifiers));
        }
        if !self.conditions.is_empty() {
            let rounds = self
                .condition_rounds
                .unwrap_or(config().until_healed_rounds);
            effects.push(Effect::new(source, rounds).with_conditions(self.conditions));
        }
        effects
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtremeVariant {
    pub description: String,
    #[serde(default)]
    pub lethal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryEntry {
    pub roll: u32,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub effect: SideEffect,
    pub extreme: ExtremeVariant,
}

/// Resolved injury for one severe hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryResult {
    pub zone: String,
    pub roll: u32,
    pub name: String,
    pub description: String,
    pub side_effect: SideEffect,
    /// The extreme variant replaced the normal result
    pub extreme: bool,
    pub lethal: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjuryTables {
    #[serde(default)]
    pub head: Vec<InjuryEntry>,
    #[serde(default)]
    pub torso: Vec<InjuryEntry>,
    #[serde(default)]
    pub arm: Vec<InjuryEntry>,
    #[serde(default)]
    pub leg: Vec<InjuryEntry>,
    #[serde(default)]
    pub generic: Vec<InjuryEntry>,
}

/// Prior severe injuries a zone can take before the extreme variant applies
pub fn escalation_threshold(kind: ZoneKind) -> u32 {
    match kind {
        ZoneKind::Torso => config().torso_escalation_threshold,
        _ => config().zone_escalation_threshold,
    }
}

impl InjuryTables {
    pub fn table(&self, category: InjuryCategory) -> &[InjuryEntry] {
        match category {
            InjuryCategory::Head => &self.head,
            InjuryCategory::Torso => &self.torso,
            InjuryCategory::Arm => &self.arm,
            InjuryCategory::Leg => &self.leg,
            InjuryCategory::Generic => &self.generic,
        }
    }

    /// Entry for a zone and d6 roll, falling back to the generic table
    pub fn entry(&self, kind: ZoneKind, roll: u32) -> Option<&InjuryEntry> {
        let category = kind.injury_category();
        self.table(category)
            .iter()
            .find(|e| e.roll == roll)
            .or_else(|| {
                if category != InjuryCategory::Generic {
                    tracing::warn!(?category, roll, "injury entry missing, using generic table");
                }
                self.generic.iter().find(|e| e.roll == roll)
            })
    }

    /// Resolve a severe injury against a zone that already took `prior_severe` of them
    pub fn resolve(&self, zone: &HitZone, prior_severe: u32, roll: u32) -> InjuryResult {
        let escalated = prior_severe >= escalation_threshold(zone.kind);

        let Some(entry) = self.entry(zone.kind, roll) else {
            tracing::warn!(zone = %zone, roll, "no injury table entry available");
            return InjuryResult {
                zone: zone.to_string(),
                roll,
                name: "Severe wound".to_string(),
                description: "A severe wound without further effects.".to_string(),
                side_effect: SideEffect::default(),
                extreme: false,
                lethal: false,
            };
        };

        if escalated {
            tracing::info!(
                zone = %zone,
                prior_severe,
                lethal = entry.extreme.lethal,
                "extreme injury"
            );
            InjuryResult {
                zone: zone.to_string(),
                roll,
                name: format!("{} (extreme)", entry.name),
                description: entry.extreme.description.clone(),
                side_effect: SideEffect {
                    status: Some(entry.extreme.description.clone()),
                    ..SideEffect::default()
                },
                extreme: true,
                lethal: entry.extreme.lethal,
            }
        } else {
            InjuryResult {
                zone: zone.to_string(),
                roll,
                name: entry.name.clone(),
                description: entry.description.clone(),
                side_effect: entry.effect.clone(),
                extreme: false,
                lethal: false,
            }
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for category in [
            InjuryCategory::Head,
            InjuryCategory::Torso,
            InjuryCategory::Arm,
            InjuryCategory::Leg,
            InjuryCategory::Generic,
        ] {
            let table = self.table(category);
            for roll in 1..=6 {
                let count = table.iter().filter(|e| e.roll == roll).count();
                if count != 1 {
                    errors.push(format!(
                        "injuries {:?}: roll {} has {} entries",
                        category, roll, count
                    ));
                }
            }
            if table.len() != 6 {
                errors.push(format!(
                    "injuries {:?}: expected 6 entries, found {}",
                    category,
                    table.len()
                ));
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
    fn test_torso_escalates_on_fourth_severe_injury() {
        let injuries = &tables().injuries;
        let torso = HitZone::torso();

        let third = injuries.resolve(&torso, 2, 3);
        assert!(!third.extreme);
        assert_eq!(third.name, injuries.entry(ZoneKind::Torso, 3).unwrap().name);

        let fourth = injuries.resolve(&torso, 3, 3);
        assert!(fourth.extreme);
    }

    #[test]
    fn test_limbs_escalate_on_second_severe_injury() {
        let injuries = &tables().injuries;
        let arm = HitZone::parse("left arm").unwrap();
        assert!(!injuries.resolve(&arm, 0, 6).extreme);

        let second = injuries.resolve(&arm, 1, 6);
        assert!(second.extreme);
        assert_eq!(second.lethal, injuries.entry(ZoneKind::Arm, 6).unwrap().extreme.lethal);
    }

    #[test]
    fn test_extreme_head_injury_is_lethal() {
        let head = HitZone::parse("head").unwrap();
        let result = tables().injuries.resolve(&head, 1, 2);
        assert!(result.extreme);
        assert!(result.lethal);
    }

    #[test]
    fn test_tail_uses_generic_table() {
        let injuries = &tables().injuries;
        let entry = injuries.entry(ZoneKind::Tail, 1).unwrap();
        assert_eq!(entry, &injuries.generic[0]);
    }

    #[test]
    fn test_missing_tables_degrade() {
        let empty = InjuryTables::default();
        let result = empty.resolve(&HitZone::torso(), 0, 4);
        assert_eq!(result.name, "Severe wound");
        assert!(!result.lethal);
    }

    #[test]
    fn test_side_effect_registers_effects() {
        let effect = SideEffect {
            modifiers: ModifierSet {
                attack: -2,
                ..Default::default()
            },
            modifier_rounds: 5,
            conditions: ConditionDeltas {
                pain: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let effects = effect.to_effects("Broken rib");
        assert_eq!(effects.len(), 2);
        assert_eq!(effects[0].rounds, 5);
        assert_eq!(effects[1].rounds, config().until_healed_rounds);
        assert!(SideEffect::default().to_effects("nothing").is_empty());
    }
}
