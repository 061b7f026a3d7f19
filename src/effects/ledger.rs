//! Per-character effect ledger
//!
//! Effects are keyed by character name. `tick` runs once per round
//! boundary and must run before initiative is recomputed.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::character::{CharacterRecord, ConditionKind};
use crate::character::conditions::clamp_level;
use crate::core::config;
use crate::effects::effect::{Effect, EffectTotals};

/// An effect removed by a round tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiredEffect {
    pub character: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectLedger {
    effects: AHashMap<String, Vec<Effect>>,
}

impl EffectLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, character: &str, effect: Effect) {
        tracing::debug!(character, effect = %effect.name, rounds = effect.rounds, "effect added");
        self.effects
            .entry(character.to_string())
            .or_default()
            .push(effect);
    }

    pub fn effects(&self, character: &str) -> &[Effect] {
        self.effects
            .get(character)
            .map(|e| e.as_slice())
            .unwrap_or(&[])
    }

    /// Remove every effect with this name from a character. Returns how many were removed.
    pub fn remove(&mut self, character: &str, name: &str) -> usize {
        let Some(list) = self.effects.get_mut(character) else {
            return 0;
        };
        let before = list.len();
        list.retain(|e| e.name != name);
        let removed = before - list.len();
        if list.is_empty() {
            self.effects.remove(character);
        }
        removed
    }

    /// Sum every numeric field across the character's active effects
    pub fn aggregate(&self, character: &str) -> EffectTotals {
        self.effects(character)
            .iter()
            .fold(EffectTotals::default(), |mut totals, effect| {
                totals.modifiers += effect.modifiers;
                totals.conditions += effect.conditions;
                totals
            })
    }

    /// Decrement every duration by one and drop effects that reach 0
    ///
    /// Expired effects are returned sorted by character for logging.
    pub fn tick(&mut self) -> Vec<ExpiredEffect> {
        let mut expired = Vec::new();

        for (character, list) in self.effects.iter_mut() {
            for effect in list.iter_mut() {
                effect.rounds = effect.rounds.saturating_sub(1);
            }
            list.retain(|effect| {
                if effect.rounds <= 0 {
                    expired.push(ExpiredEffect {
                        character: character.clone(),
                        name: effect.name.clone(),
                    });
                    false
                } else {
                    true
                }
            });
        }
        self.effects.retain(|_, list| !list.is_empty());

        // Stable sort keeps insertion order within one character
        expired.sort_by(|a, b| a.character.cmp(&b.character));
        for e in &expired {
            tracing::info!(character = %e.character, effect = %e.name, "effect expired");
        }
        expired
    }

    /// Condition level including effect deltas, clamped to the legal range
    pub fn effective_level(&self, record: &CharacterRecord, kind: ConditionKind) -> u8 {
        let stored = record.conditions.level(kind) as i32;
        let delta = self.aggregate(&record.name).conditions.get(kind);
        clamp_level(stored + delta)
    }

    /// Combined condition penalty used against defenses
    ///
    /// Stored conditions, effect deltas and armor encumbrance are summed,
    /// then capped.
    pub fn condition_penalty(&self, record: &CharacterRecord) -> i32 {
        let conditions: i32 = ConditionKind::all()
            .iter()
            .map(|&kind| self.effective_level(record, kind) as i32)
            .sum();
        let raw = conditions + record.armor_encumbrance();
        raw.clamp(0, config().condition_penalty_cap)
    }

    pub fn characters(&self) -> impl Iterator<Item = &str> {
        self.effects.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Snapshot in the ordered form written to the encounter log
    pub fn to_block(&self) -> BTreeMap<String, Vec<Effect>> {
        self.effects
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn from_block(block: BTreeMap<String, Vec<Effect>>) -> Self {
        let mut ledger = Self::new();
        for (character, effects) in block {
            for effect in effects {
                ledger.add(&character, effect);
            }
        }
        ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::ArmorPiece;
    use crate::effects::effect::{ConditionDeltas, ModifierSet};

    fn parry_effect(name: &str, parry: i32, rounds: i32) -> Effect {
        Effect::new(name, rounds).with_modifiers(ModifierSet {
            parry,
            ..Default::default()
        })
    }

    #[test]
    fn test_aggregate_sums_fields() {
        let mut ledger = EffectLedger::new();
        ledger.add("Alrik", parry_effect("Armatrutz", 2, 5));
        ledger.add("Alrik", parry_effect("Zerschmetterter Arm", -3, 10));
        ledger.add("Bosper", parry_effect("Armatrutz", 2, 5));

        let totals = ledger.aggregate("Alrik");
        assert_eq!(totals.modifiers.parry, -1);
        assert_eq!(totals.modifiers.attack, 0);
        assert_eq!(ledger.aggregate("Niemand"), EffectTotals::default());
    }

    #[test]
    fn test_duration_one_expires_after_one_tick() {
        let mut ledger = EffectLedger::new();
        ledger.add("Alrik", parry_effect("Kurz", 1, 1));
        assert_eq!(ledger.effects("Alrik").len(), 1);

        let expired = ledger.tick();
        assert!(ledger.effects("Alrik").is_empty());
        assert_eq!(
            expired,
            vec![ExpiredEffect {
                character: "Alrik".into(),
                name: "Kurz".into()
            }]
        );
    }

    #[test]
    fn test_tick_keeps_longer_effects() {
        let mut ledger = EffectLedger::new();
        ledger.add("Alrik", parry_effect("Lang", 1, 3));
        assert!(ledger.tick().is_empty());
        assert_eq!(ledger.effects("Alrik")[0].rounds, 2);
    }

    #[test]
    fn test_expired_sorted_by_character() {
        let mut ledger = EffectLedger::new();
        ledger.add("Zara", Effect::new("a", 1));
        ledger.add("Alrik", Effect::new("b", 1));
        ledger.add("Mira", Effect::new("c", 0));
        let names: Vec<_> = ledger.tick().into_iter().map(|e| e.character).collect();
        assert_eq!(names, vec!["Alrik", "Mira", "Zara"]);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_condition_penalty_capped() {
        let mut record = CharacterRecord::new("Alrik");
        record.conditions.set(ConditionKind::Pain, 3);
        record.conditions.set(ConditionKind::Stun, 2);
        record.conditions.set(ConditionKind::Fear, 2);
        record.armor.push(ArmorPiece::new("Kettenhemd", 4, 2));

        let ledger = EffectLedger::new();
        assert_eq!(ledger.condition_penalty(&record), 5);
    }

    #[test]
    fn test_effect_deltas_join_penalty() {
        let mut record = CharacterRecord::new("Alrik");
        record.conditions.set(ConditionKind::Pain, 1);

        let mut ledger = EffectLedger::new();
        ledger.add(
            "Alrik",
            Effect::new("Gehirnerschütterung", 10)
                .with_conditions(ConditionDeltas::single(ConditionKind::Stun, 2)),
        );
        assert_eq!(ledger.effective_level(&record, ConditionKind::Stun), 2);
        assert_eq!(ledger.condition_penalty(&record), 3);
    }

    #[test]
    fn test_remove_by_name() {
        let mut ledger = EffectLedger::new();
        ledger.add("Alrik", Effect::new("Armatrutz", 5));
        ledger.add("Alrik", Effect::new("Armatrutz", 3));
        assert_eq!(ledger.remove("Alrik", "Armatrutz"), 2);
        assert_eq!(ledger.remove("Alrik", "Armatrutz"), 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_block_roundtrip() {
        let mut ledger = EffectLedger::new();
        ledger.add("Alrik", parry_effect("Armatrutz", 2, 5));
        let block = ledger.to_block();
        let restored = EffectLedger::from_block(block.clone());
        assert_eq!(restored.to_block(), block);
    }
}
