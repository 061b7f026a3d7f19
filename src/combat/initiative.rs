//! Initiative order
//!
//! The base component follows the combatant's current attributes and
//! armor every round; the random bonus is rolled once per encounter.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::character::{CharacterRecord, ConditionKind};
use crate::core::config;
use crate::dice::DieSource;
use crate::effects::EffectLedger;

/// Initiative base: (MU + GE) / 2 rounded half up, minus armor encumbrance
pub fn initiative_base(record: &CharacterRecord) -> i32 {
    let sum = record.attributes.courage + record.attributes.agility;
    (sum + 1).div_euclid(2) - record.armor_encumbrance()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeEntry {
    pub name: String,
    pub base: i32,
    pub bonus: i32,
    pub total: i32,
    /// Pain 4 or otherwise unable to act
    #[serde(default)]
    pub incapacitated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeTracker {
    /// Per-combat random bonus, fixed at encounter start
    pub bonuses: BTreeMap<String, i32>,
    #[serde(default)]
    pub order: Vec<InitiativeEntry>,
}

impl InitiativeTracker {
    /// Roll the fixed bonus for every combatant
    pub fn start<D: DieSource + ?Sized>(records: &[CharacterRecord], dice: &mut D) -> Self {
        let die = config().initiative_bonus_die;
        let bonuses = records
            .iter()
            .map(|r| (r.name.clone(), dice.roll_die(die) as i32))
            .collect();
        Self {
            bonuses,
            order: Vec::new(),
        }
    }

    /// Add a combatant joining mid-encounter
    pub fn join<D: DieSource + ?Sized>(&mut self, record: &CharacterRecord, dice: &mut D) -> i32 {
        let die = config().initiative_bonus_die;
        *self
            .bonuses
            .entry(record.name.clone())
            .or_insert_with(|| dice.roll_die(die) as i32)
    }

    pub fn bonus(&self, name: &str) -> Option<i32> {
        self.bonuses.get(name).copied()
    }

    /// Recompute the base component of every combatant and re-sort
    pub fn recompute(
        &mut self,
        records: &[CharacterRecord],
        ledger: &EffectLedger,
    ) -> &[InitiativeEntry] {
        let max_level = config().condition_level_max;
        let mut order: Vec<InitiativeEntry> = records
            .iter()
            .map(|record| {
                let bonus = self.bonus(&record.name).unwrap_or_else(|| {
                    tracing::warn!(
                        character = %record.name,
                        "no initiative bonus recorded, using 0"
                    );
                    0
                });
                let base = initiative_base(record);
                let pain = ledger.effective_level(record, ConditionKind::Pain);
                InitiativeEntry {
                    name: record.name.clone(),
                    base,
                    bonus,
                    total: base + bonus,
                    incapacitated: pain >= max_level || !record.can_act(),
                }
            })
            .collect();

        order.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then(b.base.cmp(&a.base))
                .then(a.name.cmp(&b.name))
        });
        self.order = order;
        &self.order
    }

    pub fn order(&self) -> &[InitiativeEntry] {
        &self.order
    }
}
