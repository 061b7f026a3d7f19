//! AP calculator
//!
//! A pure function over a character record. Every call recomputes the
//! total and the per-category breakdown from scratch.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::character::{Attribute, CharacterRecord, LearnedAbility};
use crate::core::lenient::COMBAT_TECHNIQUE_BASELINE;
use crate::progression::costs::{attribute_cost, skill_cost, CostTier};
use crate::tables::{tables, ProgressionTables};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApCategory {
    Species,
    Attributes,
    Skills,
    CombatTechniques,
    Spells,
    Rituals,
    Liturgies,
    Ceremonies,
    Tricks,
    Blessings,
    Advantages,
    Disadvantages,
    SpecialAbilities,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApReport {
    pub character: String,
    pub total: i32,
    pub breakdown: BTreeMap<ApCategory, i32>,
}

/// AP spent by a character, against the process-wide tables
pub fn calculate(record: &CharacterRecord) -> ApReport {
    calculate_with(record, &tables().progression)
}

pub fn calculate_with(record: &CharacterRecord, costs: &ProgressionTables) -> ApReport {
    let mut breakdown = BTreeMap::new();

    breakdown.insert(ApCategory::Species, costs.species(&record.species).cost);

    let attributes = Attribute::all()
        .iter()
        .map(|a| attribute_cost(record.attributes.get(*a), &costs.attribute_costs))
        .sum();
    breakdown.insert(ApCategory::Attributes, attributes);

    let skills = record
        .skills
        .iter()
        .map(|(name, level)| {
            let tier = costs.talents.get(name).copied().unwrap_or_else(|| {
                tracing::warn!(skill = %name, "unknown skill tier, using A");
                CostTier::A
            });
            skill_cost(tier, 0, *level, &costs.skill_costs)
        })
        .sum();
    breakdown.insert(ApCategory::Skills, skills);

    let techniques = record
        .combat_techniques
        .iter()
        .map(|(name, level)| {
            let tier = costs
                .combat_techniques
                .get(name)
                .map(|t| t.tier)
                .unwrap_or_else(|| {
                    tracing::warn!(technique = %name, "unknown combat technique tier, using A");
                    CostTier::A
                });
            skill_cost(tier, COMBAT_TECHNIQUE_BASELINE, *level, &costs.skill_costs)
        })
        .sum();
    breakdown.insert(ApCategory::CombatTechniques, techniques);

    let arcane = |list: &[LearnedAbility], table: &BTreeMap<String, CostTier>| -> i32 {
        list.iter()
            .map(|ability| {
                let tier = ability
                    .tier
                    .or_else(|| table.get(&ability.name).copied())
                    .unwrap_or_else(|| {
                        tracing::warn!(ability = %ability.name, "unknown tier, using A");
                        CostTier::A
                    });
                tier.activation_fee() + skill_cost(tier, 0, ability.level, &costs.skill_costs)
            })
            .sum()
    };
    breakdown.insert(ApCategory::Spells, arcane(&record.spells, &costs.spells));
    breakdown.insert(ApCategory::Rituals, arcane(&record.rituals, &costs.spells));
    breakdown.insert(ApCategory::Liturgies, arcane(&record.liturgies, &costs.liturgies));
    breakdown.insert(ApCategory::Ceremonies, arcane(&record.ceremonies, &costs.liturgies));

    breakdown.insert(ApCategory::Tricks, record.tricks.len() as i32);
    breakdown.insert(ApCategory::Blessings, record.blessings.len() as i32);

    breakdown.insert(
        ApCategory::Advantages,
        record.advantages.iter().map(|e| e.ap).sum(),
    );
    breakdown.insert(
        ApCategory::Disadvantages,
        record.disadvantages.iter().map(|e| -e.ap.abs()).sum(),
    );
    breakdown.insert(
        ApCategory::SpecialAbilities,
        record.special_abilities.iter().map(|e| e.ap).sum(),
    );

    let total = breakdown.values().sum();
    tracing::debug!(character = %record.name, total, "AP calculated");
    ApReport {
        character: record.name.clone(),
        total,
        breakdown,
    }
}

/// Max LE from species base and constitution
pub fn derived_max_life(record: &CharacterRecord, costs: &ProgressionTables) -> i32 {
    costs.species(&record.species).life + 2 * record.attributes.constitution.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Attributes, PointEntry};
    use proptest::prelude::*;

    fn average_human() -> CharacterRecord {
        let mut record = CharacterRecord::new("Alrik");
        record.attributes = Attributes::uniform(8);
        record
    }

    #[test]
    fn test_baseline_record_costs_nothing() {
        let report = calculate(&average_human());
        assert_eq!(report.total, 0);
        assert!(report.breakdown.values().all(|v| *v == 0));
        assert_eq!(report.breakdown.len(), 13);
    }

    #[test]
    fn test_category_costs() {
        let mut record = average_human();
        record.species = "Zwerg".to_string();
        record.attributes.constitution = 14;
        record.skills.insert("Klettern".to_string(), 4);
        record.skills.insert("Erfundenes Talent".to_string(), 2);
        record.combat_techniques.insert("Schwerter".to_string(), 10);
        record.spells.push(LearnedAbility::new("Ignifaxius", 3));
        let mut explicit = LearnedAbility::new("Hausgemacht", 1);
        explicit.tier = Some(CostTier::D);
        record.rituals.push(explicit);
        record.tricks = vec!["Funkenflug".to_string(), "Schlangenhände".to_string()];
        record.advantages.push(PointEntry::new("Zäher Hund", 20));
        record.disadvantages.push(PointEntry::new("Goldgier", 10));
        record.disadvantages.push(PointEntry::new("Jähzorn", -5));
        record.special_abilities.push(PointEntry::new("Finte I", 15));

        let report = calculate(&record);
        let b = &report.breakdown;
        assert_eq!(b[&ApCategory::Species], 61);
        assert_eq!(b[&ApCategory::Attributes], 90);
        assert_eq!(b[&ApCategory::Skills], 4 * 2 + 2);
        assert_eq!(b[&ApCategory::CombatTechniques], 4 * 3);
        assert_eq!(b[&ApCategory::Spells], 3 + 3 * 3);
        assert_eq!(b[&ApCategory::Rituals], 4 + 4);
        assert_eq!(b[&ApCategory::Tricks], 2);
        assert_eq!(b[&ApCategory::Advantages], 20);
        assert_eq!(b[&ApCategory::Disadvantages], -15);
        assert_eq!(b[&ApCategory::SpecialAbilities], 15);
        assert_eq!(report.total, b.values().sum::<i32>());
    }

    #[test]
    fn test_spell_at_zero_still_pays_activation() {
        let mut record = average_human();
        record.liturgies.push(LearnedAbility::new("Heilsegen", 0));
        let report = calculate(&record);
        assert_eq!(report.breakdown[&ApCategory::Liturgies], 2);
    }

    #[test]
    fn test_derived_max_life() {
        let mut record = average_human();
        record.attributes.constitution = 12;
        assert_eq!(derived_max_life(&record, &tables().progression), 29);
        record.species = "Elf".to_string();
        assert_eq!(derived_max_life(&record, &tables().progression), 26);
    }

    proptest! {
        #[test]
        fn test_calculation_is_idempotent(
            courage in 0i32..22,
            level in 0u32..20,
            technique in 0u32..20,
            advantage in -50i32..50,
        ) {
            let mut record = average_human();
            record.attributes.courage = courage;
            record.skills.insert("Zechen".to_string(), level);
            record.combat_techniques.insert("Dolche".to_string(), technique);
            record.advantages.push(PointEntry::new("Glück", advantage));

            let first = calculate(&record);
            let second = calculate(&record);
            prop_assert_eq!(first, second);
        }
    }
}
