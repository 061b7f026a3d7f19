//! Cost lookup data for the progression calculator

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::character::Attribute;
use crate::progression::CostTier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesProfile {
    /// AP cost of the species
    pub cost: i32,
    /// Base LE before constitution
    pub life: i32,
    /// Geschwindigkeit
    pub movement: i32,
}

impl Default for SpeciesProfile {
    fn default() -> Self {
        Self {
            cost: 0,
            life: 5,
            movement: 8,
        }
    }
}

/// Attribute raise costs: free up to `free_up_to`, flat to `flat_up_to`, then rising
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeCurve {
    pub free_up_to: u32,
    pub flat_up_to: u32,
    pub step_cost: i32,
}

impl Default for AttributeCurve {
    fn default() -> Self {
        Self {
            free_up_to: 8,
            flat_up_to: 14,
            step_cost: 15,
        }
    }
}

/// Skill raise costs: one tier factor per level up to `flat_up_to`, rising after
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCurve {
    pub flat_up_to: u32,
}

impl Default for SkillCurve {
    fn default() -> Self {
        Self { flat_up_to: 12 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechniqueProfile {
    pub tier: CostTier,
    /// Leitattribute; the best one grants the parry bonus
    #[serde(default)]
    pub lead: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionTables {
    #[serde(default)]
    pub species: BTreeMap<String, SpeciesProfile>,
    #[serde(default)]
    pub attribute_costs: AttributeCurve,
    #[serde(default)]
    pub skill_costs: SkillCurve,
    #[serde(default)]
    pub talents: BTreeMap<String, CostTier>,
    #[serde(default)]
    pub combat_techniques: BTreeMap<String, TechniqueProfile>,
    /// Spells and rituals
    #[serde(default)]
    pub spells: BTreeMap<String, CostTier>,
    /// Liturgies and ceremonies
    #[serde(default)]
    pub liturgies: BTreeMap<String, CostTier>,
}

impl ProgressionTables {
    /// Species profile, human values for unknown species
    pub fn species(&self, name: &str) -> SpeciesProfile {
        if let Some(profile) = self.species.get(name) {
            return *profile;
        }
        tracing::warn!(species = name, "unknown species, using human values");
        let mut fallback = self.species.get("Mensch").copied().unwrap_or_default();
        fallback.cost = 0;
        fallback
    }

    pub fn lead_attributes(&self, technique: &str) -> &[Attribute] {
        self.combat_techniques
            .get(technique)
            .map(|t| t.lead.as_slice())
            .unwrap_or(&[])
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.species.contains_key("Mensch") {
            errors.push("progression: species table has no Mensch entry".to_string());
        }
        let curve = self.attribute_costs;
        if curve.free_up_to > curve.flat_up_to {
            errors.push("progression: attribute free range exceeds flat range".to_string());
        }
        if curve.step_cost <= 0 {
            errors.push("progression: attribute step cost must be positive".to_string());
        }
        for (name, technique) in &self.combat_techniques {
            if technique.lead.is_empty() {
                errors.push(format!(
                    "progression: combat technique {} has no lead attribute",
                    name
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
    fn test_species_values() {
        let progression = &tables().progression;
        let dwarf = progression.species("Zwerg");
        assert_eq!(dwarf.cost, 61);
        assert_eq!(dwarf.life, 8);
        assert_eq!(dwarf.movement, 6);
        assert_eq!(progression.species("Elf").cost, 18);
    }

    #[test]
    fn test_unknown_species_is_free_human() {
        let profile = tables().progression.species("Grolm");
        assert_eq!(profile, SpeciesProfile::default());
    }

    #[test]
    fn test_lead_attributes() {
        let progression = &tables().progression;
        assert_eq!(progression.lead_attributes("Schwerter"), &[Attribute::GE, Attribute::KK]);
        assert!(progression.lead_attributes("Unbekannt").is_empty());
    }
}
