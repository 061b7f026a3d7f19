//! Cost curves

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tables::progression::{AttributeCurve, SkillCurve};

/// Steigerungsfaktor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CostTier {
    #[default]
    A,
    B,
    C,
    D,
}

impl CostTier {
    pub fn factor(&self) -> i32 {
        match self {
            CostTier::A => 1,
            CostTier::B => 2,
            CostTier::C => 3,
            CostTier::D => 4,
        }
    }

    /// One-time fee for activating a spell, ritual, liturgy or ceremony
    pub fn activation_fee(&self) -> i32 {
        self.factor()
    }
}

impl fmt::Display for CostTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            CostTier::A => "A",
            CostTier::B => "B",
            CostTier::C => "C",
            CostTier::D => "D",
        };
        write!(f, "{}", letter)
    }
}

/// Cost of raising a skill from `level - 1` to `level`
pub fn skill_step_cost(tier: CostTier, level: u32, curve: &SkillCurve) -> i32 {
    if level <= curve.flat_up_to {
        tier.factor()
    } else {
        tier.factor() * (level - curve.flat_up_to + 1) as i32
    }
}

/// Cost of raising a skill from `from` to `to`; zero when `to <= from`
pub fn skill_cost(tier: CostTier, from: u32, to: u32, curve: &SkillCurve) -> i32 {
    (from + 1..=to).map(|level| skill_step_cost(tier, level, curve)).sum()
}

/// Cost of raising an attribute from `level - 1` to `level`
pub fn attribute_step_cost(level: u32, curve: &AttributeCurve) -> i32 {
    if level <= curve.free_up_to {
        0
    } else if level <= curve.flat_up_to {
        curve.step_cost
    } else {
        curve.step_cost * (level - curve.flat_up_to + 1) as i32
    }
}

/// Total cost of an attribute at `value`
pub fn attribute_cost(value: i32, curve: &AttributeCurve) -> i32 {
    let value = value.max(0) as u32;
    (1..=value).map(|level| attribute_step_cost(level, curve)).sum()
}
