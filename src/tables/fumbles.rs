//! Two-stage fumble tables
//!
//! A 2d6 sum picks the category, a d20 picks the detail row inside it.
//! Unarmed attacks and dodges shift low category sums up so they never
//! land on the weapon-breaking results.

use serde::{Deserialize, Serialize};

use crate::core::config;
use crate::dice::DieSource;
use crate::tables::injuries::SideEffect;

/// What a detail row resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FumbleDetail {
    Outcome {
        text: String,
        effect: Option<SideEffect>,
    },
    /// Repeat the whole two-stage roll
    RollAgain,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RawFumbleRow {
    min: u32,
    max: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    reroll: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    effect: Option<SideEffect>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawFumbleRow", into = "RawFumbleRow")]
pub struct FumbleRow {
    pub min: u32,
    pub max: u32,
    pub detail: FumbleDetail,
}

impl From<RawFumbleRow> for FumbleRow {
    fn from(raw: RawFumbleRow) -> Self {
        let detail = if raw.reroll {
            FumbleDetail::RollAgain
        } else {
            FumbleDetail::Outcome {
                text: raw.text.unwrap_or_default(),
                effect: raw.effect,
            }
        };
        Self {
            min: raw.min,
            max: raw.max,
            detail,
        }
    }
}

impl From<FumbleRow> for RawFumbleRow {
    fn from(row: FumbleRow) -> Self {
        match row.detail {
            FumbleDetail::Outcome { text, effect } => Self {
                min: row.min,
                max: row.max,
                text: Some(text),
                reroll: false,
                effect,
            },
            FumbleDetail::RollAgain => Self {
                min: row.min,
                max: row.max,
                text: None,
                reroll: true,
                effect: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FumbleCategory {
    pub sum: u32,
    pub name: String,
    #[serde(rename = "row")]
    pub rows: Vec<FumbleRow>,
}

impl FumbleCategory {
    pub fn detail(&self, roll: u32) -> Option<&FumbleDetail> {
        self.rows
            .iter()
            .find(|r| roll >= r.min && roll <= r.max)
            .map(|r| &r.detail)
    }

    fn first_outcome(&self) -> Option<&FumbleDetail> {
        self.rows
            .iter()
            .map(|r| &r.detail)
            .find(|d| matches!(d, FumbleDetail::Outcome { .. }))
    }
}

/// A fully resolved fumble
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FumbleResult {
    /// 2d6 sum as rolled
    pub raw_sum: u32,
    /// Sum after the unarmed/dodge shift
    pub category_sum: u32,
    pub category: String,
    pub detail_roll: u32,
    pub text: String,
    pub side_effect: Option<SideEffect>,
    pub rerolls: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FumbleTables {
    #[serde(default, rename = "category")]
    pub categories: Vec<FumbleCategory>,
}

/// Category sum for a raw 2d6 roll
///
/// `shifted` applies to unarmed attacks and dodges: raw sums up to
/// the configured limit move up, never past the cap.
pub fn category_sum(raw: u32, shifted: bool) -> u32 {
    let cfg = config();
    if shifted && raw >= 2 && raw <= cfg.fumble_shift_max_raw {
        (raw + cfg.fumble_shift).min(cfg.fumble_sum_cap)
    } else {
        raw
    }
}

impl FumbleTables {
    pub fn category(&self, sum: u32) -> Option<&FumbleCategory> {
        self.categories.iter().find(|c| c.sum == sum)
    }

    /// Roll a fumble, repeating the whole roll while a row says so
    pub fn roll<D: DieSource + ?Sized>(&self, dice: &mut D, shifted: bool) -> FumbleResult {
        let cap = config().max_fumble_rerolls;
        let mut rerolls = 0;

        loop {
            let raw_sum = dice.two_d6();
            let sum = category_sum(raw_sum, shifted);
            let detail_roll = dice.d20();

            let Some(category) = self.category(sum) else {
                tracing::warn!(sum, "no fumble category for sum");
                return FumbleResult {
                    raw_sum,
                    category_sum: sum,
                    category: "Fumble".to_string(),
                    detail_roll,
                    text: "The action fails badly.".to_string(),
                    side_effect: None,
                    rerolls,
                };
            };

            let detail = match category.detail(detail_roll) {
                Some(FumbleDetail::RollAgain) if rerolls < cap => {
                    rerolls += 1;
                    tracing::debug!(category = %category.name, detail_roll, "fumble rolls again");
                    continue;
                }
                Some(FumbleDetail::RollAgain) => {
                    tracing::warn!(rerolls, "fumble reroll cap reached");
                    category.first_outcome()
                }
                Some(detail) => Some(detail),
                None => {
                    tracing::warn!(
                        category = %category.name,
                        detail_roll,
                        "no fumble row for roll"
                    );
                    category.first_outcome()
                }
            };

            let (text, side_effect) = match detail {
                Some(FumbleDetail::Outcome { text, effect }) => (text.clone(), effect.clone()),
                _ => (category.name.clone(), None),
            };

            tracing::info!(
                raw_sum,
                category_sum = sum,
                category = %category.name,
                detail_roll,
                "fumble"
            );
            return FumbleResult {
                raw_sum,
                category_sum: sum,
                category: category.name.clone(),
                detail_roll,
                text,
                side_effect,
                rerolls,
            };
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for sum in 2..=12 {
            let Some(category) = self.category(sum) else {
                errors.push(format!("fumbles: missing category for sum {}", sum));
                continue;
            };
            for roll in 1..=20 {
                let hits = category
                    .rows
                    .iter()
                    .filter(|r| roll >= r.min && roll <= r.max)
                    .count();
                if hits != 1 {
                    errors.push(format!(
                        "fumbles: category {} covers d20 roll {} {} times",
                        sum, roll, hits
                    ));
                }
            }
            if category.first_outcome().is_none() {
                errors.push(format!("fumbles: category {} has only reroll rows", sum));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::tables::tables;

    #[test]
    fn test_category_shift() {
        assert_eq!(category_sum(5, true), 10);
        assert_eq!(category_sum(2, true), 7);
        assert_eq!(category_sum(6, true), 11);
        assert_eq!(category_sum(7, true), 7);
        assert_eq!(category_sum(12, true), 12);
        assert_eq!(category_sum(5, false), 5);
    }

    #[test]
    fn test_dodge_fumble_keeps_raw_sum() {
        // 2d6 = 2 + 3, d20 = 1
        let mut dice = ScriptedDice::new([2, 3, 1]);
        let result = tables().fumbles.roll(&mut dice, true);
        assert_eq!(result.raw_sum, 5);
        assert_eq!(result.category_sum, 10);
        assert_eq!(result.category, tables().fumbles.category(10).unwrap().name);
        assert_eq!(result.rerolls, 0);
    }

    #[test]
    fn test_reroll_sentinel_repeats_both_stages() {
        // first: 1+1 = 2, d20 = 20 (roll again); second: 3+4 = 7, d20 = 1
        let mut dice = ScriptedDice::new([1, 1, 20, 3, 4, 1]);
        let result = tables().fumbles.roll(&mut dice, false);
        assert_eq!(result.rerolls, 1);
        assert_eq!(result.raw_sum, 7);
        assert_eq!(dice.remaining(), 0);
    }

    #[test]
    fn test_reroll_cap_falls_back_to_first_outcome() {
        let tables = FumbleTables {
            categories: vec![FumbleCategory {
                sum: 7,
                name: "Loop".to_string(),
                rows: vec![
                    FumbleRow {
                        min: 1,
                        max: 1,
                        detail: FumbleDetail::Outcome {
                            text: "fallback".to_string(),
                            effect: None,
                        },
                    },
                    FumbleRow {
                        min: 2,
                        max: 20,
                        detail: FumbleDetail::RollAgain,
                    },
                ],
            }],
        };
        let cap = config().max_fumble_rerolls;
        let script = (0..=cap).flat_map(|_| [3, 4, 20]);
        let mut dice = ScriptedDice::new(script);
        let result = tables.roll(&mut dice, false);
        assert_eq!(result.text, "fallback");
        assert_eq!(result.rerolls, cap);
    }

    #[test]
    fn test_builtin_fumbles_validate() {
        assert!(tables().fumbles.validate().is_empty());
    }

    #[test]
    fn test_row_toml_shape() {
        let row: FumbleRow = toml::from_str("min = 20\nmax = 20\nreroll = true").unwrap();
        assert_eq!(row.detail, FumbleDetail::RollAgain);
        let row: FumbleRow = toml::from_str("min = 1\nmax = 10\ntext = \"Oops\"").unwrap();
        assert!(matches!(
            row.detail,
            FumbleDetail::Outcome { ref text, effect: None } if text == "Oops"
        ));
    }
}
