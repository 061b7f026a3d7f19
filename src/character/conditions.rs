//! Condition levels (pain, stun, fear, paralysis, confusion)
//!
//! Every level is clamped to `0..=4` on every write, so a stored level can
//! never leave that range.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    /// Schmerz
    Pain,
    /// Betäubung
    Stun,
    /// Furcht
    Fear,
    /// Paralyse
    Paralysis,
    /// Verwirrung
    Confusion,
}

impl ConditionKind {
    pub fn all() -> [ConditionKind; 5] {
        [
            ConditionKind::Pain,
            ConditionKind::Stun,
            ConditionKind::Fear,
            ConditionKind::Paralysis,
            ConditionKind::Confusion,
        ]
    }

    /// Parse a sheet name, English or German, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "pain" | "schmerz" => Some(ConditionKind::Pain),
            "stun" | "betäubung" | "betaeubung" => Some(ConditionKind::Stun),
            "fear" | "furcht" => Some(ConditionKind::Fear),
            "paralysis" | "paralyse" => Some(ConditionKind::Paralysis),
            "confusion" | "verwirrung" => Some(ConditionKind::Confusion),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConditionKind::Pain => "pain",
            ConditionKind::Stun => "stun",
            ConditionKind::Fear => "fear",
            ConditionKind::Paralysis => "paralysis",
            ConditionKind::Confusion => "confusion",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Clamp a raw level into the legal condition range
pub fn clamp_level(level: i32) -> u8 {
    level.clamp(0, config().condition_level_max as i32) as u8
}

/// Sheet representation: a list of `{ name, level }` records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub name: String,
    #[serde(default, deserialize_with = "crate::core::lenient::int")]
    pub level: i32,
}

/// Stored condition levels of one character
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ConditionEntry>", into = "Vec<ConditionEntry>")]
pub struct Conditions {
    levels: BTreeMap<ConditionKind, u8>,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, kind: ConditionKind) -> u8 {
        self.levels.get(&kind).copied().unwrap_or(0)
    }

    /// Set a level (clamped). Returns the stored level.
    pub fn set(&mut self, kind: ConditionKind, level: i32) -> u8 {
        let level = clamp_level(level);
        if level == 0 {
            self.levels.remove(&kind);
        } else {
            self.levels.insert(kind, level);
        }
        level
    }

    /// Add a signed delta (clamped). Returns the new level.
    pub fn adjust(&mut self, kind: ConditionKind, delta: i32) -> u8 {
        let current = self.level(kind) as i32;
        self.set(kind, current + delta)
    }

    /// Sum of all stored levels
    pub fn total(&self) -> i32 {
        self.levels.values().map(|&l| l as i32).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConditionKind, u8)> + '_ {
        self.levels.iter().map(|(k, v)| (*k, *v))
    }
}

impl From<Vec<ConditionEntry>> for Conditions {
    fn from(entries: Vec<ConditionEntry>) -> Self {
        let mut conditions = Conditions::new();
        for entry in entries {
            match ConditionKind::from_name(&entry.name) {
                Some(kind) => {
                    conditions.adjust(kind, entry.level);
                }
                None => tracing::warn!(name = %entry.name, "unknown condition dropped"),
            }
        }
        conditions
    }
}

impl From<Conditions> for Vec<ConditionEntry> {
    fn from(conditions: Conditions) -> Self {
        conditions
            .levels
            .into_iter()
            .map(|(kind, level)| ConditionEntry {
                name: kind.name().to_string(),
                level: level as i32,
            })
            .collect()
    }
}
