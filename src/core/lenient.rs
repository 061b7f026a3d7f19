//! Forgiving numeric deserializers for hand-edited character sheets.
//!
//! Malformed numbers degrade to a default instead of rejecting the sheet:
//! 0 for plain values, the baseline level for combat techniques.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Baseline level of an unlisted or malformed combat technique
pub const COMBAT_TECHNIQUE_BASELINE: u32 = 6;

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl Loose {
    fn as_i64(&self) -> Option<i64> {
        match self {
            Loose::Int(v) => Some(*v),
            Loose::Float(v) if v.is_finite() => Some(v.trunc() as i64),
            Loose::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Signed integer, 0 when malformed
pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let raw = Loose::deserialize(deserializer)?;
    Ok(raw.as_i64().map(saturate).unwrap_or_else(|| {
        tracing::warn!("malformed numeric field, defaulting to 0");
        0
    }))
}

/// Non-negative level, 0 when malformed
pub fn level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = Loose::deserialize(deserializer)?;
    Ok(to_level(&raw, 0))
}

fn to_level(raw: &Loose, fallback: u32) -> u32 {
    match raw.as_i64() {
        Some(v) => v.clamp(0, u32::MAX as i64) as u32,
        None => {
            tracing::warn!(fallback, "malformed level, using fallback");
            fallback
        }
    }
}

/// Skill name → level, malformed levels become 0
pub fn level_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, u32>, D::Error> {
    let raw = BTreeMap::<String, Loose>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| {
            let level = to_level(&value, 0);
            (name, level)
        })
        .collect())
}

/// Combat technique name → level, malformed levels become the baseline
pub fn technique_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, u32>, D::Error> {
    let raw = BTreeMap::<String, Loose>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| {
            let level = to_level(&value, COMBAT_TECHNIQUE_BASELINE);
            (name, level)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sheet {
        #[serde(default, deserialize_with = "int")]
        value: i32,
        #[serde(default, deserialize_with = "technique_map")]
        techniques: BTreeMap<String, u32>,
    }

    #[test]
    fn test_text_numbers_are_accepted() {
        let sheet: Sheet = toml::from_str(r#"value = "12""#).unwrap();
        assert_eq!(sheet.value, 12);
    }

    #[test]
    fn test_malformed_number_defaults_to_zero() {
        let sheet: Sheet = toml::from_str(r#"value = "twelve""#).unwrap();
        assert_eq!(sheet.value, 0);
    }

    #[test]
    fn test_missing_number_defaults_to_zero() {
        let sheet: Sheet = toml::from_str("").unwrap();
        assert_eq!(sheet.value, 0);
    }

    #[test]
    fn test_malformed_technique_uses_baseline() {
        let sheet: Sheet = toml::from_str(
            r#"
[techniques]
Schwerter = 12
Dolche = "?"
"#,
        )
        .unwrap();
        assert_eq!(sheet.techniques["Schwerter"], 12);
        assert_eq!(sheet.techniques["Dolche"], COMBAT_TECHNIQUE_BASELINE);
    }
}
