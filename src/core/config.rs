//! Rules configuration with documented constants
//!
//! Every threshold and step value the rules engine uses is collected here.
//! The lookup tables themselves (hit zones, injuries, fumbles, costs) live
//! in `data/` and are loaded by `crate::tables`.

use serde::{Deserialize, Serialize};

/// Rule constants for combat resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    // === DEFENSE ===
    /// Penalty per additional defense attempt in the same round
    ///
    /// The first defense is free, the second costs 3, the third 6.
    pub multi_defense_step: i32,

    /// Upper bound on the combined condition penalty applied to a defense
    ///
    /// Stored conditions, effect deltas and armor encumbrance are summed
    /// first and then capped.
    pub condition_penalty_cap: i32,

    /// Penalty for defending against a fired projectile (bows, crossbows)
    pub ranged_penalty_fired: i32,

    /// Penalty for defending against a thrown weapon
    pub ranged_penalty_thrown: i32,

    /// Multiplier applied to a shield's parry modifier
    pub shield_parry_multiplier: i32,

    /// Attribute value from which the lead attribute adds a parry bonus
    ///
    /// Bonus is +1 per full 3 points above this value.
    pub lead_attribute_base: i32,

    // === CONDITIONS ===
    /// Highest level any single condition can reach
    pub condition_level_max: u8,

    /// Life total at or below which pain is always at its maximum level
    pub pain_absolute_threshold: i32,

    // === INJURIES ===
    /// Prior severe torso injuries before the extreme variant applies
    pub torso_escalation_threshold: u32,

    /// Prior severe injuries before the extreme variant applies on any other zone
    pub zone_escalation_threshold: u32,

    /// Duration used for effects that last until healed
    pub until_healed_rounds: i32,

    // === FUMBLES ===
    /// Shift applied to low fumble category sums for unarmed or dodging defenders
    pub fumble_shift: u32,

    /// Largest raw category sum that still receives the shift
    pub fumble_shift_max_raw: u32,

    /// Highest category sum on the fumble table
    pub fumble_sum_cap: u32,

    /// Safety cap for the "roll again" loop on fumble tables
    pub max_fumble_rerolls: u32,

    // === INITIATIVE ===
    /// Die size of the fixed per-combat initiative bonus
    pub initiative_bonus_die: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            multi_defense_step: 3,
            condition_penalty_cap: 5,
            ranged_penalty_fired: 4,
            ranged_penalty_thrown: 2,
            shield_parry_multiplier: 2,
            lead_attribute_base: 13,

            condition_level_max: 4,
            pain_absolute_threshold: 5,

            torso_escalation_threshold: 3,
            zone_escalation_threshold: 1,
            until_healed_rounds: 9999,

            fumble_shift: 5,
            fumble_shift_max_raw: 6,
            fumble_sum_cap: 12,
            max_fumble_rerolls: 100,

            initiative_bonus_die: 6,
        }
    }
}

impl RulesConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config file; missing keys keep their defaults
    pub fn from_toml(text: &str) -> crate::core::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config
            .validate()
            .map_err(crate::core::RulesError::InvalidInput)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.condition_penalty_cap < 0 {
            return Err("condition_penalty_cap must not be negative".into());
        }

        if self.fumble_shift_max_raw > self.fumble_sum_cap {
            return Err(format!(
                "fumble_shift_max_raw ({}) exceeds fumble_sum_cap ({})",
                self.fumble_shift_max_raw, self.fumble_sum_cap
            ));
        }

        if self.fumble_sum_cap < 2 || self.fumble_sum_cap > 12 {
            return Err(format!(
                "fumble_sum_cap ({}) must lie within the 2d6 range",
                self.fumble_sum_cap
            ));
        }

        if self.until_healed_rounds <= 0 || self.initiative_bonus_die == 0 {
            return Err("durations and dice sizes must be positive".into());
        }

        Ok(())
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<RulesConfig> = OnceLock::new();

/// Get the global rules config (initializes with defaults if not set)
pub fn config() -> &'static RulesConfig {
    CONFIG.get_or_init(RulesConfig::default)
}

/// Set the global rules config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: RulesConfig) -> Result<(), RulesConfig> {
    CONFIG.set(config)
}
