//! Combat resolution: defense, damage, initiative and rounds

pub mod damage;
pub mod defense;
pub mod encounter;
pub mod initiative;

pub use damage::{
    heal, pain_from_life, plan_damage, plan_fumble, DamagePlan, DamageReport, HealReport,
    PendingSideEffect, ZoneChoice, ZoneCollapse,
};
pub use defense::{
    base_score, check_option, defense_options, lead_attribute_bonus, target_value, AttackKind,
    DefenseOption, DefenseOutcome, DefenseRequest, DefenseResolver, DefenseResult, DefenseState,
    Positioning, TargetValue,
};
pub use encounter::{Encounter, RoundSummary};
pub use initiative::{initiative_base, InitiativeEntry, InitiativeTracker};
