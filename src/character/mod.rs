//! Character records: one combatant's stats, skills, equipment and conditions

pub mod conditions;
pub mod equipment;
pub mod record;
pub mod zones;

pub use conditions::{ConditionKind, Conditions};
pub use equipment::{
    ArmorPiece, RangedKind, RangedProfile, Weapon, SHIELD_TECHNIQUE, UNARMED_TECHNIQUE,
};
pub use record::{
    Attribute, Attributes, Body, CharacterRecord, LearnedAbility, PointEntry, StatusFlags, Vitals,
};
pub use zones::{Zone, ZoneStatus};
