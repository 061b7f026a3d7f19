//! Timed effects and the per-character effect ledger

pub mod effect;
pub mod ledger;

pub use effect::{ConditionDeltas, Effect, EffectTotals, ModifierSet};
pub use ledger::{EffectLedger, ExpiredEffect};
