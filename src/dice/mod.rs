//! Dice engine: expression parsing and substitutable die sources
//!
//! Expressions follow the usual tabletop notation, `NdS+M`. The German
//! `W` (Würfel) is accepted as a synonym for `d`, so sheets written as
//! `1W6+4` roll the same as `1d6+4`.

pub mod expression;
pub mod source;

pub use expression::{parse_formula, DiceExpr, Formula};
pub use source::{DieSource, RandomDice, ScriptedDice};

use serde::{Deserialize, Serialize};

/// Outcome of evaluating a dice expression
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RollResult {
    pub total: i32,
    pub rolls: Vec<u32>,
}

/// Evaluate a dice expression against a die source
///
/// A bare integer yields a flat total with no individual rolls; an
/// unparseable expression yields 0.
pub fn roll<D: DieSource + ?Sized>(expression: &str, dice: &mut D) -> RollResult {
    match parse_formula(expression) {
        Formula::Dice(expr) => expr.roll(dice),
        Formula::Flat(value) => RollResult {
            total: value,
            rolls: Vec::new(),
        },
        Formula::Invalid => {
            tracing::warn!(expression, "unparseable dice expression, rolling 0");
            RollResult::default()
        }
    }
}
