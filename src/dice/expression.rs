//! Dice expression grammar: `[count] (d|D|w|W) sides [(+|-) modifier]`

use nom::character::complete::{digit1, one_of};
use nom::combinator::{all_consuming, map_res, opt};
use nom::{IResult, Parser};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DieSource, RollResult};

/// Upper bound on dice per expression; larger counts are rejected as unparseable
const MAX_DICE: u32 = 1000;

/// A parsed `NdS+M` expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiceExpr {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl DiceExpr {
    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// Smallest possible total
    pub fn min_total(&self) -> i32 {
        saturate(i64::from(self.count) + i64::from(self.modifier))
    }

    /// Largest possible total
    pub fn max_total(&self) -> i32 {
        saturate(i64::from(self.count) * i64::from(self.sides) + i64::from(self.modifier))
    }

    /// Roll every die; the total saturates at the `i32` bounds
    pub fn roll<D: DieSource + ?Sized>(&self, dice: &mut D) -> RollResult {
        let rolls: Vec<u32> = (0..self.count).map(|_| dice.roll_die(self.sides)).collect();
        let sum: i64 = rolls.iter().map(|&r| i64::from(r)).sum();
        let total = saturate(sum + i64::from(self.modifier));
        tracing::debug!(expr = %self, ?rolls, total, "rolled");
        RollResult { total, rolls }
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{}", m),
            m => write!(f, "{}", m),
        }
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// What a formula string evaluates to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formula {
    Dice(DiceExpr),
    Flat(i32),
    Invalid,
}

/// Classify a formula string
pub fn parse_formula(input: &str) -> Formula {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Formula::Invalid;
    }

    if let Ok(value) = compact.parse::<i32>() {
        return Formula::Flat(value);
    }

    let parsed = all_consuming(dice_expr).parse(compact.as_str());
    match parsed {
        Ok((_, expr)) if is_rollable(&expr) => Formula::Dice(expr),
        _ => Formula::Invalid,
    }
}

fn is_rollable(expr: &DiceExpr) -> bool {
    (1..=MAX_DICE).contains(&expr.count) && expr.sides > 0 && expr.sides <= i32::MAX as u32
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |digits: &str| digits.parse::<u32>()).parse(input)
}

fn signed_modifier(input: &str) -> IResult<&str, i32> {
    let (rest, (sign, value)) = (one_of("+-"), number).parse(input)?;
    let value = value.min(i32::MAX as u32) as i32;
    Ok((rest, if sign == '-' { -value } else { value }))
}

fn dice_expr(input: &str) -> IResult<&str, DiceExpr> {
    let (rest, (count, _, sides, modifier)) =
        (opt(number), one_of("dDwW"), number, opt(signed_modifier)).parse(input)?;
    Ok((
        rest,
        DiceExpr::new(count.unwrap_or(1), sides, modifier.unwrap_or(0)),
    ))
}
