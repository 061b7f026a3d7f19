//! Defense resolution
//!
//! The target value is computed once when the resolver is created, from
//! the record and ledger as they stand at that moment. The resolver then
//! walks `Start -> RollDefense -> {CriticalConfirm | FumbleConfirm} -> Resolved`
//! one die at a time.

use serde::{Deserialize, Serialize};

use crate::character::{CharacterRecord, RangedKind, SHIELD_TECHNIQUE, UNARMED_TECHNIQUE};
use crate::core::{config, Result, RulesError};
use crate::dice::DieSource;
use crate::effects::EffectLedger;
use crate::tables::{tables, FumbleResult, FumbleTables, ProgressionTables};

/// Kind of the incoming attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    Melee,
    Ranged(RangedKind),
}

impl AttackKind {
    pub fn is_ranged(&self) -> bool {
        matches!(self, AttackKind::Ranged(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Positioning {
    #[default]
    Neutral,
    Advantageous,
    Disadvantageous,
}

impl Positioning {
    pub fn bonus(&self) -> i32 {
        match self {
            Positioning::Neutral => 0,
            Positioning::Advantageous => 2,
            Positioning::Disadvantageous => -2,
        }
    }
}

/// How the defender defends; indices refer to `CharacterRecord::weapons`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseOption {
    Weapon(usize),
    Shield(usize),
    Unarmed,
    Dodge,
}

impl DefenseOption {
    /// Fumbles of unarmed parries and dodges use the shifted category table
    pub fn shifts_fumbles(&self) -> bool {
        matches!(self, DefenseOption::Unarmed | DefenseOption::Dodge)
    }
}

/// Everything the operator supplies for one defense attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseRequest {
    pub option: DefenseOption,
    pub attack: AttackKind,
    /// 1 for the first defense this round
    pub attempt: u32,
    pub positioning: Positioning,
    pub manual_modifier: i32,
    /// Halve the final target, e.g. against a critical attack
    pub halved: bool,
}

impl DefenseRequest {
    pub fn new(option: DefenseOption, attack: AttackKind) -> Self {
        Self {
            option,
            attack,
            attempt: 1,
            positioning: Positioning::Neutral,
            manual_modifier: 0,
            halved: false,
        }
    }
}

/// Options a defender may choose against an attack
pub fn defense_options(record: &CharacterRecord, attack: AttackKind) -> Vec<DefenseOption> {
    let mut options = Vec::new();
    for (index, weapon) in record.weapons.iter().enumerate() {
        if weapon.is_shield() {
            options.push(DefenseOption::Shield(index));
        } else if !weapon.is_ranged() && !attack.is_ranged() {
            options.push(DefenseOption::Weapon(index));
        }
    }
    if !attack.is_ranged() {
        options.push(DefenseOption::Unarmed);
    }
    options.push(DefenseOption::Dodge);
    options
}

/// Reject options the defender cannot use against this attack
pub fn check_option(record: &CharacterRecord, request: &DefenseRequest) -> Result<()> {
    match request.option {
        DefenseOption::Weapon(index) => {
            let weapon = record
                .weapons
                .get(index)
                .ok_or_else(|| RulesError::InvalidInput(format!("no weapon at index {}", index)))?;
            if request.attack.is_ranged() {
                return Err(RulesError::InvalidInput(
                    "only shield parry or dodge against ranged attacks".to_string(),
                ));
            }
            if weapon.is_ranged() || weapon.is_shield() {
                return Err(RulesError::InvalidInput(format!("{} cannot parry", weapon.name)));
            }
        }
        DefenseOption::Shield(index) => {
            let weapon = record
                .weapons
                .get(index)
                .ok_or_else(|| RulesError::InvalidInput(format!("no weapon at index {}", index)))?;
            if !weapon.is_shield() {
                return Err(RulesError::InvalidInput(format!("{} is not a shield", weapon.name)));
            }
        }
        DefenseOption::Unarmed if request.attack.is_ranged() => {
            return Err(RulesError::InvalidInput(
                "only shield parry or dodge against ranged attacks".to_string(),
            ));
        }
        DefenseOption::Unarmed | DefenseOption::Dodge => {}
    }
    if request.attempt == 0 {
        return Err(RulesError::InvalidInput("defense attempts start at 1".to_string()));
    }
    Ok(())
}

fn half_up(value: i32) -> i32 {
    (value + 1).div_euclid(2)
}

/// Parry bonus from the best lead attribute of a technique
pub fn lead_attribute_bonus(
    record: &CharacterRecord,
    technique: &str,
    costs: &ProgressionTables,
) -> i32 {
    let best = costs
        .lead_attributes(technique)
        .iter()
        .map(|a| record.attributes.get(*a))
        .max()
        .unwrap_or(0);
    ((best - config().lead_attribute_base) / 3).max(0)
}

fn parry_value(
    record: &CharacterRecord,
    technique: &str,
    weapon_mod: i32,
    costs: &ProgressionTables,
) -> i32 {
    half_up(record.combat_technique(technique) as i32)
        + lead_attribute_bonus(record, technique, costs)
        + weapon_mod
}

/// Base defense score before situational modifiers
pub fn base_score(
    record: &CharacterRecord,
    option: DefenseOption,
    costs: &ProgressionTables,
) -> i32 {
    match option {
        DefenseOption::Weapon(index) => match record.weapons.get(index) {
            Some(weapon) => parry_value(record, &weapon.technique, weapon.parry_mod, costs),
            None => 0,
        },
        DefenseOption::Shield(index) => match record.weapons.get(index) {
            Some(weapon) => parry_value(
                record,
                SHIELD_TECHNIQUE,
                weapon.parry_mod * config().shield_parry_multiplier,
                costs,
            ),
            None => 0,
        },
        DefenseOption::Unarmed => parry_value(record, UNARMED_TECHNIQUE, 0, costs),
        DefenseOption::Dodge => half_up(record.attributes.agility),
    }
}

/// The parts that make up a defense target value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetValue {
    pub base: i32,
    pub effect_modifier: i32,
    pub positional: i32,
    pub condition_penalty: i32,
    pub multi_defense_penalty: i32,
    pub ranged_penalty: i32,
    pub manual: i32,
    pub halved: bool,
    pub target: i32,
}

pub fn target_value(
    record: &CharacterRecord,
    ledger: &EffectLedger,
    request: &DefenseRequest,
) -> TargetValue {
    let cfg = config();
    let base = base_score(record, request.option, &tables().progression);
    let totals = ledger.aggregate(&record.name);
    let effect_modifier = match request.option {
        DefenseOption::Dodge => totals.modifiers.dodge,
        _ => totals.modifiers.parry,
    };
    let positional = request.positioning.bonus();
    let condition_penalty = ledger.condition_penalty(record);
    let multi_defense_penalty = cfg.multi_defense_step * (request.attempt.max(1) as i32 - 1);
    let ranged_penalty = match request.attack {
        AttackKind::Melee => 0,
        AttackKind::Ranged(RangedKind::Fired) => cfg.ranged_penalty_fired,
        AttackKind::Ranged(RangedKind::Thrown) => cfg.ranged_penalty_thrown,
    };

    let mut target = base + effect_modifier + positional - condition_penalty
        - multi_defense_penalty
        - ranged_penalty
        + request.manual_modifier;
    if request.halved {
        target = target.div_euclid(2);
    }

    TargetValue {
        base,
        effect_modifier,
        positional,
        condition_penalty,
        multi_defense_penalty,
        ranged_penalty,
        manual: request.manual_modifier,
        halved: request.halved,
        target,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseResult {
    ConfirmedCritical,
    Success,
    Failure,
    Fumble,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseOutcome {
    pub result: DefenseResult,
    pub roll: u32,
    pub confirmation: Option<u32>,
    pub target: TargetValue,
    pub fumble: Option<FumbleResult>,
}

impl DefenseOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.result, DefenseResult::ConfirmedCritical | DefenseResult::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefenseState {
    Start,
    RollDefense,
    CriticalConfirm { roll: u32 },
    FumbleConfirm { roll: u32 },
    Resolved(DefenseOutcome),
}

pub struct DefenseResolver<'t> {
    target: TargetValue,
    shifted: bool,
    fumbles: &'t FumbleTables,
    state: DefenseState,
}

impl<'t> DefenseResolver<'t> {
    pub fn new(record: &CharacterRecord, ledger: &EffectLedger, request: &DefenseRequest) -> Self {
        Self::with_tables(record, ledger, request, &tables().fumbles)
    }

    pub fn with_tables(
        record: &CharacterRecord,
        ledger: &EffectLedger,
        request: &DefenseRequest,
        fumbles: &'t FumbleTables,
    ) -> Self {
        Self {
            target: target_value(record, ledger, request),
            shifted: request.option.shifts_fumbles(),
            fumbles,
            state: DefenseState::Start,
        }
    }

    pub fn target(&self) -> &TargetValue {
        &self.target
    }

    pub fn state(&self) -> &DefenseState {
        &self.state
    }

    fn resolve(
        &mut self,
        result: DefenseResult,
        roll: u32,
        confirmation: Option<u32>,
        fumble: Option<FumbleResult>,
    ) {
        self.state = DefenseState::Resolved(DefenseOutcome {
            result,
            roll,
            confirmation,
            target: self.target,
            fumble,
        });
    }

    /// Advance one state, rolling at most one stage of dice
    pub fn step<D: DieSource + ?Sized>(&mut self, dice: &mut D) -> &DefenseState {
        let target = self.target.target;
        match self.state {
            DefenseState::Start => self.state = DefenseState::RollDefense,
            DefenseState::RollDefense => {
                let roll = dice.d20();
                tracing::debug!(roll, target, "defense roll");
                match roll {
                    1 => self.state = DefenseState::CriticalConfirm { roll },
                    20 => self.state = DefenseState::FumbleConfirm { roll },
                    r if r as i32 <= target => {
                        self.resolve(DefenseResult::Success, roll, None, None)
                    }
                    _ => self.resolve(DefenseResult::Failure, roll, None, None),
                }
            }
            DefenseState::CriticalConfirm { roll } => {
                let confirmation = dice.d20();
                let result = if confirmation as i32 <= target {
                    DefenseResult::ConfirmedCritical
                } else {
                    DefenseResult::Success
                };
                self.resolve(result, roll, Some(confirmation), None);
            }
            DefenseState::FumbleConfirm { roll } => {
                let confirmation = dice.d20();
                if confirmation as i32 > target {
                    let fumble = self.fumbles.roll(dice, self.shifted);
                    self.resolve(DefenseResult::Fumble, roll, Some(confirmation), Some(fumble));
                } else {
                    self.resolve(DefenseResult::Failure, roll, Some(confirmation), None);
                }
            }
            DefenseState::Resolved(_) => {}
        }
        &self.state
    }

    /// Step until resolved
    pub fn run<D: DieSource + ?Sized>(mut self, dice: &mut D) -> DefenseOutcome {
        loop {
            if let DefenseState::Resolved(outcome) = self.step(dice) {
                let outcome = outcome.clone();
                tracing::info!(
                    result = ?outcome.result,
                    roll = outcome.roll,
                    target = outcome.target.target,
                    "defense resolved"
                );
                return outcome;
            }
        }
    }
}
