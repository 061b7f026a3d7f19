//! Damage pipeline
//!
//! `plan_damage` rolls every die and decides every outcome without touching
//! the record. `DamagePlan::apply` then performs the whole mutation at once.

use serde::{Deserialize, Serialize};

use crate::character::{CharacterRecord, ConditionKind, ZoneStatus};
use crate::core::config;
use crate::dice::{roll, DieSource};
use crate::effects::EffectLedger;
use crate::tables::{tables, FumbleResult, HitZone, InjuryResult, SideEffect, ZoneKind};

/// Pain level from the life ratio; the worst matching threshold wins
pub fn pain_from_life(current: i32, max: i32) -> u8 {
    if max <= 0 {
        return 0;
    }
    let level = if current <= config().pain_absolute_threshold && current < max {
        4
    } else if current * 4 <= max {
        3
    } else if current * 2 <= max {
        2
    } else if current * 4 <= max * 3 {
        1
    } else {
        0
    };
    level.min(config().condition_level_max)
}

/// Zone selection for a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneChoice {
    /// Roll 1d20 on the defender's hit-zone table
    Random,
    Chosen(HitZone),
}

/// Effect of a tracked zone dropping to zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneCollapse {
    Unconscious,
    Incapacitated,
    LimbUnusable(String),
}

/// Side effect waiting to be applied, with the name it is registered under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSideEffect {
    pub source: String,
    pub effect: SideEffect,
}

/// Every decision of one damage application, with all dice already rolled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamagePlan {
    pub character: String,
    pub raw: i32,
    pub armor: i32,
    /// Damage after armor
    pub damage: i32,
    pub threshold: i32,
    pub zone: Option<HitZone>,
    pub zone_roll: Option<u32>,
    pub injury: Option<InjuryResult>,
    /// Extra damage from side effects, already rolled; ignores armor
    pub extra_damage: i32,
    pub side_effects: Vec<PendingSideEffect>,
}

/// What `DamagePlan::apply` changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReport {
    pub character: String,
    pub damage: i32,
    pub armor_absorbed: i32,
    pub life_before: i32,
    pub life_after: i32,
    pub zone: Option<String>,
    pub zone_status: Option<ZoneStatus>,
    pub collapse: Option<ZoneCollapse>,
    pub injury: Option<InjuryResult>,
    pub effects_added: Vec<String>,
    pub statuses: Vec<String>,
    pub pain: u8,
    pub dead: bool,
    pub incapacitated: bool,
}

fn roll_extra<D: DieSource + ?Sized>(effect: &SideEffect, dice: &mut D) -> i32 {
    match &effect.extra_damage {
        Some(formula) => roll(formula, dice).total.max(0),
        None => 0,
    }
}

/// Decide the outcome of `raw` incoming damage against `record`
pub fn plan_damage<D: DieSource + ?Sized>(
    record: &CharacterRecord,
    raw: i32,
    zone: ZoneChoice,
    dice: &mut D,
) -> DamagePlan {
    let armor = record.armor_protection();
    let damage = (raw.max(0) - armor).max(0);
    let threshold = record.wound_threshold();
    let severe = damage > 0 && damage >= threshold;
    let needs_zone = severe || (record.body.track_zones && damage > 0);

    let (zone, zone_roll) = if needs_zone {
        match zone {
            ZoneChoice::Chosen(chosen) => (Some(chosen), None),
            ZoneChoice::Random => {
                let roll = dice.d20();
                let selected = tables()
                    .hit_zones
                    .select_zone(roll, record.body.topology, record.body.size);
                (Some(selected), Some(roll))
            }
        }
    } else {
        (None, None)
    };

    let mut extra_damage = 0;
    let mut side_effects = Vec::new();
    let injury = match (severe, zone) {
        (true, Some(hit)) => {
            let prior = record.body.zone(&hit).severe_injuries;
            let roll = dice.d6();
            let injury = tables().injuries.resolve(&hit, prior, roll);
            extra_damage += roll_extra(&injury.side_effect, dice);
            side_effects.push(PendingSideEffect {
                source: injury.name.clone(),
                effect: injury.side_effect.clone(),
            });
            Some(injury)
        }
        _ => None,
    };

    tracing::debug!(
        character = %record.name,
        raw,
        armor,
        damage,
        threshold,
        extra_damage,
        "damage planned"
    );

    DamagePlan {
        character: record.name.clone(),
        raw,
        armor,
        damage,
        threshold,
        zone,
        zone_roll,
        injury,
        extra_damage,
        side_effects,
    }
}

/// Consequences of a fumble for the fumbling defender
pub fn plan_fumble<D: DieSource + ?Sized>(
    record: &CharacterRecord,
    fumble: &FumbleResult,
    dice: &mut D,
) -> DamagePlan {
    let mut plan = DamagePlan {
        character: record.name.clone(),
        raw: 0,
        armor: 0,
        damage: 0,
        threshold: record.wound_threshold(),
        zone: None,
        zone_roll: None,
        injury: None,
        extra_damage: 0,
        side_effects: Vec::new(),
    };
    if let Some(effect) = &fumble.side_effect {
        plan.extra_damage = roll_extra(effect, dice);
        plan.side_effects.push(PendingSideEffect {
            source: fumble.category.clone(),
            effect: effect.clone(),
        });
    }
    plan
}

fn collapse_for(zone: &HitZone) -> ZoneCollapse {
    match zone.kind {
        ZoneKind::Head => ZoneCollapse::Unconscious,
        ZoneKind::Torso => ZoneCollapse::Incapacitated,
        _ => ZoneCollapse::LimbUnusable(zone.to_string()),
    }
}

impl DamagePlan {
    /// Total life deduction
    pub fn total(&self) -> i32 {
        self.damage + self.extra_damage
    }

    /// Apply the plan to the record and ledger in one step
    pub fn apply(self, record: &mut CharacterRecord, ledger: &mut EffectLedger) -> DamageReport {
        let total = self.total();
        let life_before = record.vitals.life.current;
        record.vitals.life.reduce(total);

        let mut collapse = None;
        let mut zone_status = None;
        let mut statuses = Vec::new();

        if let Some(hit) = self.zone {
            let tracked = record.body.track_zones;
            let zone = record.body.zone_mut(&hit);
            if self.injury.is_some() {
                zone.severe_injuries += 1;
            }
            if tracked {
                if let Some(pool) = zone.life.as_mut() {
                    let was_standing = pool.current > 0;
                    pool.reduce(total);
                    if was_standing && pool.is_empty() {
                        collapse = Some(collapse_for(&hit));
                    }
                }
            }
            zone_status = zone.status();
        }

        match &collapse {
            Some(ZoneCollapse::Unconscious) => record.status.unconscious = true,
            Some(ZoneCollapse::Incapacitated) => record.status.incapacitated = true,
            Some(ZoneCollapse::LimbUnusable(name)) => {
                record.status.unusable_limbs.insert(name.clone());
            }
            None => {}
        }

        let mut lethal = false;
        if let (Some(injury), Some(hit)) = (&self.injury, self.zone) {
            lethal = injury.lethal;
            if injury.extreme && !injury.lethal && hit.kind.is_limb() {
                record.status.unusable_limbs.insert(hit.to_string());
            }
        }

        let mut effects_added = Vec::new();
        for pending in &self.side_effects {
            for effect in pending.effect.to_effects(&pending.source) {
                effects_added.push(effect.name.clone());
                ledger.add(&record.name, effect);
            }
            if let Some(status) = &pending.effect.status {
                statuses.push(status.clone());
            }
        }

        let pain = pain_from_life(record.vitals.life.current, record.vitals.life.max);
        record.conditions.set(ConditionKind::Pain, pain as i32);

        if record.vitals.life.current <= 0 || lethal {
            record.status.dead = true;
        }
        if pain >= config().condition_level_max {
            record.status.incapacitated = true;
        }

        tracing::info!(
            character = %record.name,
            damage = total,
            life = record.vitals.life.current,
            pain,
            dead = record.status.dead,
            "damage applied"
        );
        for status in &statuses {
            tracing::info!(character = %record.name, status = %status, "status");
        }

        DamageReport {
            character: record.name.clone(),
            damage: total,
            armor_absorbed: self.raw.max(0) - self.damage,
            life_before,
            life_after: record.vitals.life.current,
            zone: self.zone.map(|z| z.to_string()),
            zone_status,
            collapse,
            injury: self.injury,
            effects_added,
            statuses,
            pain,
            dead: record.status.dead,
            incapacitated: record.status.incapacitated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealReport {
    pub restored: i32,
    pub life: i32,
    pub pain: u8,
    pub incapacitated: bool,
}

/// Restore life points and recompute pain
pub fn heal(record: &mut CharacterRecord, amount: i32) -> HealReport {
    let restored = record.vitals.life.restore(amount.max(0));
    let pain = pain_from_life(record.vitals.life.current, record.vitals.life.max);
    record.conditions.set(ConditionKind::Pain, pain as i32);
    let torso = record.body.zone(&HitZone::torso());
    let torso_down = torso.status() == Some(ZoneStatus::Ausgefallen);
    if pain < config().condition_level_max && !torso_down {
        record.status.incapacitated = false;
    }
    tracing::info!(character = %record.name, restored, life = record.vitals.life.current, "healed");
    HealReport {
        restored,
        life: record.vitals.life.current,
        pain,
        incapacitated: record.status.incapacitated,
    }
}
