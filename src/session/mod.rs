//! Session operations over the stores
//!
//! Every operation first collects all operator input, then rolls, then
//! writes. A cancellation at any prompt returns `Ok(None)` before anything
//! has been written.

pub mod operator;

pub use operator::{Answer, Operator, Reply, ScriptedOperator};

use serde::{Deserialize, Serialize};

use crate::character::{CharacterRecord, ConditionKind, RangedKind};
use crate::combat::{
    check_option, defense_options, heal, plan_damage, plan_fumble, AttackKind, DamageReport,
    DefenseOption, DefenseOutcome, DefenseRequest, DefenseResolver, Encounter, HealReport,
    Positioning, RoundSummary, ZoneChoice,
};
use crate::core::{Result, RulesError};
use crate::dice::DieSource;
use crate::effects::{ConditionDeltas, Effect, EffectLedger, ModifierSet};
use crate::progression::{self, ApReport};
use crate::store::{CharacterStore, EncounterLog};
use crate::tables::tables;

macro_rules! ask {
    ($answer:expr) => {
        match $answer {
            Answer::Value(value) => value,
            Answer::Cancelled => {
                tracing::info!("operation cancelled by operator");
                return Ok(None);
            }
        }
    };
}

/// Result of a resolved defense, including damage when the defense failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseReport {
    pub defender: String,
    pub outcome: DefenseOutcome,
    pub damage: Option<DamageReport>,
    pub fumble: Option<DamageReport>,
}

/// Modifier kinds an operator can attach to a manual effect
const EFFECT_KINDS: [&str; 10] = [
    "attack", "parry", "dodge", "ranged", "movement", "pain", "stun", "fear", "paralysis",
    "confusion",
];

fn labels<T: ToString>(items: &[T]) -> Vec<String> {
    items.iter().map(|i| i.to_string()).collect()
}

fn option_label(record: &CharacterRecord, option: &DefenseOption) -> String {
    match option {
        DefenseOption::Weapon(i) | DefenseOption::Shield(i) => record
            .weapons
            .get(*i)
            .map(|w| format!("parry with {}", w.name))
            .unwrap_or_else(|| "parry".to_string()),
        DefenseOption::Unarmed => "parry unarmed".to_string(),
        DefenseOption::Dodge => "dodge".to_string(),
    }
}

pub struct Session<S, L, D, O> {
    pub characters: S,
    pub log: L,
    pub dice: D,
    pub operator: O,
}

impl<S, L, D, O> Session<S, L, D, O>
where
    S: CharacterStore,
    L: EncounterLog,
    D: DieSource,
    O: Operator,
{
    pub fn new(characters: S, log: L, dice: D, operator: O) -> Self {
        Self {
            characters,
            log,
            dice,
            operator,
        }
    }

    fn load_encounter(&self) -> Result<Encounter> {
        let mut encounter = self.log.read_encounter()?.ok_or(RulesError::NoActiveEncounter)?;
        encounter.ledger = EffectLedger::from_block(self.log.read_effects_block()?);
        Ok(encounter)
    }

    fn load_roster(&self) -> Result<Vec<CharacterRecord>> {
        Ok(self
            .characters
            .read_all()?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Ask the operator to pick one of `items`, shown as `shown`
    fn choose<T: Clone>(
        &mut self,
        prompt: &str,
        items: &[T],
        shown: &[String],
    ) -> Result<Answer<T>> {
        Ok(match self.operator.select(prompt, shown) {
            Answer::Value(index) => Answer::Value(
                items
                    .get(index)
                    .cloned()
                    .ok_or_else(|| {
                        RulesError::InvalidInput(format!("no choice {} for {}", index, prompt))
                    })?,
            ),
            Answer::Cancelled => Answer::Cancelled,
        })
    }

    fn pick_character(&mut self, prompt: &str) -> Result<Answer<(String, CharacterRecord)>> {
        let ids = self.characters.list()?;
        if ids.is_empty() {
            return Err(RulesError::NoCharacters);
        }
        let id = match self.choose(prompt, &ids, &ids)? {
            Answer::Value(id) => id,
            Answer::Cancelled => return Ok(Answer::Cancelled),
        };
        let record = self.characters.read(&id)?;
        Ok(Answer::Value((id, record)))
    }

    /// Roll fixed initiative bonuses for every stored character and open round 1
    pub fn start_encounter(&mut self) -> Result<Option<RoundSummary>> {
        let roster = self.load_roster()?;
        let encounter = Encounter::start(&roster, &mut self.dice);
        let summary = RoundSummary {
            round: encounter.round,
            expired: Vec::new(),
            order: encounter.tracker.order().to_vec(),
        };

        self.log.write_encounter(&encounter)?;
        self.log.write_effects_block(&encounter.ledger.to_block())?;
        self.log.append_entry(&format!("Round 1: {}", describe_order(&summary)))?;
        Ok(Some(summary))
    }

    /// Tick effects, recompute initiative and persist the new round
    pub fn advance_round(&mut self) -> Result<Option<RoundSummary>> {
        let mut encounter = self.load_encounter()?;
        let roster = self.load_roster()?;
        let summary = encounter.advance_round(&roster);

        self.log.write_encounter(&encounter)?;
        self.log.write_effects_block(&encounter.ledger.to_block())?;
        for expired in &summary.expired {
            self.log
                .append_entry(&format!("{} ends for {}", expired.name, expired.character))?;
        }
        self.log.append_entry(&format!(
            "Round {}: {}",
            summary.round,
            describe_order(&summary)
        ))?;
        Ok(Some(summary))
    }

    /// Resolve one defense and, if it fails, the incoming damage
    pub fn resolve_defense(&mut self) -> Result<Option<DefenseReport>> {
        let encounter = self.load_encounter()?;
        let mut ledger = encounter.ledger;

        let (id, mut record) = ask!(self.pick_character("Defender")?);

        let attacks = [
            AttackKind::Melee,
            AttackKind::Ranged(RangedKind::Fired),
            AttackKind::Ranged(RangedKind::Thrown),
        ];
        let attack_labels = labels(&["melee", "ranged (fired)", "ranged (thrown)"]);
        let attack = ask!(self.choose("Attack", &attacks, &attack_labels)?);

        let options = defense_options(&record, attack);
        let option_labels: Vec<String> = options.iter().map(|o| option_label(&record, o)).collect();
        let option = ask!(self.choose("Defense", &options, &option_labels)?);

        let attempt = ask!(self.operator.number("Defense attempt this round"));
        let positions = [
            Positioning::Neutral,
            Positioning::Advantageous,
            Positioning::Disadvantageous,
        ];
        let position_labels = labels(&["neutral", "advantageous", "disadvantageous"]);
        let positioning = ask!(self.choose("Position", &positions, &position_labels)?);
        let manual_modifier = ask!(self.operator.number("Modifier"));
        let halved = ask!(self.choose("Halve defense", &[false, true], &labels(&["no", "yes"]))?);

        let request = DefenseRequest {
            option,
            attack,
            attempt: attempt.max(1) as u32,
            positioning,
            manual_modifier,
            halved,
        };
        check_option(&record, &request)?;

        let outcome = DefenseResolver::new(&record, &ledger, &request).run(&mut self.dice);

        let mut damage_plan = None;
        if !outcome.is_success() {
            let raw = ask!(self.operator.number("Damage"));
            let mut zones = vec![ZoneChoice::Random];
            zones.extend(
                tables()
                    .hit_zones
                    .zones_for(record.body.topology, record.body.size)
                    .into_iter()
                    .map(ZoneChoice::Chosen),
            );
            let zone_labels: Vec<String> = zones
                .iter()
                .map(|z| match z {
                    ZoneChoice::Random => "random".to_string(),
                    ZoneChoice::Chosen(zone) => zone.to_string(),
                })
                .collect();
            let zone = ask!(self.choose("Hit zone", &zones, &zone_labels)?);
            damage_plan = Some(plan_damage(&record, raw, zone, &mut self.dice));
        }
        let fumble_plan = outcome
            .fumble
            .as_ref()
            .map(|fumble| plan_fumble(&record, fumble, &mut self.dice));

        // Everything is decided; apply and persist
        let fumble = fumble_plan.map(|plan| plan.apply(&mut record, &mut ledger));
        let damage = damage_plan.map(|plan| plan.apply(&mut record, &mut ledger));

        self.characters.write(&id, &record)?;
        self.log.write_effects_block(&ledger.to_block())?;
        let mut entry = format!(
            "{} defends ({}): roll {} vs {} -> {:?}",
            record.name,
            option_label(&record, &option),
            outcome.roll,
            outcome.target.target,
            outcome.result
        );
        if let Some(f) = &outcome.fumble {
            entry.push_str(&format!("; fumble {} ({}): {}", f.category, f.category_sum, f.text));
        }
        if let Some(d) = &damage {
            entry.push_str(&format!("; {} damage, LE {}", d.damage, d.life_after));
            if let Some(injury) = &d.injury {
                entry.push_str(&format!("; {} at {}", injury.name, injury.zone));
            }
            if d.dead {
                entry.push_str("; dead");
            }
        }
        self.log.append_entry(&entry)?;

        Ok(Some(DefenseReport {
            defender: record.name,
            outcome,
            damage,
            fumble,
        }))
    }

    /// Register an operator-defined effect on a character
    pub fn apply_effect(&mut self) -> Result<Option<Effect>> {
        let mut ledger = self.load_encounter()?.ledger;
        let (_, record) = ask!(self.pick_character("Character")?);
        let name = ask!(self.operator.text("Effect name"));
        let rounds = ask!(self.operator.number("Duration in rounds"));
        let kinds = labels(&EFFECT_KINDS);
        let kind = ask!(self.choose("Modifier", &EFFECT_KINDS, &kinds)?);
        let value = ask!(self.operator.number("Value"));

        let mut modifiers = ModifierSet::default();
        let mut conditions = ConditionDeltas::default();
        match kind {
            "attack" => modifiers.attack = value,
            "parry" => modifiers.parry = value,
            "dodge" => modifiers.dodge = value,
            "ranged" => modifiers.ranged = value,
            "movement" => modifiers.movement = value,
            other => {
                if let Some(condition) = ConditionKind::from_name(other) {
                    conditions = ConditionDeltas::single(condition, value);
                }
            }
        }
        let effect = Effect::new(&name, rounds)
            .with_modifiers(modifiers)
            .with_conditions(conditions);

        ledger.add(&record.name, effect.clone());
        self.log.write_effects_block(&ledger.to_block())?;
        self.log.append_entry(&format!(
            "{} gains {} for {} rounds",
            record.name, effect.name, effect.rounds
        ))?;
        tracing::info!(character = %record.name, effect = %effect.name, "effect applied");
        Ok(Some(effect))
    }

    /// Restore life points on a character
    pub fn heal_character(&mut self) -> Result<Option<HealReport>> {
        let (id, mut record) = ask!(self.pick_character("Character")?);
        let amount = ask!(self.operator.number("LE restored"));
        let report = heal(&mut record, amount);
        self.characters.write(&id, &record)?;
        self.log.append_entry(&format!(
            "{} heals {} LE (LE {})",
            record.name, report.restored, report.life
        ))?;
        Ok(Some(report))
    }

    /// AP report for one character; writes nothing
    pub fn progression_report(&mut self) -> Result<Option<ApReport>> {
        let (_, record) = ask!(self.pick_character("Character")?);
        Ok(Some(progression::calculate(&record)))
    }
}

fn describe_order(summary: &RoundSummary) -> String {
    summary
        .order
        .iter()
        .map(|e| {
            if e.incapacitated {
                format!("{} {} (incapacitated)", e.name, e.total)
            } else {
                format!("{} {}", e.name, e.total)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Weapon;
    use crate::dice::ScriptedDice;
    use crate::store::{MemoryCharacterStore, MemoryEncounterLog};

    type TestSession =
        Session<MemoryCharacterStore, MemoryEncounterLog, ScriptedDice, ScriptedOperator>;

    fn session(dice: Vec<u32>, replies: Vec<Reply>) -> TestSession {
        let mut fighter = CharacterRecord::new("Alrik");
        fighter.weapons.push(Weapon::melee("Säbel", "Schwerter", "1W6+3", 0, 0));
        let store = MemoryCharacterStore::new()
            .with(fighter)
            .with(CharacterRecord::new("Bosper"));
        Session::new(
            store,
            MemoryEncounterLog::new(),
            ScriptedDice::new(dice),
            ScriptedOperator::new(replies),
        )
    }

    #[test]
    fn test_round_requires_encounter() {
        let mut session = session(vec![], vec![]);
        assert!(matches!(session.advance_round(), Err(RulesError::NoActiveEncounter)));
        assert!(matches!(session.resolve_defense(), Err(RulesError::NoActiveEncounter)));
    }

    #[test]
    fn test_start_without_characters() {
        let mut session = Session::new(
            MemoryCharacterStore::new(),
            MemoryEncounterLog::new(),
            ScriptedDice::new([]),
            ScriptedOperator::default(),
        );
        assert!(matches!(session.start_encounter(), Err(RulesError::NoCharacters)));
        assert!(session.log.entries().unwrap().is_empty());
    }

    #[test]
    fn test_start_and_advance() {
        let mut session = session(vec![3, 5], vec![]);
        let start = session.start_encounter().unwrap().unwrap();
        assert_eq!(start.round, 1);
        let next = session.advance_round().unwrap().unwrap();
        assert_eq!(next.round, 2);
        assert_eq!(session.log.read_encounter().unwrap().unwrap().round, 2);
        assert_eq!(session.log.entries().unwrap().len(), 2);
    }

    #[test]
    fn test_cancelled_defense_writes_nothing() {
        // defender Alrik, melee, parry with the sabre, attempt 1, neutral, +0, not halved
        // defense roll 15 fails; then the operator cancels at the damage prompt
        let replies = vec![
            Reply::Select(0),
            Reply::Select(0),
            Reply::Select(0),
            Reply::Number(1),
            Reply::Select(0),
            Reply::Number(0),
            Reply::Select(0),
            Reply::Cancel,
        ];
        let mut session = session(vec![1, 1, 15], replies);
        session.start_encounter().unwrap();
        let entries_before = session.log.entries().unwrap().len();
        let before = session.characters.read("Alrik").unwrap();

        assert_eq!(session.resolve_defense().unwrap(), None);
        assert_eq!(session.characters.read("Alrik").unwrap(), before);
        assert_eq!(session.log.entries().unwrap().len(), entries_before);
    }

    #[test]
    fn test_failed_defense_applies_damage() {
        let replies = vec![
            Reply::Select(0),
            Reply::Select(0),
            Reply::Select(0),
            Reply::Number(1),
            Reply::Select(0),
            Reply::Number(0),
            Reply::Select(0),
            Reply::Number(4),
            Reply::Select(0),
        ];
        let mut session = session(vec![1, 1, 15], replies);
        session.start_encounter().unwrap();

        let report = session.resolve_defense().unwrap().unwrap();
        let damage = report.damage.unwrap();
        assert_eq!(damage.damage, 4);
        assert_eq!(session.characters.read("Alrik").unwrap().vitals.life.current, 21);
    }

    #[test]
    fn test_apply_effect_persists_block() {
        let replies = vec![
            Reply::Select(1),
            Reply::Text("Horriphobus".to_string()),
            Reply::Number(3),
            Reply::Select(7),
            Reply::Number(2),
        ];
        let mut session = session(vec![1, 1], replies);
        session.start_encounter().unwrap();
        let effect = session.apply_effect().unwrap().unwrap();
        assert_eq!(effect.conditions.fear, 2);
        let block = session.log.read_effects_block().unwrap();
        assert_eq!(block["Bosper"], vec![effect]);
    }

    #[test]
    fn test_progression_report_is_read_only() {
        let mut session = session(vec![], vec![Reply::Select(0)]);
        let report = session.progression_report().unwrap().unwrap();
        assert_eq!(report.character, "Alrik");
        assert!(session.log.entries().unwrap().is_empty());
    }
}
