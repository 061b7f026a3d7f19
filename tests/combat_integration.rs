//! Combat integration tests
//!
//! End-to-end scenarios through the public API: defense, fumbles, damage,
//! injury escalation and round scheduling.

use std::fs;

use aventuria_rules::character::{ArmorPiece, CharacterRecord, ConditionKind, Weapon, ZoneStatus};
use aventuria_rules::combat::{
    plan_damage, AttackKind, DefenseOption, DefenseRequest, DefenseResolver, DefenseResult,
    Encounter, ZoneChoice, ZoneCollapse,
};
use aventuria_rules::core::Pool;
use aventuria_rules::dice::ScriptedDice;
use aventuria_rules::effects::{ConditionDeltas, Effect, EffectLedger};
use aventuria_rules::store::{CharacterStore, TomlCharacterStore};
use aventuria_rules::tables::{category_sum, tables, HitZone};

fn combatant(name: &str) -> CharacterRecord {
    let mut record = CharacterRecord::new(name);
    record.attributes.constitution = 10;
    record.attributes.agility = 14;
    record.vitals.life = Pool::full(25);
    record
}

/// KO 10, RS 2, raw 9: 7 damage passes threshold 5 and causes a severe injury
#[test]
fn test_armored_hit_causes_severe_injury() {
    let mut record = combatant("Alrik");
    record.armor.push(ArmorPiece::new("Lederharnisch", 2, 1));
    let mut ledger = EffectLedger::new();

    // hit zone d20 = 5 (torso), injury d6 = 1 (bruised ribs, no extra damage)
    let mut dice = ScriptedDice::new([5, 1]);
    let plan = plan_damage(&record, 9, ZoneChoice::Random, &mut dice);
    assert_eq!(plan.damage, 7);
    assert_eq!(plan.threshold, 5);
    assert_eq!(plan.zone, Some(HitZone::torso()));

    let report = plan.apply(&mut record, &mut ledger);
    assert_eq!(report.damage, 7);
    assert_eq!(report.life_after, 18);
    assert!(report.injury.is_some());
    // 18 of 25 is below 75%
    assert_eq!(record.pain_level(), 1);
    assert_eq!(ledger.effects("Alrik").len(), 1);
}

/// Roll 20 against 11, confirmation 14 fumbles; a dodge with raw sum 5 lands on 10
#[test]
fn test_dodge_fumble_uses_shifted_category() {
    let record = combatant("Alrik");
    let mut request = DefenseRequest::new(DefenseOption::Dodge, AttackKind::Melee);
    request.manual_modifier = 4;

    let ledger = EffectLedger::new();
    let resolver = DefenseResolver::new(&record, &ledger, &request);
    assert_eq!(resolver.target().target, 11);

    let mut dice = ScriptedDice::new([20, 14, 2, 3, 5]);
    let outcome = resolver.run(&mut dice);
    assert_eq!(outcome.result, DefenseResult::Fumble);
    assert_eq!(outcome.confirmation, Some(14));

    let fumble = outcome.fumble.unwrap();
    assert_eq!(fumble.raw_sum, 5);
    assert_eq!(fumble.category_sum, 10);
    assert_eq!(fumble.category, tables().fumbles.category(10).unwrap().name);
    assert_ne!(fumble.category, tables().fumbles.category(5).unwrap().name);
}

#[test]
fn test_unarmed_fumble_shift_from_four_to_nine() {
    assert_eq!(category_sum(4, true), 9);

    let record = combatant("Alrik");
    let request = DefenseRequest::new(DefenseOption::Unarmed, AttackKind::Melee);
    let mut dice = ScriptedDice::new([20, 20, 1, 3, 10]);
    let outcome = DefenseResolver::new(&record, &EffectLedger::new(), &request).run(&mut dice);
    let fumble = outcome.fumble.unwrap();
    assert_eq!(fumble.category_sum, 9);
    assert_eq!(fumble.category, tables().fumbles.category(9).unwrap().name);
}

#[test]
fn test_torso_escalates_on_fourth_severe_injury() {
    let mut record = combatant("Alrik");
    record.vitals.life = Pool::full(200);
    let mut ledger = EffectLedger::new();

    for hit in 1..=3 {
        let mut dice = ScriptedDice::new([1]);
        let plan = plan_damage(&record, 5, ZoneChoice::Chosen(HitZone::torso()), &mut dice);
        let injury = plan.injury.clone().unwrap();
        assert!(!injury.extreme, "hit {} should use the normal table", hit);
        plan.apply(&mut record, &mut ledger);
    }
    assert_eq!(record.body.zone(&HitZone::torso()).severe_injuries, 3);

    let mut dice = ScriptedDice::new([1]);
    let plan = plan_damage(&record, 5, ZoneChoice::Chosen(HitZone::torso()), &mut dice);
    assert!(plan.injury.as_ref().unwrap().extreme);
}

#[test]
fn test_wound_threshold_for_constitution_fourteen() {
    let mut record = combatant("Alrik");
    record.attributes.constitution = 14;
    assert_eq!(record.wound_threshold(), 7);

    let six = plan_damage(&record, 6, ZoneChoice::Random, &mut ScriptedDice::new([]));
    assert!(six.injury.is_none());
    let seven = plan_damage(&record, 7, ZoneChoice::Random, &mut ScriptedDice::new([10, 1]));
    assert!(seven.injury.is_some());
}

#[test]
fn test_parry_with_weapon_succeeds() {
    let mut record = combatant("Alrik");
    record.attributes.strength = 16;
    record.combat_techniques.insert("Schwerter".to_string(), 14);
    record.weapons.push(Weapon::melee("Langschwert", "Schwerter", "1W6+4", 0, 0));
    let request = DefenseRequest::new(DefenseOption::Weapon(0), AttackKind::Melee);
    let outcome = DefenseResolver::new(&record, &EffectLedger::new(), &request)
        .run(&mut ScriptedDice::new([6]));
    assert_eq!(outcome.target.target, 8);
    assert!(outcome.is_success());
}

#[test]
fn test_round_ticks_effects_before_initiative() {
    let records = vec![combatant("Alrik"), combatant("Bosper")];
    let mut encounter = Encounter::start(&records, &mut ScriptedDice::new([2, 4]));
    encounter.ledger.add(
        "Alrik",
        Effect::new("Schreck", 1).with_conditions(ConditionDeltas::single(ConditionKind::Pain, 4)),
    );
    encounter.ledger.add(
        "Bosper",
        Effect::new("Lähmung", 3).with_conditions(ConditionDeltas::single(ConditionKind::Pain, 4)),
    );

    let summary = encounter.advance_round(&records);
    assert_eq!(summary.round, 2);
    assert_eq!(summary.expired.len(), 1);
    assert_eq!(summary.expired[0].character, "Alrik");

    let bosper = summary.order.iter().find(|e| e.name == "Bosper").unwrap();
    assert!(bosper.incapacitated);
    let alrik = summary.order.iter().find(|e| e.name == "Alrik").unwrap();
    assert!(!alrik.incapacitated);
    assert_eq!(summary.order[0].name, "Bosper");
}

/// A stored sheet with zone tracking gets its pools on load; 8 damage takes out a 7-point arm
#[test]
fn test_tracked_sheet_from_store_collapses_limb() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("thorwal.toml"),
        r#"
name = "Thorwal"

[attributes]
KO = 20

[vitals.LE]
current = 30
max = 30

[body]
track_zones = true
"#,
    )
    .unwrap();
    let mut store = TomlCharacterStore::new(dir.path());
    let mut record = store.read("thorwal").unwrap();
    let mut ledger = EffectLedger::new();

    let left_arm = HitZone::parse("left arm").unwrap();
    let mut dice = ScriptedDice::new([]);
    let report = plan_damage(&record, 8, ZoneChoice::Chosen(left_arm), &mut dice)
        .apply(&mut record, &mut ledger);
    assert!(report.injury.is_none());
    assert_eq!(report.life_after, 22);
    assert_eq!(report.zone_status, Some(ZoneStatus::Ausgefallen));
    assert_eq!(report.collapse, Some(ZoneCollapse::LimbUnusable("left arm".to_string())));

    store.write("thorwal", &record).unwrap();
    let stored = store.read("thorwal").unwrap();
    assert!(stored.status.unusable_limbs.contains("left arm"));
    assert_eq!(stored.body.zone(&left_arm).life.map(|p| p.current), Some(0));
}
