//! Encounter state and round scheduling

use serde::{Deserialize, Serialize};

use crate::character::CharacterRecord;
use crate::combat::initiative::{InitiativeEntry, InitiativeTracker};
use crate::core::Round;
use crate::dice::DieSource;
use crate::effects::{EffectLedger, ExpiredEffect};

/// A running encounter
///
/// The ledger is persisted separately as the encounter log's effects block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    pub round: Round,
    pub tracker: InitiativeTracker,
    #[serde(skip)]
    pub ledger: EffectLedger,
}

/// Outcome of one round boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: Round,
    pub expired: Vec<ExpiredEffect>,
    pub order: Vec<InitiativeEntry>,
}

impl Encounter {
    /// Open round 1, rolling each combatant's fixed initiative bonus
    pub fn start<D: DieSource + ?Sized>(records: &[CharacterRecord], dice: &mut D) -> Self {
        let mut tracker = InitiativeTracker::start(records, dice);
        let ledger = EffectLedger::new();
        tracker.recompute(records, &ledger);
        tracing::info!(combatants = records.len(), "encounter started");
        Self {
            round: 1,
            tracker,
            ledger,
        }
    }

    /// Advance to the next round
    ///
    /// Effects tick before initiative is recomputed so that expired
    /// modifiers no longer count toward the new order.
    pub fn advance_round(&mut self, records: &[CharacterRecord]) -> RoundSummary {
        self.round += 1;
        let expired = self.ledger.tick();
        let order = self.tracker.recompute(records, &self.ledger).to_vec();
        for entry in order.iter().filter(|e| e.incapacitated) {
            tracing::info!(character = %entry.name, "incapacitated");
        }
        tracing::info!(round = self.round, expired = expired.len(), "round advanced");
        RoundSummary {
            round: self.round,
            expired,
            order,
        }
    }
}
