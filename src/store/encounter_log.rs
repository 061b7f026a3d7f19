//! Encounter log storage
//!
//! The log holds free-text entries, the persisted encounter state and the
//! effects block (character name to active effects).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::combat::Encounter;
use crate::core::Result;
use crate::effects::Effect;
use crate::store::write_atomic;

pub type EffectsBlock = BTreeMap<String, Vec<Effect>>;

pub trait EncounterLog {
    fn append_entry(&mut self, text: &str) -> Result<()>;
    fn entries(&self) -> Result<Vec<String>>;
    fn read_effects_block(&self) -> Result<EffectsBlock>;
    fn write_effects_block(&mut self, block: &EffectsBlock) -> Result<()>;
    /// `None` when no encounter has been started
    fn read_encounter(&self) -> Result<Option<Encounter>>;
    fn write_encounter(&mut self, encounter: &Encounter) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct LogDocument {
    #[serde(default)]
    entries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encounter: Option<Encounter>,
    #[serde(default)]
    effects: EffectsBlock,
}

/// The whole log in one TOML file
#[derive(Debug, Clone)]
pub struct TomlEncounterLog {
    path: PathBuf,
}

impl TomlEncounterLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<LogDocument> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(toml::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(LogDocument::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, document: &LogDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        write_atomic(&self.path, &toml::to_string_pretty(document)?)
    }

    fn update(&mut self, change: impl FnOnce(&mut LogDocument)) -> Result<()> {
        let mut document = self.load()?;
        change(&mut document);
        self.save(&document)
    }
}

impl EncounterLog for TomlEncounterLog {
    fn append_entry(&mut self, text: &str) -> Result<()> {
        self.update(|doc| doc.entries.push(text.to_string()))
    }

    fn entries(&self) -> Result<Vec<String>> {
        Ok(self.load()?.entries)
    }

    fn read_effects_block(&self) -> Result<EffectsBlock> {
        Ok(self.load()?.effects)
    }

    fn write_effects_block(&mut self, block: &EffectsBlock) -> Result<()> {
        self.update(|doc| doc.effects = block.clone())
    }

    fn read_encounter(&self) -> Result<Option<Encounter>> {
        Ok(self.load()?.encounter)
    }

    fn write_encounter(&mut self, encounter: &Encounter) -> Result<()> {
        self.update(|doc| doc.encounter = Some(encounter.clone()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryEncounterLog {
    document: LogDocument,
}

impl MemoryEncounterLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EncounterLog for MemoryEncounterLog {
    fn append_entry(&mut self, text: &str) -> Result<()> {
        self.document.entries.push(text.to_string());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<String>> {
        Ok(self.document.entries.clone())
    }

    fn read_effects_block(&self) -> Result<EffectsBlock> {
        Ok(self.document.effects.clone())
    }

    fn write_effects_block(&mut self, block: &EffectsBlock) -> Result<()> {
        self.document.effects = block.clone();
        Ok(())
    }

    fn read_encounter(&self) -> Result<Option<Encounter>> {
        Ok(self.document.encounter.clone())
    }

    fn write_encounter(&mut self, encounter: &Encounter) -> Result<()> {
        self.document.encounter = Some(encounter.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterRecord;
    use crate::dice::ScriptedDice;
    use crate::effects::ModifierSet;

    #[test]
    fn test_missing_file_is_empty_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = TomlEncounterLog::new(dir.path().join("encounter.toml"));
        assert!(log.entries().unwrap().is_empty());
        assert!(log.read_encounter().unwrap().is_none());
        assert!(log.read_effects_block().unwrap().is_empty());
    }

    #[test]
    fn test_toml_log_keeps_sections_apart() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = TomlEncounterLog::new(dir.path().join("logs").join("encounter.toml"));

        let records = vec![CharacterRecord::new("Alrik")];
        let encounter = Encounter::start(&records, &mut ScriptedDice::new([4]));
        log.write_encounter(&encounter).unwrap();
        log.append_entry("Runde 1").unwrap();

        let mut block = EffectsBlock::new();
        block.insert(
            "Alrik".to_string(),
            vec![Effect::new("Axxeleratus", 5).with_modifiers(ModifierSet {
                dodge: 2,
                ..Default::default()
            })],
        );
        log.write_effects_block(&block).unwrap();
        log.append_entry("Alrik wirkt Axxeleratus").unwrap();

        assert_eq!(log.entries().unwrap().len(), 2);
        assert_eq!(log.read_effects_block().unwrap(), block);
        let stored = log.read_encounter().unwrap().unwrap();
        assert_eq!(stored.round, 1);
        assert_eq!(stored.tracker.bonus("Alrik"), Some(4));
    }

    #[test]
    fn test_memory_log() {
        let mut log = MemoryEncounterLog::new();
        log.append_entry("start").unwrap();
        assert_eq!(log.entries().unwrap(), vec!["start".to_string()]);
        assert!(log.read_encounter().unwrap().is_none());
    }
}
