//! Character sheet storage

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::character::CharacterRecord;
use crate::core::{Result, RulesError};
use crate::store::write_atomic;

pub trait CharacterStore {
    fn read(&self, id: &str) -> Result<CharacterRecord>;
    fn write(&mut self, id: &str, record: &CharacterRecord) -> Result<()>;
    /// Ids of every stored character, sorted
    fn list(&self) -> Result<Vec<String>>;

    /// Read every listed character; an empty store is an error
    fn read_all(&self) -> Result<Vec<(String, CharacterRecord)>> {
        let ids = self.list()?;
        if ids.is_empty() {
            return Err(RulesError::NoCharacters);
        }
        ids.into_iter()
            .map(|id| self.read(&id).map(|record| (id, record)))
            .collect()
    }
}

/// One `<id>.toml` file per character in a directory
#[derive(Debug, Clone)]
pub struct TomlCharacterStore {
    dir: PathBuf,
}

impl TomlCharacterStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.toml", id))
    }
}

impl CharacterStore for TomlCharacterStore {
    fn read(&self, id: &str) -> Result<CharacterRecord> {
        let text = fs::read_to_string(self.path(id)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => RulesError::CharacterNotFound(id.to_string()),
            _ => RulesError::Io(e),
        })?;
        let mut record: CharacterRecord = toml::from_str(&text)?;
        record.normalize();
        Ok(record)
    }

    fn write(&mut self, id: &str, record: &CharacterRecord) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let text = toml::to_string_pretty(record)?;
        write_atomic(&self.path(id), &text)?;
        tracing::debug!(character = id, "character written");
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCharacterStore {
    records: BTreeMap<String, CharacterRecord>,
}

impl MemoryCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, record: CharacterRecord) -> Self {
        self.records.insert(record.name.clone(), record);
        self
    }
}

impl CharacterStore for MemoryCharacterStore {
    fn read(&self, id: &str) -> Result<CharacterRecord> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| RulesError::CharacterNotFound(id.to_string()))
    }

    fn write(&mut self, id: &str, record: &CharacterRecord) -> Result<()> {
        self.records.insert(id.to_string(), record.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.records.keys().cloned().collect())
    }
}
