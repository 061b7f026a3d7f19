//! Persistence ports for character sheets and the encounter log
//!
//! The rules engine only ever talks to these traits. TOML-file and
//! in-memory implementations are provided.

pub mod characters;
pub mod encounter_log;

pub use characters::{CharacterStore, MemoryCharacterStore, TomlCharacterStore};
pub use encounter_log::{EffectsBlock, EncounterLog, MemoryEncounterLog, TomlEncounterLog};

use std::fs;
use std::path::Path;

use crate::core::Result;

/// Write through a sibling temp file so readers never see a half-written file
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("toml.tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
