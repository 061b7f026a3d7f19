use thiserror::Error;

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Character not found: {0}")]
    CharacterNotFound(String),

    #[error("No characters discovered")]
    NoCharacters,

    #[error("No active encounter")]
    NoActiveEncounter,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rule table error: {0}")]
    Table(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    #[error("TOML encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RulesError>;
