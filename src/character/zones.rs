//! Per-zone injury tracking
//!
//! The severe-injury counter is always kept; the life sub-pool only exists
//! when anatomical tracking is enabled for the character.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::Pool;

/// Status tier derived from a zone's current/maximum ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZoneStatus {
    /// At least half the zone's points remain
    Ok,
    /// Below half
    Angeschlagen,
    /// A quarter or less
    Kritisch,
    /// Zone is out
    Ausgefallen,
}

impl ZoneStatus {
    pub fn from_pool(pool: &Pool) -> Self {
        if pool.current <= 0 {
            ZoneStatus::Ausgefallen
        } else if pool.current * 4 <= pool.max {
            ZoneStatus::Kritisch
        } else if pool.current * 2 < pool.max {
            ZoneStatus::Angeschlagen
        } else {
            ZoneStatus::Ok
        }
    }
}

impl fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ZoneStatus::Ok => "OK",
            ZoneStatus::Angeschlagen => "Angeschlagen",
            ZoneStatus::Kritisch => "Kritisch",
            ZoneStatus::Ausgefallen => "Ausgefallen",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default, deserialize_with = "crate::core::lenient::level")]
    pub severe_injuries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life: Option<Pool>,
}

impl Zone {
    pub fn with_pool(max: i32) -> Self {
        Self {
            severe_injuries: 0,
            life: Some(Pool::full(max)),
        }
    }

    /// Status tier, `None` when the zone has no sub-pool
    pub fn status(&self) -> Option<ZoneStatus> {
        self.life.as_ref().map(ZoneStatus::from_pool)
    }
}
