//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Combat round counter (1-based once an encounter has started)
pub type Round = u32;

/// Body side for paired limbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Even rolls strike the right side, odd rolls the left.
    pub fn from_roll(roll: u32) -> Self {
        if roll % 2 == 0 {
            Side::Right
        } else {
            Side::Left
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// A current/maximum point pool (LE, AE, KE, SchiP, zone sub-pools)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pool {
    #[serde(default, deserialize_with = "crate::core::lenient::int")]
    pub current: i32,
    #[serde(default, deserialize_with = "crate::core::lenient::int")]
    pub max: i32,
}

impl Pool {
    pub fn full(max: i32) -> Self {
        let max = max.max(0);
        Self { current: max, max }
    }

    /// Remove points, flooring at 0. Returns the points actually removed.
    pub fn reduce(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = (self.current - amount.max(0)).max(0);
        before - self.current
    }

    /// Restore points, capped at max. Returns the points actually restored.
    pub fn restore(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = (self.current + amount.max(0)).min(self.max).max(before);
        self.current - before
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0
    }

    /// Clamp current into [0, max]
    pub fn normalize(&mut self) {
        self.max = self.max.max(0);
        self.current = self.current.clamp(0, self.max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_parity() {
        assert_eq!(Side::from_roll(14), Side::Right);
        assert_eq!(Side::from_roll(13), Side::Left);
    }

    #[test]
    fn test_pool_reduce_floors_at_zero() {
        let mut pool = Pool::full(10);
        assert_eq!(pool.reduce(4), 4);
        assert_eq!(pool.reduce(20), 6);
        assert_eq!(pool.current, 0);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pool_restore_caps_at_max() {
        let mut pool = Pool { current: 3, max: 10 };
        assert_eq!(pool.restore(50), 7);
        assert_eq!(pool.current, 10);
    }

    #[test]
    fn test_normalize_clamps_out_of_range() {
        let mut pool = Pool { current: 40, max: 30 };
        pool.normalize();
        assert_eq!(pool.current, 30);

        pool.current = -5;
        pool.normalize();
        assert_eq!(pool.current, 0);
    }
}
