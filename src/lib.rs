//! Aventuria Rules - combat and progression rules engine for DSA5 sessions

pub mod character;
pub mod combat;
pub mod core;
pub mod dice;
pub mod effects;
pub mod progression;
pub mod session;
pub mod store;
pub mod tables;
