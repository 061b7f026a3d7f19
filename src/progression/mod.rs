//! Adventure point (AP) accounting

pub mod calculator;
pub mod costs;

pub use calculator::{calculate, calculate_with, derived_max_life, ApCategory, ApReport};
pub use costs::{attribute_cost, attribute_step_cost, skill_cost, skill_step_cost, CostTier};
