//! Bidirectional mapping plans.
//!
//! Rules are declared as [`MappingRule`]s (or read from a [`PlanFile`]),
//! compiled once into a [`MappingPlan`] and then applied in either
//! [`Direction`].

pub mod compiler;
pub mod executor;
pub mod registry;
pub mod rule;

pub use compiler::{compile, CompiledRule, Compiler, MappingPlan, PlanFile, RuleSpec, Side};
pub use executor::map;
pub use registry::Registry;
pub use rule::{Direction, MappingRule, Order, OrderOptions, PlanOptions, Transform};
