//! Document and plan file codecs.
//!
//! Each module turns text into a [`Value`](crate::value::Value) and back,
//! and reads a [`PlanFile`](crate::mapping::PlanFile) in its own syntax.

pub mod json;
pub mod toml;
pub mod yaml;
