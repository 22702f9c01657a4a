use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which way a plan is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Read left paths, write right paths.
    LeftToRight,
    /// Read right paths, write left paths.
    RightToLeft,
}

impl Direction {
    pub fn inverse(self) -> Self {
        match self {
            Direction::LeftToRight => Direction::RightToLeft,
            Direction::RightToLeft => Direction::LeftToRight,
        }
    }

    /// Parse a direction name as accepted on the command line.
    pub fn from_name(name: &str) -> Option<Direction> {
        match name.to_lowercase().as_str() {
            "right" | "to-right" | "ltr" | "left-to-right" => Some(Direction::LeftToRight),
            "left" | "to-left" | "rtl" | "right-to-left" => Some(Direction::RightToLeft),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::LeftToRight => write!(f, "left-to-right"),
            Direction::RightToLeft => write!(f, "right-to-left"),
        }
    }
}

/// Rule ordering for one direction.
///
/// `Asc` applies rules in declared order, so the later of two rules writing
/// the same target wins. `Desc` applies them reversed, so the earlier wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    #[default]
    #[serde(alias = "ASC")]
    Asc,
    #[serde(alias = "DESC")]
    Desc,
}

/// Per-direction ordering policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderOptions {
    #[serde(default, alias = "toLeft")]
    pub to_left: Order,
    #[serde(default, alias = "toRight")]
    pub to_right: Order,
}

impl OrderOptions {
    pub fn for_direction(&self, direction: Direction) -> Order {
        match direction {
            Direction::LeftToRight => self.to_right,
            Direction::RightToLeft => self.to_left,
        }
    }
}

/// Options applied to a whole plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlanOptions {
    #[serde(default)]
    pub order: OrderOptions,
}

/// A fallible value conversion, shared between rules.
pub type ConvertFn = Arc<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;

/// A pair of conversions, one per direction.
///
/// `to_right` turns a left-side value into its right-side form; `to_left`
/// undoes it. Used both for a rule's own transform and for named format
/// converters.
#[derive(Clone)]
pub struct Transform {
    to_left: ConvertFn,
    to_right: ConvertFn,
}

impl Transform {
    pub fn new<L, R>(to_left: L, to_right: R) -> Self
    where
        L: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
        R: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Transform {
            to_left: Arc::new(to_left),
            to_right: Arc::new(to_right),
        }
    }

    /// Apply the conversion for `direction`.
    pub fn apply(&self, direction: Direction, value: Value) -> anyhow::Result<Value> {
        match direction {
            Direction::LeftToRight => (self.to_right)(value),
            Direction::RightToLeft => (self.to_left)(value),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform { .. }")
    }
}

/// A declared correspondence between a left and a right location.
///
/// Each side's value comes from exactly one of its path or the literal.
#[derive(Debug, Clone, Default)]
pub struct MappingRule {
    pub left: Option<String>,
    pub right: Option<String>,
    pub literal: Option<Value>,
    pub transform: Option<Transform>,
    pub format: Option<String>,
}

impl MappingRule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a plain `left <-> right` rule.
    pub fn paths(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::new().left(left).right(right)
    }

    pub fn left(mut self, path: impl Into<String>) -> Self {
        self.left = Some(path.into());
        self
    }

    pub fn right(mut self, path: impl Into<String>) -> Self {
        self.right = Some(path.into());
        self
    }

    pub fn literal(mut self, value: impl Into<Value>) -> Self {
        self.literal = Some(value.into());
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn format(mut self, name: impl Into<String>) -> Self {
        self.format = Some(name.into());
        self
    }
}
