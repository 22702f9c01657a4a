//! fieldmap: declarative, bidirectional mapping between JSON-like documents.
//!
//! Paths such as `users[0].name` or `rows[[1,-2]].id` address values inside a
//! document ([`path`]). A plan of rules pairs left paths with right paths and
//! moves data either way between two shapes ([`mapping`]).
//!
//! ```
//! use fieldmap::mapping::{compile, Direction, MappingRule, PlanOptions};
//! use fieldmap::value::Value;
//!
//! let plan = compile(
//!     &[MappingRule::paths("users[0].name", "firstUser")],
//!     PlanOptions::default(),
//! )?;
//! let left = Value::from(serde_json::json!({"users": [{"name": "Alice"}]}));
//! let right = plan.map(&left, None, Direction::LeftToRight)?;
//! assert_eq!(right, Value::from(serde_json::json!({"firstUser": "Alice"})));
//! assert_eq!(plan.map(&right, None, Direction::RightToLeft)?, left);
//! # Ok::<(), fieldmap::error::FieldmapError>(())
//! ```

pub mod cli;
pub mod error;
pub mod formats;
pub mod mapping;
pub mod path;
pub mod value;

pub use error::{FieldmapError, Result};
pub use mapping::{map, Direction, MappingPlan, MappingRule};
pub use path::{extract_value, inject_value, parse_path, Path};
pub use value::Value;
