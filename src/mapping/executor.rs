use crate::error::{self, FieldmapError};
use crate::mapping::compiler::{CompiledRule, MappingPlan, Side};
use crate::mapping::rule::Direction;
use crate::path::eval::inject_into;
use crate::path::extract_value;
use crate::value::Value;
use indexmap::IndexMap;

/// Apply `plan` to `document` in `direction`.
///
/// Rules run one at a time in the plan's order for `direction`, each writing
/// into the growing result, so a later rule may overwrite an earlier one.
/// A rule whose source is missing writes nothing. Left to right a value goes
/// through the rule's transform and then its format converter; right to left
/// the format converter runs first and the transform second. `overrides` is
/// deep-merged last and always wins.
pub fn map(
    document: &Value,
    plan: &MappingPlan,
    overrides: Option<&Value>,
    direction: Direction,
) -> error::Result<Value> {
    let mut target = Value::Map(IndexMap::new());

    for rule in plan.ordered(direction) {
        let (source, destination) = rule.sides(direction);
        let Side::Path(destination) = destination else {
            tracing::trace!(rule = rule.index, %direction, "no destination path, skipped");
            continue;
        };

        let value = match source {
            Side::Path(path) => extract_value(document, path),
            Side::Literal(literal) => literal.clone(),
        };
        let value = convert(rule, direction, value)?;

        tracing::trace!(rule = rule.index, %direction, target = %destination, "applying rule");
        target = inject_into(target, value, destination);
    }

    if let Some(overrides) = overrides {
        tracing::debug!("merging overrides");
        target.merge(overrides.clone());
    }

    Ok(target)
}

/// Convert a value on its way across a rule. Left to right runs the
/// transform and then the format converter; right to left undoes them in the
/// opposite order. Missing values pass through untouched.
fn convert(rule: &CompiledRule, direction: Direction, value: Value) -> error::Result<Value> {
    if value.is_undefined() {
        return Ok(value);
    }
    match direction {
        Direction::LeftToRight => {
            let value = apply_transform(rule, direction, value)?;
            apply_format(rule, direction, value)
        }
        Direction::RightToLeft => {
            let value = apply_format(rule, direction, value)?;
            apply_transform(rule, direction, value)
        }
    }
}

fn apply_transform(rule: &CompiledRule, direction: Direction, value: Value) -> error::Result<Value> {
    match &rule.transform {
        Some(transform) => transform
            .apply(direction, value)
            .map_err(|e| FieldmapError::convert(format!("rule {} transform", rule.index), &e)),
        None => Ok(value),
    }
}

fn apply_format(rule: &CompiledRule, direction: Direction, value: Value) -> error::Result<Value> {
    match &rule.format {
        Some((name, converter)) => converter
            .apply(direction, value)
            .map_err(|e| FieldmapError::convert(name.as_str(), &e)),
        None => Ok(value),
    }
}

impl MappingPlan {
    /// Apply this plan; see [`map`].
    pub fn map(
        &self,
        document: &Value,
        overrides: Option<&Value>,
        direction: Direction,
    ) -> error::Result<Value> {
        map(document, self, overrides, direction)
    }
}
