use crate::error::{self, suggest_closest, FieldmapError};
use crate::mapping::registry::Registry;
use crate::mapping::rule::{Direction, MappingRule, Order, OrderOptions, PlanOptions, Transform};
use crate::path::{Path, PathCache};
use crate::value::Value;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

/// Where one side of a compiled rule gets its value.
#[derive(Debug, Clone, PartialEq)]
pub enum Side {
    Path(Arc<Path>),
    Literal(Value),
}

/// A rule with parsed paths and resolved converters.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Position of the rule in the declared list.
    pub index: usize,
    pub left: Side,
    pub right: Side,
    pub transform: Option<Transform>,
    pub format: Option<(String, Transform)>,
}

impl CompiledRule {
    /// The side read from and the side written to, for `direction`.
    pub fn sides(&self, direction: Direction) -> (&Side, &Side) {
        match direction {
            Direction::LeftToRight => (&self.left, &self.right),
            Direction::RightToLeft => (&self.right, &self.left),
        }
    }
}

/// An executable, bidirectional set of rules.
#[derive(Debug, Clone)]
pub struct MappingPlan {
    rules: Vec<CompiledRule>,
    order: OrderOptions,
}

impl MappingPlan {
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn order(&self) -> OrderOptions {
        self.order
    }

    /// Rules in the order they run for `direction`.
    pub fn ordered(&self, direction: Direction) -> Box<dyn Iterator<Item = &CompiledRule> + '_> {
        match self.order.for_direction(direction) {
            Order::Asc => Box::new(self.rules.iter()),
            Order::Desc => Box::new(self.rules.iter().rev()),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan files
// ---------------------------------------------------------------------------

/// Serialized plan, as read from a JSON, YAML or TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanFile {
    #[serde(default)]
    pub order: OrderOptions,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One rule of a [`PlanFile`]. `transform` and `format` name registry entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    #[serde(default)]
    pub left: Option<String>,
    #[serde(default)]
    pub right: Option<String>,
    /// An explicit `null` is a literal, so presence is tracked separately
    /// from the value.
    #[serde(default, deserialize_with = "present")]
    pub literal: Option<serde_json::Value>,
    #[serde(default)]
    pub transform: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

// ---------------------------------------------------------------------------
// Compiler
// ---------------------------------------------------------------------------

/// Turns declared rules into a [`MappingPlan`].
///
/// Path texts are parsed once per compiler and shared between rules.
#[derive(Debug)]
pub struct Compiler {
    registry: Registry,
    cache: PathCache,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// A compiler using the builtin converters.
    pub fn new() -> Self {
        Self::with_registry(Registry::with_builtins())
    }

    pub fn with_registry(registry: Registry) -> Self {
        Compiler {
            registry,
            cache: PathCache::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn compile(
        &mut self,
        rules: &[MappingRule],
        options: PlanOptions,
    ) -> error::Result<MappingPlan> {
        let compiled = rules
            .iter()
            .enumerate()
            .map(|(index, rule)| self.compile_rule(index, rule))
            .collect::<error::Result<Vec<_>>>()?;

        tracing::debug!(
            rules = compiled.len(),
            to_left = ?options.order.to_left,
            to_right = ?options.order.to_right,
            "compiled mapping plan"
        );

        Ok(MappingPlan {
            rules: compiled,
            order: options.order,
        })
    }

    /// Compile a plan file, resolving named transforms through the registry.
    pub fn compile_file(&mut self, file: &PlanFile) -> error::Result<MappingPlan> {
        let rules = file
            .rules
            .iter()
            .enumerate()
            .map(|(index, spec)| self.rule_from_spec(index, spec))
            .collect::<error::Result<Vec<_>>>()?;
        self.compile(&rules, PlanOptions { order: file.order })
    }

    fn rule_from_spec(&self, index: usize, spec: &RuleSpec) -> error::Result<MappingRule> {
        let transform = match &spec.transform {
            Some(name) => Some(self.lookup(index, "transform", name)?.clone()),
            None => None,
        };
        Ok(MappingRule {
            left: spec.left.clone(),
            right: spec.right.clone(),
            literal: spec.literal.clone().map(Value::from),
            transform,
            format: spec.format.clone(),
        })
    }

    fn compile_rule(&mut self, index: usize, rule: &MappingRule) -> error::Result<CompiledRule> {
        match (&rule.left, &rule.right, &rule.literal) {
            (None, None, _) => {
                return Err(FieldmapError::rule(
                    index,
                    "rule names neither a left nor a right path",
                ))
            }
            (Some(_), Some(_), Some(_)) => {
                return Err(FieldmapError::rule(
                    index,
                    "literal given but both sides already have a path",
                ))
            }
            (None, Some(_), None) => {
                return Err(FieldmapError::rule(
                    index,
                    "left side needs a path or a literal",
                ))
            }
            (Some(_), None, None) => {
                return Err(FieldmapError::rule(
                    index,
                    "right side needs a path or a literal",
                ))
            }
            _ => {}
        }

        let left = self.side(rule.left.as_deref(), rule.literal.as_ref())?;
        let right = self.side(rule.right.as_deref(), rule.literal.as_ref())?;
        let format = match &rule.format {
            Some(name) => Some((name.clone(), self.lookup(index, "format", name)?.clone())),
            None => None,
        };

        Ok(CompiledRule {
            index,
            left,
            right,
            transform: rule.transform.clone(),
            format,
        })
    }

    fn side(&mut self, path: Option<&str>, literal: Option<&Value>) -> error::Result<Side> {
        match (path, literal) {
            (Some(path), _) => Ok(Side::Path(self.cache.parse(path)?)),
            (None, Some(literal)) => Ok(Side::Literal(literal.clone())),
            (None, None) => Ok(Side::Literal(Value::Undefined)),
        }
    }

    fn lookup(&self, index: usize, what: &str, name: &str) -> error::Result<&Transform> {
        self.registry.get(name).ok_or_else(|| {
            let known = self.registry.names();
            let msg = match suggest_closest(name, &known, 3) {
                Some(s) => format!("unknown {what} '{name}', did you mean '{s}'?"),
                None => format!("unknown {what} '{name}'"),
            };
            FieldmapError::rule(index, msg)
        })
    }
}

/// Compile `rules` with the builtin converters.
pub fn compile(rules: &[MappingRule], options: PlanOptions) -> error::Result<MappingPlan> {
    Compiler::new().compile(rules, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::parse_path;

    fn rule_err(rule: MappingRule) -> String {
        match compile(&[rule], PlanOptions::default()).unwrap_err() {
            FieldmapError::Rule { message, .. } => message,
            other => panic!("expected Rule error, got {other:?}"),
        }
    }

    #[test]
    fn compiles_paths() {
        let plan = compile(
            &[MappingRule::paths("users[0].name", "firstUser")],
            PlanOptions::default(),
        )
        .unwrap();
        let rule = &plan.rules()[0];
        assert_eq!(
            rule.left,
            Side::Path(Arc::new(parse_path("users[0].name").unwrap()))
        );
        assert_eq!(rule.right, Side::Path(Arc::new(parse_path("firstUser").unwrap())));
    }

    #[test]
    fn empty_string_is_root() {
        let plan = compile(&[MappingRule::paths("", "wrapped")], PlanOptions::default()).unwrap();
        match &plan.rules()[0].left {
            Side::Path(p) => assert!(p.is_root()),
            other => panic!("expected path, got {other:?}"),
        }
    }

    #[test]
    fn literal_fills_missing_side() {
        let plan = compile(
            &[MappingRule::new().right("version").literal(2i64)],
            PlanOptions::default(),
        )
        .unwrap();
        assert_eq!(plan.rules()[0].left, Side::Literal(Value::Int(2)));
    }

    #[test]
    fn rejects_literal_with_both_paths() {
        let msg = rule_err(MappingRule::paths("a", "b").literal(1i64));
        assert_eq!(msg, "literal given but both sides already have a path");
    }

    #[test]
    fn rejects_missing_sides() {
        assert_eq!(
            rule_err(MappingRule::new().right("b")),
            "left side needs a path or a literal"
        );
        assert_eq!(
            rule_err(MappingRule::new().left("a")),
            "right side needs a path or a literal"
        );
        assert_eq!(
            rule_err(MappingRule::new().literal(1i64)),
            "rule names neither a left nor a right path"
        );
    }

    #[test]
    fn rejects_unknown_format_with_suggestion() {
        let msg = rule_err(MappingRule::paths("a", "b").format("strng"));
        assert_eq!(msg, "unknown format 'strng', did you mean 'string'?");
    }

    #[test]
    fn rule_error_carries_index() {
        let err = compile(
            &[MappingRule::paths("a", "b"), MappingRule::new().left("c")],
            PlanOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FieldmapError::Rule { index: 1, .. }));
    }

    #[test]
    fn path_errors_propagate() {
        let err = compile(&[MappingRule::paths("a[", "b")], PlanOptions::default()).unwrap_err();
        assert_eq!(err.offset(), Some(2));
    }

    #[test]
    fn shared_paths_parse_once() {
        let mut compiler = Compiler::new();
        let plan = compiler
            .compile(
                &[
                    MappingRule::paths("a", "x"),
                    MappingRule::paths("a", "y"),
                ],
                PlanOptions::default(),
            )
            .unwrap();
        match (&plan.rules()[0].left, &plan.rules()[1].left) {
            (Side::Path(p), Side::Path(q)) => assert!(Arc::ptr_eq(p, q)),
            other => panic!("expected paths, got {other:?}"),
        }
    }

    #[test]
    fn ordering_follows_policy() {
        let options = PlanOptions {
            order: OrderOptions {
                to_left: Order::Desc,
                to_right: Order::Asc,
            },
        };
        let plan = compile(
            &[
                MappingRule::paths("a", "x"),
                MappingRule::paths("b", "y"),
                MappingRule::paths("c", "z"),
            ],
            options,
        )
        .unwrap();
        let forward: Vec<usize> = plan.ordered(Direction::LeftToRight).map(|r| r.index).collect();
        let backward: Vec<usize> = plan.ordered(Direction::RightToLeft).map(|r| r.index).collect();
        assert_eq!(forward, vec![0, 1, 2]);
        assert_eq!(backward, vec![2, 1, 0]);
    }

    #[test]
    fn plan_file_from_json() {
        let file: PlanFile = serde_json::from_str(
            r#"{
                "order": {"toRight": "DESC"},
                "rules": [
                    {"left": "id", "right": "user.id", "format": "string"},
                    {"right": "kind", "literal": null},
                    {"left": "meta", "right": "meta_text", "transform": "json"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(file.rules[1].literal, Some(serde_json::Value::Null));
        assert_eq!(file.rules[0].literal, None);

        let plan = Compiler::new().compile_file(&file).unwrap();
        assert_eq!(plan.order().to_right, Order::Desc);
        assert_eq!(plan.rules()[1].left, Side::Literal(Value::Null));
        assert!(plan.rules()[2].transform.is_some());
        assert_eq!(plan.rules()[0].format.as_ref().map(|f| f.0.as_str()), Some("string"));
    }

    #[test]
    fn plan_file_unknown_transform() {
        let file = PlanFile {
            rules: vec![RuleSpec {
                left: Some("a".into()),
                right: Some("b".into()),
                transform: Some("nope".into()),
                ..RuleSpec::default()
            }],
            ..PlanFile::default()
        };
        let err = Compiler::new().compile_file(&file).unwrap_err();
        assert_eq!(err.to_string(), "Rule error: rule 0: unknown transform 'nope'");
    }

    #[test]
    fn plan_file_rejects_unknown_keys() {
        let result: std::result::Result<PlanFile, _> =
            serde_json::from_str(r#"{"rules": [{"lft": "a"}]}"#);
        assert!(result.is_err());
    }
}
