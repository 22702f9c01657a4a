//! Property-based tests for path parsing, slices, extraction and mapping.

use fieldmap::mapping::{
    compile, Direction, MappingRule, Order, OrderOptions, PlanOptions, Transform,
};
use fieldmap::path::{extract_value, inject_value, parse_path, ArrayIterator, Path, SegmentKind};
use fieldmap::value::Value;
use indexmap::IndexMap;
use proptest::prelude::*;

fn segment_kind() -> impl Strategy<Value = SegmentKind> {
    prop_oneof![
        "[a-z][a-z0-9_.]{0,4}(\\[[a-z.]{0,2}\\])?".prop_map(|name| SegmentKind::ObjectIndex { name }),
        (-20i64..20).prop_map(|index| SegmentKind::ArrayIndex { index }),
        (-20i64..20, proptest::option::of(-20i64..20))
            .prop_map(|(start, size)| SegmentKind::ArrayIterator(ArrayIterator::new(start, size))),
    ]
}

fn int_array() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(-100i64..100, 0..12)
}

/// Number of elements a slice can actually reach in an array of `len`.
fn reachable(len: usize, start: i64, size: Option<i64>) -> usize {
    let len = len as i64;
    let from = if start < 0 { len + start } else { start };
    let lo = from.max(0);
    let hi = match size {
        None => len,
        Some(s) => (from + s.abs()).min(len),
    };
    (hi - lo).max(0) as usize
}

fn add(delta: i64) -> impl Fn(Value) -> anyhow::Result<Value> {
    move |v| match v {
        Value::Int(i) => Ok(Value::Int(i + delta)),
        other => anyhow::bail!("expected int, found {}", other.type_name()),
    }
}

proptest! {
    #[test]
    fn parsing_is_deterministic(kinds in prop::collection::vec(segment_kind(), 0..6)) {
        let text = Path::from_kinds(kinds.clone()).to_string();
        let first = parse_path(&text).unwrap();
        let second = parse_path(&text).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert!(first.kinds().eq(kinds.iter()), "{}", text);
    }

    #[test]
    fn slice_reads_reachable_range(
        items in int_array(),
        start in -15i64..15,
        size in proptest::option::of(-15i64..15),
    ) {
        let array = Value::Array(items.iter().copied().map(Value::Int).collect());
        let iter = ArrayIterator::new(start, size);
        let read = iter.get_value(&array);
        prop_assert_eq!(read.len(), reachable(items.len(), start, size));
    }

    #[test]
    fn slice_write_back_restores_array(
        items in int_array(),
        start in -15i64..15,
        size in proptest::option::of(-15i64..15),
    ) {
        let array = Value::Array(items.into_iter().map(Value::Int).collect());
        let iter = ArrayIterator::new(start, size);
        let read = iter.get_value(&array);
        prop_assert_eq!(iter.set_value(array.clone(), Value::Array(read)), array);
    }

    #[test]
    fn array_free_extract_then_inject_restricts_document(
        keys in prop::collection::vec("[a-m]{1,4}", 1..5),
        noise in prop::collection::vec(("[n-z]{1,4}", any::<i64>()), 1..5),
        leaf in any::<i64>(),
    ) {
        let mut full = Value::Int(leaf);
        let mut restricted = Value::Int(leaf);
        for (level, key) in keys.iter().enumerate().rev() {
            let mut map = IndexMap::new();
            let (noise_key, noise_value) = &noise[level % noise.len()];
            map.insert(noise_key.clone(), Value::Int(*noise_value));
            map.insert(key.clone(), full);
            full = Value::Map(map);

            let mut only = IndexMap::new();
            only.insert(key.clone(), restricted);
            restricted = Value::Map(only);
        }

        let path = parse_path(&keys.join(".")).unwrap();
        prop_assert!(path.is_array_free());
        let extracted = extract_value(&full, &path);
        prop_assert_eq!(inject_value(&Value::Undefined, extracted, &path), restricted);
    }

    #[test]
    fn inverse_transforms_round_trip(
        fields in prop::collection::btree_map("[a-z]{1,6}", -1000i64..1000, 1..8),
    ) {
        let rules: Vec<MappingRule> = fields
            .keys()
            .enumerate()
            .map(|(i, key)| {
                MappingRule::paths(format!("src.{key}"), format!("dst[{i}].value"))
                    .transform(Transform::new(add(-1), add(1)))
            })
            .collect();
        let plan = compile(&rules, PlanOptions::default()).unwrap();

        let source: IndexMap<String, Value> = fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::Int(*v)))
            .collect();
        let mut left = IndexMap::new();
        left.insert("src".to_string(), Value::Map(source));
        let left = Value::Map(left);

        let right = plan.map(&left, None, Direction::LeftToRight).unwrap();
        prop_assert_eq!(plan.map(&right, None, Direction::RightToLeft).unwrap(), left);
    }

    #[test]
    fn rule_order_and_overrides(
        a in any::<i64>(),
        b in any::<i64>(),
        o in any::<i64>(),
        target in "[a-z]{1,3}",
    ) {
        let rules = [
            MappingRule::paths("a", target.as_str()),
            MappingRule::paths("b", target.as_str()),
        ];
        let doc = Value::from(serde_json::json!({"a": a, "b": b}));
        let mut patch = IndexMap::new();
        patch.insert(target.clone(), Value::Int(o));
        let overrides = Value::Map(patch);

        for (order, expected) in [(Order::Asc, b), (Order::Desc, a)] {
            let options = PlanOptions { order: OrderOptions { to_left: order, to_right: order } };
            let plan = compile(&rules, options).unwrap();
            let out = plan.map(&doc, None, Direction::LeftToRight).unwrap();
            prop_assert_eq!(extract_value(&out, &parse_path(&target).unwrap()), Value::Int(expected));
            let out = plan.map(&doc, Some(&overrides), Direction::LeftToRight).unwrap();
            prop_assert_eq!(extract_value(&out, &parse_path(&target).unwrap()), Value::Int(o));
        }
    }
}

#[test]
fn reachable_matches_known_slices() {
    assert_eq!(reachable(5, 1, Some(-2)), 2);
    assert_eq!(reachable(5, -2, None), 2);
    assert_eq!(reachable(5, -7, Some(3)), 1);
    assert_eq!(reachable(5, 9, Some(2)), 0);
}
