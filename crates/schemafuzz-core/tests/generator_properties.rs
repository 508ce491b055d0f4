//! `proptest`-driven checks of the universal properties in §8: the
//! generator is exercised over arbitrary schema nodes (not over its own
//! production RNG path — the engine's own shrinking lives in
//! `schemafuzz_runner`; here `proptest` only shrinks the *schema* input).

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use schemafuzz_core::{GenOptions, Generator, SchemaNode, TapeRecorder, default_options};
use serde_json::{Value, json};

fn draw(schema: Value, options: GenOptions, seed: u64) -> Result<Value, schemafuzz_core::GenError> {
    let node = SchemaNode::from_value(&schema, "root").expect("valid test schema");
    let generator = Generator::new(node, options);
    let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(seed));
    generator.draw_value(&mut rng)
}

proptest! {
    /// (Bounds) every integer draw falls within `[minimum, maximum]`.
    #[test]
    fn integer_bounds_are_respected(lo in -1000i64..1000, span in 0i64..2000, seed in any::<u64>()) {
        let hi = lo + span;
        let schema = json!({"type": "integer", "minimum": lo, "maximum": hi});
        let v = draw(schema, default_options(), seed).unwrap();
        let n = v.as_i64().unwrap();
        prop_assert!(n >= lo && n <= hi);
    }

    /// (Bounds) every number draw falls within `[minimum, maximum]`.
    #[test]
    fn number_bounds_are_respected(lo in -1000.0f64..1000.0, span in 0.0f64..2000.0, seed in any::<u64>()) {
        let hi = lo + span;
        let schema = json!({"type": "number", "minimum": lo, "maximum": hi});
        let v = draw(schema, default_options(), seed).unwrap();
        let n = v.as_f64().unwrap();
        prop_assert!(n >= lo && n <= hi);
    }

    /// (Length) string draws have length in `[min_length, max_length]`
    /// (measured in Unicode scalar values, matching `minLength`/`maxLength`
    /// semantics the loader reads off the raw document).
    #[test]
    fn string_length_is_respected(min_len in 0u64..20, extra in 0u64..30, seed in any::<u64>()) {
        let max_len = min_len + extra;
        let schema = json!({"type": "string", "minLength": min_len, "maxLength": max_len});
        let v = draw(schema, default_options(), seed).unwrap();
        let s = v.as_str().unwrap();
        let len = s.chars().count() as u64;
        prop_assert!(len >= min_len && len <= max_len);
    }

    /// (Length) array draws have cardinality in `[min_items, max_items]`.
    #[test]
    fn array_cardinality_is_respected(min_items in 0u64..10, extra in 0u64..10, seed in any::<u64>()) {
        let max_items = min_items + extra;
        let schema = json!({
            "type": "array",
            "items": {"type": "integer", "minimum": 0, "maximum": 10},
            "minItems": min_items,
            "maxItems": max_items,
        });
        let v = draw(schema, default_options(), seed).unwrap();
        let arr = v.as_array().unwrap();
        prop_assert!(arr.len() as u64 >= min_items && arr.len() as u64 <= max_items);
    }

    /// (Required) every object draw contains every required key.
    #[test]
    fn required_keys_are_always_present(seed in any::<u64>()) {
        let schema = json!({
            "type": "object",
            "required": ["a", "b"],
            "properties": {
                "a": {"type": "boolean"},
                "b": {"type": "string"},
                "c": {"type": "integer"},
            },
            "additionalProperties": false,
        });
        let v = draw(schema, default_options(), seed).unwrap();
        let obj = v.as_object().unwrap();
        prop_assert!(obj.contains_key("a"));
        prop_assert!(obj.contains_key("b"));
    }

    /// (Enum closure) a draw from an enum-constrained node is always a
    /// member of that enum.
    #[test]
    fn enum_closure_holds(seed in any::<u64>()) {
        let allowed = [json!(1), json!(2), json!(3)];
        let schema = json!({"type": "integer", "enum": allowed});
        let v = draw(schema, default_options(), seed).unwrap();
        prop_assert!(allowed.contains(&v));
    }

    /// (Nullable) `null` only ever appears when the node says it may.
    #[test]
    fn non_nullable_node_never_draws_null(seed in any::<u64>()) {
        let schema = json!({"type": "integer", "minimum": 0, "maximum": 5});
        let v = draw(schema, default_options(), seed).unwrap();
        prop_assert!(!v.is_null());
    }

    /// (Uniqueness) `unique_items` draws never contain a JSON-text
    /// duplicate, over an item domain wide enough to make the property
    /// meaningful.
    #[test]
    fn unique_items_have_no_duplicates(seed in any::<u64>()) {
        let schema = json!({
            "type": "array",
            "items": {"type": "integer", "minimum": 0, "maximum": 1000},
            "minItems": 3,
            "maxItems": 8,
            "uniqueItems": true,
        });
        let v = draw(schema, default_options(), seed).unwrap();
        let arr = v.as_array().unwrap();
        let mut seen = std::collections::HashSet::new();
        for item in arr {
            prop_assert!(seen.insert(serde_json::to_string(item).unwrap()));
        }
    }
}
