//! Array generator (§4.3): cardinality, uniqueness, recursive item generation.

use serde_json::Value;

use crate::error::GenError;
use crate::model::SchemaNode;
use crate::options::GenOptions;
use crate::random::RandomSource;

use super::dispatcher::generate_value;

/// Ceiling used when `max_items` is absent (§4.3: "max defaulting to a small
/// ceiling").
const DEFAULT_MAX_ITEMS: u64 = 10;
/// Retry budget for `unique_items` redraws before declaring a configuration
/// error (§4.3, §7.1).
const UNIQUE_RETRY_BUDGET: u32 = 50;

pub fn gen_array(
    node: &SchemaNode,
    path: &str,
    depth: u32,
    options: &GenOptions,
    random: &mut dyn RandomSource,
) -> Result<Value, GenError> {
    if let Some(values) = &node.enum_values {
        if !values.is_empty() {
            let idx = random.choose_index(values.len());
            return Ok(values[idx].clone());
        }
    }

    let min = node.min_items.unwrap_or(0);
    let max = node.max_items.unwrap_or(min.max(DEFAULT_MAX_ITEMS));
    let n = random.gen_range_u64(min, max);

    let item_path = format!("{path}.items");
    let mut items: Vec<Value> = Vec::with_capacity(n as usize);

    if node.unique_items {
        let mut seen_texts: Vec<String> = Vec::new();
        while (items.len() as u64) < n {
            let mut drawn = None;
            for _ in 0..UNIQUE_RETRY_BUDGET {
                let candidate = gen_item(node, &item_path, depth, options, random)?;
                let text = candidate.to_string();
                if !seen_texts.contains(&text) {
                    seen_texts.push(text);
                    drawn = Some(candidate);
                    break;
                }
            }
            match drawn {
                Some(v) => items.push(v),
                None => {
                    return Err(GenError::UniqueItemsExhausted {
                        path: path.to_string(),
                        count: n,
                        retries: UNIQUE_RETRY_BUDGET,
                    });
                }
            }
        }
    } else {
        for _ in 0..n {
            items.push(gen_item(node, &item_path, depth, options, random)?);
        }
    }

    Ok(Value::Array(items))
}

fn gen_item(
    node: &SchemaNode,
    item_path: &str,
    depth: u32,
    options: &GenOptions,
    random: &mut dyn RandomSource,
) -> Result<Value, GenError> {
    match &node.items {
        Some(items_schema) => generate_value(items_schema, item_path, depth + 1, options, random),
        None => super::any::gen_any(item_path, depth + 1, options, random),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::TapeRecorder;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use serde_json::json;
    use std::collections::HashSet;

    fn node(v: Value) -> SchemaNode {
        SchemaNode::from_value(&v, "root").unwrap()
    }

    #[test]
    fn cardinality_within_bounds() {
        let n = node(json!({
            "type": "array", "items": {"type": "integer"},
            "minItems": 2, "maxItems": 4
        }));
        let opts = GenOptions::default();
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        for _ in 0..30 {
            let v = gen_array(&n, "root", 0, &opts, &mut rng).unwrap();
            let arr = v.as_array().unwrap();
            assert!((2..=4).contains(&arr.len()));
        }
    }

    #[test]
    fn unique_items_are_distinct() {
        let n = node(json!({
            "type": "array",
            "items": {"type": "integer", "minimum": 0, "maximum": 1000},
            "minItems": 5, "maxItems": 5,
            "uniqueItems": true
        }));
        let opts = GenOptions::default();
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        let v = gen_array(&n, "root", 0, &opts, &mut rng).unwrap();
        let arr = v.as_array().unwrap();
        let set: HashSet<String> = arr.iter().map(ToString::to_string).collect();
        assert_eq!(set.len(), arr.len());
    }

    #[test]
    fn unsatisfiable_uniqueness_is_configuration_error() {
        let n = node(json!({
            "type": "array",
            "items": {"type": "integer", "minimum": 1, "maximum": 1},
            "minItems": 2, "maxItems": 2,
            "uniqueItems": true
        }));
        let opts = GenOptions::default();
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        let err = gen_array(&n, "root", 0, &opts, &mut rng).unwrap_err();
        assert!(matches!(err, GenError::UniqueItemsExhausted { .. }));
    }

    #[test]
    fn missing_items_schema_falls_back_to_any() {
        let n = node(json!({"type": "array", "minItems": 1, "maxItems": 1}));
        let opts = GenOptions::default();
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        let v = gen_array(&n, "root", 0, &opts, &mut rng).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 1);
    }
}
