//! Composition handlers (§4.5): `allOf` merge, `anyOf` subset-merge, `oneOf`
//! branch selection.

use serde_json::Value;

use crate::error::GenError;
use crate::model::{SchemaNode, Type};
use crate::options::GenOptions;
use crate::random::RandomSource;

use super::dispatcher::generate_value;
use super::merge::merge_object_schemas;

/// `allOf` (§4.5): fold the left-to-right list into a merged object schema,
/// then generate from it. Non-`object` branches are a configuration error.
pub fn gen_all_of(
    branches: &[SchemaNode],
    path: &str,
    depth: u32,
    options: &GenOptions,
    random: &mut dyn RandomSource,
) -> Result<Value, GenError> {
    for branch in branches {
        if branch.ty.is_some() && branch.ty != Some(Type::Object) {
            return Err(GenError::AllOfNonObjectBranch {
                path: path.to_string(),
                found: branch.ty.map_or("untyped", Type::as_str).to_string(),
            });
        }
    }

    let mut merged = SchemaNode {
        ty: Some(Type::Object),
        ..SchemaNode::default()
    };
    for (i, branch) in branches.iter().enumerate() {
        merged = merge_object_schemas(&merged, branch, &format!("{path}.allOf[{i}]"))?;
    }
    merged.ty = Some(Type::Object);

    generate_value(&merged, path, depth, options, random)
}

/// `anyOf` (§4.5): select a random non-empty subset, generate one value per
/// selected branch, and shallow-merge if every value is an object;
/// otherwise return the first non-object value unmerged.
pub fn gen_any_of(
    branches: &[SchemaNode],
    path: &str,
    depth: u32,
    options: &GenOptions,
    random: &mut dyn RandomSource,
) -> Result<Value, GenError> {
    let k = random.gen_range_u64(1, branches.len() as u64) as usize;
    let selected = choose_subset(branches, k, random);

    if selected.len() == 1 {
        let sub_path = format!("{path}.anyOf[0]");
        return generate_value(selected[0], &sub_path, depth, options, random);
    }

    let mut values = Vec::with_capacity(selected.len());
    for (i, branch) in selected.iter().enumerate() {
        let sub_path = format!("{path}.anyOf[{i}]");
        values.push(generate_value(branch, &sub_path, depth, options, random)?);
    }

    if let Some(non_object) = values.iter().find(|v| !v.is_object()) {
        return Ok(non_object.clone());
    }

    let mut merged = serde_json::Map::new();
    for value in values {
        if let Value::Object(obj) = value {
            merged.extend(obj);
        }
    }
    Ok(Value::Object(merged))
}

/// `oneOf` (§4.5): uniformly select one sub-schema; mutual exclusion is not
/// enforced.
pub fn gen_one_of(
    branches: &[SchemaNode],
    path: &str,
    depth: u32,
    options: &GenOptions,
    random: &mut dyn RandomSource,
) -> Result<Value, GenError> {
    let idx = random.choose_index(branches.len());
    let sub_path = format!("{path}.oneOf[{idx}]");
    generate_value(&branches[idx], &sub_path, depth, options, random)
}

/// Select a random subset of size `k` out of `items` without replacement,
/// preserving original order.
fn choose_subset<'a, T>(items: &'a [T], k: usize, random: &mut dyn RandomSource) -> Vec<&'a T> {
    if k >= items.len() {
        return items.iter().collect();
    }
    let mut indices: Vec<usize> = (0..items.len()).collect();
    let mut chosen = Vec::with_capacity(k);
    for _ in 0..k {
        let i = random.choose_index(indices.len());
        chosen.push(indices.remove(i));
    }
    chosen.sort_unstable();
    chosen.into_iter().map(|i| &items[i]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::TapeRecorder;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use serde_json::json;

    fn node(v: Value) -> SchemaNode {
        SchemaNode::from_value(&v, "root").unwrap()
    }

    #[test]
    fn all_of_merges_required_properties_from_every_branch() {
        let schema = node(json!({
            "allOf": [
                {"type":"object","required":["x"],"properties":{"x":{"type":"integer","minimum":1,"maximum":1}}},
                {"type":"object","required":["y"],"properties":{"y":{"type":"string","minLength":1,"maxLength":1}}}
            ]
        }));
        let opts = GenOptions::default();
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        let v = gen_all_of(&schema.all_of, "root", 0, &opts, &mut rng).unwrap();
        let obj = v.as_object().unwrap();
        assert!(obj.contains_key("x"));
        assert!(obj.contains_key("y"));
    }

    #[test]
    fn all_of_non_object_branch_is_configuration_error() {
        let schema = node(json!({"allOf": [{"type":"object"}, {"type":"integer"}]}));
        let opts = GenOptions::default();
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        let err = gen_all_of(&schema.all_of, "root", 0, &opts, &mut rng).unwrap_err();
        assert!(matches!(err, GenError::AllOfNonObjectBranch { .. }));
    }

    #[test]
    fn one_of_produces_values_from_every_branch_over_many_draws() {
        let schema = node(json!({"oneOf": [{"type":"integer"}, {"type":"string"}]}));
        let opts = GenOptions::default();
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        let mut saw_int = false;
        let mut saw_str = false;
        for _ in 0..50 {
            let v = gen_one_of(&schema.one_of, "root", 0, &opts, &mut rng).unwrap();
            if v.is_i64() {
                saw_int = true;
            }
            if v.is_string() {
                saw_str = true;
            }
        }
        assert!(saw_int && saw_str);
    }

    #[test]
    fn any_of_single_selection_passes_through() {
        let schema = node(json!({"anyOf": [{"type":"boolean"}]}));
        let opts = GenOptions::default();
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(1));
        let v = gen_any_of(&schema.any_of, "root", 0, &opts, &mut rng).unwrap();
        assert!(v.is_boolean());
    }

    #[test]
    fn any_of_object_subset_merges_shallowly() {
        let schema = node(json!({
            "anyOf": [
                {"type":"object","required":["a"],"properties":{"a":{"type":"boolean"}}},
                {"type":"object","required":["b"],"properties":{"b":{"type":"boolean"}}}
            ]
        }));
        let opts = GenOptions::default();
        // Seed chosen so both branches are selected at least some of the time;
        // regardless of which subset is drawn the result must be an object.
        let mut rng = TapeRecorder::new(SmallRng::seed_from_u64(9));
        let v = gen_any_of(&schema.any_of, "root", 0, &opts, &mut rng).unwrap();
        assert!(v.is_object());
    }
}
