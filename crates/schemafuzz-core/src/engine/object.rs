//! Object generator (§4.4): required/optional/additional property assembly.

use serde_json::{Map, Value};

use crate::error::GenError;
use crate::model::{AdditionalProperties, SchemaNode};
use crate::options::GenOptions;
use crate::random::RandomSource;

use super::dispatcher::generate_value;

/// Alphabet for ad-hoc additional-property keys (§4.4 step 2: "random strings
/// of length ~20-30").
const KEY_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn gen_object(
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

    let mut map = Map::new();

    // Step 2: ad-hoc additional-property keys, if permitted.
    let additional_schema = match &node.additional_properties {
        AdditionalProperties::Forbidden => None,
        AdditionalProperties::AllowedAny => Some(None),
        AdditionalProperties::AllowedWithSchema(schema) => Some(Some(schema.as_ref())),
    };
    if let Some(schema) = additional_schema {
        let k = random.gen_range_u64(0, u64::from(options.additional_properties_max)) as usize;
        for i in 0..k {
            let key = random_key(random);
            let sub_path = format!("{path}.<additional:{i}>");
            let value = match schema {
                Some(sub) => generate_value(sub, &sub_path, depth + 1, options, random)?,
                None => super::any::gen_any(&sub_path, depth + 1, options, random)?,
            };
            map.insert(key, value);
        }
    }

    // Step 3: optional declared properties, each independently present/absent.
    for (name, schema) in &node.properties {
        if node.required.contains(name) {
            continue;
        }
        if random.gen_bool(0.5) {
            let sub_path = format!("{path}.{name}");
            let value = generate_value(schema, &sub_path, depth + 1, options, random)?;
            map.insert(name.clone(), value);
        }
    }

    // Step 4: required declared properties, always present, later-wins over
    // any coincidentally-colliding ad-hoc key (§3.4 invariant).
    for name in &node.required {
        let schema = node
            .properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s);
        let sub_path = format!("{path}.{name}");
        let value = match schema {
            Some(s) => generate_value(s, &sub_path, depth + 1, options, random)?,
            None => super::any::gen_any(&sub_path, depth + 1, options, random)?,
        };
        map.insert(name.clone(), value);
    }

    Ok(Value::Object(map))
}

fn random_key(random: &mut dyn RandomSource) -> String {
    let len = random.gen_range_u64(20, 30) as usize;
    (0..len)
        .map(|_| KEY_ALPHABET[random.choose_index(KEY_ALPHABET.len())] as char)
        .collect()
}
