//! Priority dispatch (§4.1): the single entry point every generator
//! (including itself, recursively) calls to turn a `SchemaNode` into a value.

use serde_json::Value;

use crate::error::GenError;
use crate::model::{SchemaNode, Type};
use crate::options::GenOptions;
use crate::random::RandomSource;

use super::composition::{gen_all_of, gen_any_of, gen_one_of};
use super::{any, array, object, primitives, string};

/// Resolve one schema node to a generated JSON value, honoring the
/// dispatch order in §4.1:
///
/// 1. `nullable` gets first refusal — a coin flip decides whether the rest
///    of the node is even consulted.
/// 2. A non-empty `allOf`/`anyOf`/`oneOf` dispatches to the matching
///    composition handler, ahead of a sibling `type` tag — compositors take
///    priority over primitive dispatch per the numbered list in §4.1.
/// 3. A node carrying a `type` tag dispatches straight to that type's
///    generator, which itself checks `enum` before falling back to its
///    unconstrained shape.
/// 4. A typeless, compositor-less node with a non-empty `enum` samples from
///    it directly — required for the Enum closure property (§8) to hold
///    unconditionally, a resolution of an ambiguity between §4.1's literal
///    priority list and §8's universal property (see `DESIGN.md`).
/// 5. A typeless, enum-less, compositor-less node is "any" (§4.7).
pub fn generate_value(
    node: &SchemaNode,
    path: &str,
    depth: u32,
    options: &GenOptions,
    random: &mut dyn RandomSource,
) -> Result<Value, GenError> {
    if node.nullable && random.gen_bool(0.5) {
        return Ok(Value::Null);
    }

    if !node.all_of.is_empty() {
        return gen_all_of(&node.all_of, path, depth, options, random);
    }
    if !node.any_of.is_empty() {
        return gen_any_of(&node.any_of, path, depth, options, random);
    }
    if !node.one_of.is_empty() {
        return gen_one_of(&node.one_of, path, depth, options, random);
    }

    if let Some(ty) = node.ty {
        return match ty {
            Type::String => string::gen_string(node, path, options, random),
            Type::Integer => primitives::gen_integer(node, path, random),
            Type::Number => primitives::gen_number(node, path, options, random),
            Type::Boolean => Ok(primitives::gen_boolean(node, random)),
            Type::Array => array::gen_array(node, path, depth, options, random),
            Type::Object => object::gen_object(node, path, depth, options, random),
        };
    }

    if let Some(values) = &node.enum_values {
        if !values.is_empty() {
            let idx = random.choose_index(values.len());
            return Ok(values[idx].clone());
        }
    }

    any::gen_any(path, depth, options, random)
}
