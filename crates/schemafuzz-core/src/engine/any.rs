//! Untyped / unconstrained generation (§4.7): used for `additionalProperties:
//! true`, bare `items`-less arrays, and schema nodes that carry no type, enum,
//! or compositor at all.

use serde_json::Value;

use crate::error::GenError;
use crate::model::{SchemaNode, Type};
use crate::options::GenOptions;
use crate::random::RandomSource;

use super::dispatcher::generate_value;

/// The six typed shapes an *any* draw can pick among (§4.7): the five
/// primitive types plus array and object. `null` is a seventh possible shape,
/// handled directly below rather than through a stub `SchemaNode` since
/// `Type` has no `Null` arm (§3.1: `null` is modeled via `nullable`, not as a
/// type tag).
const SHAPES: [Type; 6] = [
    Type::String,
    Type::Integer,
    Type::Number,
    Type::Boolean,
    Type::Array,
    Type::Object,
];

/// Generate an unconstrained value, instantiating a stub schema of a
/// uniformly-chosen shape and recursing through the dispatcher. Past
/// `options.max_depth` this degenerates to a plain string to guarantee
/// termination (§4.7).
pub fn gen_any(
    path: &str,
    depth: u32,
    options: &GenOptions,
    random: &mut dyn RandomSource,
) -> Result<Value, GenError> {
    if depth >= options.max_depth {
        return super::string::gen_string(&SchemaNode::default(), path, options, random);
    }

    // SHAPES.len() + 1: the seven choices are the six typed stubs below plus
    // the `null` literal (§4.7).
    let idx = random.choose_index(SHAPES.len() + 1);
    if idx == SHAPES.len() {
        return Ok(Value::Null);
    }
    let stub = SchemaNode {
        ty: Some(SHAPES[idx]),
        ..SchemaNode::default()
    };
    generate_value(&stub, path, depth, options, random)
}
