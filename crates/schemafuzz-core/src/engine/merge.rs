//! The schema merger (§4.6): structural merge of two `object`-typed schemas,
//! used by the `allOf` handler (§4.5) to fold a list of sub-schemas into one.

use crate::error::GenError;
use crate::model::{AdditionalProperties, SchemaNode};

/// Merge `sub` into `base`, both assumed `object`-typed by the caller.
/// Duplicate property names are a configuration error (§4.6: "out of scope
/// to merge property sub-schemas").
pub fn merge_object_schemas(
    base: &SchemaNode,
    sub: &SchemaNode,
    path: &str,
) -> Result<SchemaNode, GenError> {
    let mut merged = base.clone();
    merged.ty = base.ty.or(sub.ty);

    for name in &sub.required {
        merged.required.insert(name.clone());
    }

    for (name, schema) in &sub.properties {
        if merged.properties.iter().any(|(n, _)| n == name) {
            return Err(GenError::DuplicateProperty {
                path: path.to_string(),
                name: name.clone(),
            });
        }
        merged.properties.push((name.clone(), schema.clone()));
    }

    merged.additional_properties =
        merge_additional_properties(&base.additional_properties, &sub.additional_properties, path)?;

    Ok(merged)
}

/// The forbidden < schema-constrained < allowed-any lattice of §4.6.
fn merge_additional_properties(
    a: &AdditionalProperties,
    b: &AdditionalProperties,
    path: &str,
) -> Result<AdditionalProperties, GenError> {
    use AdditionalProperties::{AllowedAny, AllowedWithSchema, Forbidden};

    Ok(match (a, b) {
        (Forbidden, _) | (_, Forbidden) => Forbidden,
        (AllowedAny, AllowedAny) => AllowedAny,
        (AllowedAny, AllowedWithSchema(s)) | (AllowedWithSchema(s), AllowedAny) => {
            AllowedWithSchema(s.clone())
        }
        (AllowedWithSchema(sa), AllowedWithSchema(sb)) => {
            let merged = merge_object_schemas(sa, sb, &format!("{path}.additionalProperties"))?;
            AllowedWithSchema(Box::new(merged))
        }
    })
}
