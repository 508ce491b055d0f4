//! The schema node data model (§3.1) and the loader that lifts a raw
//! `serde_json::Value` document into the tagged-variant form §9 calls for:
//! an explicit `Type`, an explicit three-state `AdditionalProperties`, and
//! explicit compositor lists, instead of threading loose JSON around the
//! engine.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::error::GenError;

/// One of the seven recognized type tags (§3.1). `Null` only ever appears as
/// a member of a multi-value `type` array in the raw document; once loaded,
/// a node's `ty` is `None` when the only tag present was `null` (handled via
/// `nullable` instead, per §4.1's nullable wrapper).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl Type {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            "null" => None,
            _ => None,
        }
    }
}

/// Numeric `format` hint (§3.1). Only `Int32`/`Int64` further restrict the
/// generated range; `Float`/`Double` are accepted but do not (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    Int32,
    Int64,
    Float,
    Double,
}

/// String `format` hint (§3.1, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Uuid,
    DateTime,
    Date,
    Email,
    Hostname,
    Ipv4,
    Ipv6,
    Uri,
    UriReference,
    Byte,
    Binary,
}

impl StringFormat {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "uuid" => Some(Self::Uuid),
            "date-time" => Some(Self::DateTime),
            "date" => Some(Self::Date),
            "email" => Some(Self::Email),
            "hostname" => Some(Self::Hostname),
            "ipv4" => Some(Self::Ipv4),
            "ipv6" => Some(Self::Ipv6),
            "uri" => Some(Self::Uri),
            "uri-reference" => Some(Self::UriReference),
            "byte" => Some(Self::Byte),
            "binary" => Some(Self::Binary),
            _ => None,
        }
    }

    /// The pattern handed to `pattern_func` for formats whose canonical
    /// shape is a regex (§4.2 step 2, formats delegated rather than
    /// synthesized directly).
    #[must_use]
    pub const fn suggested_pattern(self) -> Option<&'static str> {
        match self {
            Self::Email => Some(r"[a-zA-Z0-9._%+-]{1,20}@[a-zA-Z0-9.-]{1,20}\.[a-zA-Z]{2,6}"),
            Self::Hostname => Some(r"[a-z0-9]{1,15}(\.[a-z0-9]{1,15}){0,3}\.[a-z]{2,6}"),
            Self::Ipv4 => Some(r"([0-9]{1,3}\.){3}[0-9]{1,3}"),
            Self::Ipv6 => Some(r"([0-9a-f]{1,4}:){7}[0-9a-f]{1,4}"),
            Self::Uri => Some(r"https?://[a-z0-9.-]{3,20}(/[a-zA-Z0-9_-]{1,10}){0,4}"),
            Self::UriReference => Some(r"(/[a-zA-Z0-9_-]{1,10}){1,4}"),
            Self::Uuid | Self::DateTime | Self::Date | Self::Byte | Self::Binary => None,
        }
    }
}

/// The three-state `additionalProperties` value (§3.1, merged per §4.6).
#[derive(Debug, Clone)]
pub enum AdditionalProperties {
    Forbidden,
    AllowedAny,
    AllowedWithSchema(Box<SchemaNode>),
}

/// One syntactic subtree of the schema document (§3.1).
#[derive(Debug, Clone, Default)]
pub struct SchemaNode {
    pub ty: Option<Type>,
    pub nullable: bool,
    pub enum_values: Option<Vec<Value>>,

    // Numeric
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    pub multiple_of: Option<f64>,
    pub number_format: Option<NumberFormat>,

    // String
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub string_format: Option<StringFormat>,

    // Array
    pub items: Option<Box<SchemaNode>>,
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,
    pub unique_items: bool,

    // Object
    pub properties: Vec<(String, SchemaNode)>,
    pub required: BTreeSet<String>,
    pub additional_properties: AdditionalProperties,

    // Compositors
    pub all_of: Vec<SchemaNode>,
    pub any_of: Vec<SchemaNode>,
    pub one_of: Vec<SchemaNode>,
}

impl Default for AdditionalProperties {
    fn default() -> Self {
        Self::AllowedAny
    }
}

impl SchemaNode {
    /// `true` if the node carries no type, no enum, and no compositor — the
    /// dispatcher's condition for falling through to the *any* generator
    /// (§4.1 rule 1).
    #[must_use]
    pub fn is_untyped(&self) -> bool {
        self.ty.is_none()
            && self.enum_values.is_none()
            && self.all_of.is_empty()
            && self.any_of.is_empty()
            && self.one_of.is_empty()
    }

    /// Lift a raw JSON Schema / OpenAPI Schema document into the typed form,
    /// per the design note in §9. `path` is a dotted label used only for
    /// error messages.
    pub fn from_value(value: &Value, path: &str) -> Result<Self, GenError> {
        let Some(obj) = value.as_object() else {
            // `true`/`false`/absent schemas and non-object JSON are treated
            // as the maximally permissive "any" node.
            return Ok(Self::default());
        };

        let mut node = Self::default();

        // type: string | array of strings. More than one non-null tag is a
        // configuration error (§3.1, §4.1).
        let mut tags: Vec<String> = Vec::new();
        match obj.get("type") {
            Some(Value::String(s)) => tags.push(s.clone()),
            Some(Value::Array(arr)) => {
                for v in arr {
                    if let Some(s) = v.as_str() {
                        tags.push(s.to_string());
                    }
                }
            }
            _ => {}
        }
        let mut non_null: Vec<Type> = Vec::new();
        for tag in &tags {
            if tag == "null" {
                node.nullable = true;
            } else if let Some(t) = Type::from_str(tag) {
                non_null.push(t);
            }
        }
        if non_null.len() > 1 {
            return Err(GenError::MultipleTypeTags {
                path: path.to_string(),
                types: tags,
            });
        }
        node.ty = non_null.into_iter().next();

        if obj.get("nullable").and_then(Value::as_bool) == Some(true) {
            node.nullable = true;
        }

        if let Some(Value::Array(vs)) = obj.get("enum") {
            node.enum_values = Some(vs.clone());
        }

        node.minimum = obj.get("minimum").and_then(Value::as_f64);
        node.maximum = obj.get("maximum").and_then(Value::as_f64);
        node.exclusive_minimum = obj.get("exclusiveMinimum").and_then(Value::as_bool) == Some(true);
        node.exclusive_maximum = obj.get("exclusiveMaximum").and_then(Value::as_bool) == Some(true);
        node.multiple_of = obj.get("multipleOf").and_then(Value::as_f64);

        node.min_length = obj.get("minLength").and_then(Value::as_u64);
        node.max_length = obj.get("maxLength").and_then(Value::as_u64);
        node.pattern = obj
            .get("pattern")
            .and_then(Value::as_str)
            .map(str::to_string);

        if let Some(fmt) = obj.get("format").and_then(Value::as_str) {
            match fmt {
                "int32" => node.number_format = Some(NumberFormat::Int32),
                "int64" => node.number_format = Some(NumberFormat::Int64),
                "float" => node.number_format = Some(NumberFormat::Float),
                "double" => node.number_format = Some(NumberFormat::Double),
                other => node.string_format = StringFormat::from_str(other),
            }
        }

        node.min_items = obj.get("minItems").and_then(Value::as_u64);
        node.max_items = obj.get("maxItems").and_then(Value::as_u64);
        node.unique_items = obj.get("uniqueItems").and_then(Value::as_bool) == Some(true);
        if let Some(items) = obj.get("items") {
            node.items = Some(Box::new(Self::from_value(
                items,
                &format!("{path}.items"),
            )?));
        }

        if let Some(props) = obj.get("properties").and_then(Value::as_object) {
            for (name, sub) in props {
                let sub_path = format!("{path}.properties.{name}");
                node.properties
                    .push((name.clone(), Self::from_value(sub, &sub_path)?));
            }
        }
        if let Some(req) = obj.get("required").and_then(Value::as_array) {
            node.required = req
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
        }
        node.additional_properties = match obj.get("additionalProperties") {
            None => AdditionalProperties::AllowedAny,
            Some(Value::Bool(true)) | Some(Value::Object(_)) if obj.get("additionalProperties").map(Value::is_object) == Some(true) => {
                let schema = obj.get("additionalProperties").unwrap();
                AdditionalProperties::AllowedWithSchema(Box::new(Self::from_value(
                    schema,
                    &format!("{path}.additionalProperties"),
                )?))
            }
            Some(Value::Bool(true)) => AdditionalProperties::AllowedAny,
            Some(Value::Bool(false)) => AdditionalProperties::Forbidden,
            Some(_) => AdditionalProperties::AllowedAny,
        };

        for (key, field) in [
            ("allOf", &mut node.all_of),
            ("anyOf", &mut node.any_of),
            ("oneOf", &mut node.one_of),
        ] {
            if let Some(Value::Array(items)) = obj.get(key) {
                for (i, item) in items.iter().enumerate() {
                    field.push(Self::from_value(item, &format!("{path}.{key}[{i}]"))?);
                }
            }
        }

        Ok(node)
    }
}
