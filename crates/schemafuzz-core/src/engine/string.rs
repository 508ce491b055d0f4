//! String generator (§4.2 "String"): enum → named format → pattern →
//! implementation-chosen default.

use base64::Engine as _;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::error::GenError;
use crate::model::{SchemaNode, StringFormat};
use crate::options::{GenOptions, PatternRequest};
use crate::random::RandomSource;

/// Ceiling used when `max_length` is absent (§4.2 step 4: "max defaulting to
/// an implementation-chosen ceiling").
const DEFAULT_MAX_LENGTH: u64 = 20;
/// Unicode alphabet used for the unconstrained default string — printable
/// ASCII plus a handful of non-ASCII code points, so draws occasionally
/// exercise multi-byte encoding without becoming unreadable in reports.
const ALPHABET: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', '0', '1', '2', '3',
    '4', '5', '6', '7', '8', '9', '_', '-', 'é', 'ü', '日',
];

pub fn gen_string(
    node: &SchemaNode,
    path: &str,
    options: &GenOptions,
    random: &mut dyn RandomSource,
) -> Result<Value, GenError> {
    if let Some(values) = &node.enum_values {
        if !values.is_empty() {
            let idx = random.choose_index(values.len());
            return Ok(values[idx].clone());
        }
    }

    if let Some(format) = node.string_format {
        if let Some(s) = canonical_format(format, random) {
            return Ok(Value::String(s));
        }
        // Regex-shaped formats fall through to pattern_func below.
        return gen_via_pattern_func(node, "", Some(format), path, options, random);
    }

    if let Some(pattern) = &node.pattern {
        return gen_via_pattern_func(node, pattern, None, path, options, random);
    }

    let min_len = node.min_length.unwrap_or(0);
    let max_len = node.max_length.unwrap_or(min_len.max(DEFAULT_MAX_LENGTH));
    let len = random.gen_range_u64(min_len, max_len);
    let s: String = (0..len)
        .map(|_| ALPHABET[random.choose_index(ALPHABET.len())])
        .collect();
    Ok(Value::String(s))
}

fn gen_via_pattern_func(
    node: &SchemaNode,
    pattern: &str,
    format: Option<StringFormat>,
    path: &str,
    options: &GenOptions,
    random: &mut dyn RandomSource,
) -> Result<Value, GenError> {
    let Some(func) = options.pattern_func() else {
        return Err(GenError::PatternFuncMissing {
            path: path.to_string(),
        });
    };
    let min_len = node.min_length.unwrap_or(0);
    let max_len = node.max_length.unwrap_or(min_len.max(DEFAULT_MAX_LENGTH * 4));
    let req = PatternRequest {
        pattern,
        format,
        min_len,
        max_len,
    };
    let s = func(&req, random).map_err(|e| e.with_path_prefix(path))?;
    Ok(Value::String(s))
}

/// Formats generated directly rather than delegated to `pattern_func`
/// (§4.2 step 2): `uuid`, `date-time`, `date`, `byte`, `binary`.
fn canonical_format(format: StringFormat, random: &mut dyn RandomSource) -> Option<String> {
    match format {
        StringFormat::Uuid => {
            let bytes: [u8; 16] = random.gen_bytes(16).try_into().unwrap_or([0; 16]);
            Some(Uuid::from_bytes(make_v4(bytes)).to_string())
        }
        StringFormat::DateTime => Some(Utc::now().to_rfc3339()),
        StringFormat::Date => Some(Utc::now().format("%Y-%m-%d").to_string()),
        StringFormat::Byte | StringFormat::Binary => {
            let len = random.gen_range_u64(0, 32) as usize;
            let bytes = random.gen_bytes(len);
            Some(base64::engine::general_purpose::STANDARD.encode(bytes))
        }
        StringFormat::Email
        | StringFormat::Hostname
        | StringFormat::Ipv4
        | StringFormat::Ipv6
        | StringFormat::Uri
        | StringFormat::UriReference => None,
    }
}

/// Force RFC 4122 version/variant bits onto a random 16-byte buffer so the
/// result is a well-formed UUIDv4 regardless of the raw random bytes drawn.
fn make_v4(mut bytes: [u8; 16]) -> [u8; 16] {
    bytes[6] = (bytes[6] & 0x0F) | 0x40;
    bytes[8] = (bytes[8] & 0x3F) | 0x80;
    bytes
}
