//! Conversion: raw runner output (§schema.rs) → classified verdict types.
//!
//! All classification logic lives here: the runner only dumps raw
//! `RawFailure`/`RawInteraction` records; this module decides severity,
//! failure type, and verdict.

use std::collections::HashMap;

use crate::schema::{RawFailure, RawInteraction, RunOutput};
use crate::verdict::{Failure, FailureType, RequestSnapshot, ResponseSnapshot, Severity};

/// Convert raw runner output into classified failures.
///
/// Joins `RawFailure` with `RawInteraction` data (by case_id)
/// to produce fully classified `Failure` values with request/response snapshots.
#[must_use]
pub fn classify_failures(output: &RunOutput) -> Vec<Failure> {
    // Build lookup: case_id → interaction (for request/response data)
    let interaction_map: HashMap<&str, &RawInteraction> = output
        .interactions
        .iter()
        .filter_map(|i| i.case.id.as_deref().map(|id| (id, i)))
        .collect();

    output
        .failures
        .iter()
        .enumerate()
        .map(|(idx, raw)| convert_one(raw, idx, &interaction_map))
        .collect()
}

/// Convert a single `RawFailure` → `Failure`.
fn convert_one(
    raw: &RawFailure,
    idx: usize,
    interactions: &HashMap<&str, &RawInteraction>,
) -> Failure {
    let failure_type = classify_type(&raw.failure_type, raw.status_code);
    let severity = map_severity(&raw.severity, failure_type);

    // Parse operation "POST /api/users" → (method, path)
    let (method, path) = parse_operation(&raw.operation);

    let id = raw.case_id.clone().unwrap_or_else(|| format!("f{idx}"));

    // Look up interaction by case_id for request/response snapshots
    let interaction = raw
        .case_id
        .as_deref()
        .and_then(|cid| interactions.get(cid))
        .copied();

    let request = interaction
        .map(request_from_interaction)
        .unwrap_or_else(|| default_request(&method, &path));

    let response = interaction.map(response_from_interaction);

    let mut failure = Failure {
        id,
        method,
        path,
        status_code: raw
            .status_code
            .or_else(|| interaction.map(|i| i.response.status_code))
            .unwrap_or(0),
        expected_status: None,
        failure_type,
        severity,
        request,
        response,
        context: HashMap::new(),
    };

    add_context(&mut failure, raw);
    failure
}

/// Map the raw failure-type discriminant string to our `FailureType`.
fn classify_type(type_name: &str, status_code: Option<u16>) -> FailureType {
    match type_name {
        "ServerError" => FailureType::ServerError,
        "ResponseTimeExceeded" => FailureType::Timeout,
        "MalformedJson" | "SchemaViolation" => FailureType::SchemaViolation,
        "StatusCodeConformance" => FailureType::StatusCodeConformance,
        "NegativeTestAccepted" => FailureType::NegativeTestAccepted,
        "ContentTypeMismatch" => FailureType::ContentTypeMismatch,
        // Unknown types: fall back to status-code classification
        _ => status_code.map_or(FailureType::UnexpectedError, |sc| match sc {
            408 | 504 => FailureType::Timeout,
            500..=599 => FailureType::ServerError,
            401 | 403 => FailureType::AuthError,
            429 => FailureType::RateLimit,
            _ => FailureType::UnexpectedError,
        }),
    }
}

/// Map the raw severity string to our `Severity`.
///
/// critical / high / medium / low
/// Ours:         Critical / Error / Warning / Info
fn map_severity(raw_severity: &str, failure_type: FailureType) -> Severity {
    match raw_severity {
        "critical" => Severity::Critical,
        "high" => Severity::Error,
        "medium" => Severity::Warning,
        "low" => Severity::Info,
        // Unknown: use type-based default
        _ => failure_type.default_severity(),
    }
}

/// Parse "POST /api/users" → ("POST", "/api/users")
fn parse_operation(operation: &str) -> (String, String) {
    operation
        .split_once(' ')
        .map(|(m, p)| (m.to_string(), p.to_string()))
        .unwrap_or_else(|| ("UNKNOWN".to_string(), operation.to_string()))
}

fn default_request(method: &str, path: &str) -> RequestSnapshot {
    RequestSnapshot {
        method: method.to_string(),
        url: path.to_string(),
        headers: HashMap::new(),
        body: None,
    }
}

fn request_from_interaction(interaction: &RawInteraction) -> RequestSnapshot {
    let case = &interaction.case;

    let headers = case.headers.clone().unwrap_or_default();

    let body = case.body.as_ref().map(|b| {
        if b.is_string() {
            b.as_str().unwrap_or_default().to_string()
        } else {
            serde_json::to_string(b).unwrap_or_default()
        }
    });

    // Build URL from path + path_parameters
    let mut url = case.path.clone();
    if let Some(ref params) = case.path_parameters {
        for (key, val) in params {
            let val_str = match val {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            url = url.replace(&format!("{{{key}}}"), &val_str);
        }
    }

    RequestSnapshot {
        method: case.method.clone(),
        url,
        headers,
        body,
    }
}

fn response_from_interaction(interaction: &RawInteraction) -> ResponseSnapshot {
    let resp = &interaction.response;
    ResponseSnapshot {
        status_code: resp.status_code,
        headers: HashMap::new(),
        body: resp.body.clone(),
        latency_ms: (resp.elapsed * 1000.0).max(0.0) as u64,
    }
}

/// Add raw-check context to the failure.
fn add_context(failure: &mut Failure, raw: &RawFailure) {
    failure
        .context
        .insert("raw_failure_type".to_string(), raw.failure_type.clone());
    failure
        .context
        .insert("title".to_string(), raw.title.clone());

    if !raw.message.is_empty() {
        failure
            .context
            .insert("message".to_string(), raw.message.clone());
    }

    // ResponseTimeExceeded specific
    if let Some(elapsed) = raw.elapsed {
        failure
            .context
            .insert("elapsed_s".to_string(), format!("{elapsed:.3}"));
    }
    if let Some(deadline) = raw.deadline {
        failure
            .context
            .insert("deadline_s".to_string(), format!("{deadline:.3}"));
    }

    // MalformedJson specific
    if let Some(ref msg) = raw.validation_message {
        failure
            .context
            .insert("validation_message".to_string(), msg.clone());
    }
}
