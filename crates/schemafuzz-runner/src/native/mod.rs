//! Pure Rust API fuzzer — no Python dependency
//!
//! Parses the OpenAPI spec with serde_json, generates the one
//! engine-generated base request per draw (§4.8, §10.3) through
//! `schemafuzz_core`'s generation engine, layers phase overrides
//! (`datagen`'s boundary/type-confusion/neighborhood catalogs) on top, sends
//! with reqwest, and checks responses.

mod checks;
mod phases;
mod spec;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use schemafuzz_core::schema::{RawCase, RawFailure, RawInteraction, RawResponse, RunOutput};
use schemafuzz_core::{Config, GenOptions, Generator, Probe, RandomSource, SchemaNode};

/// Bridges any `rand::Rng` to the engine's object-safe [`RandomSource`]
/// (§9: generators are "pure functions of the random source"), so every
/// base request the runner sends is drawn through the same schema-directed
/// generator the engine crate ships, not a second ad-hoc implementation.
struct RngSource<'a, R: Rng>(&'a mut R);

impl<R: Rng> RandomSource for RngSource<'_, R> {
    fn next_u64(&mut self) -> u64 {
        self.0.r#gen::<u64>()
    }
}

/// Draw one engine-conforming value from an already `$ref`-resolved schema
/// document (§10.1), per `rng`. This is "the" draw §10.3's phase list
/// describes as the base request every phase's overrides are layered onto.
fn draw_value(
    schema: &serde_json::Value,
    options: &GenOptions,
    rng: &mut impl Rng,
) -> Result<serde_json::Value, String> {
    let node = SchemaNode::from_value(schema, "root").map_err(|e| e.to_string())?;
    let generator = Generator::new(node, options.clone());
    let mut source = RngSource(rng);
    generator.draw_value(&mut source).map_err(|e| e.to_string())
}

use checks::CheckInput;
use checks::run_checks;
use phases::{
    FuzzPhase, Overrides, StatusExpectation, collect_boundary_cases, collect_probe_cases,
    collect_type_confusion_cases, generate_neighborhood_case,
};
use spec::{Operation, ParamLocation, extract_operations};

/// Fuzz intensity level
#[derive(Debug, Clone, Copy, Default)]
pub enum FuzzLevel {
    /// 100 examples
    Quick,
    /// 1000 examples
    #[default]
    Normal,
    /// 5000 examples
    Heavy,
}

impl FuzzLevel {
    #[must_use]
    pub const fn max_examples(self) -> u32 {
        match self {
            Self::Quick => 100,
            Self::Normal => 1000,
            Self::Heavy => 5000,
        }
    }
}

/// Accumulates fuzz results across all operations and phases.
struct FuzzAccumulator {
    total: u64,
    success: u64,
    failures: Vec<RawFailure>,
    interactions: Vec<RawInteraction>,
    errors: Vec<String>,
    seen_spec_gaps: HashSet<String>,
}

impl FuzzAccumulator {
    fn new() -> Self {
        Self {
            total: 0,
            success: 0,
            failures: Vec::new(),
            interactions: Vec::new(),
            errors: Vec::new(),
            seen_spec_gaps: HashSet::new(),
        }
    }

    /// Record one execution result. Returns `true` if the request had failures.
    fn record(
        &mut self,
        result: Result<(RawInteraction, Vec<RawFailure>), String>,
        op_label: &str,
        phase_label: &str,
    ) -> bool {
        self.total += 1;
        match result {
            Ok((interaction, failures)) => {
                let failed = !failures.is_empty();
                if !failed {
                    self.success += 1;
                }
                self.failures.extend(failures);
                self.interactions.push(interaction);
                failed
            }
            Err(e) => {
                self.errors.push(format!("{op_label}: {phase_label}: {e}"));
                false
            }
        }
    }

    fn into_output(self) -> RunOutput {
        RunOutput {
            total: self.total,
            success: self.success,
            failure_count: u64::try_from(self.failures.len()).unwrap_or(u64::MAX),
            failures: self.failures,
            interactions: self.interactions,
            errors: self.errors,
        }
    }
}

/// Per-phase statistics for progress reporting.
#[derive(Default)]
struct PhaseStats {
    total: u32,
    fail: u32,
}

impl PhaseStats {
    fn record(&mut self, failed: bool) {
        self.total += 1;
        if failed {
            self.fail += 1;
        }
    }
}

/// Record one fuzz result, update phase stats and op counter,
/// and return whether `--stop-on-failure` was triggered.
fn record_and_check_stop(
    acc: &mut FuzzAccumulator,
    stats: &mut PhaseStats,
    result: Result<(RawInteraction, Vec<RawFailure>), String>,
    op_label: &str,
    phase_name: &str,
    op_count: &mut u32,
    stop_on_failure: bool,
) -> bool {
    let failed = acc.record(result, op_label, phase_name);
    stats.record(failed);
    *op_count += 1;
    stop_on_failure && failed
}

/// Pure Rust API fuzzer
pub struct NativeRunner {
    spec_path: PathBuf,
    base_url: String,
    headers: HashMap<String, String>,
    path_params: HashMap<String, String>,
    probes: Vec<Probe>,
    response_time_limit: Option<f64>,
    level: FuzzLevel,
    /// Override neighborhood+random count (takes precedence over level)
    examples: Option<u32>,
    /// Stop on first failure detection
    stop_on_failure: bool,
    /// Per-operation request limit (across all phases)
    limit: Option<u32>,
    /// The engine options every base draw is generated with (§3.2, §11.1).
    gen_options: GenOptions,
}

impl NativeRunner {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            spec_path: config.spec.clone(),
            base_url: config.base_url.clone(),
            headers: config.headers.clone(),
            path_params: config.path_params.clone(),
            probes: config.probes.clone(),
            response_time_limit: config.response_time_limit,
            level: FuzzLevel::default(),
            examples: None,
            stop_on_failure: false,
            limit: None,
            gen_options: config.to_gen_options(),
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: FuzzLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_examples(mut self, examples: Option<u32>) -> Self {
        self.examples = examples;
        self
    }

    #[must_use]
    pub fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    /// Generate a dry run plan: parse spec, count phases, validate config.
    /// No HTTP requests are sent.
    ///
    /// # Errors
    ///
    /// Returns error if spec cannot be read or parsed.
    pub fn plan(
        &self,
        config: &schemafuzz_core::Config,
    ) -> Result<schemafuzz_core::dryrun::DryRunPlan, NativeError> {
        use schemafuzz_core::dryrun::{
            DryRunPlan, MatchedProbe, OperationPlan, PhaseCounts, Validation, ValidationStatus,
        };

        let spec_content = std::fs::read_to_string(&self.spec_path)
            .map_err(|e| NativeError::Io(format!("{}: {e}", self.spec_path.display())))?;
        let spec: serde_json::Value = parse_spec(&self.spec_path, &spec_content)?;

        let components = spec
            .get("components")
            .and_then(|c| c.get("schemas"))
            .cloned()
            .unwrap_or(serde_json::json!({}));

        let operations = extract_operations(&spec);

        let max_examples = self.examples.unwrap_or_else(|| self.level.max_examples());
        let neighborhood_count = max_examples / 3;
        let random_count = max_examples - neighborhood_count;

        let mut op_plans = Vec::new();
        let mut total_requests: u64 = 0;

        for op in &operations {
            let probe_cases = collect_probe_cases(op, &self.probes);
            let boundary_cases = collect_boundary_cases(op, &components);
            let tc_cases = collect_type_confusion_cases(op, &components);

            let probe_count = u32::try_from(probe_cases.len()).unwrap_or(u32::MAX);
            let boundary_count = u32::try_from(boundary_cases.len()).unwrap_or(u32::MAX);
            let tc_count = u32::try_from(tc_cases.len()).unwrap_or(u32::MAX);
            let op_total =
                probe_count + boundary_count + tc_count + neighborhood_count + random_count;

            total_requests += u64::from(op_total);

            // Parameter names
            let parameters: Vec<String> = op.parameters.iter().map(|p| p.name.clone()).collect();

            // Body property names
            let body_properties: Vec<String> = op
                .request_body_schema
                .as_ref()
                .and_then(|s| s.get("properties"))
                .and_then(|p| p.as_object())
                .map(|props| props.keys().cloned().collect())
                .unwrap_or_default();

            // Matched probes
            let matched_probes: Vec<MatchedProbe> = self
                .probes
                .iter()
                .filter(|p| p.matches_operation(&op.method, &op.path))
                .map(|p| MatchedProbe {
                    target: p.target.clone(),
                    values: p.to_json_values(),
                })
                .collect();

            op_plans.push(OperationPlan {
                operation: format!("{} {}", op.method, op.path),
                method: op.method.clone(),
                path: op.path.clone(),
                total: op_total,
                phases: PhaseCounts {
                    probe: probe_count,
                    boundary: boundary_count,
                    type_confusion: tc_count,
                    neighborhood: neighborhood_count,
                    random: random_count,
                },
                parameters,
                body_properties,
                matched_probes,
            });
        }

        // Config validation
        let mut validations = schemafuzz_core::dryrun::validate_config(config);

        // Spec parse result
        validations.push(Validation {
            check: "spec_parse".into(),
            status: if operations.is_empty() {
                ValidationStatus::Error
            } else {
                ValidationStatus::Ok
            },
            message: format!("spec parsed: {} operations found", operations.len()),
        });

        // Probe → operation matching validation
        for probe in &self.probes {
            let matched = operations
                .iter()
                .any(|op| probe.matches_operation(&op.method, &op.path));
            if !matched {
                validations.push(Validation {
                    check: "probe_match".into(),
                    status: ValidationStatus::Warning,
                    message: format!(
                        "probe '{}' target '{}' does not match any operation in spec",
                        probe.operation, probe.target
                    ),
                });
            }
        }

        Ok(DryRunPlan {
            operations: op_plans,
            total_requests,
            validations,
        })
    }

    /// Run the fuzzer. Returns output compatible with existing verdict pipeline.
    ///
    /// # Errors
    ///
    /// Returns error if spec cannot be read/parsed or HTTP client fails to build.
    pub fn run(&self) -> Result<RunOutput, NativeError> {
        let spec_content = std::fs::read_to_string(&self.spec_path)
            .map_err(|e| NativeError::Io(format!("{}: {e}", self.spec_path.display())))?;
        let spec: serde_json::Value = parse_spec(&self.spec_path, &spec_content)?;

        let components = spec
            .get("components")
            .and_then(|c| c.get("schemas"))
            .cloned()
            .unwrap_or(serde_json::json!({}));

        let operations = extract_operations(&spec);

        if operations.is_empty() {
            return Err(NativeError::Parse(
                "No operations found in OpenAPI spec".into(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| NativeError::Http(e.to_string()))?;

        let mut rng = SmallRng::from_entropy();
        let max_examples = self.examples.unwrap_or_else(|| self.level.max_examples());
        let mut acc = FuzzAccumulator::new();

        let neighborhood_count = max_examples / 3;
        let random_count = max_examples - neighborhood_count;

        let probe_count: usize = self.probes.len();
        tracing::info!(
            operations = operations.len(),
            probes = probe_count,
            neighborhood = neighborhood_count,
            random = random_count,
            "starting fuzz run"
        );

        let mut stopped_early = false;

        'ops: for op in &operations {
            let op_label = format!("{} {}", op.method, op.path);
            let _op_span = tracing::info_span!("operation", op = %op_label).entered();
            let mut op_count: u32 = 0;

            tracing::debug!(phase = "probe", "entering phase");
            // Phase 0: Custom probes (user-defined known-bug patterns)
            let probe_cases = collect_probe_cases(op, &self.probes);
            let mut pr = PhaseStats::default();
            for case in &probe_cases {
                if self.limit.is_some_and(|l| op_count >= l) {
                    break;
                }
                let r = self.execute_one(
                    &client,
                    op,
                    &mut rng,
                    Some(&case.overrides),
                    &case.expectation,
                    &mut acc.seen_spec_gaps,
                );
                if record_and_check_stop(
                    &mut acc,
                    &mut pr,
                    r,
                    &op_label,
                    "probe",
                    &mut op_count,
                    self.stop_on_failure,
                ) {
                    stopped_early = true;
                    break 'ops;
                }
            }

            tracing::debug!(phase = "boundary", "entering phase");
            // Phase 1: Fixed boundary (deterministic)
            let boundary_cases = collect_boundary_cases(op, &components);
            let mut p1 = PhaseStats::default();
            for case in &boundary_cases {
                if self.limit.is_some_and(|l| op_count >= l) {
                    break;
                }
                let r = self.execute_one(
                    &client,
                    op,
                    &mut rng,
                    Some(&case.overrides),
                    &case.expectation,
                    &mut acc.seen_spec_gaps,
                );
                if record_and_check_stop(
                    &mut acc,
                    &mut p1,
                    r,
                    &op_label,
                    "boundary",
                    &mut op_count,
                    self.stop_on_failure,
                ) {
                    stopped_early = true;
                    break 'ops;
                }
            }

            tracing::debug!(phase = "type_confusion", "entering phase");
            // Phase 1b: Type confusion (deterministic)
            let tc_cases = collect_type_confusion_cases(op, &components);
            let mut tc = PhaseStats::default();
            for case in &tc_cases {
                if self.limit.is_some_and(|l| op_count >= l) {
                    break;
                }
                let r = self.execute_one(
                    &client,
                    op,
                    &mut rng,
                    Some(&case.overrides),
                    &case.expectation,
                    &mut acc.seen_spec_gaps,
                );
                if record_and_check_stop(
                    &mut acc,
                    &mut tc,
                    r,
                    &op_label,
                    "type-confusion",
                    &mut op_count,
                    self.stop_on_failure,
                ) {
                    stopped_early = true;
                    break 'ops;
                }
            }

            tracing::debug!(phase = "neighborhood", "entering phase");
            // Phase 2: Boundary neighborhood random
            let mut p2 = PhaseStats::default();
            for _ in 0..neighborhood_count {
                if self.limit.is_some_and(|l| op_count >= l) {
                    break;
                }
                let case = generate_neighborhood_case(op, &components, &mut rng);
                let ov = if case.overrides.params.is_empty() && case.overrides.body_props.is_empty()
                {
                    None
                } else {
                    Some(&case.overrides)
                };
                let r = self.execute_one(
                    &client,
                    op,
                    &mut rng,
                    ov,
                    &case.expectation,
                    &mut acc.seen_spec_gaps,
                );
                if record_and_check_stop(
                    &mut acc,
                    &mut p2,
                    r,
                    &op_label,
                    "neighborhood",
                    &mut op_count,
                    self.stop_on_failure,
                ) {
                    stopped_early = true;
                    break 'ops;
                }
            }

            tracing::debug!(phase = "random", "entering phase");
            // Phase 3: Full random (spec-compliant input → expect 2xx)
            let random_expectation = StatusExpectation::from_phase(op, FuzzPhase::Random);
            let mut p3 = PhaseStats::default();
            for _ in 0..random_count {
                if self.limit.is_some_and(|l| op_count >= l) {
                    break;
                }
                let r = self.execute_one(
                    &client,
                    op,
                    &mut rng,
                    None,
                    &random_expectation,
                    &mut acc.seen_spec_gaps,
                );
                if record_and_check_stop(
                    &mut acc,
                    &mut p3,
                    r,
                    &op_label,
                    "random",
                    &mut op_count,
                    self.stop_on_failure,
                ) {
                    stopped_early = true;
                    break 'ops;
                }
            }

            let total_fail = pr.fail + p1.fail + tc.fail + p2.fail + p3.fail;
            if total_fail > 0 {
                tracing::warn!(
                    probe = format!("{}/{}", pr.fail, pr.total),
                    boundary = format!("{}/{}", p1.fail, p1.total),
                    type_confusion = format!("{}/{}", tc.fail, tc.total),
                    neighborhood = format!("{}/{}", p2.fail, p2.total),
                    random = format!("{}/{}", p3.fail, p3.total),
                    "operation had {total_fail} failures"
                );
            } else {
                tracing::info!(
                    probe = pr.total,
                    boundary = p1.total,
                    type_confusion = tc.total,
                    neighborhood = p2.total,
                    random = p3.total,
                    "operation OK"
                );
            }
        }

        if stopped_early {
            tracing::warn!("stopped early: failure detected (--stop-on-failure)");
        }

        Ok(acc.into_output())
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_one(
        &self,
        client: &reqwest::blocking::Client,
        op: &Operation,
        rng: &mut impl Rng,
        overrides: Option<&Overrides>,
        expectation: &StatusExpectation,
        seen_spec_gaps: &mut HashSet<String>,
    ) -> Result<(RawInteraction, Vec<RawFailure>), String> {
        // Build URL with path parameters
        let mut url_path = op.path.clone();
        let mut path_params_resolved: HashMap<String, serde_json::Value> = HashMap::new();
        for param in &op.parameters {
            if param.location == ParamLocation::Path {
                let value = if let Some(ov) = overrides.and_then(|o| o.params.get(&param.name)) {
                    value_to_param_string(ov)
                } else {
                    match self.path_params.get(&param.name).cloned() {
                        Some(v) => v,
                        None => draw_value(&param.schema, &self.gen_options, rng)?
                            .to_string()
                            .trim_matches('"')
                            .to_string(),
                    }
                };
                url_path = url_path.replace(&format!("{{{}}}", param.name), &value);
                path_params_resolved.insert(param.name.clone(), serde_json::Value::String(value));
            }
        }
        let url = format!("{}{url_path}", self.base_url);

        // Query parameters
        let mut query_params: Vec<(String, String)> = Vec::new();
        for p in &op.parameters {
            if p.location == ParamLocation::Query {
                if let Some(ov) = overrides.and_then(|o| o.params.get(&p.name)) {
                    // Boundary: always include overridden params
                    query_params.push((p.name.clone(), value_to_param_string(ov)));
                } else if p.required || rng.gen_bool(0.3) {
                    let v = draw_value(&p.schema, &self.gen_options, rng)?;
                    query_params.push((p.name.clone(), value_to_param_string(&v)));
                }
            }
        }

        // Headers (configured + spec-defined)
        let mut req_headers = self.headers.clone();
        for param in &op.parameters {
            if param.location == ParamLocation::Header {
                if let Some(ov) = overrides.and_then(|o| o.params.get(&param.name)) {
                    req_headers.insert(param.name.clone(), value_to_param_string(ov));
                } else {
                    let v = draw_value(&param.schema, &self.gen_options, rng)?;
                    req_headers.insert(param.name.clone(), value_to_param_string(&v));
                }
            }
        }

        // Request body: the one engine-generated base draw (§10.3) every
        // phase's overrides are layered onto.
        let body = match op.request_body_schema.as_ref() {
            Some(schema) => {
                let mut generated = draw_value(schema, &self.gen_options, rng)?;
                if let Some(ov) = overrides {
                    if let serde_json::Value::Object(ref mut obj) = generated {
                        for (k, v) in &ov.body_props {
                            obj.insert(k.clone(), v.clone());
                        }
                    }
                }
                Some(generated)
            }
            None => None,
        };

        // Build request
        let method = reqwest::Method::from_bytes(op.method.as_bytes())
            .map_err(|_| format!("invalid HTTP method '{}' for {}", op.method, op.path))?;

        let mut req = client.request(method, &url);
        for (k, v) in &req_headers {
            // Skip header values that are invalid in HTTP (e.g. \0, \r\n from
            // boundary testing).  These never reach the server so testing them
            // via headers has no value.
            if reqwest::header::HeaderValue::from_str(v).is_ok() {
                req = req.header(k, v);
            }
        }
        for (k, v) in &query_params {
            req = req.query(&[(k, v)]);
        }
        if let Some(ref body_value) = body {
            req = req.header("Content-Type", "application/json");
            req = req.json(body_value);
        }

        // Send
        let start = Instant::now();
        let resp = req.send().map_err(|e| e.to_string())?;
        let elapsed = start.elapsed().as_secs_f64();

        let status_code = resp.status().as_u16();
        let status_text = resp.status().canonical_reason().unwrap_or("").to_string();

        // Capture response headers before consuming response body
        let resp_content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let resp_headers = resp.headers().clone();

        // Capture response body (truncated for memory safety)
        let body_text = resp.text().unwrap_or_default();
        let content_length = body_text.len() as u64;
        const MAX_BODY_BYTES: usize = 4096;
        let body_stored = if body_text.is_empty() {
            None
        } else if body_text.len() <= MAX_BODY_BYTES {
            Some(body_text.clone())
        } else {
            // Safe UTF-8 truncation: walk back to char boundary
            let mut end = MAX_BODY_BYTES;
            while end > 0 && !body_text.is_char_boundary(end) {
                end -= 1;
            }
            Some(format!(
                "{}…({} bytes total)",
                &body_text[..end],
                body_text.len()
            ))
        };

        let case_id = format!("{:016x}", rng.r#gen::<u64>());
        let operation_label = format!("{} {}", op.method, op.path);

        let raw_case = RawCase {
            method: op.method.clone(),
            path: op.path.clone(),
            id: Some(case_id.clone()),
            path_parameters: if path_params_resolved.is_empty() {
                None
            } else {
                Some(path_params_resolved)
            },
            headers: if req_headers.is_empty() {
                None
            } else {
                Some(req_headers.clone())
            },
            query: if query_params.is_empty() {
                None
            } else {
                Some(
                    query_params
                        .iter()
                        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                        .collect(),
                )
            },
            body: body.clone(),
            media_type: body.as_ref().map(|_| "application/json".to_string()),
        };

        let raw_response = RawResponse {
            status_code,
            elapsed,
            message: status_text,
            content_length,
            body: body_stored,
        };

        // Run response validation checks (pure logic, no I/O)
        let mut check_input = CheckInput {
            status_code,
            body_text: &body_text,
            content_type: resp_content_type.as_deref(),
            response_headers: &resp_headers,
            elapsed,
            url: &url,
            operation_label: &operation_label,
            case_id: &case_id,
            expectation,
            op,
            response_time_limit: self.response_time_limit,
            seen_spec_gaps,
        };
        let failures = run_checks(&mut check_input);

        let interaction = RawInteraction {
            case: raw_case,
            response: raw_response,
            operation: operation_label,
            failures: failures.clone(),
        };

        Ok((interaction, failures))
    }
}

/// Parse an OpenAPI spec from JSON or YAML.
///
/// Detection strategy: try extension first (`.yaml`/`.yml`), then fall back to
/// content sniffing (leading `{` → JSON, otherwise YAML).
fn parse_spec(path: &std::path::Path, content: &str) -> Result<serde_json::Value, NativeError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "yaml" | "yml" => serde_yml::from_str(content)
            .map_err(|e| NativeError::Parse(format!("Invalid YAML: {e}"))),
        "json" => serde_json::from_str(content)
            .map_err(|e| NativeError::Parse(format!("Invalid JSON: {e}"))),
        _ => {
            // Content sniffing: trimmed first char
            if content.trim_start().starts_with('{') {
                serde_json::from_str(content)
                    .map_err(|e| NativeError::Parse(format!("Invalid JSON: {e}")))
            } else {
                serde_yml::from_str(content)
                    .map_err(|e| NativeError::Parse(format!("Invalid YAML: {e}")))
            }
        }
    }
}

fn value_to_param_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NativeError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("HTTP error: {0}")]
    Http(String),
}
