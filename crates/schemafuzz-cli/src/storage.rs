//! Persistent report storage — `~/.schemafuzz/reports/`
//!
//! Every `schemafuzz fuzz` run is automatically saved regardless of `--output` mode.
//! Directory layout: `{host_port}_{timestamp}_{level}/`

use std::path::PathBuf;

use chrono::Utc;

use schemafuzz_core::schema::RunOutput;
use schemafuzz_core::{Config, Failure, VerdictStatus};

/// Everything needed to persist a fuzz session.
pub struct ReportData<'a> {
    pub config: &'a Config,
    pub output: &'a RunOutput,
    pub failures: &'a [Failure],
    pub verdict_status: VerdictStatus,
    pub verdict_exit_code: i32,
    pub verdict_reason: &'a str,
    pub level: &'a str,
    pub duration_secs: f64,
}

/// Save a fuzz report to `~/.schemafuzz/reports/{host_port}_{timestamp}_{level}/`.
///
/// Returns the report directory path on success.
pub fn save_report(data: &ReportData) -> Result<PathBuf, std::io::Error> {
    let base = report_base_dir()?;
    let dir_name = build_dir_name(&data.config.base_url, data.level);
    let report_dir = base.join(&dir_name);
    std::fs::create_dir_all(&report_dir)?;

    // config.toml — snapshot of the config used
    let config_toml =
        toml::to_string_pretty(data.config).map_err(|e| std::io::Error::other(e.to_string()))?;
    std::fs::write(report_dir.join("config.toml"), config_toml)?;

    // summary.json — verdict + stats + metadata
    let summary = serde_json::json!({
        "verdict": {
            "status": format!("{}", data.verdict_status),
            "exit_code": data.verdict_exit_code,
            "reason": data.verdict_reason,
        },
        "stats": {
            "total": data.output.total,
            "success": data.output.success,
            "failure": data.output.total.saturating_sub(data.output.success).saturating_sub(data.output.errors.len() as u64),
            "error": data.output.errors.len(),
        },
        "meta": {
            "timestamp": timestamp_iso(),
            "level": data.level,
            "duration_secs": data.duration_secs,
            "base_url": data.config.base_url,
            "spec": data.config.spec.display().to_string(),
        },
    });
    std::fs::write(
        report_dir.join("summary.json"),
        serde_json::to_string_pretty(&summary).unwrap_or_default(),
    )?;

    // failures.json — classified failures (only if present)
    if !data.failures.is_empty() {
        std::fs::write(
            report_dir.join("failures.json"),
            serde_json::to_string_pretty(data.failures).unwrap_or_default(),
        )?;
    }

    // reproductions.http — for quick replay in IDE/curl
    if !data.failures.is_empty() {
        let http_content = schemafuzz_core::to_http_file(data.failures, "base_url");
        std::fs::write(report_dir.join("reproductions.http"), http_content)?;
    }

    Ok(report_dir)
}

fn report_base_dir() -> Result<PathBuf, std::io::Error> {
    let home = std::env::var("HOME")
        .map_err(|_| std::io::Error::new(std::io::ErrorKind::NotFound, "HOME not set"))?;
    Ok(PathBuf::from(home).join(".schemafuzz").join("reports"))
}

/// `{host_port}_{timestamp}_{level}` e.g. `localhost_8080_20260205T193000_quick`
fn build_dir_name(base_url: &str, level: &str) -> String {
    let host_port = extract_host_port(base_url);
    let ts = timestamp_compact();
    format!("{host_port}_{ts}_{level}")
}

/// `"http://localhost:8080/path"` → `"localhost_8080"`
fn extract_host_port(url: &str) -> String {
    url.split("://")
        .nth(1)
        .unwrap_or(url)
        .split('/')
        .next()
        .unwrap_or("unknown")
        .replace(':', "_")
}

/// `"20260205T193000"` — filesystem-safe compact timestamp.
fn timestamp_compact() -> String {
    Utc::now().format("%Y%m%dT%H%M%S").to_string()
}

/// `"2026-02-05T19:30:00Z"` — ISO 8601 for JSON.
fn timestamp_iso() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
