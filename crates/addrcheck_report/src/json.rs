use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::{Local, SecondsFormat};
use serde::Serialize;

use addrcheck_core::{CheckResult, ValidationOutcome};
use addrcheck_model::FieldMapping;

/// Serializable record of one validation run.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub country_code: String,
    pub policy_name: String,
    pub validator_version: String,
    pub validated_at: String,
    pub validation_time_seconds: f64,
    pub row_count: usize,
    pub flagged_rows: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub field_mapping: FieldMapping,
    pub summary: Vec<CheckResult>,
}

impl ValidationReport {
    pub fn new(
        country_code: impl Into<String>,
        policy_name: impl Into<String>,
        row_count: usize,
        outcome: &ValidationOutcome,
        mapping: &FieldMapping,
    ) -> Self {
        Self {
            country_code: country_code.into(),
            policy_name: policy_name.into(),
            validator_version: env!("CARGO_PKG_VERSION").to_string(),
            validated_at: Local::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            validation_time_seconds: 0.0,
            row_count,
            flagged_rows: outcome.flagged_rows,
            error_count: outcome.error_count,
            warning_count: outcome.warning_count,
            info_count: outcome.info_count,
            field_mapping: mapping.clone(),
            summary: outcome.summary.clone(),
        }
    }

    pub fn with_validation_time_seconds(mut self, seconds: f64) -> Self {
        self.validation_time_seconds = seconds;
        self
    }
}

pub fn write_json_report<P: AsRef<Path>>(
    path: P,
    report: &ValidationReport,
    pretty: bool,
) -> anyhow::Result<()> {
    let serialized = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    fs::write(&path, serialized)
        .with_context(|| format!("write json report to {}", path.as_ref().display()))?;
    Ok(())
}
