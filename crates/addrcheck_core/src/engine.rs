use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use addrcheck_model::{CountryPolicy, Dataset, FieldMapping, PolicyError};
use tracing::{debug, info};

use crate::checks::{default_battery, CheckContext};
use crate::oracle::AdvisoryOracle;
use crate::remark;
use crate::result::{CheckResult, ResultContainer, Severity};

/// Shared cancellation flag for a validation run. Cancelling stops dispatch
/// of new row work; results committed before the flag was set are kept.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

pub struct ValidationOutcome {
    /// Dataset-scoped summary entries in check-execution order.
    pub summary: Vec<CheckResult>,
    /// Rows whose `Remark` ended up non-empty.
    pub flagged_rows: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
}

/// Runs the full check battery and annotates the dataset in place with the
/// `Remark` column. The mapping must have been produced by reconciling the
/// same policy against this dataset.
pub fn validate_dataset(
    dataset: &mut Dataset,
    policy: &CountryPolicy,
    mapping: &FieldMapping,
    oracle: Option<&dyn AdvisoryOracle>,
    cancel: &CancelToken,
) -> Result<ValidationOutcome, PolicyError> {
    policy.validate()?;

    let mut results = ResultContainer::new();
    {
        let ctx = CheckContext {
            dataset,
            policy,
            mapping,
            oracle,
            cancel,
        };
        for check in default_battery() {
            if cancel.is_cancelled() {
                info!(check = check.name(), "run cancelled, skipping remaining checks");
                break;
            }
            debug!(check = check.name(), "running check");
            check.run(&ctx, &mut results);
        }
    }

    let fragments = results.row_fragments(dataset.rows.len());
    let remarks: Vec<String> = fragments
        .iter()
        .map(|row_fragments| remark::aggregate(row_fragments))
        .collect();
    let flagged_rows = remarks.iter().filter(|remark| !remark.is_empty()).count();
    dataset.apply_remarks(remarks);

    let outcome = ValidationOutcome {
        summary: results.summary(),
        flagged_rows,
        error_count: results.count_by_severity(Severity::Error),
        warning_count: results.count_by_severity(Severity::Warning),
        info_count: results.count_by_severity(Severity::Info),
    };
    info!(
        rows = dataset.rows.len(),
        flagged = outcome.flagged_rows,
        errors = outcome.error_count,
        warnings = outcome.warning_count,
        "validation run complete"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use addrcheck_model::{AccuracyExpectation, AddressRow, REMARK_COLUMN};
    use serde_json::{json, Value};

    use super::*;

    fn policy() -> CountryPolicy {
        CountryPolicy {
            country_name: "Test".to_string(),
            expected_attributes: vec!["street_name".to_string(), "postal_code".to_string()],
            mandatory_fields: vec!["street_name".to_string(), "postal_code".to_string()],
            postal_code_length: 6,
            language_support: vec!["en".to_string()],
            accuracy_expectation: AccuracyExpectation::Parcel,
            notes: String::new(),
        }
    }

    fn row(street: Value, postal: Value) -> AddressRow {
        let mut row = AddressRow::default();
        row.properties.insert("street_name".to_string(), street);
        row.properties.insert("postal_code".to_string(), postal);
        row.geometry = Some(geo::point!(x: 77.2, y: 28.6).into());
        row
    }

    fn dataset() -> Dataset {
        Dataset {
            columns: vec!["street_name".to_string(), "postal_code".to_string()],
            rows: vec![
                row(json!("MG Road"), json!("110001")),
                row(json!(null), json!("110002")),
                row(json!("Ring Road"), json!("1100")),
            ],
            crs: Some("EPSG:4326".to_string()),
        }
    }

    fn full_mapping() -> FieldMapping {
        let mut mapping = FieldMapping::new();
        mapping.insert("street_name", "street_name");
        mapping.insert("postal_code", "postal_code");
        mapping
    }

    #[test]
    fn invalid_policy_is_a_configuration_error() {
        let mut bad = policy();
        bad.mandatory_fields.push("house_number".to_string());
        let mut data = dataset();
        let result = validate_dataset(
            &mut data,
            &bad,
            &full_mapping(),
            None,
            &CancelToken::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn clean_rows_get_an_empty_remark() {
        let mut data = dataset();
        let outcome = validate_dataset(
            &mut data,
            &policy(),
            &full_mapping(),
            None,
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(
            data.rows[0].value(REMARK_COLUMN),
            Some(&Value::String(String::new()))
        );
        assert_eq!(
            data.rows[1].value(REMARK_COLUMN),
            Some(&Value::String("street_name is missing".to_string()))
        );
        assert_eq!(
            data.rows[2].value(REMARK_COLUMN),
            Some(&Value::String("postal_code wrong length".to_string()))
        );
        assert_eq!(outcome.flagged_rows, 2);
    }

    #[test]
    fn cancelled_run_still_applies_committed_remarks() {
        let mut data = dataset();
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome =
            validate_dataset(&mut data, &policy(), &full_mapping(), None, &cancel).unwrap();

        // No checks dispatched, but the Remark column exists and is empty.
        assert_eq!(outcome.summary.len(), 0);
        assert!(data.columns.iter().any(|c| c == REMARK_COLUMN));
        assert_eq!(
            data.rows[0].value(REMARK_COLUMN),
            Some(&Value::String(String::new()))
        );
    }

    #[test]
    fn summary_keeps_check_order() {
        let mut data = dataset();
        data.crs = None;
        let outcome = validate_dataset(
            &mut data,
            &policy(),
            &full_mapping(),
            None,
            &CancelToken::new(),
        )
        .unwrap();

        let codes: Vec<&str> = outcome
            .summary
            .iter()
            .map(|entry| entry.code.as_str())
            .collect();
        assert_eq!(
            codes,
            vec![
                "mandatory_value_missing_count", // street_name
                "mandatory_value_missing_count", // postal_code
                "postal_code_wrong_length_count",
                "null_geometry_count",
                "invalid_geometry_count",
                "missing_crs",
            ]
        );
    }
}
