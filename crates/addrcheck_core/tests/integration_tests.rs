use std::collections::BTreeMap;

use addrcheck_core::engine::CancelToken;
use addrcheck_core::oracle::{AdvisoryOracle, OracleError};
use addrcheck_core::{reconcile, validate_dataset, Severity};
use addrcheck_model::{
    AccuracyExpectation, AddressRow, CountryPolicy, Dataset, REMARK_COLUMN,
};
use serde_json::{json, Value};

fn scenario_policy() -> CountryPolicy {
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

fn scenario_dataset() -> Dataset {
    Dataset {
        columns: vec!["street_name".to_string(), "postal_code".to_string()],
        rows: vec![
            row(json!("MG Road"), json!("110001")),
            row(json!(null), json!("110002")),
            row(json!("Ring Road"), json!("12345")),
        ],
        crs: Some("EPSG:4326".to_string()),
    }
}

fn remark(dataset: &Dataset, index: usize) -> String {
    match dataset.rows[index].value(REMARK_COLUMN) {
        Some(Value::String(text)) => text.clone(),
        other => panic!("expected remark string, got {other:?}"),
    }
}

#[test]
fn three_row_scenario_end_to_end() {
    let policy = scenario_policy();
    let mut dataset = scenario_dataset();
    let mapping = reconcile(&policy, &dataset, None);
    let outcome = validate_dataset(&mut dataset, &policy, &mapping, None, &CancelToken::new())
        .expect("valid policy");

    assert_eq!(remark(&dataset, 0), "");
    assert!(remark(&dataset, 1).contains("street_name is missing"));
    assert!(remark(&dataset, 2).contains("wrong length"));
    assert_eq!(outcome.flagged_rows, 2);

    let street_summary = outcome
        .summary
        .iter()
        .find(|entry| {
            entry.code == "mandatory_value_missing_count"
                && entry.field.as_deref() == Some("street_name")
        })
        .expect("street_name count entry");
    assert_eq!(street_summary.affected_rows, Some(1));

    let postal_summary = outcome
        .summary
        .iter()
        .find(|entry| entry.code == "postal_code_wrong_length_count")
        .expect("postal count entry");
    assert_eq!(postal_summary.affected_rows, Some(1));
}

#[test]
fn empty_remark_distinguishes_clean_rows() {
    let policy = scenario_policy();
    let mut dataset = scenario_dataset();
    let mapping = reconcile(&policy, &dataset, None);
    validate_dataset(&mut dataset, &policy, &mapping, None, &CancelToken::new()).unwrap();

    assert_eq!(dataset.rows[0].value(REMARK_COLUMN), Some(&json!("")));
    assert_ne!(dataset.rows[1].value(REMARK_COLUMN), Some(&json!("")));
}

/// Oracle that fails on one specific row and flags another.
struct FlakyOracle;

impl AdvisoryOracle for FlakyOracle {
    fn suggest_mapping(
        &self,
        _expected_fields: &[String],
        _column_names: &[String],
    ) -> Result<BTreeMap<String, String>, OracleError> {
        Ok(BTreeMap::new())
    }

    fn find_anomalies(
        &self,
        row_values: &BTreeMap<String, String>,
    ) -> Result<Option<String>, OracleError> {
        let street = row_values.get("street_name").cloned().unwrap_or_default();
        if street == "Ring Road" {
            return Err(OracleError::Malformed("request timed out".to_string()));
        }
        if street == "MG Road" {
            return Ok(Some("street_name: abbreviation".to_string()));
        }
        Ok(None)
    }
}

#[test]
fn oracle_timeout_on_one_row_spares_the_rest() {
    let policy = scenario_policy();
    let mut dataset = scenario_dataset();
    let mapping = reconcile(&policy, &dataset, None);
    validate_dataset(
        &mut dataset,
        &policy,
        &mapping,
        Some(&FlakyOracle),
        &CancelToken::new(),
    )
    .unwrap();

    assert!(remark(&dataset, 0).contains("street_name: abbreviation"));
    assert!(remark(&dataset, 1).contains("street_name is missing"));
    // Row 2's advisory failed; its format finding is still present.
    assert!(remark(&dataset, 2).contains("wrong length"));
    assert!(!remark(&dataset, 2).contains("timed out"));
}

#[test]
fn unmapped_mandatory_field_downgrades_to_schema_entry() {
    let policy = scenario_policy();
    let mut dataset = scenario_dataset();
    // Strip postal_code from the schema entirely.
    dataset.columns.retain(|column| column != "postal_code");
    for row in &mut dataset.rows {
        row.properties.remove("postal_code");
    }

    let mapping = reconcile(&policy, &dataset, None);
    assert!(!mapping.is_mapped("postal_code"));

    let outcome =
        validate_dataset(&mut dataset, &policy, &mapping, None, &CancelToken::new()).unwrap();
    let schema_entry = outcome
        .summary
        .iter()
        .find(|entry| entry.code == "mandatory_field_missing_schema_wide")
        .expect("schema-wide entry");
    assert_eq!(schema_entry.severity, Severity::Error);
    assert_eq!(schema_entry.field.as_deref(), Some("postal_code"));
    // No row-level postal fragments were attempted.
    assert!(!remark(&dataset, 0).contains("wrong length"));
}

#[test]
fn registry_policy_runs_against_renamed_columns() {
    let policy = addrcheck_core::policy::lookup("IND").expect("IND policy");
    let mut dataset = scenario_dataset();
    dataset.columns = vec!["Street_Name".to_string(), "POSTAL_CODE".to_string()];
    for row in &mut dataset.rows {
        let street = row.properties.remove("street_name").unwrap_or(Value::Null);
        let postal = row.properties.remove("postal_code").unwrap_or(Value::Null);
        row.properties.insert("Street_Name".to_string(), street);
        row.properties.insert("POSTAL_CODE".to_string(), postal);
    }

    let mapping = reconcile(&policy, &dataset, None);
    assert_eq!(mapping.column_for("street_name"), Some("Street_Name"));
    assert_eq!(mapping.column_for("postal_code"), Some("POSTAL_CODE"));

    validate_dataset(&mut dataset, &policy, &mapping, None, &CancelToken::new()).unwrap();
    assert!(remark(&dataset, 2).contains("POSTAL_CODE wrong length"));
}
