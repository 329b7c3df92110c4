use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the column the engine appends to an annotated dataset.
pub const REMARK_COLUMN: &str = "Remark";

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("mandatory field '{0}' is not listed in expected_attributes")]
    MandatoryNotExpected(String),
    #[error("invalid accuracy expectation: {0}")]
    InvalidAccuracyExpectation(String),
}

/// Positional accuracy class an address source is expected to meet.
/// Informational only; no check consumes it numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyExpectation {
    Parcel,
    Building,
    Rooftop,
    Entrance,
}

impl fmt::Display for AccuracyExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccuracyExpectation::Parcel => "parcel",
            AccuracyExpectation::Building => "building",
            AccuracyExpectation::Rooftop => "rooftop",
            AccuracyExpectation::Entrance => "entrance",
        };
        f.write_str(label)
    }
}

impl FromStr for AccuracyExpectation {
    type Err = PolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "parcel" => Ok(AccuracyExpectation::Parcel),
            "building" => Ok(AccuracyExpectation::Building),
            "rooftop" => Ok(AccuracyExpectation::Rooftop),
            "entrance" => Ok(AccuracyExpectation::Entrance),
            other => Err(PolicyError::InvalidAccuracyExpectation(other.to_string())),
        }
    }
}

/// Validation expectations for one jurisdiction. Constructed once (registry
/// entry or inference output) and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryPolicy {
    pub country_name: String,
    pub expected_attributes: Vec<String>,
    pub mandatory_fields: Vec<String>,
    /// Expected character length of postal code values; 0 disables the check.
    pub postal_code_length: usize,
    pub language_support: Vec<String>,
    pub accuracy_expectation: AccuracyExpectation,
    pub notes: String,
}

impl CountryPolicy {
    /// Every mandatory field must also be an expected attribute.
    pub fn validate(&self) -> Result<(), PolicyError> {
        for field in &self.mandatory_fields {
            if !self.expected_attributes.iter().any(|attr| attr == field) {
                return Err(PolicyError::MandatoryNotExpected(field.clone()));
            }
        }
        Ok(())
    }

    /// Expected attributes followed by any mandatory field not already listed.
    /// Preserves declaration order so downstream output is reproducible.
    pub fn all_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self
            .expected_attributes
            .iter()
            .map(String::as_str)
            .collect();
        for field in &self.mandatory_fields {
            if !fields.contains(&field.as_str()) {
                fields.push(field);
            }
        }
        fields
    }
}

/// One address point: attribute values keyed by column name plus a geometry.
/// Attribute values stay as raw JSON values so the annotated output
/// round-trips the source unchanged.
#[derive(Debug, Clone, Default)]
pub struct AddressRow {
    pub properties: Map<String, Value>,
    pub geometry: Option<geo::Geometry<f64>>,
}

impl AddressRow {
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.properties.get(column)
    }
}

/// Tabular address-point dataset as produced by the loader. Column names keep
/// their source casing; lookups go through `find_column`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<AddressRow>,
    /// Coordinate reference system label, if the source declared one.
    pub crs: Option<String>,
}

impl Dataset {
    /// Case-insensitive column lookup returning the column's actual spelling.
    pub fn find_column(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|column| column.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }

    pub fn value(&self, row_index: usize, column: &str) -> Option<&Value> {
        self.rows.get(row_index).and_then(|row| row.value(column))
    }

    /// Appends the `Remark` column, one value per row in order. The remarks
    /// vector must have been produced from this dataset's rows.
    pub fn apply_remarks(&mut self, remarks: Vec<String>) {
        debug_assert_eq!(remarks.len(), self.rows.len());
        if !self.columns.iter().any(|column| column == REMARK_COLUMN) {
            self.columns.push(REMARK_COLUMN.to_string());
        }
        for (row, remark) in self.rows.iter_mut().zip(remarks) {
            row.properties
                .insert(REMARK_COLUMN.to_string(), Value::String(remark));
        }
    }
}

/// Mapping from a policy's logical field names to actual dataset columns.
/// Every mapped column refers to a column that exists in the dataset; the
/// reconciler canonicalizes suggestions to the dataset's exact spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: BTreeMap<String, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, column: impl Into<String>) {
        self.entries.insert(field.into(), column.into());
    }

    pub fn column_for(&self, field: &str) -> Option<&str> {
        self.entries.get(field).map(String::as_str)
    }

    pub fn is_mapped(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(field, column)| (field.as_str(), column.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// True when a value should count as absent: missing key, JSON null, or an
/// empty / whitespace-only string.
pub fn value_is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

/// Coerces an attribute value to text for length and advisory checks.
/// Integral floats render without the trailing `.0`; attribute tables often
/// surface integer postal codes as floats.
pub fn coerce_to_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                int.to_string()
            } else if let Some(uint) = number.as_u64() {
                uint.to_string()
            } else if let Some(float) = number.as_f64() {
                if float.fract() == 0.0 && float.is_finite() {
                    format!("{}", float as i64)
                } else {
                    float.to_string()
                }
            } else {
                number.to_string()
            }
        }
        Value::Bool(flag) => flag.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
