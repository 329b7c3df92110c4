use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// One outcome of a check: either dataset-scoped (a summary statement with an
/// affected-row count) or row-scoped (a remark fragment for one row).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_rows: Option<usize>,
}

impl CheckResult {
    pub fn dataset(code: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            row: None,
            field: None,
            affected_rows: None,
        }
    }

    /// Row-scoped result; `fragment` is the text that ends up in the row's
    /// `Remark` column.
    pub fn row_remark(code: impl Into<String>, row: usize, fragment: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            severity: Severity::Error,
            message: fragment.into(),
            row: Some(row),
            field: None,
            affected_rows: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_affected_rows(mut self, count: usize) -> Self {
        self.affected_rows = Some(count);
        self
    }

    pub fn is_row_scoped(&self) -> bool {
        self.row.is_some()
    }
}

/// Accumulates check results in execution order. Row-scoped results later
/// collapse into per-row remark strings; dataset-scoped results become the
/// run summary.
#[derive(Debug, Default)]
pub struct ResultContainer {
    results: Vec<CheckResult>,
}

impl ResultContainer {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    pub fn merge(&mut self, other: ResultContainer) {
        self.results.extend(other.results);
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Row remark fragments bucketed by row index, preserving push order
    /// within each row.
    pub fn row_fragments(&self, row_count: usize) -> Vec<Vec<String>> {
        let mut fragments = vec![Vec::new(); row_count];
        for result in &self.results {
            if let Some(row) = result.row {
                if let Some(bucket) = fragments.get_mut(row) {
                    bucket.push(result.message.clone());
                }
            }
        }
        fragments
    }

    pub fn summary(&self) -> Vec<CheckResult> {
        self.results
            .iter()
            .filter(|result| !result.is_row_scoped())
            .cloned()
            .collect()
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.results
            .iter()
            .filter(|result| result.severity == severity)
            .count()
    }
}
