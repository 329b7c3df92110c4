use std::collections::BTreeMap;

use addrcheck_model::{coerce_to_text, value_is_missing, AddressRow};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::checks::{Check, CheckContext};
use crate::result::{CheckResult, ResultContainer, Severity};

const CODE_VALUE_ANOMALY: &str = "value_anomaly";
const CODE_VALUE_ANOMALY_SUMMARY: &str = "value_anomaly_count";

/// Per-row advisory pass over the mapped expected attributes. The oracle's
/// finding is appended verbatim as a remark fragment. A failed or timed-out
/// call skips that row only; the run never aborts on oracle trouble.
#[derive(Debug, Default)]
pub struct ValueAnomalyCheck;

impl ValueAnomalyCheck {
    fn row_subset(
        ctx: &CheckContext<'_>,
        row: &AddressRow,
    ) -> BTreeMap<String, String> {
        let mut subset = BTreeMap::new();
        for field in &ctx.policy.expected_attributes {
            let Some(column) = ctx.mapping.column_for(field) else {
                continue;
            };
            let value = row.value(column);
            if value_is_missing(value) {
                continue;
            }
            if let Some(value) = value {
                subset.insert(field.clone(), coerce_to_text(value));
            }
        }
        subset
    }

    fn finding_for_row(ctx: &CheckContext<'_>, index: usize, row: &AddressRow) -> Option<String> {
        if ctx.is_cancelled() {
            return None;
        }
        let oracle = ctx.oracle?;
        let subset = Self::row_subset(ctx, row);
        if subset.is_empty() {
            return None;
        }
        match oracle.find_anomalies(&subset) {
            Ok(finding) => finding,
            Err(err) => {
                debug!(row = index, error = %err, "anomaly advisory skipped for row");
                None
            }
        }
    }
}

impl Check for ValueAnomalyCheck {
    fn name(&self) -> &'static str {
        "value_anomaly"
    }

    fn run(&self, ctx: &CheckContext<'_>, results: &mut ResultContainer) {
        if ctx.oracle.is_none() || ctx.is_cancelled() {
            return;
        }

        // Oracle calls are network-bound; fan out across the pool with the
        // results collected back in row order.
        #[cfg(feature = "parallel")]
        let findings: Vec<Option<String>> = ctx
            .dataset
            .rows
            .par_iter()
            .enumerate()
            .map(|(index, row)| Self::finding_for_row(ctx, index, row))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let findings: Vec<Option<String>> = ctx
            .dataset
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| Self::finding_for_row(ctx, index, row))
            .collect();

        let mut flagged = 0usize;
        for (index, finding) in findings.into_iter().enumerate() {
            if let Some(finding) = finding {
                results.push(CheckResult::row_remark(CODE_VALUE_ANOMALY, index, finding));
                flagged += 1;
            }
        }

        let severity = if flagged > 0 {
            Severity::Warning
        } else {
            Severity::Info
        };
        results.push(
            CheckResult::dataset(
                CODE_VALUE_ANOMALY_SUMMARY,
                severity,
                format!("{flagged} row(s) flagged by the value-anomaly advisory"),
            )
            .with_affected_rows(flagged),
        );
    }
}
