use addrcheck_model::value_is_missing;

use crate::checks::{Check, CheckContext};
use crate::result::{CheckResult, ResultContainer, Severity};

const CODE_MANDATORY_VALUE_MISSING: &str = "mandatory_value_missing";
const CODE_MANDATORY_VALUE_SUMMARY: &str = "mandatory_value_missing_count";

/// Row-level completeness sweep over every mapped mandatory field. Missing
/// values (null, absent, empty or whitespace-only) append a
/// `"<field> is missing"` fragment; each field also gets a dataset-level
/// count entry after its sweep.
#[derive(Debug, Default)]
pub struct CompletenessCheck;

impl Check for CompletenessCheck {
    fn name(&self) -> &'static str {
        "row_completeness"
    }

    fn run(&self, ctx: &CheckContext<'_>, results: &mut ResultContainer) {
        for field in &ctx.policy.mandatory_fields {
            let Some(column) = ctx.mapping.column_for(field) else {
                // Schema-wide gap already reported by the mandatory-schema check.
                continue;
            };

            let mut missing = 0usize;
            for (index, row) in ctx.dataset.rows.iter().enumerate() {
                if ctx.is_cancelled() {
                    return;
                }
                if value_is_missing(row.value(column)) {
                    results.push(
                        CheckResult::row_remark(
                            CODE_MANDATORY_VALUE_MISSING,
                            index,
                            format!("{field} is missing"),
                        )
                        .with_field(field.clone()),
                    );
                    missing += 1;
                }
            }

            let severity = if missing > 0 {
                Severity::Error
            } else {
                Severity::Info
            };
            results.push(
                CheckResult::dataset(
                    CODE_MANDATORY_VALUE_SUMMARY,
                    severity,
                    format!("{missing} row(s) missing {field}"),
                )
                .with_field(field.clone())
                .with_affected_rows(missing),
            );
        }
    }
}
