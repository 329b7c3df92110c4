use addrcheck_model::{coerce_to_text, value_is_missing};

use crate::checks::{Check, CheckContext};
use crate::result::{CheckResult, ResultContainer, Severity};

const CODE_POSTAL_WRONG_LENGTH: &str = "postal_code_wrong_length";
const CODE_POSTAL_SUMMARY: &str = "postal_code_wrong_length_count";

pub const POSTAL_CODE_FIELD: &str = "postal_code";

/// Length check on coerced postal-code text. Runs only when the policy sets a
/// non-zero expected length and the postal_code field is mapped. Missing
/// values are left to the completeness sweep rather than double-flagged.
#[derive(Debug, Default)]
pub struct PostalCodeCheck;

impl Check for PostalCodeCheck {
    fn name(&self) -> &'static str {
        "postal_code_format"
    }

    fn run(&self, ctx: &CheckContext<'_>, results: &mut ResultContainer) {
        let expected_length = ctx.policy.postal_code_length;
        if expected_length == 0 {
            return;
        }
        let Some(column) = ctx.mapping.column_for(POSTAL_CODE_FIELD) else {
            return;
        };

        let mut wrong = 0usize;
        for (index, row) in ctx.dataset.rows.iter().enumerate() {
            if ctx.is_cancelled() {
                return;
            }
            let value = row.value(column);
            if value_is_missing(value) {
                continue;
            }
            let text = value.map(coerce_to_text).unwrap_or_default();
            if text.chars().count() != expected_length {
                results.push(
                    CheckResult::row_remark(
                        CODE_POSTAL_WRONG_LENGTH,
                        index,
                        format!("{column} wrong length"),
                    )
                    .with_field(POSTAL_CODE_FIELD),
                );
                wrong += 1;
            }
        }

        let severity = if wrong > 0 {
            Severity::Error
        } else {
            Severity::Info
        };
        results.push(
            CheckResult::dataset(
                CODE_POSTAL_SUMMARY,
                severity,
                format!("{wrong} row(s) with wrong-length {column}"),
            )
            .with_field(POSTAL_CODE_FIELD)
            .with_affected_rows(wrong),
        );
    }
}
