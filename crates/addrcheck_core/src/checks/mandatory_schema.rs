use crate::checks::{Check, CheckContext};
use crate::result::{CheckResult, ResultContainer, Severity};

const CODE_MANDATORY_FIELD_MISSING: &str = "mandatory_field_missing_schema_wide";

/// Flags mandatory fields the reconciler could not map to any column. A
/// schema-wide gap is a dataset-level failure; row checks for that field are
/// skipped entirely.
#[derive(Debug, Default)]
pub struct MandatorySchemaCheck;

impl Check for MandatorySchemaCheck {
    fn name(&self) -> &'static str {
        "mandatory_field_schema"
    }

    fn run(&self, ctx: &CheckContext<'_>, results: &mut ResultContainer) {
        for field in &ctx.policy.mandatory_fields {
            if !ctx.mapping.is_mapped(field) {
                results.push(
                    CheckResult::dataset(
                        CODE_MANDATORY_FIELD_MISSING,
                        Severity::Error,
                        format!("mandatory field '{field}' missing from schema"),
                    )
                    .with_field(field.clone())
                    .with_affected_rows(ctx.dataset.rows.len()),
                );
            }
        }
    }
}
