use crate::checks::{Check, CheckContext};
use crate::result::{CheckResult, ResultContainer, Severity};

const CODE_NULL_GEOMETRY: &str = "null_geometry";
const CODE_NULL_GEOMETRY_SUMMARY: &str = "null_geometry_count";

pub const NULL_GEOMETRY_REMARK: &str = "Null geometry";

/// Flags rows without any geometry value.
#[derive(Debug, Default)]
pub struct GeometryNullCheck;

impl Check for GeometryNullCheck {
    fn name(&self) -> &'static str {
        "geometry_null"
    }

    fn run(&self, ctx: &CheckContext<'_>, results: &mut ResultContainer) {
        let mut missing = 0usize;
        for (index, row) in ctx.dataset.rows.iter().enumerate() {
            if ctx.is_cancelled() {
                return;
            }
            if row.geometry.is_none() {
                results.push(CheckResult::row_remark(
                    CODE_NULL_GEOMETRY,
                    index,
                    NULL_GEOMETRY_REMARK,
                ));
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
                CODE_NULL_GEOMETRY_SUMMARY,
                severity,
                format!("{missing} row(s) with null geometry"),
            )
            .with_affected_rows(missing),
        );
    }
}
