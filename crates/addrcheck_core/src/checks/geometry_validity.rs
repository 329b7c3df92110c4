use geo::Validation;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::checks::{Check, CheckContext};
use crate::result::{CheckResult, ResultContainer, Severity};

const CODE_INVALID_GEOMETRY: &str = "invalid_geometry";
const CODE_INVALID_GEOMETRY_SUMMARY: &str = "invalid_geometry_count";

pub const INVALID_GEOMETRY_REMARK: &str = "Invalid geometry";

/// Flags rows whose geometry is present but topologically invalid
/// (self-intersections, malformed rings). Validity is delegated to geo's
/// `Validation` predicate. Rows are independent; the sweep runs in parallel
/// and merges back by row index so remark order stays deterministic.
#[derive(Debug, Default)]
pub struct GeometryValidityCheck;

impl GeometryValidityCheck {
    fn invalid_rows(ctx: &CheckContext<'_>) -> Vec<usize> {
        #[cfg(feature = "parallel")]
        {
            ctx.dataset
                .rows
                .par_iter()
                .enumerate()
                .filter_map(|(index, row)| match &row.geometry {
                    Some(geometry) if !geometry.is_valid() => Some(index),
                    _ => None,
                })
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            ctx.dataset
                .rows
                .iter()
                .enumerate()
                .filter_map(|(index, row)| match &row.geometry {
                    Some(geometry) if !geometry.is_valid() => Some(index),
                    _ => None,
                })
                .collect()
        }
    }
}

impl Check for GeometryValidityCheck {
    fn name(&self) -> &'static str {
        "geometry_validity"
    }

    fn run(&self, ctx: &CheckContext<'_>, results: &mut ResultContainer) {
        if ctx.is_cancelled() {
            return;
        }

        let mut invalid = Self::invalid_rows(ctx);
        invalid.sort_unstable();

        for &index in &invalid {
            results.push(CheckResult::row_remark(
                CODE_INVALID_GEOMETRY,
                index,
                INVALID_GEOMETRY_REMARK,
            ));
        }

        let severity = if invalid.is_empty() {
            Severity::Info
        } else {
            Severity::Error
        };
        results.push(
            CheckResult::dataset(
                CODE_INVALID_GEOMETRY_SUMMARY,
                severity,
                format!("{} row(s) with invalid geometry", invalid.len()),
            )
            .with_affected_rows(invalid.len()),
        );
    }
}
