use crate::checks::{Check, CheckContext};
use crate::result::{CheckResult, ResultContainer, Severity};

const CODE_MISSING_CRS: &str = "missing_crs";
const CODE_CRS_PRESENT: &str = "crs_present";

/// Dataset-level check on the coordinate reference system. Absence is a
/// warning, never a row failure.
#[derive(Debug, Default)]
pub struct CrsPresenceCheck;

impl Check for CrsPresenceCheck {
    fn name(&self) -> &'static str {
        "crs_presence"
    }

    fn run(&self, ctx: &CheckContext<'_>, results: &mut ResultContainer) {
        match ctx.dataset.crs.as_deref() {
            Some(crs) => {
                results.push(CheckResult::dataset(
                    CODE_CRS_PRESENT,
                    Severity::Info,
                    format!("coordinate reference system: {crs}"),
                ));
            }
            None => {
                results.push(CheckResult::dataset(
                    CODE_MISSING_CRS,
                    Severity::Warning,
                    "coordinate reference system not set",
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::tests::{context, identity_mapping, test_dataset, test_policy};
    use crate::engine::CancelToken;

    #[test]
    fn missing_crs_is_a_warning() {
        let dataset = test_dataset(&["street_name"], 1);
        let policy = test_policy(&["street_name"], &[]);
        let mapping = identity_mapping(&[]);
        let cancel = CancelToken::new();
        let ctx = context(&dataset, &policy, &mapping, &cancel);

        let mut results = ResultContainer::new();
        CrsPresenceCheck.run(&ctx, &mut results);

        let summary = results.summary();
        assert_eq!(summary[0].code, CODE_MISSING_CRS);
        assert_eq!(summary[0].severity, Severity::Warning);
    }

    #[test]
    fn present_crs_is_informational() {
        let mut dataset = test_dataset(&["street_name"], 1);
        dataset.crs = Some("EPSG:4326".to_string());
        let policy = test_policy(&["street_name"], &[]);
        let mapping = identity_mapping(&[]);
        let cancel = CancelToken::new();
        let ctx = context(&dataset, &policy, &mapping, &cancel);

        let mut results = ResultContainer::new();
        CrsPresenceCheck.run(&ctx, &mut results);

        let summary = results.summary();
        assert_eq!(summary[0].code, CODE_CRS_PRESENT);
        assert_eq!(summary[0].severity, Severity::Info);
    }
}
