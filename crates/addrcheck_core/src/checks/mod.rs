use addrcheck_model::{CountryPolicy, Dataset, FieldMapping};

use crate::engine::CancelToken;
use crate::oracle::AdvisoryOracle;
use crate::result::ResultContainer;

pub mod completeness;
pub mod crs_presence;
pub mod geometry_null;
pub mod geometry_validity;
pub mod mandatory_schema;
pub mod postal_code;
pub mod value_anomaly;

/// Everything a check may consult. Checks never mutate the dataset; they only
/// emit results.
pub struct CheckContext<'a> {
    pub dataset: &'a Dataset,
    pub policy: &'a CountryPolicy,
    pub mapping: &'a FieldMapping,
    pub oracle: Option<&'a dyn AdvisoryOracle>,
    pub cancel: &'a CancelToken,
}

impl CheckContext<'_> {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

pub trait Check: Send + Sync {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &CheckContext<'_>, results: &mut ResultContainer);
}

/// The full battery in its fixed execution order. Remark fragment order per
/// row follows this order, so golden outputs stay reproducible.
pub fn default_battery() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(mandatory_schema::MandatorySchemaCheck),
        Box::new(completeness::CompletenessCheck),
        Box::new(postal_code::PostalCodeCheck),
        Box::new(geometry_null::GeometryNullCheck),
        Box::new(geometry_validity::GeometryValidityCheck),
        Box::new(value_anomaly::ValueAnomalyCheck),
        Box::new(crs_presence::CrsPresenceCheck),
    ]
}
