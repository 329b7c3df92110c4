pub mod checks;
pub mod engine;
pub mod inference;
pub mod input;
pub mod oracle;
pub mod policy;
pub mod reconcile;
pub mod remark;
pub mod result;

pub use checks::{default_battery, Check, CheckContext};
pub use engine::{validate_dataset, CancelToken, ValidationOutcome};
pub use inference::infer;
pub use input::{load_dataset, DatasetLoadError};
pub use oracle::{AdvisoryOracle, HttpOracle, OracleError, SimilarityOracle};
pub use policy::lookup;
pub use reconcile::reconcile;
pub use remark::{aggregate, REMARK_DELIMITER};
pub use result::{CheckResult, ResultContainer, Severity};
