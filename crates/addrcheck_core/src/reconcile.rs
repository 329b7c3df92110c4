use addrcheck_model::{CountryPolicy, Dataset, FieldMapping};
use tracing::{debug, warn};

use crate::oracle::AdvisoryOracle;

/// Maps the policy's logical field names onto the dataset's actual columns.
///
/// Exact case-insensitive matches are resolved first and are never overridden
/// by an oracle suggestion. Remaining fields go to the oracle in a single
/// call; a suggestion is accepted only when it names a real column
/// (canonicalized to the dataset's spelling). Oracle absence or failure
/// leaves those fields unmapped rather than guessing further.
pub fn reconcile(
    policy: &CountryPolicy,
    dataset: &Dataset,
    oracle: Option<&dyn AdvisoryOracle>,
) -> FieldMapping {
    let mut mapping = FieldMapping::new();
    let mut unresolved: Vec<String> = Vec::new();

    for field in policy.all_fields() {
        match dataset.find_column(field) {
            Some(column) => mapping.insert(field, column),
            None => unresolved.push(field.to_string()),
        }
    }

    if unresolved.is_empty() {
        return mapping;
    }

    let Some(oracle) = oracle else {
        debug!(
            unresolved = unresolved.len(),
            "no oracle configured, leaving fields unmapped"
        );
        return mapping;
    };

    let expected: Vec<String> = policy.all_fields().iter().map(|f| f.to_string()).collect();
    match oracle.suggest_mapping(&expected, &dataset.columns) {
        Ok(suggestions) => {
            for field in &unresolved {
                let Some(suggested) = suggestions.get(field) else {
                    continue;
                };
                // Advisory only: accept nothing that does not name a real column.
                match dataset.find_column(suggested) {
                    Some(column) => {
                        debug!(field = %field, column, "accepted oracle column suggestion");
                        mapping.insert(field, column);
                    }
                    None => {
                        warn!(
                            field = %field,
                            suggested = %suggested,
                            "oracle suggested a column that does not exist"
                        );
                    }
                }
            }
        }
        Err(err) => {
            warn!(error = %err, "column-mapping oracle call failed");
        }
    }

    mapping
}
