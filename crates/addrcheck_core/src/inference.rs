use addrcheck_model::{AccuracyExpectation, CountryPolicy};
use tracing::debug;

/// Keyword groups driving the column-name scan. `mandatory` marks the logical
/// field mandatory whenever its group matches; state and city never are.
const KEYWORD_GROUPS: &[(&str, &[&str], bool)] = &[
    ("street_name", &["street"], true),
    ("house_number", &["house", "building"], true),
    ("postal_code", &["postal", "zip"], true),
    ("state", &["state", "province"], false),
    ("city", &["city", "town"], false),
];

/// Synthesizes a best-guess policy from a dataset's column names when the
/// registry has no entry. Always succeeds, even with zero signal; the result
/// is a heuristic and must be confirmed by the operator before use.
pub fn infer<S: AsRef<str>>(column_names: &[S]) -> CountryPolicy {
    let lowered: Vec<String> = column_names
        .iter()
        .map(|name| name.as_ref().to_lowercase())
        .collect();

    let mut expected_attributes = Vec::new();
    let mut mandatory_fields = Vec::new();
    for (field, keywords, mandatory) in KEYWORD_GROUPS {
        let matched = lowered
            .iter()
            .any(|column| keywords.iter().any(|keyword| column.contains(keyword)));
        if matched {
            expected_attributes.push(field.to_string());
            if *mandatory {
                mandatory_fields.push(field.to_string());
            }
        }
    }

    debug!(
        expected = expected_attributes.len(),
        mandatory = mandatory_fields.len(),
        "inferred policy from column names"
    );

    CountryPolicy {
        country_name: "Unknown".to_string(),
        expected_attributes,
        mandatory_fields,
        postal_code_length: 6,
        language_support: vec!["en".to_string()],
        accuracy_expectation: AccuracyExpectation::Parcel,
        notes: "Auto-generated rule based on column names".to_string(),
    }
}
