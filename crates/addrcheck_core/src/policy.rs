use addrcheck_model::{AccuracyExpectation, CountryPolicy};

/// Fetches the validation policy for a 3-letter ISO country code. The code is
/// trimmed and upper-cased before lookup; unknown codes return `None` and the
/// caller decides between inference and abort.
pub fn lookup(country_code: &str) -> Option<CountryPolicy> {
    let normalized = country_code.trim().to_ascii_uppercase();
    registry()
        .iter()
        .find(|(code, _)| *code == normalized)
        .map(|(_, policy)| policy.clone())
}

pub fn known_codes() -> Vec<&'static str> {
    registry().iter().map(|(code, _)| *code).collect()
}

/// Seeded jurisdiction table. Adding a jurisdiction is a data change: append
/// one more entry here.
fn registry() -> Vec<(&'static str, CountryPolicy)> {
    vec![
        (
            "IND",
            CountryPolicy {
                country_name: "India".to_string(),
                expected_attributes: strings(&[
                    "street_name",
                    "house_number",
                    "postal_code",
                    "state",
                    "city",
                ]),
                mandatory_fields: strings(&["street_name", "house_number", "postal_code"]),
                postal_code_length: 6,
                language_support: strings(&["en", "hi"]),
                accuracy_expectation: AccuracyExpectation::Parcel,
                notes: "Dependent Locality often not used; region-specific scripts may apply."
                    .to_string(),
            },
        ),
        (
            "ARE",
            CountryPolicy {
                country_name: "United Arab Emirates".to_string(),
                expected_attributes: strings(&["street_name", "building_name", "zone", "emirate"]),
                mandatory_fields: strings(&["street_name", "building_name"]),
                // UAE does not use postal codes.
                postal_code_length: 0,
                language_support: strings(&["en", "ar"]),
                accuracy_expectation: AccuracyExpectation::Building,
                notes: "Building names are crucial; postcode not applicable.".to_string(),
            },
        ),
        (
            "SAU",
            CountryPolicy {
                country_name: "Saudi Arabia".to_string(),
                expected_attributes: strings(&[
                    "street_name",
                    "building_number",
                    "district",
                    "city",
                    "postal_code",
                ]),
                mandatory_fields: strings(&["street_name", "building_number", "postal_code"]),
                postal_code_length: 5,
                language_support: strings(&["en", "ar"]),
                accuracy_expectation: AccuracyExpectation::Rooftop,
                notes: "Wasel system applies; rooftop accuracy preferred.".to_string(),
            },
        ),
    ]
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_normalizes_code() {
        assert_eq!(lookup("ind").unwrap().country_name, "India");
        assert_eq!(lookup("  SAU ").unwrap().country_name, "Saudi Arabia");
    }

    #[test]
    fn unknown_code_returns_none() {
        assert!(lookup("ZZZ").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn uae_skips_postal_code_check() {
        assert_eq!(lookup("ARE").unwrap().postal_code_length, 0);
    }

    #[test]
    fn every_registry_policy_is_internally_consistent() {
        for (code, policy) in registry() {
            policy
                .validate()
                .unwrap_or_else(|err| panic!("policy {code} invalid: {err}"));
        }
    }
}
