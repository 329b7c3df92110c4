/// Canonical delimiter between remark fragments.
pub const REMARK_DELIMITER: &str = " | ";

/// Joins a row's remark fragments in check-execution order. An empty fragment
/// list yields an empty string, meaning the row passed every check. Never
/// emits a trailing delimiter.
pub fn aggregate(fragments: &[String]) -> String {
    fragments.join(REMARK_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_fragments_without_trailing_delimiter() {
        let fragments = vec![
            "street_name is missing".to_string(),
            "Null geometry".to_string(),
        ];
        assert_eq!(
            aggregate(&fragments),
            "street_name is missing | Null geometry"
        );
    }

    #[test]
    fn empty_fragment_list_yields_empty_string() {
        assert_eq!(aggregate(&[]), "");
    }

    #[test]
    fn single_fragment_has_no_delimiter() {
        assert_eq!(
            aggregate(&["postal_code wrong length".to_string()]),
            "postal_code wrong length"
        );
    }
}
