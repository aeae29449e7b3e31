use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{JStoreErr, JStoreResult};

/// `/<id>` or `/<id>.json`, where an id is ASCII letters, digits and hyphens.
/// Nothing else may follow, which keeps path separators and dots out of ids
/// before they are used as file names.
static DOCUMENT_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([a-zA-Z0-9-]+)(\.json)?$").expect("static pattern"));

/// Pulls the document identifier out of a request path.
///
/// Expects the router's view of the path: unreserved escapes such as `%61`
/// already decoded, while `%2F`, `%25` and `%2B` stay encoded and so never match.
/// Matching is case-sensitive.
pub fn extract_identifier(path: &str) -> JStoreResult<&str> {
    DOCUMENT_PATH
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str())
        .ok_or(JStoreErr::InvalidIdentifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_and_suffixed_ids() {
        assert_eq!(extract_identifier("/abc").unwrap(), "abc");
        assert_eq!(extract_identifier("/abc.json").unwrap(), "abc");
        assert_eq!(
            extract_identifier("/0f8fad5b-d9cb-469f-a165-70867728950e.json").unwrap(),
            "0f8fad5b-d9cb-469f-a165-70867728950e"
        );
        assert_eq!(extract_identifier("/MiXeD-Case-9").unwrap(), "MiXeD-Case-9");
        assert_eq!(extract_identifier("/-").unwrap(), "-");
    }

    #[test]
    fn test_rejects_malformed_paths() {
        for path in [
            "",
            "/",
            "/.json",
            "abc",
            "/a/b",
            "/../etc",
            "/abc/",
            "/abc.json.json",
            "/abc.txt",
            "/abcXjson",
            "/a_b",
            "/a%2Fb",
            "/abc%2Ejson",
            "/abc.json/",
            "/ab c",
        ] {
            assert!(
                matches!(extract_identifier(path), Err(JStoreErr::InvalidIdentifier)),
                "{path:?} should be rejected"
            );
        }
    }
}
