//! Query-string construction for API calls.
//!
//! # Design
//! Values are stringified through `Display`, percent-encoded so that only the
//! RFC 3986 unreserved set stays literal, and then `%20` is rewritten to `+`.
//! A literal `+` in the input is encoded as `%2B`, so the two never collide.
//!
//! Output order is the iteration order of the input. Pass a slice or `Vec` of
//! pairs when the URL must be deterministic; a `HashMap` works but its order
//! is unspecified.

use std::fmt::Display;

/// Build a `?k1=v1&k2=v2` suffix from key/value pairs.
///
/// Returns an empty string when there are no pairs.
pub fn escaped_parameters<I, K, V>(parameters: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Display,
{
    let vars: Vec<String> = parameters
        .into_iter()
        .map(|(key, value)| format!("{}={}", escape(key.as_ref()), escape(&value.to_string())))
        .collect();

    if vars.is_empty() {
        return String::new();
    }
    format!("?{}", vars.join("&"))
}

fn escape(raw: &str) -> String {
    urlencoding::encode(raw).replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use super::*;

    #[test]
    fn empty_input_yields_empty_string() {
        let params: Vec<(&str, &str)> = Vec::new();
        assert_eq!(escaped_parameters(params), "");
        assert_eq!(escaped_parameters(HashMap::<String, String>::new()), "");
    }

    #[test]
    fn ordered_pairs_keep_their_order() {
        let query = escaped_parameters([("api_key", "k"), ("username", "bob")]);
        assert_eq!(query, "?api_key=k&username=bob");
    }

    #[test]
    fn spaces_become_plus() {
        let query = escaped_parameters([("query", "star wars episode iv")]);
        assert_eq!(query, "?query=star+wars+episode+iv");
        assert!(!query.contains(' '));
    }

    #[test]
    fn reserved_characters_are_percent_encoded() {
        let query = escaped_parameters([("password", "a&b=c+d/e?")]);
        assert_eq!(query, "?password=a%26b%3Dc%2Bd%2Fe%3F");
    }

    #[test]
    fn non_ascii_is_utf8_percent_encoded() {
        let query = escaped_parameters([("query", "Amélie")]);
        assert_eq!(query, "?query=Am%C3%A9lie");
    }

    #[test]
    fn values_are_stringified() {
        let query = escaped_parameters([("page", 2), ("year", 1977)]);
        assert_eq!(query, "?page=2&year=1977");
    }

    #[test]
    fn btree_map_is_key_sorted() {
        let mut params = BTreeMap::new();
        params.insert("session_id", "s");
        params.insert("api_key", "k");
        assert_eq!(escaped_parameters(&params), "?api_key=k&session_id=s");
    }

    #[test]
    fn hash_map_has_one_entry_per_key() {
        let mut params = HashMap::new();
        params.insert("api_key".to_string(), "my key".to_string());
        params.insert("request_token".to_string(), "abc".to_string());
        params.insert("username".to_string(), "jane doe".to_string());

        let query = escaped_parameters(&params);
        assert!(query.starts_with('?'));
        assert!(!query.contains(' '));

        let mut entries: Vec<&str> = query[1..].split('&').collect();
        entries.sort_unstable();
        assert_eq!(entries, vec!["api_key=my+key", "request_token=abc", "username=jane+doe"]);
    }
}
