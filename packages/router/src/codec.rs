//! Props ↔ query-string codec.
//!
//! The query string doubles as the identity of a history entry, so encoding
//! must be deterministic: [`Props`] iterates its keys in sorted order, which
//! makes `encode` a canonical form. Values are typed — `?id=5` decodes to the
//! number `5`, not the string `"5"` — because the codec deliberately favors
//! machine-typed props over accidental stringification.

use serde_json::Value;
use tracing::trace;

pub use nebula_history::Props;

/// Serialize `props` into a query string, without the leading `?`.
///
/// Strings, numbers and bools are rendered raw; everything else (null,
/// arrays, objects) is JSON-serialized first. Either way the result is
/// percent-encoded. A value that cannot be serialized is dropped from the
/// output entirely, no error is surfaced. Empty props yield an empty string.
pub fn encode(props: &Props) -> String {
    let mut parts = Vec::with_capacity(props.len());
    for (key, value) in props {
        let raw = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => match serde_json::to_string(other) {
                Ok(serialized) => serialized,
                Err(error) => {
                    trace!(key, %error, "dropping prop that cannot be serialized");
                    continue;
                }
            },
        };
        parts.push(format!("{key}={}", urlencoding::encode(&raw)));
    }
    parts.join("&")
}

/// Parse a query string (without the leading `?`) back into [`Props`].
///
/// Each pair is split on the first `=`; a pair without one gets an empty
/// string value. The value is percent-decoded and then run through a JSON
/// parse; when the parse fails the decoded string is kept as-is. Duplicate
/// keys keep the last occurrence. This never fails: malformed input degrades
/// to string values.
pub fn decode(query: &str) -> Props {
    let mut props = Props::new();
    if query.is_empty() {
        return props;
    }
    for pair in query.split('&') {
        let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
        let decoded = match urlencoding::decode(raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        };
        let value = match serde_json::from_str(&decoded) {
            Ok(value) => value,
            Err(_) => Value::String(decoded),
        };
        props.insert(key.to_string(), value);
    }
    props
}

/// Build a navigable href (`?key=value&…`) for `props`.
///
/// The result can be placed in an anchor's `href` and handed to
/// [`Router::navigate`](crate::router::Router::navigate).
pub fn href_from_props(props: &Props) -> String {
    format!("?{}", encode(props))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn props(pairs: &[(&str, Value)]) -> Props {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn empty_props_yield_empty_string() {
        assert_eq!(encode(&Props::new()), "");
        assert_eq!(decode(""), Props::new());
    }

    #[test]
    fn primitives_round_trip() {
        let input = props(&[
            ("component", json!("List")),
            ("count", json!(42)),
            ("ratio", json!(0.25)),
            ("visible", json!(true)),
            ("label", json!("hello world")),
        ]);
        assert_eq!(decode(&encode(&input)), input);
    }

    #[test]
    fn nested_values_round_trip() {
        let input = props(&[
            ("state", json!({"selected": 3, "open": [1, 2]})),
            ("tags", json!(["a", "b"])),
            ("nothing", json!(null)),
        ]);
        assert_eq!(decode(&encode(&input)), input);
    }

    #[test]
    fn encoding_is_canonical() {
        // Map iteration is key-sorted, so insertion order cannot leak into
        // the identity string.
        let mut a = Props::new();
        a.insert("b".into(), json!(2));
        a.insert("a".into(), json!(1));
        let mut b = Props::new();
        b.insert("a".into(), json!(1));
        b.insert("b".into(), json!(2));
        assert_eq!(encode(&a), encode(&b));
        assert_eq!(encode(&a), "a=1&b=2");
    }

    #[test]
    fn values_are_percent_encoded() {
        let input = props(&[("q", json!("a=b&c"))]);
        let encoded = encode(&input);
        assert_eq!(encoded, "q=a%3Db%26c");
        assert_eq!(decode(&encoded), input);
    }

    #[test]
    fn numeric_looking_strings_are_retyped() {
        // Deliberate: the codec favors machine types, "5" comes back as 5.
        let input = props(&[("id", json!("5"))]);
        assert_eq!(decode(&encode(&input)), props(&[("id", json!(5))]));
    }

    #[test]
    fn unparsable_values_stay_strings() {
        assert_eq!(
            decode("name=movie%20night"),
            props(&[("name", json!("movie night"))])
        );
    }

    #[test]
    fn pair_without_separator_defaults_to_empty_string() {
        assert_eq!(decode("orphan"), props(&[("orphan", json!(""))]));
        assert_eq!(
            decode("orphan&a=1"),
            props(&[("orphan", json!("")), ("a", json!(1))])
        );
    }

    #[test]
    fn duplicate_keys_keep_the_last_occurrence() {
        assert_eq!(decode("a=1&a=2"), props(&[("a", json!(2))]));
    }

    #[test]
    fn href_is_prefixed() {
        assert_eq!(
            href_from_props(&props(&[("component", json!("List"))])),
            "?component=List"
        );
    }
}
