//! Helpers for reading loosely shaped JSON documents produced by remote
//! services and the ingestion pipeline.

use serde_json::{Map, Value};

/// Whether `value` carries data: null, `""`, `false`, `0`, `[]` and `{}`
/// count as absent.
pub(crate) fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// First value under `keys`, in order, that [`is_present`].
pub(crate) fn first_present<'a>(
    object: &'a Map<String, Value>,
    keys: &[&str],
) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find(|value| is_present(value))
}

/// Render a scalar as text; containers and null yield `None`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// First present object under `keys`; scalars under earlier keys are skipped.
pub(crate) fn first_object<'a>(
    object: &'a Map<String, Value>,
    keys: &[&str],
) -> Option<&'a Map<String, Value>> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .filter(|value| is_present(value))
        .find_map(Value::as_object)
}

/// Text of the first present scalar under `keys`; containers are skipped.
pub(crate) fn first_text(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .filter(|value| is_present(value))
        .find_map(scalar_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(null), false)]
    #[case(json!(""), false)]
    #[case(json!(false), false)]
    #[case(json!(0), false)]
    #[case(json!(0.0), false)]
    #[case(json!([]), false)]
    #[case(json!({}), false)]
    #[case(json!("x"), true)]
    #[case(json!(true), true)]
    #[case(json!(-1), true)]
    #[case(json!([0]), true)]
    fn presence_follows_truthiness(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(is_present(&value), expected);
    }

    #[rstest]
    fn first_text_skips_empty_candidates() {
        let value = json!({ "a": "", "b": 12, "c": "later" });
        let object = value.as_object().expect("object");
        assert_eq!(first_text(object, &["missing", "a", "b", "c"]).as_deref(), Some("12"));
    }

    #[rstest]
    fn first_object_ignores_scalars() {
        let value = json!({ "a": "text", "b": { "k": 1 } });
        let object = value.as_object().expect("object");
        assert!(first_object(object, &["a"]).is_none());
        assert!(first_object(object, &["a", "b"]).is_some());
    }

    #[rstest]
    fn first_text_falls_back_past_containers() {
        let value = json!({ "estado": { "code": 3 }, "status": "Terminada" });
        let object = value.as_object().expect("object");
        assert_eq!(
            first_text(object, &["estado", "status"]).as_deref(),
            Some("Terminada")
        );
    }
}
