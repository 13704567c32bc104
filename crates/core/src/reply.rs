//! Structured replies shared by both endpoints.
//!
//! Every endpoint answers with a JSON object carrying an `ok` flag. The server
//! sends `1` or `0`. The two endpoints read the flag differently: a chunk is
//! accepted on any truthy `ok`, a draft only on `ok` equal to one.

use serde_json::Value;

/// Returns `true` when the `ok` member of `payload` is truthy.
///
/// `true`, any non-zero number, any non-empty string (`"0"` included), arrays
/// and objects count as success. `false`, zero, `""`, `null` and a missing
/// member are falsy. Used for attachment chunks.
///
/// # Example
///
/// ```
/// use journal_core::reply::is_ok;
///
/// assert!(is_ok(&serde_json::json!({"ok": 1})));
/// assert!(!is_ok(&serde_json::json!({"ok": 0, "error": 3})));
/// ```
pub fn is_ok(payload: &Value) -> bool {
    match payload.get("ok") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}

/// Returns `true` when the `ok` member of `payload` equals one.
///
/// `true`, the number `1` and a string holding the number one (`"1"`,
/// `" 1.0 "`) match. Any other value, `2` and `"yes"` included, is a failed
/// draft save.
///
/// # Example
///
/// ```
/// use journal_core::reply::is_draft_saved;
///
/// assert!(is_draft_saved(&serde_json::json!({"ok": 1, "draft_id": "abc"})));
/// assert!(!is_draft_saved(&serde_json::json!({"ok": 2, "draft_id": "abc"})));
/// ```
pub fn is_draft_saved(payload: &Value) -> bool {
    match payload.get("ok") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().is_ok_and(|v| v == 1.0),
        Some(Value::Null | Value::Array(_) | Value::Object(_)) | None => false,
    }
}

/// Human-readable message of a reply, if the server sent one.
///
/// The journal server puts its message under the `_` key.
pub fn message(payload: &Value) -> Option<&str> {
    payload
        .get("_")
        .or_else(|| payload.get("message"))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_flags() {
        assert!(is_ok(&json!({"ok": 1})));
        assert!(is_ok(&json!({"ok": 2.5})));
        assert!(!is_ok(&json!({"ok": 0})));
    }

    #[test]
    fn boolean_and_string_flags() {
        assert!(is_ok(&json!({"ok": true})));
        assert!(!is_ok(&json!({"ok": false})));
        assert!(is_ok(&json!({"ok": "yes"})));
        assert!(is_ok(&json!({"ok": "0"})));
        assert!(!is_ok(&json!({"ok": ""})));
    }

    #[test]
    fn missing_or_null_flag_is_failure() {
        assert!(!is_ok(&json!({})));
        assert!(!is_ok(&json!({"ok": null})));
        assert!(!is_ok(&json!([1, 2])));
    }

    #[test]
    fn containers_are_truthy() {
        assert!(is_ok(&json!({"ok": []})));
        assert!(is_ok(&json!({"ok": {}})));
    }

    #[test]
    fn draft_saves_need_ok_equal_to_one() {
        assert!(is_draft_saved(&json!({"ok": 1})));
        assert!(is_draft_saved(&json!({"ok": 1.0})));
        assert!(is_draft_saved(&json!({"ok": true})));
        assert!(is_draft_saved(&json!({"ok": "1"})));
        assert!(is_draft_saved(&json!({"ok": " 1 "})));

        assert!(!is_draft_saved(&json!({"ok": 2})));
        assert!(!is_draft_saved(&json!({"ok": "yes"})));
        assert!(!is_draft_saved(&json!({"ok": 0})));
        assert!(!is_draft_saved(&json!({"ok": [1]})));
        assert!(!is_draft_saved(&json!({"draft_id": "abc"})));
    }

    #[test]
    fn message_prefers_underscore_key() {
        assert_eq!(
            message(&json!({"_": "Draft saved", "message": "x"})),
            Some("Draft saved")
        );
        assert_eq!(message(&json!({"message": "bad"})), Some("bad"));
        assert_eq!(message(&json!({"ok": 0})), None);
    }
}
