//! S-expression helpers — plist lookup for config input and event
//! formatting for output.
//!
//! Output follows the `(:type :event :event :NAME ...)` shape so events can
//! be fed straight to an Emacs-side consumer.

use lexpr::Value;

/// Look up a config setting such as `:pitch-sign` or `:cooldown-ms`.
///
/// `key` is given without the colon.  The value comes back as text so each
/// field can apply its own parsing: `positive-is-up` and `:positive-is-up`
/// both yield `"positive-is-up"`, and `nil` yields `"nil"`.
pub fn get_keyword(value: &Value, key: &str) -> Option<String> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            let Value::Cons(next) = pair.cdr() else {
                return None;
            };
            let val = next.car();
            return match val {
                Value::Keyword(v) => Some(v.to_string()),
                Value::Symbol(v) => Some(v.strip_prefix(':').unwrap_or(&**v).to_string()),
                Value::String(v) => Some(v.to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(if *b { "t" } else { "nil" }.to_string()),
                Value::Null | Value::Nil => Some("nil".to_string()),
                _ => Some(val.to_string()),
            };
        }
        current = pair.cdr();
    }
    None
}

/// Extract a floating-point value from an s-expression plist.
pub fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Escape a string for s-expression output.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Format an event message with pre-rendered field values.
pub fn format_event(event_type: &str, fields: &[(&str, &str)]) -> String {
    let mut s = format!("(:type :event :event :{}", event_type);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}

/// Render a bool the elisp way.
pub fn bool_sexp(b: bool) -> &'static str {
    if b {
        "t"
    } else {
        "nil"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Value {
        lexpr::from_str(raw).unwrap()
    }

    #[test]
    fn test_get_keyword_symbol_form() {
        let v = parse("(:pitch-sign positive-is-down :cooldown-ms 250)");
        assert_eq!(get_keyword(&v, "pitch-sign").as_deref(), Some("positive-is-down"));
        assert_eq!(get_keyword(&v, "cooldown-ms").as_deref(), Some("250"));
        assert_eq!(get_keyword(&v, "missing"), None);
    }

    #[test]
    fn test_get_keyword_strips_colon_from_value() {
        let v = parse("(:pitch-sign :positive-is-up)");
        assert_eq!(get_keyword(&v, "pitch-sign").as_deref(), Some("positive-is-up"));
    }

    #[test]
    fn test_get_keyword_trailing_key_has_no_value() {
        let v = parse("(:yaw-threshold)");
        assert_eq!(get_keyword(&v, "yaw-threshold"), None);
    }

    #[test]
    fn test_get_float() {
        let v = parse("(:pitch-threshold 0.04 :cooldown-ms 500 :label \"x\")");
        assert_eq!(get_float(&v, "pitch-threshold"), Some(0.04));
        assert_eq!(get_float(&v, "cooldown-ms"), Some(500.0));
        assert_eq!(get_float(&v, "label"), None);
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string(r#"a "b" \c"#), r#"a \"b\" \\c"#);
    }

    #[test]
    fn test_format_event() {
        let s = format_event("head-gesture", &[("gesture", ":up"), ("timestamp", "0.100")]);
        assert_eq!(s, "(:type :event :event :head-gesture :gesture :up :timestamp 0.100)");
    }

    #[test]
    fn test_format_event_no_fields() {
        assert_eq!(format_event("ping", &[]), "(:type :event :event :ping)");
    }
}
