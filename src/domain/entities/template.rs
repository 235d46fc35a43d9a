//! Minimal `{{ field }}` template rendering for text replies

use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde_json::Value;

use crate::application::errors::ActionError;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(.*?)\s*\}\}").expect("placeholder pattern is valid")
});

/// Substitutes every `{{ path }}` in `template` with the matching field of
/// `data`. Dotted paths walk nested objects; keys are taken verbatim, so
/// `{{ user-name }}` reads the `user-name` field.
pub fn render(template: &str, data: &Value) -> Result<String, ActionError> {
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(path)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        match resolve(data, path.as_str())? {
            Value::String(s) => out.push_str(s),
            other => out.push_str(&other.to_string()),
        }
        last = whole.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}

fn resolve<'a>(data: &'a Value, path: &str) -> Result<&'a Value, ActionError> {
    if path.split('.').any(str::is_empty) {
        return Err(ActionError::Formatting(format!(
            "malformed placeholder `{{{{ {} }}}}`",
            path
        )));
    }
    path.split('.').try_fold(data, |current, key| {
        current
            .as_object()
            .and_then(|map| map.get(key))
            .ok_or_else(|| ActionError::Formatting(format!("missing field `{}`", path)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_plain_text() {
        let out = render("Bot test command executed.", &Value::Null).unwrap();
        assert_eq!(out, "Bot test command executed.");
    }

    #[test]
    fn test_render_fields() {
        let data = json!({"user": "ann", "count": 3, "nested": {"ok": true}});
        let out = render("{{user}} has {{ count }} items ({{ nested.ok }})", &data).unwrap();
        assert_eq!(out, "ann has 3 items (true)");
    }

    #[test]
    fn test_render_structured_value_as_json() {
        let data = json!({"tags": ["a", "b"]});
        assert_eq!(render("tags: {{ tags }}", &data).unwrap(), r#"tags: ["a","b"]"#);
    }

    #[test]
    fn test_missing_field_fails() {
        let err = render("hello {{ who }}", &json!({"name": "x"})).unwrap_err();
        assert!(matches!(err, ActionError::Formatting(msg) if msg.contains("who")));
    }

    #[test]
    fn test_field_on_non_object_fails() {
        assert!(render("{{ a }}", &Value::Null).is_err());
        assert!(render("{{ a.b }}", &json!({"a": 1})).is_err());
    }

    #[test]
    fn test_non_identifier_keys() {
        let data = json!({"user-name": "ann", "0": "zero"});
        assert_eq!(render("Hi {{ user-name }}", &data).unwrap(), "Hi ann");
        assert_eq!(render("{{0}}", &data).unwrap(), "zero");

        let err = render("Hi {{ user-name }}", &json!({"other": 1})).unwrap_err();
        assert!(matches!(err, ActionError::Formatting(msg) if msg.contains("user-name")));
        assert!(render("{{ 0 }}", &json!({"other": 1})).is_err());
    }

    #[test]
    fn test_malformed_placeholder_fails() {
        for template in ["{{ }}", "{{}}", "{{ a..b }}", "{{ .a }}", "{{ a. }}"] {
            let err = render(template, &json!({"a": {"b": 1}})).unwrap_err();
            assert!(matches!(err, ActionError::Formatting(_)), "{}", template);
        }
    }

    #[test]
    fn test_unclosed_braces_are_text() {
        assert_eq!(render("{{ a", &json!({"a": 1})).unwrap(), "{{ a");
    }
}
