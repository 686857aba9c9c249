//! Sensitive-content redaction applied before any text leaves the process.

use regex::Regex;
use std::sync::LazyLock;

/// A class of sensitive data paired with its matching rule.
struct SensitivePattern {
    label: &'static str,
    matcher: Regex,
}

/// Process-wide pattern set, fixed at startup and applied in declaration order.
///
/// Placeholder tokens contain no digits or `@`, so neither pattern can match
/// already-redacted text — redaction stays idempotent.
static SENSITIVE_PATTERNS: LazyLock<Vec<SensitivePattern>> = LazyLock::new(|| {
    vec![
        SensitivePattern {
            label: "PHONE",
            matcher: Regex::new(r"\+?\d[\d\-\(\) ]{6,}\d").expect("valid PHONE pattern"),
        },
        SensitivePattern {
            label: "EMAIL",
            matcher: Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+")
                .expect("valid EMAIL pattern"),
        },
    ]
});

/// Replace every match of every configured sensitive pattern with `<REDACTED:LABEL>`.
///
/// Patterns are applied sequentially in declaration order, so a span claimed by an
/// earlier pattern is no longer visible to later ones. Pure: the same input always
/// yields the same output, and a pattern with zero matches leaves the text unchanged.
pub fn redact(text: &str) -> String {
    let mut redacted = text.to_string();
    for pattern in SENSITIVE_PATTERNS.iter() {
        let placeholder = format!("<REDACTED:{}>", pattern.label);
        redacted = pattern
            .matcher
            .replace_all(&redacted, placeholder.as_str())
            .into_owned();
    }
    redacted
}
