//! PII / employee-identifier redaction applied to a validated response
//! before it leaves the guardrail (SPEC §4.7 step 5).
//!
//! Redaction runs after citation grounding so that markers still resolve —
//! it only ever rewrites the human-readable text, never a citation's ref.

use std::sync::OnceLock;

use regex::Regex;

fn employee_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\b(?:employee|operator|technician|supervisor)\s+([A-Z][a-z]+(?:\s[A-Z][a-z]+)?)\b")
            .expect("employee name pattern compiles")
    })
}

fn employee_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\bEMP-\d{4,8}\b").expect("employee id pattern compiles"))
}

/// Replace employee names and employee-id tokens with a stable role+id
/// placeholder. Matches are found once up front, then replaced back to
/// front so earlier byte offsets stay valid.
pub fn redact(text: &str) -> String {
    let mut out = text.to_string();
    out = redact_pattern(&out, employee_id_pattern(), "[EMPLOYEE]");
    out = redact_with_role(&out);
    out
}

fn redact_pattern(text: &str, re: &Regex, placeholder: &str) -> String {
    let mut out = text.to_string();
    let matches: Vec<(usize, usize)> = re.find_iter(text).map(|m| (m.start(), m.end())).collect();
    for (start, end) in matches.into_iter().rev() {
        out = format!("{}{}{}", &out[..start], placeholder, &out[end..]);
    }
    out
}

fn redact_with_role(text: &str) -> String {
    let re = employee_name_pattern();
    let matches: Vec<(usize, usize, String)> = re
        .captures_iter(text)
        .filter_map(|c| {
            let whole = c.get(0)?;
            Some((whole.start(), whole.end(), c[0].split_whitespace().next()?.to_lowercase()))
        })
        .collect();

    let mut out = text.to_string();
    for (start, end, role) in matches.into_iter().rev() {
        let placeholder = format!("{role} [REDACTED]");
        out = format!("{}{}{}", &out[..start], placeholder, &out[end..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_employee_id_tokens() {
        let redacted = redact("Assigned to EMP-10234 for rework.");
        assert!(!redacted.contains("EMP-10234"));
        assert!(redacted.contains("[EMPLOYEE]"));
    }

    #[test]
    fn redacts_named_employee_with_role_preserved() {
        let redacted = redact("Operator Jane Doe flagged the defect.");
        assert!(!redacted.contains("Jane Doe"));
        assert!(redacted.starts_with("operator [REDACTED]"));
    }

    #[test]
    fn leaves_unrelated_text_untouched() {
        let text = "OEE dropped to 47% during the afternoon shift.";
        assert_eq!(redact(text), text);
    }

    #[test]
    fn handles_multiple_matches_without_corrupting_offsets() {
        let redacted = redact("Technician Amy Lee and operator Bob Young both logged EMP-99887.");
        assert!(!redacted.contains("Amy Lee"));
        assert!(!redacted.contains("Bob Young"));
        assert!(!redacted.contains("EMP-99887"));
    }
}
