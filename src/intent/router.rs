//! Rule-based intent classifier (C4, SPEC §4.4).

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::Intent;

struct RulePatterns {
    kpi_current: Regex,
    explain_oee: Regex,
    explain_plan_change: Regex,
    quality_summary: Regex,
    runbook_request: Regex,
}

fn patterns() -> &'static RulePatterns {
    static PATTERNS: OnceLock<RulePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| RulePatterns {
        kpi_current: Regex::new(
            r"(?i)\b(current|now|today)\b.*\b(oee|fpy|availability|performance|quality|rework)\b|\b(oee|fpy|availability|performance|quality|rework)\b.*\b(current|now|today)\b",
        )
        .expect("kpi_current pattern compiles"),
        explain_oee: Regex::new(
            r"(?i)\b(why|porque)\b.*\b(oee|fpy|availability|performance|quality|rework)\b",
        )
        .expect("explain_oee pattern compiles"),
        explain_plan_change: Regex::new(r"(?i)\b(plan|schedule)\b.*\b(change|why)\b")
            .expect("explain_plan_change pattern compiles"),
        quality_summary: Regex::new(r"(?i)\b(quality|defects|errors)\b.*\b(summary|report|today)\b|\bsummar(y|ize)\b.*\b(quality|defects|errors)\b")
            .expect("quality_summary pattern compiles"),
        runbook_request: Regex::new(r"(?i)\brunbook\b").expect("runbook_request pattern compiles"),
    })
}

/// Classify raw query text into an [`Intent`], in strict priority order —
/// first match wins (SPEC §4.4).
pub fn classify(query_text: &str) -> Intent {
    let p = patterns();

    if p.kpi_current.is_match(query_text) {
        return Intent::KpiCurrent;
    }
    if p.explain_oee.is_match(query_text) {
        return Intent::ExplainOee;
    }
    if p.explain_plan_change.is_match(query_text) {
        return Intent::ExplainPlanChange;
    }
    if p.quality_summary.is_match(query_text) {
        return Intent::QualitySummary;
    }
    if p.runbook_request.is_match(query_text) {
        return Intent::RunbookRequest;
    }
    Intent::Generic
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_kpi_current() {
        assert_eq!(classify("what is the current OEE?"), Intent::KpiCurrent);
        assert_eq!(classify("OEE now"), Intent::KpiCurrent);
        assert_eq!(classify("how is availability today"), Intent::KpiCurrent);
    }

    #[test]
    fn classifies_explain_oee_before_generic() {
        assert_eq!(classify("why is OEE low this week"), Intent::ExplainOee);
    }

    #[test]
    fn classifies_plan_change() {
        assert_eq!(
            classify("why did the schedule change for line 2"),
            Intent::ExplainPlanChange
        );
    }

    #[test]
    fn classifies_quality_summary() {
        assert_eq!(
            classify("give me a quality summary for today"),
            Intent::QualitySummary
        );
    }

    #[test]
    fn classifies_runbook_request() {
        assert_eq!(
            classify("show me the runbook for changeover"),
            Intent::RunbookRequest
        );
    }

    #[test]
    fn falls_back_to_generic() {
        assert_eq!(classify("hello there"), Intent::Generic);
    }

    #[test]
    fn kpi_current_takes_priority_over_explain() {
        // Contains both a KPI-now trigger and a "why" trigger; priority 1 wins.
        assert_eq!(
            classify("why is current OEE so low"),
            Intent::KpiCurrent
        );
    }
}
