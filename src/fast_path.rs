//! Fast-Path KPI Resolver (C5, SPEC §4.5): answers `kpi_current` directly
//! from the [`OperationalSnapshot`], with no model call.

use crate::domain::{Citation, Fact, Intent, SourceKind, Warning, WarningCode};
use crate::domain::OperationalSnapshot;

const FAST_PATH_CONFIDENCE: f64 = 0.95;
const FAST_PATH_TRUST_INDEX: f64 = 0.9;

const KNOWN_KPIS: &[&str] = &["oee", "fpy", "availability", "performance", "quality", "rework"];

/// Result of the fast path: facts (possibly empty) plus warnings, ready to
/// hand to the Guardrail Validator alongside `intent = KpiCurrent`.
pub struct FastPathResult {
    pub facts: Vec<Fact>,
    pub warnings: Vec<Warning>,
}

/// Which KPI names the query text mentions; empty means "all" (SPEC §4.5:
/// "or all if the query is ambiguous").
fn requested_kpis(query_text: &str) -> Vec<&'static str> {
    let lower = query_text.to_lowercase();
    KNOWN_KPIS
        .iter()
        .copied()
        .filter(|kpi| lower.contains(kpi) || (*kpi == "rework" && lower.contains("rework_rate")))
        .collect()
}

/// Resolve `intent = kpi_current` directly from the snapshot, never calling
/// the model (SPEC §4.5: target <= 500ms end-to-end).
pub fn resolve(query_text: &str, snapshot: &OperationalSnapshot) -> FastPathResult {
    let requested = requested_kpis(query_text);
    let kpi_names: Vec<&str> = if requested.is_empty() {
        KNOWN_KPIS.to_vec()
    } else {
        requested
    };

    let window_ref = snapshot.window_ref();
    let mut facts = Vec::new();
    let mut unresolved = Vec::new();

    for kpi in kpi_names {
        match snapshot.kpi(kpi) {
            Some(value) => {
                let citation = Citation::new(SourceKind::Calculation, window_ref.clone(), format!("{kpi} over current window"))
                    .with_confidence(FAST_PATH_CONFIDENCE)
                    .with_trust_index(FAST_PATH_TRUST_INDEX);
                facts.push(Fact::new(format!("{kpi} is {value:.1}"), vec![citation]));
            }
            None => unresolved.push(kpi),
        }
    }

    let mut warnings = Vec::new();
    if facts.is_empty() {
        warnings.push(Warning::new(
            WarningCode::InsufficientEvidence,
            format!(
                "no current value available for: {}",
                unresolved.join(", ")
            ),
        ));
    }

    FastPathResult { facts, warnings }
}

/// Whether this intent can be answered by [`resolve`] (SPEC §4.4/§4.5).
pub fn handles(intent: Intent) -> bool {
    intent.is_fast_path()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snapshot_with_oee(value: Option<f64>) -> OperationalSnapshot {
        let end = Utc::now();
        let mut snap = OperationalSnapshot::empty(end - chrono::Duration::hours(24), end);
        snap.oee = value;
        snap
    }

    #[test]
    fn resolves_requested_kpi_with_calculation_citation() {
        let snap = snapshot_with_oee(Some(47.0));
        let result = resolve("what is the current OEE", &snap);
        assert_eq!(result.facts.len(), 1);
        assert!(result.warnings.is_empty());
        let citation = &result.facts[0].citations[0];
        assert_eq!(citation.source_kind, SourceKind::Calculation);
        assert_eq!(citation.confidence, FAST_PATH_CONFIDENCE);
        assert_eq!(citation.trust_index, FAST_PATH_TRUST_INDEX);
    }

    #[test]
    fn ambiguous_query_resolves_all_known_kpis() {
        let end = Utc::now();
        let mut snap = OperationalSnapshot::empty(end - chrono::Duration::hours(24), end);
        snap.oee = Some(10.0);
        snap.fpy = Some(20.0);
        snap.availability = Some(30.0);
        snap.performance = Some(40.0);
        snap.quality = Some(50.0);
        snap.rework_rate = Some(1.0);

        let result = resolve("how are we doing right now", &snap);
        assert_eq!(result.facts.len(), 6);
    }

    #[test]
    fn null_kpi_yields_insufficient_evidence_and_no_facts() {
        let snap = snapshot_with_oee(None);
        let result = resolve("current OEE please", &snap);
        assert!(result.facts.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, WarningCode::InsufficientEvidence);
    }
}
