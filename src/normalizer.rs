//! Response Normalizer (C8, SPEC §4.8): stamps a validated reply with a
//! suggestion id, correlation id and meta, and guarantees array fields are
//! never absent.

use uuid::Uuid;

use crate::domain::{CopilotResponse, Intent, ResponseMeta, ResponseType, WarningCode};
use crate::guardrail::ValidatedReply;

/// Inputs gathered across the pipeline that only become known once
/// generation (or the fast path) has finished.
pub struct NormalizeInput {
    pub intent: Intent,
    pub model_name: String,
    pub token_count: u32,
    pub latency_ms: u64,
    pub correlation_id: Option<String>,
}

/// Finalize a [`ValidatedReply`] into the [`CopilotResponse`] returned to
/// the caller (SPEC §4.8).
pub fn normalize(validated: ValidatedReply, input: NormalizeInput) -> CopilotResponse {
    let validation_passed = !validated
        .warnings
        .iter()
        .any(|w| w.code == WarningCode::ValidationFailed);

    let response_type = parse_response_type(&validated.response_type_hint);

    CopilotResponse {
        suggestion_id: Uuid::new_v4().to_string(),
        correlation_id: input.correlation_id,
        response_type,
        intent: input.intent,
        summary: validated.summary,
        facts: validated.facts,
        actions: validated.actions,
        warnings: validated.warnings,
        meta: ResponseMeta {
            model_name: input.model_name,
            token_count: input.token_count,
            latency_ms: input.latency_ms,
            validation_passed,
        },
    }
}

fn parse_response_type(hint: &str) -> ResponseType {
    match hint {
        "RUNBOOK_RESULT" => ResponseType::RunbookResult,
        "PROPOSAL" => ResponseType::Proposal,
        "ERROR" => ResponseType::Error,
        _ => ResponseType::Answer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Warning;

    fn validated(warnings: Vec<Warning>) -> ValidatedReply {
        ValidatedReply {
            response_type_hint: "ANSWER".to_string(),
            summary: "OEE is 47%".to_string(),
            facts: Vec::new(),
            actions: Vec::new(),
            warnings,
        }
    }

    fn input() -> NormalizeInput {
        NormalizeInput {
            intent: Intent::KpiCurrent,
            model_name: "llama3".into(),
            token_count: 42,
            latency_ms: 120,
            correlation_id: Some("corr-1".into()),
        }
    }

    #[test]
    fn validation_passed_true_when_no_validation_failed_warning() {
        let response = normalize(validated(Vec::new()), input());
        assert!(response.meta.validation_passed);
    }

    #[test]
    fn validation_passed_false_when_validation_failed_present() {
        let response = normalize(
            validated(vec![Warning::new(WarningCode::ValidationFailed, "bad json")]),
            input(),
        );
        assert!(!response.meta.validation_passed);
    }

    #[test]
    fn fresh_suggestion_id_and_propagated_correlation_id() {
        let r1 = normalize(validated(Vec::new()), input());
        let r2 = normalize(validated(Vec::new()), input());
        assert_ne!(r1.suggestion_id, r2.suggestion_id);
        assert_eq!(r1.correlation_id, Some("corr-1".to_string()));
    }

    #[test]
    fn arrays_default_to_empty_not_absent() {
        let response = normalize(validated(Vec::new()), input());
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("facts").unwrap().is_array());
        assert!(json.get("actions").unwrap().is_array());
        assert!(json.get("warnings").unwrap().is_array());
    }
}
