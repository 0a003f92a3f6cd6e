//! The response shape returned by `process_ask` (SPEC §3, §4.8, §6).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Action, Citation, Fact, Intent, Warning, WarningCode};

/// What kind of answer this response carries (SPEC §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseType {
    Answer,
    RunbookResult,
    Proposal,
    Error,
}

/// Non-content bookkeeping attached to every response (SPEC §3, §4.8).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub model_name: String,
    pub token_count: u32,
    pub latency_ms: u64,
    pub validation_passed: bool,
}

/// The final, normalized, citation-bearing answer to a copilot request
/// (SPEC §3, §4.8). This is the only type the orchestrator hands back to a
/// caller or persists as a turn's copilot message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopilotResponse {
    pub suggestion_id: String,
    #[serde(default)]
    pub correlation_id: Option<String>,
    pub response_type: ResponseType,
    pub intent: Intent,
    pub summary: String,
    #[serde(default)]
    pub facts: Vec<Fact>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
    pub meta: ResponseMeta,
}

impl CopilotResponse {
    /// An `ERROR` response: no facts, no actions, exactly the warning that
    /// caused it (SPEC §4.7 step 7, §7). Always a fresh suggestion id.
    pub fn error(intent: Intent, summary: impl Into<String>, warnings: Vec<Warning>, meta: ResponseMeta) -> Self {
        Self {
            suggestion_id: Uuid::new_v4().to_string(),
            correlation_id: None,
            response_type: ResponseType::Error,
            intent,
            summary: summary.into(),
            facts: Vec::new(),
            actions: Vec::new(),
            warnings,
            meta,
        }
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// SPEC §3 invariant 2: for `ANSWER`/`PROPOSAL`, either every fact is
    /// cited and `facts` is non-empty, or `INSUFFICIENT_EVIDENCE` is
    /// present — never both, never neither.
    pub fn satisfies_evidence_invariant(&self) -> bool {
        if !matches!(self.response_type, ResponseType::Answer | ResponseType::Proposal) {
            return true;
        }
        let has_grounded_facts = !self.facts.is_empty() && self.facts.iter().all(|f| f.is_cited());
        let has_insufficient_evidence_warning = self
            .warnings
            .iter()
            .any(|w| w.code == WarningCode::InsufficientEvidence);
        has_grounded_facts != has_insufficient_evidence_warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Citation, SourceKind};

    fn meta() -> ResponseMeta {
        ResponseMeta {
            model_name: "llama3".into(),
            token_count: 120,
            latency_ms: 10,
            validation_passed: true,
        }
    }

    #[test]
    fn error_response_has_no_facts_or_actions() {
        let r = CopilotResponse::error(
            Intent::Generic,
            "I can't help with that request.",
            vec![Warning::new(WarningCode::SecurityFlag, "prompt injection detected")],
            meta(),
        );
        assert_eq!(r.response_type, ResponseType::Error);
        assert!(r.facts.is_empty());
        assert!(r.actions.is_empty());
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn evidence_invariant_rejects_uncited_facts_without_warning() {
        let mut r = CopilotResponse::error(Intent::KpiCurrent, "x", vec![], meta());
        r.response_type = ResponseType::Answer;
        r.facts.push(Fact::new("OEE is 47%", Vec::new()));
        assert!(!r.satisfies_evidence_invariant());
    }

    #[test]
    fn evidence_invariant_accepts_cited_facts() {
        let mut r = CopilotResponse::error(Intent::KpiCurrent, "x", vec![], meta());
        r.response_type = ResponseType::Answer;
        r.facts.push(Fact::new(
            "OEE is 47%",
            vec![Citation::new(SourceKind::Calculation, "w1", "24h window")],
        ));
        assert!(r.satisfies_evidence_invariant());
    }

    #[test]
    fn evidence_invariant_accepts_insufficient_evidence_warning_with_no_facts() {
        let mut r = CopilotResponse::error(Intent::KpiCurrent, "x", vec![], meta());
        r.response_type = ResponseType::Answer;
        r.warnings.push(Warning::new(WarningCode::InsufficientEvidence, "no data"));
        assert!(r.satisfies_evidence_invariant());
    }
}
