//! Citations, supporting facts, actions and warnings attached to a response
//! (SPEC §3, §4.6, §4.7).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a cited fact came from (SPEC §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Db,
    Rag,
    Event,
    Calculation,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceKind::Db => "DB",
            SourceKind::Rag => "RAG",
            SourceKind::Event => "EVENT",
            SourceKind::Calculation => "calculation",
        };
        write!(f, "{}", s)
    }
}

/// A single verifiable reference backing part of a response (SPEC §3).
///
/// `source_ref` is the opaque string the model was instructed to cite
/// inline, e.g. the bracketed marker `[RAG:doc-42:3]` carries `doc-42:3`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub source_kind: SourceKind,
    pub source_ref: String,
    pub label: String,
    pub confidence: f64,
    pub trust_index: f64,
}

impl Citation {
    pub fn new(source_kind: SourceKind, source_ref: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            source_kind,
            source_ref: source_ref.into(),
            label: label.into(),
            confidence: 1.0,
            trust_index: 1.0,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_trust_index(mut self, trust_index: f64) -> Self {
        self.trust_index = trust_index;
        self
    }

    /// The exact bracketed marker form emitted into prompts and expected
    /// back in model replies (SPEC §4.6).
    pub fn marker(&self) -> String {
        format!("[{}:{}]", self.source_kind, self.source_ref)
    }
}

/// A single factual claim the guardrail extracted from the model's reply
/// (SPEC §3). Must carry at least one citation unless the enclosing
/// response already records `INSUFFICIENT_EVIDENCE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl Fact {
    pub fn new(text: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            text: text.into(),
            citations,
        }
    }

    pub fn is_cited(&self) -> bool {
        !self.citations.is_empty()
    }
}

/// Closed allow-list of actions the copilot may suggest (SPEC §3, §4.7).
/// Any model-proposed action outside this set is dropped, not reworded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    CreateDecisionPr,
    DryRun,
    OpenEntity,
    RunRunbook,
}

/// A suggested next action attached to a response (SPEC §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub action_type: ActionType,
    pub label: String,
    pub requires_approval: bool,
    #[serde(default)]
    pub payload: Value,
}

/// Closed allow-list of warning codes attached to a response (SPEC §3, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    InsufficientEvidence,
    SecurityFlag,
    LowTrustIndex,
    ModelOffline,
    ValidationFailed,
    RateLimited,
}

/// A machine-readable warning surfaced alongside (or instead of) an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub code: WarningCode,
    pub message: String,
}

impl Warning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citation_marker_matches_source_kind_format() {
        let c = Citation::new(SourceKind::Rag, "doc-42:3", "changeover runbook");
        assert_eq!(c.marker(), "[RAG:doc-42:3]");

        let c = Citation::new(SourceKind::Calculation, "2026-07-31..2026-08-01", "24h snapshot");
        assert_eq!(c.marker(), "[calculation:2026-07-31..2026-08-01]");
    }

    #[test]
    fn fact_without_citations_is_not_cited() {
        let fact = Fact::new("OEE is 47%", Vec::new());
        assert!(!fact.is_cited());
    }

    #[test]
    fn action_type_serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&ActionType::CreateDecisionPr).unwrap();
        assert_eq!(json, "\"CREATE_DECISION_PR\"");
        let json = serde_json::to_string(&ActionType::RunRunbook).unwrap();
        assert_eq!(json, "\"RUN_RUNBOOK\"");
    }

    #[test]
    fn warning_code_round_trips_through_json() {
        let w = Warning::new(WarningCode::LowTrustIndex, "below threshold");
        let json = serde_json::to_string(&w).unwrap();
        let back: Warning = serde_json::from_str(&json).unwrap();
        assert_eq!(w, back);
        assert!(json.contains("LOW_TRUST_INDEX"));
    }
}
