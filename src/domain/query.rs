//! Inbound query shape, derived intent, and context budget (SPEC §3, §4.4).

use serde::{Deserialize, Serialize};

/// A copilot request, as received by the orchestrator (SPEC §6 `process_ask`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub user_query: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub context_window_hours: Option<u32>,
    #[serde(default = "default_include_citations")]
    pub include_citations: bool,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

fn default_include_citations() -> bool {
    true
}

impl AskRequest {
    pub fn new(user_query: impl Into<String>) -> Self {
        Self {
            user_query: user_query.into(),
            entity_type: None,
            entity_id: None,
            conversation_id: None,
            context_window_hours: None,
            include_citations: true,
            idempotency_key: None,
        }
    }

    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn with_context_window_hours(mut self, hours: u32) -> Self {
        self.context_window_hours = Some(hours);
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Collapses `entity_type`/`entity_id` into the single opaque hint the
    /// Context Builder's `(tenant, window_hours, entity_hint)` input expects
    /// (SPEC §4.3).
    pub fn entity_hint(&self) -> Option<String> {
        match (&self.entity_type, &self.entity_id) {
            (Some(t), Some(id)) => Some(format!("{t}:{id}")),
            (Some(t), None) => Some(t.clone()),
            (None, Some(id)) => Some(id.clone()),
            (None, None) => None,
        }
    }

    /// Validate the request shape itself (SPEC §8 boundary: query length).
    ///
    /// This is a pure check with no I/O, run before any rate-limit or model
    /// call — a failure here never consumes quota.
    pub fn validate(&self) -> Result<(), String> {
        if self.user_query.is_empty() {
            return Err("user_query must not be empty".to_string());
        }
        if self.user_query.chars().count() > 2000 {
            return Err("user_query must not exceed 2000 characters".to_string());
        }
        if let Some(hours) = self.context_window_hours {
            if !(1..=720).contains(&hours) {
                return Err("context_window_hours must be between 1 and 720".to_string());
            }
        }
        Ok(())
    }
}

/// Closed set of classified intents (SPEC §3). Derived per-request, never
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    KpiCurrent,
    ExplainOee,
    ExplainPlanChange,
    QualitySummary,
    DataIntegrity,
    RunbookRequest,
    Generic,
}

impl Intent {
    /// Whether this intent is answered by the fast path (SPEC §4.4/§4.5).
    pub fn is_fast_path(&self) -> bool {
        matches!(self, Intent::KpiCurrent)
    }

    /// The context budget this intent requires downstream (SPEC §4.4/§4.6).
    pub fn context_budget(&self) -> ContextBudget {
        match self {
            Intent::KpiCurrent => ContextBudget::Small,
            Intent::ExplainOee | Intent::QualitySummary | Intent::DataIntegrity => {
                ContextBudget::Medium
            }
            Intent::ExplainPlanChange => ContextBudget::Medium,
            Intent::RunbookRequest => ContextBudget::Large,
            Intent::Generic => ContextBudget::Medium,
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Intent::KpiCurrent => "kpi_current",
            Intent::ExplainOee => "explain_oee",
            Intent::ExplainPlanChange => "explain_plan_change",
            Intent::QualitySummary => "quality_summary",
            Intent::DataIntegrity => "data_integrity",
            Intent::RunbookRequest => "runbook_request",
            Intent::Generic => "generic",
        };
        write!(f, "{}", s)
    }
}

/// Prompt size budget selected by the Intent Router (SPEC §4.4/§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextBudget {
    Small,
    Medium,
    Large,
}

impl ContextBudget {
    /// Maximum prompt size in bytes for this budget tier (SPEC §4.6).
    pub fn max_prompt_bytes(&self) -> usize {
        match self {
            ContextBudget::Small => 2 * 1024,
            ContextBudget::Medium => 6 * 1024,
            ContextBudget::Large => 12 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_query() {
        let req = AskRequest::new("");
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_over_length_query() {
        let req = AskRequest::new("a".repeat(2001));
        assert!(req.validate().is_err());
    }

    #[test]
    fn accepts_boundary_length_query() {
        let req = AskRequest::new("a".repeat(2000));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_window() {
        let req = AskRequest::new("hi").with_context_window_hours(0);
        assert!(req.validate().is_err());
        let req = AskRequest::new("hi").with_context_window_hours(721);
        assert!(req.validate().is_err());
    }

    #[test]
    fn entity_hint_combines_type_and_id() {
        let req = AskRequest::new("hi").with_entity("line", "L2");
        assert_eq!(req.entity_hint(), Some("line:L2".to_string()));
        assert_eq!(AskRequest::new("hi").entity_hint(), None);
    }

    #[test]
    fn kpi_current_is_fast_path_with_small_budget() {
        assert!(Intent::KpiCurrent.is_fast_path());
        assert_eq!(Intent::KpiCurrent.context_budget(), ContextBudget::Small);
        assert_eq!(
            Intent::RunbookRequest.context_budget(),
            ContextBudget::Large
        );
    }
}
