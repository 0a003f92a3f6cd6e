//! Persisted conversation history and suggestion audit trail (SPEC §3, §4.10).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CopilotResponse, Intent, TenantId, UserId};

/// Who authored a turn in a conversation (SPEC §3: actor role).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Copilot,
}

/// One turn of a conversation (SPEC §3).
///
/// `content_structured` is populated only for `role == Copilot`, holding
/// the serialized [`CopilotResponse`]; user turns carry `content_text`
/// alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: MessageRole,
    pub content_text: String,
    #[serde(default)]
    pub content_structured: Option<CopilotResponse>,
    pub created_at: DateTime<Utc>,
}

/// A persisted conversation thread, scoped to a tenant and user (SPEC §3,
/// §4.10). Created explicitly; never auto-created by appending a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_message_at: DateTime<Utc>,
    pub archived: bool,
}

impl Conversation {
    pub fn new(tenant_id: TenantId, user_id: UserId, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id,
            user_id,
            title,
            created_at: now,
            last_message_at: now,
            archived: false,
        }
    }
}

/// Immutable audit record of one answered request, retained independently
/// of the conversation it arose from (SPEC §3: written unconditionally for
/// every answered request).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionAudit {
    pub suggestion_id: String,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub query_text: String,
    pub resolved_intent: Intent,
    pub full_response: CopilotResponse,
    pub created_at: DateTime<Utc>,
}

impl SuggestionAudit {
    pub fn new(
        tenant_id: TenantId,
        user_id: UserId,
        query_text: impl Into<String>,
        resolved_intent: Intent,
        full_response: CopilotResponse,
    ) -> Self {
        Self {
            suggestion_id: full_response.suggestion_id.clone(),
            tenant_id,
            user_id,
            query_text: query_text.into(),
            resolved_intent,
            full_response,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResponseMeta;

    #[test]
    fn new_conversation_has_matching_created_and_last_message() {
        let convo = Conversation::new(TenantId::from("acme"), UserId::from("u1"), None);
        assert_eq!(convo.created_at, convo.last_message_at);
        assert!(!convo.archived);
    }

    #[test]
    fn suggestion_audit_carries_same_id_as_its_response() {
        let response = CopilotResponse::error(
            Intent::Generic,
            "x",
            vec![],
            ResponseMeta {
                model_name: "llama3".into(),
                token_count: 0,
                latency_ms: 1,
                validation_passed: false,
            },
        );
        let suggestion_id = response.suggestion_id.clone();
        let audit = SuggestionAudit::new(
            TenantId::from("acme"),
            UserId::from("u1"),
            "why is OEE low",
            Intent::ExplainOee,
            response,
        );
        assert_eq!(audit.suggestion_id, suggestion_id);
    }
}
