//! SQLite-backed Conversation Store (C10, SPEC §4.10): conversations,
//! messages and suggestion audits, always scoped by tenant.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::domain::{Conversation, Intent, Message, MessageRole, SuggestionAudit, TenantId, UserId};
use crate::error::{Error, Result};

use super::schema::{initialize_schema, is_initialized};

/// Conversation and audit persistence (SPEC §4.10). Every operation
/// enforces that the target row belongs to the caller's tenant; a
/// cross-tenant id is treated as not-found, never as an error that leaks
/// the row's existence.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_conversation(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        title: Option<String>,
    ) -> Result<String>;

    async fn list_conversations(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        limit: u32,
        offset: u32,
        archived: Option<bool>,
    ) -> Result<Vec<Conversation>>;

    async fn list_messages(
        &self,
        tenant_id: &TenantId,
        conversation_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Message>>;

    async fn append_turn(
        &self,
        tenant_id: &TenantId,
        conversation_id: &str,
        user_message_text: &str,
        copilot_response: &crate::domain::CopilotResponse,
    ) -> Result<()>;

    async fn rename(&self, tenant_id: &TenantId, conversation_id: &str, title: &str) -> Result<bool>;
    async fn archive(&self, tenant_id: &TenantId, conversation_id: &str) -> Result<bool>;

    async fn record_suggestion_audit(&self, audit: &SuggestionAudit) -> Result<()>;
}

pub struct SqliteConversationStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteConversationStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| Error::storage(e.to_string()))?;
        if !is_initialized(&conn) {
            initialize_schema(&conn).map_err(|e| Error::storage(e.to_string()))?;
        }
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::storage(e.to_string()))?;
        initialize_schema(&conn).map_err(|e| Error::storage(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> rusqlite::Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| Error::internal(format!("failed to lock connection: {e}")))?;
        f(&mut conn).map_err(|e| Error::storage(e.to_string()))
    }

    fn row_to_conversation(row: &rusqlite::Row) -> rusqlite::Result<Conversation> {
        Ok(Conversation {
            id: row.get(0)?,
            tenant_id: TenantId(row.get(1)?),
            user_id: UserId(row.get(2)?),
            title: row.get(3)?,
            created_at: row.get::<_, String>(4)?.parse().unwrap_or_else(|_| Utc::now()),
            last_message_at: row.get::<_, String>(5)?.parse().unwrap_or_else(|_| Utc::now()),
            archived: row.get::<_, i64>(6)? != 0,
        })
    }

    fn row_to_message(row: &rusqlite::Row) -> rusqlite::Result<Message> {
        let role_str: String = row.get(2)?;
        let structured_json: Option<String> = row.get(4)?;
        Ok(Message {
            id: row.get(0)?,
            conversation_id: row.get(1)?,
            role: if role_str == "user" { MessageRole::User } else { MessageRole::Copilot },
            content_text: row.get(3)?,
            content_structured: structured_json.and_then(|s| serde_json::from_str(&s).ok()),
            created_at: row.get::<_, String>(5)?.parse().unwrap_or_else(|_| Utc::now()),
        })
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn create_conversation(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        title: Option<String>,
    ) -> Result<String> {
        let convo = Conversation::new(tenant_id.clone(), user_id.clone(), title);
        let id = convo.id.clone();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (id, tenant_id, user_id, title, created_at, last_message_at, archived)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0)",
                params![
                    convo.id,
                    convo.tenant_id.0,
                    convo.user_id.0,
                    convo.title,
                    convo.created_at.to_rfc3339(),
                    convo.last_message_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })?;
        Ok(id)
    }

    async fn list_conversations(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        limit: u32,
        offset: u32,
        archived: Option<bool>,
    ) -> Result<Vec<Conversation>> {
        self.with_conn(|conn| {
            let (clause, archived_val) = match archived {
                Some(flag) => (" AND archived = ?5", Some(flag as i64)),
                None => ("", None),
            };
            let sql = format!(
                "SELECT id, tenant_id, user_id, title, created_at, last_message_at, archived
                 FROM conversations WHERE tenant_id = ?1 AND user_id = ?2{clause}
                 ORDER BY last_message_at DESC LIMIT ?3 OFFSET ?4"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = if let Some(flag) = archived_val {
                stmt.query_map(
                    params![tenant_id.0, user_id.0, limit, offset, flag],
                    Self::row_to_conversation,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?
            } else {
                stmt.query_map(
                    params![tenant_id.0, user_id.0, limit, offset],
                    Self::row_to_conversation,
                )?
                .collect::<rusqlite::Result<Vec<_>>>()?
            };
            Ok(rows)
        })
    }

    async fn list_messages(
        &self,
        tenant_id: &TenantId,
        conversation_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, role, content_text, content_structured, created_at
                 FROM messages WHERE conversation_id = ?1 AND tenant_id = ?2
                 ORDER BY created_at ASC LIMIT ?3 OFFSET ?4",
            )?;
            let rows = stmt
                .query_map(params![conversation_id, tenant_id.0, limit, offset], Self::row_to_message)?
                .collect();
            rows
        })
    }

    async fn append_turn(
        &self,
        tenant_id: &TenantId,
        conversation_id: &str,
        user_message_text: &str,
        copilot_response: &crate::domain::CopilotResponse,
    ) -> Result<()> {
        let user_at = Utc::now();
        // Copilot row must sort strictly after the user row (SPEC §8:
        // messages strictly increasing in `created_at`).
        let copilot_at = user_at + chrono::Duration::milliseconds(1);
        let structured = serde_json::to_string(copilot_response)?;

        let affected = self.with_conn(|conn| {
            let tx = conn.transaction()?;

            let owned: i64 = tx.query_row(
                "SELECT COUNT(*) FROM conversations WHERE id = ?1 AND tenant_id = ?2",
                params![conversation_id, tenant_id.0],
                |row| row.get(0),
            )?;
            if owned == 0 {
                return Ok(0);
            }

            tx.execute(
                "INSERT INTO messages (id, conversation_id, tenant_id, role, content_text, content_structured, created_at)
                 VALUES (?1, ?2, ?3, 'user', ?4, NULL, ?5)",
                params![Uuid::new_v4().to_string(), conversation_id, tenant_id.0, user_message_text, user_at.to_rfc3339()],
            )?;

            tx.execute(
                "INSERT INTO messages (id, conversation_id, tenant_id, role, content_text, content_structured, created_at)
                 VALUES (?1, ?2, ?3, 'copilot', ?4, ?5, ?6)",
                params![
                    Uuid::new_v4().to_string(),
                    conversation_id,
                    tenant_id.0,
                    copilot_response.summary,
                    structured,
                    copilot_at.to_rfc3339(),
                ],
            )?;

            tx.execute(
                "UPDATE conversations SET last_message_at = ?1 WHERE id = ?2 AND tenant_id = ?3",
                params![copilot_at.to_rfc3339(), conversation_id, tenant_id.0],
            )?;

            tx.commit()?;
            Ok(1)
        })?;

        if affected == 0 {
            return Err(Error::BadRequest(format!(
                "conversation {conversation_id} not found for this tenant"
            )));
        }
        Ok(())
    }

    async fn rename(&self, tenant_id: &TenantId, conversation_id: &str, title: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE conversations SET title = ?1 WHERE id = ?2 AND tenant_id = ?3",
                params![title, conversation_id, tenant_id.0],
            )?;
            Ok(affected > 0)
        })
    }

    async fn archive(&self, tenant_id: &TenantId, conversation_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute(
                "UPDATE conversations SET archived = 1 WHERE id = ?1 AND tenant_id = ?2",
                params![conversation_id, tenant_id.0],
            )?;
            Ok(affected > 0)
        })
    }

    async fn record_suggestion_audit(&self, audit: &SuggestionAudit) -> Result<()> {
        let full_response = serde_json::to_string(&audit.full_response)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO suggestion_audits (suggestion_id, tenant_id, user_id, query_text, resolved_intent, full_response, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    audit.suggestion_id,
                    audit.tenant_id.0,
                    audit.user_id.0,
                    audit.query_text,
                    audit.resolved_intent.to_string(),
                    full_response,
                    audit.created_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResponseMeta;

    fn sample_response() -> crate::domain::CopilotResponse {
        crate::domain::CopilotResponse::error(
            Intent::Generic,
            "hi",
            vec![],
            ResponseMeta {
                model_name: "llama3".into(),
                token_count: 1,
                latency_ms: 1,
                validation_passed: true,
            },
        )
    }

    #[tokio::test]
    async fn append_turn_writes_two_messages_and_bumps_last_message_at() {
        let store = SqliteConversationStore::in_memory().unwrap();
        let tenant = TenantId::from("acme");
        let user = UserId::from("u1");
        let id = store.create_conversation(&tenant, &user, None).await.unwrap();

        store
            .append_turn(&tenant, &id, "why is OEE low", &sample_response())
            .await
            .unwrap();

        let messages = store.list_messages(&tenant, &id, 10, 0).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].role, MessageRole::Copilot);
        assert!(messages[0].created_at < messages[1].created_at);
    }

    #[tokio::test]
    async fn list_messages_is_tenant_scoped() {
        let store = SqliteConversationStore::in_memory().unwrap();
        let tenant = TenantId::from("acme");
        let user = UserId::from("u1");
        let id = store.create_conversation(&tenant, &user, None).await.unwrap();
        store.append_turn(&tenant, &id, "x", &sample_response()).await.unwrap();

        let intruder_view = store.list_messages(&TenantId::from("intruder"), &id, 10, 0).await.unwrap();
        assert!(intruder_view.is_empty());

        let owner_view = store.list_messages(&tenant, &id, 10, 0).await.unwrap();
        assert_eq!(owner_view.len(), 2);
    }

    #[tokio::test]
    async fn append_turn_rejects_cross_tenant_conversation_id() {
        let store = SqliteConversationStore::in_memory().unwrap();
        let id = store
            .create_conversation(&TenantId::from("acme"), &UserId::from("u1"), None)
            .await
            .unwrap();

        let result = store
            .append_turn(&TenantId::from("intruder"), &id, "x", &sample_response())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_conversations_orders_by_last_message_desc() {
        let store = SqliteConversationStore::in_memory().unwrap();
        let tenant = TenantId::from("acme");
        let user = UserId::from("u1");
        let id1 = store.create_conversation(&tenant, &user, None).await.unwrap();
        let id2 = store.create_conversation(&tenant, &user, None).await.unwrap();
        store.append_turn(&tenant, &id1, "x", &sample_response()).await.unwrap();

        let list = store.list_conversations(&tenant, &user, 10, 0, None).await.unwrap();
        assert_eq!(list[0].id, id1);
        assert_eq!(list[1].id, id2);
    }

    #[tokio::test]
    async fn rename_and_archive_are_tenant_scoped() {
        let store = SqliteConversationStore::in_memory().unwrap();
        let id = store
            .create_conversation(&TenantId::from("acme"), &UserId::from("u1"), None)
            .await
            .unwrap();

        assert!(!store.rename(&TenantId::from("intruder"), &id, "x").await.unwrap());
        assert!(store.rename(&TenantId::from("acme"), &id, "renamed").await.unwrap());
        assert!(store.archive(&TenantId::from("acme"), &id).await.unwrap());
    }
}
