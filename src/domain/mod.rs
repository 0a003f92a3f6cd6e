//! Core data model shared by every component (SPEC §3).
//!
//! Every persisted type carries a [`TenantId`]; nothing in this module
//! crosses tenant boundaries on its own — callers are responsible for
//! scoping every query they issue against a store.

mod citation;
mod conversation;
mod query;
mod response;
mod snapshot;
pub mod sources;

pub use citation::{Action, ActionType, Citation, Fact, SourceKind, Warning, WarningCode};
pub use conversation::{Conversation, Message, MessageRole, SuggestionAudit};
pub use query::{AskRequest, ContextBudget, Intent};
pub use response::{CopilotResponse, ResponseMeta, ResponseType};
pub use snapshot::{
    DataGap, ErrorSeverity, KpiReadings, OperationalError, OperationalSnapshot, OrderCounts,
    PhaseWip,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque tenant identifier. Every persisted row and every query is scoped
/// by one of these; it is never inferred from ambient/thread-local state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        TenantId(s.to_string())
    }
}

/// Opaque user identifier, scoped within a [`TenantId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// A single chunk of an indexed document (SPEC §3 `DocumentChunk`).
///
/// Immutable once written; a reindex supersedes it by writing a new row,
/// never by mutating this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub id: String,
    pub tenant_id: TenantId,
    pub source_ref: String,
    pub ordinal: u32,
    pub text: String,
    pub embedding: Vec<f32>,
    pub tags: Vec<String>,
}

/// A chunk returned from a retrieval search, carrying its ranking score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f64,
}
