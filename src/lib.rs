//! # copilot-core
//!
//! Server-side core of the ProdPlan ONE operational copilot: classifies a
//! factory-floor question's intent, assembles the operational context it
//! needs, retrieves supporting documents, invokes the tenant-local model
//! behind a circuit breaker, validates and grounds the reply against its
//! citations, and returns an auditable [`domain::CopilotResponse`].
//!
//! ## Core components
//!
//! - **Model Gateway** ([`gateway`]): the sole path to the local model
//!   server, behind a circuit breaker with bounded retry.
//! - **Retrieval Store** ([`retrieval`]): hybrid lexical + vector search
//!   over tenant-scoped document chunks.
//! - **Context Builder** ([`context_builder`]): assembles the operational
//!   snapshot from host-ERP read-only sources.
//! - **Intent Router** ([`intent`]): priority-ordered rule classification.
//! - **Fast-Path Resolver** ([`fast_path`]): answers KPI lookups without a
//!   model call.
//! - **Prompt Renderer** ([`prompt`]): composes the budgeted prompt.
//! - **Guardrail Validator** ([`guardrail`]): grounds citations, detects
//!   prompt leakage, redacts PII.
//! - **Response Normalizer** ([`normalizer`]): finalizes the response shape.
//! - **Rate Limiter** ([`rate_limit`]): per-tenant/user quotas and the
//!   wall-clock budget guard.
//! - **Conversation Store** ([`storage`]): tenant-scoped conversation
//!   history and the suggestion audit trail.
//! - **Orchestrator** ([`orchestrator`]): wires the above into
//!   `process_ask`, `health`, `daily_feedback` and `insights`.

pub mod config;
pub mod context_builder;
pub mod domain;
pub mod error;
pub mod fast_path;
pub mod gateway;
pub mod guardrail;
pub mod intent;
pub mod normalizer;
pub mod orchestrator;
pub mod prompt;
pub mod rate_limit;
pub mod retrieval;
pub mod storage;

pub use config::CopilotConfig;
pub use domain::{
    Action, ActionType, AskRequest, Citation, Conversation, ContextBudget, CopilotResponse, Fact,
    Intent, Message, MessageRole, OperationalSnapshot, ResponseMeta, ResponseType, SourceKind,
    SuggestionAudit, TenantId, UserId, Warning, WarningCode,
};
pub use error::{Error, Result};
pub use gateway::{LocalModelGateway, ModelGateway};
pub use orchestrator::{DailyFeedback, HealthReport, Insights, InsightItem, Orchestrator};
pub use rate_limit::RateLimiter;
pub use retrieval::{RetrievalStore, SqliteRetrievalStore};
pub use storage::{ConversationStore, SqliteConversationStore};
