//! Orchestrator (C11, SPEC §4.11): wires the Rate Limiter, Intent Router,
//! Context Builder, Fast-Path Resolver, Retrieval Store, Model Gateway,
//! Guardrail Validator, Response Normalizer and Conversation Store into one
//! `process_ask` pipeline, plus the `health`/`daily_feedback`/`insights`
//! read-only interfaces (SPEC §6).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::config::CopilotConfig;
use crate::context_builder::{ContextBuilder, DEGRADED_TRUST_INDEX};
use crate::domain::{
    AskRequest, Citation, CopilotResponse, Fact, Intent, ResponseMeta, SourceKind,
    SuggestionAudit, TenantId, UserId, Warning, WarningCode,
};
use crate::error::{Error, Result};
use crate::fast_path;
use crate::gateway::{GenerateOptions, HealthStatus, ModelGateway};
use crate::guardrail::{self, GuardrailContext, GuardrailOutcome};
use crate::intent;
use crate::normalizer::{self, NormalizeInput};
use crate::prompt;
use crate::rate_limit::{with_wall_clock_budget, RateLimiter};
use crate::retrieval::RetrievalStore;
use crate::storage::ConversationStore;

/// How long a cached `idempotency_key` response is replayed for (SPEC §8
/// round-trip law: equal `suggestion_id`/`facts`/`summary` within validity).
const IDEMPOTENCY_TTL: Duration = Duration::from_secs(300);

/// Everything `process_ask` needs to answer one request (SPEC §4.11).
pub struct Orchestrator {
    config: CopilotConfig,
    gateway: Arc<dyn ModelGateway>,
    retrieval: Arc<dyn RetrievalStore>,
    context_builder: Arc<ContextBuilder>,
    rate_limiter: Arc<RateLimiter>,
    conversation_store: Arc<dyn ConversationStore>,
    idempotency_cache: RwLock<HashMap<String, (Instant, CopilotResponse)>>,
}

/// Status of the model server and rate-limit ceilings as surfaced to a
/// dashboard or health probe (SPEC §6 `health`).
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub status: &'static str,
    pub model_status: &'static str,
    pub model_detail: Option<String>,
    pub embeddings_model: String,
    pub rate_limit_per_hour: u32,
    pub rate_limit_per_day: u32,
}

/// One bullet in a daily feedback digest or insight list (SPEC §6
/// `daily_feedback`/`insights`).
#[derive(Debug, Clone, PartialEq)]
pub struct InsightItem {
    pub title: String,
    pub text: String,
    pub citations: Vec<Citation>,
}

/// Severity-bucketed digest generated once per day per tenant (SPEC §6
/// `daily_feedback`).
#[derive(Debug, Clone, PartialEq)]
pub struct DailyFeedback {
    pub date: chrono::NaiveDate,
    pub info: Vec<InsightItem>,
    pub warn: Vec<InsightItem>,
    pub critical: Vec<InsightItem>,
}

/// Dashboard-facing summary of current state and near-term outlook (SPEC §6
/// `insights`).
#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub now: Vec<InsightItem>,
    pub next: Vec<InsightItem>,
}

impl Orchestrator {
    pub fn new(
        config: CopilotConfig,
        gateway: Arc<dyn ModelGateway>,
        retrieval: Arc<dyn RetrievalStore>,
        context_builder: Arc<ContextBuilder>,
        rate_limiter: Arc<RateLimiter>,
        conversation_store: Arc<dyn ConversationStore>,
    ) -> Self {
        Self {
            config,
            gateway,
            retrieval,
            context_builder,
            rate_limiter,
            conversation_store,
            idempotency_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Answer one request end-to-end (SPEC §4.11 state machine:
    /// RECEIVE -> RATE_CHECK -> INTENT -> (fast path | LLM path) ->
    /// VALIDATE -> NORMALIZE -> PERSIST -> DONE/ERROR).
    pub async fn process_ask(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        request: AskRequest,
    ) -> CopilotResponse {
        if let Err(msg) = request.validate() {
            return self.error_response(Intent::Generic, WarningCode::ValidationFailed, msg, 0);
        }

        let budget_ms = self.config.wall_clock_budget_ms;
        match with_wall_clock_budget(budget_ms, self.process_ask_inner(tenant_id, user_id, &request)).await {
            Ok(response) => response,
            Err(Error::Timeout { duration_ms }) => self.error_response(
                Intent::Generic,
                WarningCode::ModelOffline,
                format!("request exceeded its {duration_ms}ms wall-clock budget"),
                0,
            ),
            Err(e) => self.error_response(Intent::Generic, WarningCode::ValidationFailed, e.to_string(), 0),
        }
    }

    async fn process_ask_inner(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        request: &AskRequest,
    ) -> Result<CopilotResponse> {
        let started = Instant::now();

        let idempotency_key = request
            .idempotency_key
            .as_ref()
            .map(|key| idempotency_cache_key(tenant_id, key));
        if let Some(key) = &idempotency_key {
            if let Some(cached) = self.idempotency_lookup(key).await {
                return Ok(cached);
            }
        }

        // RATE_CHECK: no downstream call happens if this fails (SPEC §4.11).
        if let Err(e) = self.rate_limiter.check_and_consume(&tenant_id.0, &user_id.0).await {
            return Ok(self.error_response(
                Intent::Generic,
                WarningCode::RateLimited,
                e.to_string(),
                started.elapsed().as_millis() as u64,
            ));
        }

        // INTENT
        let resolved_intent = intent::classify(&request.user_query);

        let window_hours = request
            .context_window_hours
            .unwrap_or(self.config.context_window_hours_default);
        let window_end = Utc::now();
        let window_start = window_end - chrono::Duration::hours(window_hours as i64);

        // SNAPSHOT: both paths need the operational snapshot.
        let entity_hint = request.entity_hint();
        let snapshot = self
            .context_builder
            .build(tenant_id, window_start, window_end, entity_hint.as_deref())
            .await;

        let response = if self.config.fast_path_enabled && fast_path::handles(resolved_intent) {
            // Fast path: no model call (SPEC §4.5).
            let result = fast_path::resolve(&request.user_query, &snapshot);
            let mut warnings = result.warnings;
            if !snapshot.data_gaps.is_empty() {
                warnings.push(Warning::new(
                    WarningCode::LowTrustIndex,
                    "snapshot assembled with one or more data gaps",
                ));
            }
            let validated = guardrail::ValidatedReply {
                response_type_hint: "ANSWER".to_string(),
                summary: summarize_facts(&result.facts, &warnings),
                facts: result.facts,
                actions: Vec::new(),
                warnings,
            };
            normalizer::normalize(
                validated,
                NormalizeInput {
                    intent: resolved_intent,
                    model_name: "fast-path".to_string(),
                    token_count: 0,
                    latency_ms: started.elapsed().as_millis() as u64,
                    correlation_id: None,
                },
            )
        } else {
            self.llm_path(tenant_id, request, resolved_intent, &snapshot, started)
                .await?
        };

        // PERSIST: best-effort, never fails the response (SPEC §4.11).
        self.persist(tenant_id, user_id, request, resolved_intent, &response).await;

        if let Some(key) = &idempotency_key {
            self.idempotency_store(key, &response).await;
        }

        Ok(response)
    }

    /// Returns the cached response for `key` if present and still within
    /// [`IDEMPOTENCY_TTL`] (SPEC §8 round-trip law).
    async fn idempotency_lookup(&self, key: &str) -> Option<CopilotResponse> {
        let cache = self.idempotency_cache.read().await;
        cache.get(key).and_then(|(cached_at, response)| {
            if cached_at.elapsed() < IDEMPOTENCY_TTL {
                Some(response.clone())
            } else {
                None
            }
        })
    }

    async fn idempotency_store(&self, key: &str, response: &CopilotResponse) {
        let mut cache = self.idempotency_cache.write().await;
        cache.insert(key.to_string(), (Instant::now(), response.clone()));
    }

    async fn llm_path(
        &self,
        tenant_id: &TenantId,
        request: &AskRequest,
        resolved_intent: Intent,
        snapshot: &crate::domain::OperationalSnapshot,
        started: Instant,
    ) -> Result<CopilotResponse> {
        // RETRIEVE
        let query_embedding = match self.gateway.embed(&self.config.model_name, &request.user_query).await {
            Ok(embedding) => embedding,
            Err(_) => vec![0.0; self.config.embedding_dim],
        };
        let chunks = self
            .retrieval
            .search(
                tenant_id,
                &request.user_query,
                &query_embedding,
                self.config.retrieval_candidate_size,
                resolved_intent.context_budget().max_prompt_bytes() / 256,
                self.config.lexical_weight,
                self.config.vector_weight,
            )
            .await
            .unwrap_or_default();

        // RENDER
        let rendered_prompt = prompt::render(resolved_intent.context_budget(), &request.user_query, &chunks, snapshot);

        let retrieved_chunk_ids: Vec<String> = chunks.iter().map(|c| c.chunk.id.clone()).collect();
        let snapshot_markers = vec![snapshot.window_ref()];
        let ctx = GuardrailContext {
            retrieved_chunk_ids: &retrieved_chunk_ids,
            snapshot_markers: &snapshot_markers,
            low_trust_threshold: self.config.low_trust_threshold,
            redact_employee_names: self.config.redact_employee_names,
        };

        // GENERATE, then VALIDATE with one repair retry (SPEC §4.7 step 1).
        let mut options = GenerateOptions::new(&self.config.model_name, rendered_prompt);
        let mut total_tokens = 0u32;
        let mut is_repair_attempt = false;

        loop {
            let reply = match self.gateway.generate(options.clone()).await {
                Ok(reply) => reply,
                Err(e) => {
                    return Ok(self.error_response(
                        resolved_intent,
                        WarningCode::ModelOffline,
                        e.to_string(),
                        started.elapsed().as_millis() as u64,
                    ));
                }
            };
            total_tokens += reply.eval_count;

            match guardrail::validate(&reply.response, is_repair_attempt, &ctx) {
                GuardrailOutcome::Validated(mut validated) => {
                    if self.config.redact_employee_names {
                        validated.summary = guardrail::redact(&validated.summary);
                        for fact in &mut validated.facts {
                            fact.text = guardrail::redact(&fact.text);
                        }
                    }
                    if !snapshot.data_gaps.is_empty() {
                        downgrade_calculation_trust(&mut validated.facts);
                    }
                    return Ok(normalizer::normalize(
                        validated,
                        NormalizeInput {
                            intent: resolved_intent,
                            model_name: self.config.model_name.clone(),
                            token_count: total_tokens,
                            latency_ms: started.elapsed().as_millis() as u64,
                            correlation_id: None,
                        },
                    ));
                }
                GuardrailOutcome::NeedsRepair if !is_repair_attempt => {
                    is_repair_attempt = true;
                    options = options.with_repair_instruction();
                    continue;
                }
                GuardrailOutcome::NeedsRepair => {
                    return Ok(self.error_response(
                        resolved_intent,
                        WarningCode::ValidationFailed,
                        "model reply was not valid JSON after repair attempt",
                        started.elapsed().as_millis() as u64,
                    ));
                }
                GuardrailOutcome::Rejected(warning) => {
                    return Ok(self.error_response(
                        resolved_intent,
                        warning.code,
                        warning.message,
                        started.elapsed().as_millis() as u64,
                    ));
                }
            }
        }
    }

    async fn persist(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
        request: &AskRequest,
        resolved_intent: Intent,
        response: &CopilotResponse,
    ) {
        if let Some(conversation_id) = &request.conversation_id {
            if let Err(e) = self
                .conversation_store
                .append_turn(tenant_id, conversation_id, &request.user_query, response)
                .await
            {
                tracing::warn!(error = %e, conversation_id, "failed to persist conversation turn");
            }
        }

        let audit = SuggestionAudit::new(
            tenant_id.clone(),
            user_id.clone(),
            request.user_query.clone(),
            resolved_intent,
            response.clone(),
        );
        if let Err(e) = self.conversation_store.record_suggestion_audit(&audit).await {
            tracing::warn!(error = %e, "failed to persist suggestion audit");
        }
    }

    fn error_response(
        &self,
        intent: Intent,
        code: WarningCode,
        message: impl Into<String>,
        latency_ms: u64,
    ) -> CopilotResponse {
        CopilotResponse::error(
            intent,
            message_for_code(code),
            vec![Warning::new(code, message)],
            ResponseMeta {
                model_name: self.config.model_name.clone(),
                token_count: 0,
                latency_ms,
                validation_passed: false,
            },
        )
    }

    /// Model server and quota status, without consuming a quota slot (SPEC
    /// §6 `health`).
    pub async fn health(&self) -> HealthReport {
        let (status, model_status, model_detail) = match self.gateway.health().await {
            HealthStatus::Online => ("healthy", "online", None),
            HealthStatus::Degraded(reason) => ("degraded", "degraded", Some(reason)),
            HealthStatus::Offline(reason) => ("unhealthy", "offline", Some(reason)),
        };
        HealthReport {
            status,
            model_status,
            model_detail,
            embeddings_model: self.config.model_name.clone(),
            rate_limit_per_hour: self.config.rate_per_hour,
            rate_limit_per_day: self.config.rate_per_day,
        }
    }

    /// Severity-bucketed digest built from the operational snapshot for one
    /// day, run once per tenant per day (SPEC §6 `daily_feedback`).
    pub async fn daily_feedback(&self, tenant_id: &TenantId, date: chrono::NaiveDate) -> DailyFeedback {
        let window_end = date.and_hms_opt(23, 59, 59).unwrap_or_default().and_utc();
        let window_start = window_end - chrono::Duration::hours(24);
        let snapshot = self.context_builder.build(tenant_id, window_start, window_end, None).await;

        let mut info = Vec::new();
        let mut warn = Vec::new();
        let mut critical = Vec::new();

        let window_ref = snapshot.window_ref();
        if let Some(oee) = snapshot.oee {
            let item = InsightItem {
                title: "OEE".to_string(),
                text: format!("OEE over the last 24h was {oee:.1}%"),
                citations: vec![Citation::new(SourceKind::Calculation, window_ref.clone(), "oee")],
            };
            if oee < 50.0 {
                critical.push(item);
            } else if oee < 70.0 {
                warn.push(item);
            } else {
                info.push(item);
            }
        }

        for error in &snapshot.recent_errors {
            let item = InsightItem {
                title: format!("Error in {}", error.phase),
                text: format!("{} flagged an error at {}", error.phase, error.timestamp.to_rfc3339()),
                citations: vec![Citation::new(SourceKind::Event, error.id.clone(), "operational error")],
            };
            match error.severity {
                crate::domain::ErrorSeverity::Critical => critical.push(item),
                crate::domain::ErrorSeverity::Major => warn.push(item),
                crate::domain::ErrorSeverity::Minor => info.push(item),
            }
        }

        for gap in &snapshot.data_gaps {
            warn.push(InsightItem {
                title: format!("Data gap: {}", gap.source),
                text: gap.reason.clone(),
                citations: Vec::new(),
            });
        }

        DailyFeedback {
            date,
            info,
            warn,
            critical,
        }
    }

    /// Dashboard snapshot of current state ("now") and near-term outlook
    /// ("next"), both grounded in the live operational snapshot (SPEC §6
    /// `insights`).
    pub async fn insights(&self, tenant_id: &TenantId) -> Insights {
        let window_end = Utc::now();
        let window_start = window_end - chrono::Duration::hours(self.config.context_window_hours_default as i64);
        let snapshot = self.context_builder.build(tenant_id, window_start, window_end, None).await;
        let window_ref = snapshot.window_ref();

        let mut now = Vec::new();
        for (name, value) in [
            ("OEE", snapshot.oee),
            ("First pass yield", snapshot.fpy),
            ("Availability", snapshot.availability),
        ] {
            if let Some(v) = value {
                now.push(InsightItem {
                    title: name.to_string(),
                    text: format!("{name} is currently {v:.1}"),
                    citations: vec![Citation::new(SourceKind::Calculation, window_ref.clone(), name)],
                });
            }
        }

        let mut next = Vec::new();
        for phase in snapshot.top_phases_by_wip.iter().take(3) {
            next.push(InsightItem {
                title: format!("WIP building in {}", phase.phase),
                text: format!("{} has {} units in progress", phase.phase, phase.wip_count),
                citations: vec![Citation::new(SourceKind::Db, window_ref.clone(), "allocations")],
            });
        }

        Insights { now, next }
    }
}

fn idempotency_cache_key(tenant_id: &TenantId, key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(tenant_id.0.as_bytes());
    hasher.update(b":");
    hasher.update(key.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn message_for_code(code: WarningCode) -> &'static str {
    match code {
        WarningCode::RateLimited => "You've reached the request limit for now — please try again later.",
        WarningCode::ModelOffline => "The assistant model is unavailable right now — please try again shortly.",
        WarningCode::SecurityFlag => "I can't help with that request.",
        WarningCode::InsufficientEvidence => "I don't have enough verified information to answer that yet.",
        WarningCode::LowTrustIndex => "I have a partial answer, but confidence in it is low.",
        WarningCode::ValidationFailed => "I couldn't validate my own answer — please rephrase.",
    }
}

fn summarize_facts(facts: &[Fact], warnings: &[Warning]) -> String {
    if facts.is_empty() {
        return warnings
            .first()
            .map(|w| w.message.clone())
            .unwrap_or_else(|| "No current value available.".to_string());
    }
    facts
        .iter()
        .map(|f| f.text.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

fn downgrade_calculation_trust(facts: &mut [Fact]) {
    for fact in facts.iter_mut() {
        for citation in fact.citations.iter_mut() {
            if citation.source_kind == SourceKind::Calculation && citation.trust_index > DEGRADED_TRUST_INDEX {
                citation.trust_index = DEGRADED_TRUST_INDEX;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sources::AllocationReading;
    use crate::domain::{KpiReadings, OperationalError, OrderCounts};
    use crate::gateway::ModelReply;
    use crate::retrieval::SqliteRetrievalStore;
    use crate::storage::SqliteConversationStore;
    use async_trait::async_trait;

    struct EmptyOrders;
    #[async_trait]
    impl crate::domain::sources::OrderSource for EmptyOrders {
        async fn order_counts(
            &self,
            _tenant_id: &TenantId,
            _start: chrono::DateTime<Utc>,
            _end: chrono::DateTime<Utc>,
            _entity_hint: Option<&str>,
        ) -> Result<OrderCounts> {
            Ok(OrderCounts::default())
        }
    }

    struct EmptyAllocations;
    #[async_trait]
    impl crate::domain::sources::AllocationSource for EmptyAllocations {
        async fn top_phases_by_wip(
            &self,
            _tenant_id: &TenantId,
            _start: chrono::DateTime<Utc>,
            _end: chrono::DateTime<Utc>,
            _limit: usize,
            _entity_hint: Option<&str>,
        ) -> Result<Vec<AllocationReading>> {
            Ok(Vec::new())
        }
    }

    struct EmptyErrors;
    #[async_trait]
    impl crate::domain::sources::ErrorSource for EmptyErrors {
        async fn recent_errors(
            &self,
            _tenant_id: &TenantId,
            _start: chrono::DateTime<Utc>,
            _end: chrono::DateTime<Utc>,
            _limit: usize,
            _entity_hint: Option<&str>,
        ) -> Result<Vec<OperationalError>> {
            Ok(Vec::new())
        }
    }

    struct EmptyKpis;
    #[async_trait]
    impl crate::domain::sources::KpiSource for EmptyKpis {
        async fn current_kpis(
            &self,
            _tenant_id: &TenantId,
            _start: chrono::DateTime<Utc>,
            _end: chrono::DateTime<Utc>,
            _entity_hint: Option<&str>,
        ) -> Result<KpiReadings> {
            Ok(KpiReadings::default())
        }
    }

    struct StubGateway {
        reply: String,
    }

    #[async_trait]
    impl ModelGateway for StubGateway {
        async fn generate(&self, _options: GenerateOptions) -> Result<ModelReply> {
            Ok(ModelReply {
                response: self.reply.clone(),
                done: true,
                eval_count: 10,
            })
        }
        async fn embed(&self, _model: &str, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![0.1, 0.2, 0.3])
        }
        async fn health(&self) -> HealthStatus {
            HealthStatus::Online
        }
    }

    fn orchestrator_with_gateway(reply: impl Into<String>) -> Orchestrator {
        let config = CopilotConfig::new();
        let gateway: Arc<dyn ModelGateway> = Arc::new(StubGateway { reply: reply.into() });
        let retrieval: Arc<dyn RetrievalStore> = Arc::new(SqliteRetrievalStore::in_memory().unwrap());
        let context_builder = Arc::new(ContextBuilder::new(
            Arc::new(EmptyOrders),
            Arc::new(EmptyAllocations),
            Arc::new(EmptyErrors),
            Arc::new(EmptyKpis),
        ));
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_per_hour, config.rate_per_day, None));
        let conversation_store: Arc<dyn ConversationStore> = Arc::new(SqliteConversationStore::in_memory().unwrap());
        Orchestrator::new(config, gateway, retrieval, context_builder, rate_limiter, conversation_store)
    }

    #[tokio::test]
    async fn fast_path_intent_never_calls_the_model() {
        let orchestrator = orchestrator_with_gateway("this should never be parsed");
        let request = AskRequest::new("what is the current OEE");
        let response = orchestrator
            .process_ask(&TenantId::from("acme"), &UserId::from("u1"), request)
            .await;
        assert_eq!(response.meta.model_name, "fast-path");
    }

    #[tokio::test]
    async fn llm_path_returns_validated_answer() {
        let reply = r#"{"response_type": "ANSWER", "summary": "see runbook",
            "facts": [{"text": "follow changeover steps", "citations": []}]}"#;
        let orchestrator = orchestrator_with_gateway(reply);
        let request = AskRequest::new("explain the plan change on line 2");
        let response = orchestrator
            .process_ask(&TenantId::from("acme"), &UserId::from("u1"), request)
            .await;
        assert_eq!(response.meta.model_name, "llama3");
    }

    #[tokio::test]
    async fn rate_limited_request_short_circuits_before_any_model_call() {
        let mut orchestrator = orchestrator_with_gateway("irrelevant");
        orchestrator.rate_limiter = Arc::new(RateLimiter::new(0, 0, None));
        let request = AskRequest::new("explain the plan change on line 2");
        let response = orchestrator
            .process_ask(&TenantId::from("acme"), &UserId::from("u1"), request)
            .await;
        assert!(response.warnings.iter().any(|w| w.code == WarningCode::RateLimited));
    }

    #[tokio::test]
    async fn same_idempotency_key_returns_equal_suggestion_id() {
        let reply = r#"{"response_type": "ANSWER", "summary": "see runbook",
            "facts": [{"text": "follow changeover steps", "citations": []}]}"#;
        let orchestrator = orchestrator_with_gateway(reply);
        let tenant_id = TenantId::from("acme");
        let user_id = UserId::from("u1");

        let request1 = AskRequest::new("explain the plan change on line 2").with_idempotency_key("retry-1");
        let response1 = orchestrator.process_ask(&tenant_id, &user_id, request1).await;

        let request2 = AskRequest::new("explain the plan change on line 2").with_idempotency_key("retry-1");
        let response2 = orchestrator.process_ask(&tenant_id, &user_id, request2).await;

        assert_eq!(response1.suggestion_id, response2.suggestion_id);
        assert_eq!(response1.summary, response2.summary);
    }

    #[tokio::test]
    async fn health_reports_online_model_status() {
        let orchestrator = orchestrator_with_gateway("irrelevant");
        let report = orchestrator.health().await;
        assert_eq!(report.model_status, "online");
        assert_eq!(report.status, "healthy");
    }

    #[tokio::test]
    async fn daily_feedback_buckets_critical_oee() {
        let orchestrator = orchestrator_with_gateway("irrelevant");
        let feedback = orchestrator
            .daily_feedback(&TenantId::from("acme"), Utc::now().date_naive())
            .await;
        assert!(feedback.info.is_empty() && feedback.warn.is_empty() && feedback.critical.is_empty());
    }
}
