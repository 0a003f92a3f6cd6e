//! Runtime configuration for the copilot core.
//!
//! Every tunable named in the spec's configuration-keys table lives here,
//! with the spec's literal defaults. Construct explicitly (or via
//! [`CopilotConfig::from_env`]) and thread it through orchestrator
//! construction — the crate never reads ambient/global configuration.

use std::env;

/// All tunables for a running copilot core instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CopilotConfig {
    /// Name of the model to request from the local model server.
    pub model_name: String,
    /// Fixed embedding dimension for the retrieval store.
    pub embedding_dim: usize,
    /// Default context window, in hours, when a request omits one.
    pub context_window_hours_default: u32,
    /// Per-tenant/user requests allowed per rolling hour.
    pub rate_per_hour: u32,
    /// Per-tenant/user requests allowed per rolling day.
    pub rate_per_day: u32,
    /// Consecutive model failures before the circuit breaker opens.
    pub circuit_fail_threshold: u32,
    /// Cooldown, in seconds, before an open breaker tries HALF_OPEN.
    pub circuit_cooldown_seconds: u64,
    /// Wall-clock budget, in milliseconds, for one `process_ask` call.
    pub wall_clock_budget_ms: u64,
    /// Whether the guardrail redacts employee names/identifiers.
    pub redact_employee_names: bool,
    /// Whether the fast KPI path is enabled at all.
    pub fast_path_enabled: bool,

    /// Low-trust-index warning threshold (§4.7 step 6).
    pub low_trust_threshold: f64,
    /// Lexical weight in hybrid retrieval ranking (§4.2).
    pub lexical_weight: f64,
    /// Vector weight in hybrid retrieval ranking (§4.2).
    pub vector_weight: f64,
    /// Candidate set size before rerank (§4.2).
    pub retrieval_candidate_size: usize,
    /// Max attempts for one model generation call, including the initial
    /// try; only transient I/O and 5xx failures are retried (§4.1, ≤2).
    pub max_generation_attempts: u32,
}

impl Default for CopilotConfig {
    fn default() -> Self {
        Self {
            model_name: "llama3".to_string(),
            embedding_dim: 384,
            context_window_hours_default: 24,
            rate_per_hour: 60,
            rate_per_day: 300,
            circuit_fail_threshold: 3,
            circuit_cooldown_seconds: 60,
            wall_clock_budget_ms: 20_000,
            redact_employee_names: true,
            fast_path_enabled: true,
            low_trust_threshold: 0.6,
            lexical_weight: 0.4,
            vector_weight: 0.6,
            retrieval_candidate_size: 4_000,
            max_generation_attempts: 2,
        }
    }
}

impl CopilotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    pub fn with_rate_limits(mut self, per_hour: u32, per_day: u32) -> Self {
        self.rate_per_hour = per_hour;
        self.rate_per_day = per_day;
        self
    }

    pub fn with_circuit_breaker(mut self, fail_threshold: u32, cooldown_seconds: u64) -> Self {
        self.circuit_fail_threshold = fail_threshold;
        self.circuit_cooldown_seconds = cooldown_seconds;
        self
    }

    pub fn with_wall_clock_budget_ms(mut self, ms: u64) -> Self {
        self.wall_clock_budget_ms = ms;
        self
    }

    pub fn with_fast_path_enabled(mut self, enabled: bool) -> Self {
        self.fast_path_enabled = enabled;
        self
    }

    /// Load configuration from environment variables, falling back to
    /// [`CopilotConfig::default`] for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_name: env::var("MODEL_NAME").unwrap_or(defaults.model_name),
            embedding_dim: env_parse("EMBEDDING_DIM", defaults.embedding_dim),
            context_window_hours_default: env_parse(
                "CONTEXT_WINDOW_HOURS_DEFAULT",
                defaults.context_window_hours_default,
            ),
            rate_per_hour: env_parse("RATE_PER_HOUR", defaults.rate_per_hour),
            rate_per_day: env_parse("RATE_PER_DAY", defaults.rate_per_day),
            circuit_fail_threshold: env_parse(
                "CIRCUIT_FAIL_THRESHOLD",
                defaults.circuit_fail_threshold,
            ),
            circuit_cooldown_seconds: env_parse(
                "CIRCUIT_COOLDOWN_SECONDS",
                defaults.circuit_cooldown_seconds,
            ),
            wall_clock_budget_ms: env_parse("WALL_CLOCK_BUDGET_MS", defaults.wall_clock_budget_ms),
            redact_employee_names: env_parse(
                "REDACT_EMPLOYEE_NAMES",
                defaults.redact_employee_names,
            ),
            fast_path_enabled: env_parse("FAST_PATH_ENABLED", defaults.fast_path_enabled),
            max_generation_attempts: env_parse(
                "MAX_GENERATION_ATTEMPTS",
                defaults.max_generation_attempts,
            ),
            ..defaults
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = CopilotConfig::default();
        assert_eq!(cfg.rate_per_hour, 60);
        assert_eq!(cfg.rate_per_day, 300);
        assert_eq!(cfg.circuit_fail_threshold, 3);
        assert_eq!(cfg.circuit_cooldown_seconds, 60);
        assert_eq!(cfg.wall_clock_budget_ms, 20_000);
        assert_eq!(cfg.context_window_hours_default, 24);
    }

    #[test]
    fn builder_overrides_take_effect() {
        let cfg = CopilotConfig::new()
            .with_rate_limits(10, 50)
            .with_circuit_breaker(5, 30)
            .with_fast_path_enabled(false);

        assert_eq!(cfg.rate_per_hour, 10);
        assert_eq!(cfg.rate_per_day, 50);
        assert_eq!(cfg.circuit_fail_threshold, 5);
        assert_eq!(cfg.circuit_cooldown_seconds, 30);
        assert!(!cfg.fast_path_enabled);
    }
}
