//! Rate Limiter & Budget Guard (C9, SPEC §4.9): per-(tenant, user)
//! sliding-window quotas, with an in-process fallback when the shared
//! cache tier is unreachable, plus the per-request wall-clock ceiling.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// A shared counter tier (e.g. Redis-backed `incr`/`expire`/`get`); the
/// limiter falls back to an in-process counter when this is unreachable
/// (SPEC §4.9).
#[async_trait::async_trait]
pub trait SharedCounterCache: Send + Sync {
    async fn incr_with_expiry(&self, key: &str, window: StdDuration) -> Result<u64>;
}

#[derive(Debug, Clone)]
struct WindowEntry {
    count: u32,
    window_start: DateTime<Utc>,
}

/// In-process fallback counters, coarser than the shared cache tier
/// because they don't survive across worker processes (SPEC §4.9, §5).
struct LocalCounters {
    entries: Arc<RwLock<HashMap<String, WindowEntry>>>,
}

impl LocalCounters {
    fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn increment(&self, key: &str, window: Duration) -> u32 {
        let mut entries = self.entries.write().await;
        let now = Utc::now();
        let entry = entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            window_start: now,
        });
        if now - entry.window_start >= window {
            entry.count = 0;
            entry.window_start = now;
        }
        entry.count += 1;
        entry.count
    }
}

/// Per-(tenant, user) rate limiting and the wall-clock budget guard
/// (SPEC §4.9).
pub struct RateLimiter {
    shared_cache: Option<Arc<dyn SharedCounterCache>>,
    local: LocalCounters,
    per_hour: u32,
    per_day: u32,
}

impl RateLimiter {
    pub fn new(per_hour: u32, per_day: u32, shared_cache: Option<Arc<dyn SharedCounterCache>>) -> Self {
        Self {
            shared_cache,
            local: LocalCounters::new(),
            per_hour,
            per_day,
        }
    }

    /// Check and consume one slot for `(tenant, user)`. Returns
    /// `Err(Error::RateLimited)` without mutating state further once a
    /// limit is exceeded for this call.
    pub async fn check_and_consume(&self, tenant_id: &str, user_id: &str) -> Result<()> {
        let hour_key = format!("rl:{tenant_id}:{user_id}:hour");
        let day_key = format!("rl:{tenant_id}:{user_id}:day");

        let hour_count = self
            .increment(&hour_key, StdDuration::from_secs(3600), Duration::hours(1))
            .await;
        if hour_count > self.per_hour {
            return Err(Error::RateLimited(format!(
                "hourly quota of {} exceeded",
                self.per_hour
            )));
        }

        let day_count = self
            .increment(&day_key, StdDuration::from_secs(86_400), Duration::days(1))
            .await;
        if day_count > self.per_day {
            return Err(Error::RateLimited(format!(
                "daily quota of {} exceeded",
                self.per_day
            )));
        }

        Ok(())
    }

    async fn increment(&self, key: &str, std_window: StdDuration, window: Duration) -> u32 {
        if let Some(cache) = &self.shared_cache {
            if let Ok(count) = cache.incr_with_expiry(key, std_window).await {
                return count as u32;
            }
            // Shared cache unreachable: fall back to the in-process counter.
        }
        self.local.increment(key, window).await
    }
}

/// Run `fut` under a wall-clock ceiling; on timeout the future is dropped
/// (cancelling any in-flight work it held) and `Error::Timeout` is
/// returned (SPEC §4.9, §5 cancellation).
pub async fn with_wall_clock_budget<F, T>(budget_ms: u64, fut: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    match tokio::time::timeout(StdDuration::from_millis(budget_ms), fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            duration_ms: budget_ms,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn allows_requests_under_quota() {
        let limiter = RateLimiter::new(3, 100, None);
        for _ in 0..3 {
            assert!(limiter.check_and_consume("acme", "u1").await.is_ok());
        }
    }

    #[tokio::test]
    async fn rejects_once_hourly_quota_exceeded() {
        let limiter = RateLimiter::new(2, 100, None);
        limiter.check_and_consume("acme", "u1").await.unwrap();
        limiter.check_and_consume("acme", "u1").await.unwrap();
        let result = limiter.check_and_consume("acme", "u1").await;
        assert!(matches!(result, Err(Error::RateLimited(_))));
    }

    #[tokio::test]
    async fn counters_are_scoped_per_tenant_and_user() {
        let limiter = RateLimiter::new(1, 100, None);
        limiter.check_and_consume("acme", "u1").await.unwrap();
        assert!(limiter.check_and_consume("other", "u1").await.is_ok());
        assert!(limiter.check_and_consume("acme", "u2").await.is_ok());
    }

    #[tokio::test]
    async fn wall_clock_budget_times_out_slow_future() {
        let slow = async {
            tokio::time::sleep(StdDuration::from_millis(50)).await;
            Ok(42)
        };
        let result = with_wall_clock_budget(5, slow).await;
        assert!(matches!(result, Err(Error::Timeout { .. })));
    }

    #[tokio::test]
    async fn wall_clock_budget_returns_value_when_within_budget() {
        let fast = async { Ok(7) };
        let result = with_wall_clock_budget(1000, fast).await;
        assert_eq!(result.unwrap(), 7);
    }
}
