//! Read-only capability interfaces the host ERP implements against its own
//! order/allocation/error tables (SPEC §9 Open Question (a)).
//!
//! The copilot core never assumes a concrete schema for production orders,
//! allocations, or error logs — it only ever reads through one of these
//! narrow traits. A deployment wires in whatever backend (the ERP's own
//! database, a replica, an event-sourced projection) implements them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DataGap, KpiReadings, OperationalError, OrderCounts, TenantId};
use crate::error::Result;

/// Read-only access to production order counts within a window.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn order_counts(
        &self,
        tenant_id: &TenantId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        entity_hint: Option<&str>,
    ) -> Result<OrderCounts>;
}

/// A single phase-level allocation/WIP reading (SPEC §3 `PhaseWip`).
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationReading {
    pub phase: String,
    pub wip_count: u32,
}

/// Read-only access to work-in-progress allocations by phase.
#[async_trait]
pub trait AllocationSource: Send + Sync {
    async fn top_phases_by_wip(
        &self,
        tenant_id: &TenantId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        limit: usize,
        entity_hint: Option<&str>,
    ) -> Result<Vec<AllocationReading>>;
}

/// Read-only access to recent operational errors.
#[async_trait]
pub trait ErrorSource: Send + Sync {
    async fn recent_errors(
        &self,
        tenant_id: &TenantId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        limit: usize,
        entity_hint: Option<&str>,
    ) -> Result<Vec<OperationalError>>;
}

/// Read-only access to the current KPI readings for a window (SPEC §4.3:
/// availability, performance, quality, FPY, rework rate; OEE is derived by
/// the Context Builder, not returned here).
#[async_trait]
pub trait KpiSource: Send + Sync {
    async fn current_kpis(
        &self,
        tenant_id: &TenantId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        entity_hint: Option<&str>,
    ) -> Result<KpiReadings>;
}

/// A collaborator source that failed is recorded, not propagated; the
/// Context Builder turns this into a [`DataGap`] rather than aborting the
/// whole snapshot (SPEC §4.3).
pub fn gap(source: &str, reason: impl Into<String>) -> DataGap {
    DataGap {
        source: source.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_carries_source_and_reason() {
        let g = gap("order_source", "connection refused");
        assert_eq!(g.source, "order_source");
        assert_eq!(g.reason, "connection refused");
    }
}
