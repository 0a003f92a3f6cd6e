//! Context Builder (C3, SPEC §4.3): assembles the per-request
//! [`OperationalSnapshot`] from the host ERP's read-only domain sources.

use chrono::{DateTime, Utc};

use crate::domain::sources::{gap, AllocationSource, ErrorSource, KpiSource, OrderSource};
use crate::domain::{OperationalSnapshot, PhaseWip, TenantId};

const MAX_ORDERS: usize = 50;
const MAX_ERRORS: usize = 100;
const MAX_ALLOCATIONS: usize = 50;

/// Gathers the [`OperationalSnapshot`] for a request window. Best-effort:
/// a failing collaborator is recorded as a `data_gap`, never aborts the
/// whole snapshot (SPEC §4.3).
pub struct ContextBuilder {
    orders: std::sync::Arc<dyn OrderSource>,
    allocations: std::sync::Arc<dyn AllocationSource>,
    errors: std::sync::Arc<dyn ErrorSource>,
    kpis: std::sync::Arc<dyn KpiSource>,
}

impl ContextBuilder {
    pub fn new(
        orders: std::sync::Arc<dyn OrderSource>,
        allocations: std::sync::Arc<dyn AllocationSource>,
        errors: std::sync::Arc<dyn ErrorSource>,
        kpis: std::sync::Arc<dyn KpiSource>,
    ) -> Self {
        Self {
            orders,
            allocations,
            errors,
            kpis,
        }
    }

    pub async fn build(
        &self,
        tenant_id: &TenantId,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        entity_hint: Option<&str>,
    ) -> OperationalSnapshot {
        let mut snapshot = OperationalSnapshot::empty(window_start, window_end);

        match self
            .orders
            .order_counts(tenant_id, window_start, window_end, entity_hint)
            .await
        {
            Ok(counts) => snapshot.order_counts = counts,
            Err(e) => snapshot.data_gaps.push(gap("order_source", e.to_string())),
        }

        match self
            .errors
            .recent_errors(tenant_id, window_start, window_end, MAX_ERRORS, entity_hint)
            .await
        {
            Ok(mut errors) => {
                errors.truncate(MAX_ERRORS);
                snapshot.recent_errors = errors;
            }
            Err(e) => snapshot.data_gaps.push(gap("error_source", e.to_string())),
        }

        match self
            .allocations
            .top_phases_by_wip(tenant_id, window_start, window_end, MAX_ALLOCATIONS, entity_hint)
            .await
        {
            Ok(readings) => {
                snapshot.top_phases_by_wip = readings
                    .into_iter()
                    .take(MAX_ALLOCATIONS)
                    .map(|r| PhaseWip {
                        phase: r.phase,
                        wip_count: r.wip_count,
                    })
                    .collect();
            }
            Err(e) => snapshot
                .data_gaps
                .push(gap("allocation_source", e.to_string())),
        }

        match self
            .kpis
            .current_kpis(tenant_id, window_start, window_end, entity_hint)
            .await
        {
            Ok(readings) => {
                snapshot.availability = readings.availability;
                snapshot.performance = readings.performance;
                snapshot.quality = readings.quality;
                snapshot.fpy = readings.fpy;
                snapshot.rework_rate = readings.rework_rate;
                snapshot.oee = oee_from(readings.availability, readings.performance, readings.quality);
            }
            Err(e) => snapshot.data_gaps.push(gap("kpi_source", e.to_string())),
        }

        snapshot
    }
}

/// OEE = Availability × Performance × Quality, each in `[0,1]` (GLOSSARY).
/// Readings are stored as percentages in `[0,100]`, so the product is
/// rescaled back to a percentage; `None` if any factor is unknown.
fn oee_from(availability: Option<f64>, performance: Option<f64>, quality: Option<f64>) -> Option<f64> {
    let (a, p, q) = (availability?, performance?, quality?);
    Some((a / 100.0) * (p / 100.0) * (q / 100.0) * 100.0)
}

/// Trust index assigned to a `calculation` citation derived from a snapshot
/// with at least one data gap (SPEC §4.3).
pub const DEGRADED_TRUST_INDEX: f64 = 0.5;
