//! Operational snapshot assembled by the Context Builder (SPEC §3, §4.3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a recent operational error (SPEC §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorSeverity {
    Minor,
    Major,
    Critical,
}

/// A recent operational error surfaced into the snapshot (SPEC §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalError {
    pub id: String,
    pub phase: String,
    pub severity: ErrorSeverity,
    pub timestamp: DateTime<Utc>,
}

/// Counts of production orders by status, within the snapshot window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderCounts {
    pub planned: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub blocked: u32,
}

/// A recorded failure to gather part of the snapshot (SPEC §4.3).
///
/// The Context Builder is best-effort: any domain collaborator that fails is
/// recorded here instead of failing the whole snapshot, and later surfaced
/// as a low-trust `calculation` citation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataGap {
    pub source: String,
    pub reason: String,
}

/// Current KPI readings gathered from the host ERP's quality/performance
/// systems (SPEC §3, §4.3). Percentages in `[0,100]`; `None` means that KPI
/// could not be computed for the window. OEE is not a field here — the
/// Context Builder derives it from availability/performance/quality.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiReadings {
    pub availability: Option<f64>,
    pub performance: Option<f64>,
    pub quality: Option<f64>,
    pub fpy: Option<f64>,
    pub rework_rate: Option<f64>,
}

/// Top-N phase by work-in-progress count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseWip {
    pub phase: String,
    pub wip_count: u32,
}

/// Immutable, per-request operational state handed to the Fast-Path Resolver
/// and Prompt Renderer (SPEC §3). Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationalSnapshot {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,

    pub availability: Option<f64>,
    pub performance: Option<f64>,
    pub quality: Option<f64>,
    pub oee: Option<f64>,
    pub fpy: Option<f64>,
    pub rework_rate: Option<f64>,

    pub order_counts: OrderCounts,
    pub recent_errors: Vec<OperationalError>,
    pub top_phases_by_wip: Vec<PhaseWip>,
    pub data_gaps: Vec<DataGap>,
}

impl OperationalSnapshot {
    /// An empty snapshot spanning `[window_start, window_end]`, with every
    /// KPI unknown. Used when every domain collaborator failed.
    pub fn empty(window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> Self {
        Self {
            window_start,
            window_end,
            availability: None,
            performance: None,
            quality: None,
            oee: None,
            fpy: None,
            rework_rate: None,
            order_counts: OrderCounts::default(),
            recent_errors: Vec::new(),
            top_phases_by_wip: Vec::new(),
            data_gaps: Vec::new(),
        }
    }

    /// An opaque ref encoding this snapshot's window, used by the Fast-Path
    /// Resolver and Prompt Renderer as a `[DB:calculation:<ref>]` marker
    /// (SPEC §4.5/§4.6).
    pub fn window_ref(&self) -> String {
        format!(
            "{}..{}",
            self.window_start.to_rfc3339(),
            self.window_end.to_rfc3339()
        )
    }

    /// Get a named KPI value by the Intent Router/Fast-Path's KPI keyword.
    pub fn kpi(&self, name: &str) -> Option<f64> {
        match name {
            "availability" => self.availability,
            "performance" => self.performance,
            "quality" => self.quality,
            "oee" => self.oee,
            "fpy" => self.fpy,
            "rework_rate" | "rework" => self.rework_rate,
            _ => None,
        }
    }

    /// Render a compact, human-readable text block for prompt inclusion
    /// (SPEC §4.3: soft cap ~8KB, hard cap ~16KB).
    pub fn to_text_block(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "Window: {} to {}\n",
            self.window_start.to_rfc3339(),
            self.window_end.to_rfc3339()
        ));
        out.push_str("KPIs:\n");
        for (name, value) in [
            ("availability", self.availability),
            ("performance", self.performance),
            ("quality", self.quality),
            ("oee", self.oee),
            ("fpy", self.fpy),
            ("rework_rate", self.rework_rate),
        ] {
            match value {
                Some(v) => out.push_str(&format!("  {}: {:.1}\n", name, v)),
                None => out.push_str(&format!("  {}: unknown\n", name)),
            }
        }
        out.push_str(&format!(
            "Orders: planned={} in_progress={} completed={} blocked={}\n",
            self.order_counts.planned,
            self.order_counts.in_progress,
            self.order_counts.completed,
            self.order_counts.blocked
        ));
        if !self.recent_errors.is_empty() {
            out.push_str("Recent errors (oldest first):\n");
            for err in &self.recent_errors {
                out.push_str(&format!(
                    "  [{}] {} phase={} at {}\n",
                    err.id,
                    match err.severity {
                        ErrorSeverity::Minor => "minor",
                        ErrorSeverity::Major => "major",
                        ErrorSeverity::Critical => "critical",
                    },
                    err.phase,
                    err.timestamp.to_rfc3339()
                ));
            }
        }
        if !self.top_phases_by_wip.is_empty() {
            out.push_str("Top phases by WIP:\n");
            for p in &self.top_phases_by_wip {
                out.push_str(&format!("  {}: {}\n", p.phase, p.wip_count));
            }
        }
        if !self.data_gaps.is_empty() {
            out.push_str("Data gaps:\n");
            for gap in &self.data_gaps {
                out.push_str(&format!("  {}: {}\n", gap.source, gap.reason));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let end = Utc::now();
        (end - chrono::Duration::hours(24), end)
    }

    #[test]
    fn empty_snapshot_has_no_kpis() {
        let (start, end) = window();
        let snap = OperationalSnapshot::empty(start, end);
        assert_eq!(snap.kpi("oee"), None);
        assert_eq!(snap.kpi("unknown_kpi"), None);
    }

    #[test]
    fn kpi_lookup_resolves_known_names() {
        let (start, end) = window();
        let mut snap = OperationalSnapshot::empty(start, end);
        snap.oee = Some(47.0);
        snap.fpy = Some(32.0);
        assert_eq!(snap.kpi("oee"), Some(47.0));
        assert_eq!(snap.kpi("fpy"), Some(32.0));
    }

    #[test]
    fn text_block_respects_soft_cap_for_small_snapshot() {
        let (start, end) = window();
        let snap = OperationalSnapshot::empty(start, end);
        assert!(snap.to_text_block().len() < 8 * 1024);
    }

    #[test]
    fn window_ref_is_stable_for_equal_windows() {
        let (start, end) = window();
        let a = OperationalSnapshot::empty(start, end);
        let b = OperationalSnapshot::empty(start, end);
        assert_eq!(a.window_ref(), b.window_ref());
    }
}
