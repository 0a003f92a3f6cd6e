//! Guardrail Validator (C7, SPEC §4.7): turns the model's raw JSON reply
//! into a trustworthy, citation-grounded [`CopilotResponse`] body, or
//! rejects it.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{Action, ActionType, Citation, Fact, SourceKind, Warning, WarningCode};

/// Raw shape the model is instructed to emit (SPEC §4.6/§4.7). Looser than
/// [`crate::domain::CopilotResponse`] — `action_type`/`source_kind` are
/// plain strings here because an unknown value must be dropped with a
/// warning, not fail deserialization outright.
#[derive(Debug, Deserialize)]
struct RawReply {
    #[serde(default)]
    response_type: Option<String>,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    facts: Vec<RawFact>,
    #[serde(default)]
    actions: Vec<RawAction>,
}

#[derive(Debug, Deserialize)]
struct RawFact {
    #[serde(default)]
    text: String,
    #[serde(default)]
    citations: Vec<RawCitation>,
}

#[derive(Debug, Deserialize)]
struct RawCitation {
    #[serde(default)]
    source_kind: String,
    #[serde(default)]
    source_ref: String,
    #[serde(default)]
    label: String,
}

#[derive(Debug, Deserialize)]
struct RawAction {
    #[serde(default)]
    action_type: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    requires_approval: bool,
    #[serde(default)]
    payload: Value,
}

/// Outcome of validating one raw model reply.
pub enum GuardrailOutcome {
    /// The reply parsed and passed structural checks, possibly with
    /// warnings attached (e.g. `LOW_TRUST_INDEX`).
    Validated(ValidatedReply),
    /// Parse failure: caller should retry once with a repair instruction.
    NeedsRepair,
    /// A fatal condition (prompt leak, or a second parse failure): caller
    /// must emit an `ERROR` response with the given warning.
    Rejected(Warning),
}

pub struct ValidatedReply {
    pub response_type_hint: String,
    pub summary: String,
    pub facts: Vec<Fact>,
    pub actions: Vec<Action>,
    pub warnings: Vec<Warning>,
}

/// Everything the validator needs to ground citations and score trust
/// (SPEC §4.7 steps 3 and 6).
pub struct GuardrailContext<'a> {
    pub retrieved_chunk_ids: &'a [String],
    pub snapshot_markers: &'a [String],
    pub low_trust_threshold: f64,
    pub redact_employee_names: bool,
}

fn prompt_leak_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(ignore (all )?previous instructions|reveal (your|the) system prompt|disregard (your|the) (rules|instructions)|you are the prodplan one operational copilot)")
            .expect("prompt leak pattern compiles")
    })
}

/// Run structural checks, citation grounding, prompt-leak detection and
/// low-trust scoring over one raw reply (SPEC §4.7 steps 1-4, 6; step 5
/// redaction is a separate pass run by the caller after grounding).
pub fn validate(raw_json: &str, is_repair_attempt: bool, ctx: &GuardrailContext) -> GuardrailOutcome {
    let raw: RawReply = match serde_json::from_str(raw_json) {
        Ok(r) => r,
        Err(_) => {
            if is_repair_attempt {
                return GuardrailOutcome::Rejected(Warning::new(
                    WarningCode::ValidationFailed,
                    "model reply was not valid JSON after repair attempt",
                ));
            }
            return GuardrailOutcome::NeedsRepair;
        }
    };

    if prompt_leak_pattern().is_match(&raw.summary)
        || raw.facts.iter().any(|f| prompt_leak_pattern().is_match(&f.text))
    {
        return GuardrailOutcome::Rejected(Warning::new(
            WarningCode::SecurityFlag,
            "reply matched a prompt-leak or injection pattern",
        ));
    }

    let mut warnings = Vec::new();

    let response_type_hint = raw
        .response_type
        .unwrap_or_else(|| "ANSWER".to_string())
        .to_uppercase();

    let summary = if raw.summary.trim().is_empty() {
        warnings.push(Warning::new(
            WarningCode::ValidationFailed,
            "summary was empty",
        ));
        "I don't have a confident answer for that.".to_string()
    } else {
        raw.summary
    };

    let (facts, mut grounding_warnings) = ground_facts(raw.facts, ctx);
    warnings.append(&mut grounding_warnings);

    let needs_evidence_warning = matches!(response_type_hint.as_str(), "ANSWER" | "PROPOSAL")
        && facts.is_empty()
        && !warnings.iter().any(|w| w.code == WarningCode::InsufficientEvidence);
    if needs_evidence_warning {
        warnings.push(Warning::new(
            WarningCode::InsufficientEvidence,
            "no grounded facts survived citation checking",
        ));
    }

    let (actions, mut action_warnings) = filter_actions(raw.actions);
    warnings.append(&mut action_warnings);

    if let Some(trust) = mean_trust_index(&facts) {
        if trust < ctx.low_trust_threshold {
            warnings.push(Warning::new(
                WarningCode::LowTrustIndex,
                format!("mean citation trust index {trust:.2} below threshold"),
            ));
        }
    }

    GuardrailOutcome::Validated(ValidatedReply {
        response_type_hint,
        summary,
        facts,
        actions,
        warnings,
    })
}

fn ground_facts(raw_facts: Vec<RawFact>, ctx: &GuardrailContext) -> (Vec<Fact>, Vec<Warning>) {
    let mut facts = Vec::new();

    for raw_fact in raw_facts {
        if raw_fact.text.trim().is_empty() {
            continue;
        }
        let citations: Vec<Citation> = raw_fact
            .citations
            .into_iter()
            .filter_map(|c| ground_citation(c, ctx))
            .collect();

        if citations.is_empty() {
            continue;
        }
        facts.push(Fact::new(raw_fact.text, citations));
    }

    (facts, Vec::new())
}

fn ground_citation(raw: RawCitation, ctx: &GuardrailContext) -> Option<Citation> {
    let source_kind = parse_source_kind(&raw.source_kind)?;

    let grounded = match source_kind {
        SourceKind::Rag => ctx.retrieved_chunk_ids.iter().any(|id| id == &raw.source_ref),
        SourceKind::Db | SourceKind::Calculation | SourceKind::Event => {
            ctx.snapshot_markers.iter().any(|m| m == &raw.source_ref)
        }
    };

    if !grounded {
        return None;
    }

    let trust_index = if ctx.snapshot_markers.contains(&raw.source_ref)
        && matches!(source_kind, SourceKind::Calculation)
    {
        0.9
    } else {
        0.8
    };

    Some(
        Citation::new(source_kind, raw.source_ref, raw.label)
            .with_confidence(0.85)
            .with_trust_index(trust_index),
    )
}

fn parse_source_kind(s: &str) -> Option<SourceKind> {
    match s.to_lowercase().as_str() {
        "db" => Some(SourceKind::Db),
        "rag" => Some(SourceKind::Rag),
        "event" => Some(SourceKind::Event),
        "calculation" => Some(SourceKind::Calculation),
        _ => None,
    }
}

fn filter_actions(raw_actions: Vec<RawAction>) -> (Vec<Action>, Vec<Warning>) {
    let mut actions = Vec::new();
    let mut warnings = Vec::new();
    let mut dropped_any = false;

    for raw in raw_actions {
        match parse_action_type(&raw.action_type) {
            Some(action_type) => actions.push(Action {
                action_type,
                label: raw.label,
                requires_approval: raw.requires_approval,
                payload: raw.payload,
            }),
            None => dropped_any = true,
        }
    }

    if dropped_any {
        warnings.push(Warning::new(
            WarningCode::SecurityFlag,
            "one or more proposed actions were outside the allow-list",
        ));
    }

    (actions, warnings)
}

fn parse_action_type(s: &str) -> Option<ActionType> {
    match s.to_uppercase().as_str() {
        "CREATE_DECISION_PR" => Some(ActionType::CreateDecisionPr),
        "DRY_RUN" => Some(ActionType::DryRun),
        "OPEN_ENTITY" => Some(ActionType::OpenEntity),
        "RUN_RUNBOOK" => Some(ActionType::RunRunbook),
        _ => None,
    }
}

/// Arithmetic mean of trust index across every citation in `facts`, or
/// `None` if there are no citations at all (SPEC §4.7 step 6).
pub fn mean_trust_index(facts: &[Fact]) -> Option<f64> {
    let all_citations: Vec<&Citation> = facts.iter().flat_map(|f| f.citations.iter()).collect();
    if all_citations.is_empty() {
        return None;
    }
    let sum: f64 = all_citations.iter().map(|c| c.trust_index).sum();
    Some(sum / all_citations.len() as f64)
}
