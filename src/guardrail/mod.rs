//! Guardrail Validator (SPEC §4.7): JSON parsing, structural checks,
//! citation grounding, prompt-leak detection and redaction over a raw
//! model reply.

mod scrubber;
mod validator;

pub use scrubber::redact;
pub use validator::{validate, GuardrailContext, GuardrailOutcome, ValidatedReply};
