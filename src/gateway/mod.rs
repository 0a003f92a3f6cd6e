//! Model Gateway (SPEC §4.1): the sole path to the tenant-local model
//! server, behind a circuit breaker.

mod circuit_breaker;
mod client;
mod types;

pub use circuit_breaker::CircuitBreaker;
pub use client::{LocalModelGateway, ModelGateway};
pub use types::{GenerateOptions, HealthStatus, ModelReply};
