//! HTTP handlers for the prompt relay.
//!
//! `relay` is the service itself; `health` and `metrics` are operational.

pub mod health;
pub mod metrics;
pub mod relay;

pub use health::health_check;
pub use relay::relay;
