//! Domain models for the prompt relay.

pub mod envelope;

pub use envelope::{Envelope, EnvelopeError, ErrorDetail, MISSING_PROMPT_MESSAGE};
