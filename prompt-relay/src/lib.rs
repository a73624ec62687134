//! prompt-relay: forwards `?prompt=` to Gemini through an AI gateway and
//! answers with a fixed `{ success, response, error }` envelope.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
