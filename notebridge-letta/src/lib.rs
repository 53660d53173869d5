//! Letta agent platform backend for notebridge.
//!
//! [`LettaClient`] implements [`notebridge_core::AgentBackend`] over the
//! Letta REST API: agents are created from a project template and analysis
//! prompts are sent as user messages.
//!
//! Environment variables read by [`LettaConfig::from_env`]:
//! - `LETTA_API_KEY` (or `LETTA_TOKEN`)
//! - `LETTA_PROJECT`
//! - `LETTA_TEMPLATE_VERSION`
//! - `LETTA_API_BASE`
//! - `LETTA_TIMEOUT_SECS`

mod client;
mod config;
mod error;
pub mod types;

pub use client::LettaClient;
pub use config::{LettaConfig, DEFAULT_API_BASE, DEFAULT_PROJECT, DEFAULT_TIMEOUT};
pub use error::LettaError;
