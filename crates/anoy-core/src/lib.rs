//! Service plumbing shared by Anoy binaries: env config, tracing, HTTP layers, health.

pub mod config;
pub mod cors;
pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
