//! Test utilities for anoy services.
//!
//! Provides `MockSession` for minting bearer headers and small request/response
//! helpers for driving a router with `tower::ServiceExt::oneshot`.
//! Import from dev-dependencies only, never in production code.

pub mod auth;
pub mod http;
