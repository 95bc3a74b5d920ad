//! Session token types shared across Anoy services.
//!
//! Provides the HS256 token codec and the `Session` extractor that turns an
//! `Authorization: Bearer` header into an authenticated principal.

pub mod session;
pub mod token;
