#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Typed client for the Dendrite admin HTTP API.
//!
//! Layout: `client.rs` (the [`AdminClient`] and its single-round-trip
//! operations), `register.rs` (the two-phase shared-secret registration
//! handshake), `deactivate.rs` (the three-step deactivation handshake),
//! `models.rs` (wire models), `error.rs` (error taxonomy).

pub mod client;
pub mod deactivate;
pub mod error;
pub mod models;
pub mod register;

pub use client::{AdminClient, AdminClientBuilder, Dialect, Timeouts};
pub use error::{Error, Result};
pub use models::{
    EvacuationReport, LoginSession, PasswordReset, RegisteredUser, ServerNotice, UiaChallenge,
    UiaFlow,
};
pub use register::RegistrationRequest;
