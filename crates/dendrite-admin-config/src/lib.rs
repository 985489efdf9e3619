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

//! File-backed TOML configuration store for the dendrite-admin CLI.
//!
//! The document is read fully at startup, merged with CLI overrides, and
//! written back fully before the process exits; each invocation performs
//! at most one read-then-write of the whole blob.
//!
//! Layout: `model.rs` (the typed document), `store.rs` (the file store),
//! `error.rs` (error type).

pub mod error;
pub mod model;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use model::{ConfigDocument, TimeoutSettings};
pub use store::ConfigStore;
