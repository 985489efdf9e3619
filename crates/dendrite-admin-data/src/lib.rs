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

//! Read-only directory queries against a Dendrite database.
//!
//! Two fixed queries (accounts and rooms) against either PostgreSQL or
//! SQLite, selected by URI scheme. One connection per call, closed
//! unconditionally on exit; the records are immutable snapshots with no
//! local write path.
//!
//! Layout: `uri.rs` (database URI parsing), `directory.rs` (the queries
//! and records), `error.rs` (error type).

pub mod directory;
pub mod error;
pub mod uri;

pub use directory::{AccountRecord, RoomRecord, list_accounts, list_rooms};
pub use error::{DataError, DataResult};
pub use uri::{DatabaseUri, PostgresTarget, SslMode};
