//! Command handlers grouped by concern.

pub(crate) mod directory;
pub(crate) mod register;
pub(crate) mod rooms;
pub(crate) mod server;
pub(crate) mod users;
