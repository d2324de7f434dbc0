//! Book catalog service.
//!
//! The `books` module holds the catalog itself; `app` wires it into the
//! database, HTTP server, and module lifecycle.

pub mod app;
pub mod modules;
