//! The Developer service (spec §4.3): developer auth, bundle upload,
//! catalogue ownership queries.

pub mod commands;
pub mod service;
pub mod upload;

pub use service::run;
