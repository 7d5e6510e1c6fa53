//! The DB service: a single-writer JSON document store reachable over the
//! framed protocol (spec §4.2).

pub mod actions;
pub mod document;
pub mod service;
pub mod store;

pub use actions::dispatch;
pub use document::Document;
pub use service::run;
pub use store::Store;
