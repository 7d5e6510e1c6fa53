#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::similar_names
)]

//! # gamedock
//!
//! A three-tier online multiplayer game distribution and matchmaking
//! platform: a Database service, a Developer service, and a Lobby service,
//! cooperating over one length-prefixed framed TCP protocol.

/// On-disk bundle layout: `<storage>/<game_id>/<version>/`.
pub mod bundle;

/// Layered configuration for all three services.
pub mod config;

/// The DB service: single-writer JSON document store.
pub mod db;

/// Short-lived framed DB client shared by the Developer and Lobby services.
pub mod db_client;

/// The Developer service: auth, bundle upload, catalogue ownership.
pub mod dev;

/// The launch contract's argv surfaces for game-server and game-client children.
pub mod launch;

/// The Lobby service: player auth, catalogue, room lifecycle, process supervision.
pub mod lobby;

/// Structured logging configuration.
pub mod logging;

/// Entities shared across the three services.
pub mod model;

/// The wire protocol: frame codec, reason codes, command envelopes.
pub mod protocol;

/// Exponential-backoff retry helper for DB round trips.
pub mod retry;
