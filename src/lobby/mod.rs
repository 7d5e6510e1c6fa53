//! The Lobby service (spec §4.4): player auth, catalogue/download proxying,
//! review submission, and the Room state machine with child-process
//! supervision.

pub mod commands;
pub mod process;
pub mod room;
pub mod service;
pub mod state;

pub use service::run;
pub use state::LobbyState;
