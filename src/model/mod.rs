//! Entities shared by the DB, Developer, and Lobby services (spec §3).

pub mod developer;
pub mod game;
pub mod player;
pub mod review;

pub use developer::DeveloperAccount;
pub use game::{Game, VersionEntry};
pub use player::{PlayerAccount, PlayerStatus};
pub use review::Review;
