use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of failure reasons returned in `FAIL` responses.
///
/// Every command either succeeds or fails with exactly one of these; there
/// is no free-form reason string anywhere on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    // Account errors
    AccountExists,
    UserNotFound,
    WrongPassword,
    AlreadyLoggedIn,
    NotAuthenticated,

    // Catalogue / bundle errors
    GameNotFound,
    VersionMismatch,
    VersionNotFound,
    FileMissing,
    NotOwner,
    BadZip,

    // Room errors
    RoomNotFound,
    RoomFull,
    GameAlreadyStarted,
    NeedMorePlayers,
    NotHost,
    LaunchFail,

    // Review errors
    MustPlayFirst,

    // Generic
    DbError,
    UnknownCmd,
}

impl ReasonCode {
    /// Short operator-facing description, used only in logs — never sent
    /// over the wire in place of the reason code itself.
    pub fn description(&self) -> &'static str {
        match self {
            Self::AccountExists => "an account with this username already exists",
            Self::UserNotFound => "no account exists for this username",
            Self::WrongPassword => "the supplied password does not match",
            Self::AlreadyLoggedIn => "this username already has an active session",
            Self::NotAuthenticated => "this command requires a prior successful LOGIN on the connection",
            Self::GameNotFound => "no game exists with this id",
            Self::VersionMismatch => "the requested version does not match the expected version",
            Self::VersionNotFound => "the game has no version entry matching latest_version",
            Self::FileMissing => "the archive file for this version is missing on disk",
            Self::NotOwner => "the calling developer does not own this game",
            Self::BadZip => "the uploaded archive could not be extracted",
            Self::RoomNotFound => "no room exists with this id",
            Self::RoomFull => "the room has reached its maximum player count",
            Self::GameAlreadyStarted => "the room is no longer accepting joins",
            Self::NeedMorePlayers => "fewer than min_players are present",
            Self::NotHost => "only the host may perform this action",
            Self::LaunchFail => "the game-server child process failed to start",
            Self::MustPlayFirst => "play_history does not contain this game id",
            Self::DbError => "the database service round trip failed",
            Self::UnknownCmd => "the collection/action combination is not recognized",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&ReasonCode::VersionMismatch).unwrap(),
            "\"VERSION_MISMATCH\""
        );
        assert_eq!(
            serde_json::to_string(&ReasonCode::AlreadyLoggedIn).unwrap(),
            "\"ALREADY_LOGGED_IN\""
        );
    }

    #[test]
    fn round_trips_through_json() {
        for code in [
            ReasonCode::AccountExists,
            ReasonCode::RoomFull,
            ReasonCode::MustPlayFirst,
            ReasonCode::UnknownCmd,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            let parsed: ReasonCode = serde_json::from_str(&json).unwrap();
            assert_eq!(code, parsed);
        }
    }
}
