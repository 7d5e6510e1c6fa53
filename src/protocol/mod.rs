//! Wire protocol: the frame codec, the closed reason-code set, and the
//! per-service command envelopes.

pub mod codec;
pub mod db_messages;
pub mod dev_messages;
pub mod envelope;
pub mod lobby_messages;
pub mod reason;

pub use codec::{read_frame, read_raw, write_frame, write_raw, write_text_frame, FramePayload, DEFAULT_MAX_FRAME_SIZE};
pub use db_messages::{Collection, DbRequest, DbResponse};
pub use dev_messages::{DevCommand, GameMetadata};
pub use envelope::{Response, Status};
pub use lobby_messages::{LobbyCommand, OnlinePlayerSummary, RoomSummary};
pub use reason::ReasonCode;
