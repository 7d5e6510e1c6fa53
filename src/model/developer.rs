use serde::{Deserialize, Serialize};

/// A registered developer account (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperAccount {
    pub username: String,
    pub password: String,
    pub created_at: u64,
}
