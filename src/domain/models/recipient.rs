use serde::{Deserialize, Serialize};

/// A directory entry eligible to receive broadcasts.
///
/// Recipient records are owned and mutated by the directory; the engine
/// only reads a snapshot per message. Everything besides `chat_id` is
/// forwarded to telemetry and never interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub chat_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub language_code: Option<String>,
    pub blocked: bool,
}
