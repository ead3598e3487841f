use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted newsletter entry waiting to be fanned out.
///
/// Created by the authoring path, picked up by the poller once due, and
/// marked `sent` exactly once after a fan-out pass. There is no retry
/// state: once sent, an entry is terminal regardless of how many
/// individual deliveries failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastMessage {
    pub id: i64,
    pub title: Option<String>,
    pub content: String,
    pub scheduled_at: DateTime<Utc>,
    pub sent: bool,
}

impl BroadcastMessage {
    /// Due iff unsent and the scheduled time has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        !self.sent && self.scheduled_at <= now
    }

    /// Render the Telegram HTML payload: date stamp, bold title when one
    /// is set, then the body verbatim.
    pub fn render(&self) -> String {
        let date = self.scheduled_at.format("%d %b %Y");
        let content = self.content.trim();
        match self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
        {
            Some(title) => format!("🗓 {date} <b>{title}</b>\n\n{content}"),
            None => format!("🗓 {date}\n\n{content}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn message(title: Option<&str>, content: &str) -> BroadcastMessage {
        BroadcastMessage {
            id: 1,
            title: title.map(String::from),
            content: content.to_string(),
            scheduled_at: Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap(),
            sent: false,
        }
    }

    #[test]
    fn renders_title_and_content() {
        let rendered = message(Some("Release notes"), "<i>big news</i>").render();
        assert_eq!(rendered, "🗓 07 Mar 2024 <b>Release notes</b>\n\n<i>big news</i>");
    }

    #[test]
    fn renders_without_title() {
        let rendered = message(None, "body only").render();
        assert_eq!(rendered, "🗓 07 Mar 2024\n\nbody only");
    }

    #[test]
    fn blank_title_is_dropped_and_inputs_trimmed() {
        let rendered = message(Some("   "), "  padded  ").render();
        assert_eq!(rendered, "🗓 07 Mar 2024\n\npadded");
    }

    #[test]
    fn due_at_exact_scheduled_time() {
        let m = message(None, "x");
        assert!(m.is_due(m.scheduled_at));
        assert!(!m.is_due(m.scheduled_at - chrono::Duration::seconds(1)));
    }

    #[test]
    fn sent_message_is_never_due() {
        let mut m = message(None, "x");
        m.sent = true;
        assert!(!m.is_due(m.scheduled_at + chrono::Duration::days(1)));
    }
}
