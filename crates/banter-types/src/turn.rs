//! Chat turn types.
//!
//! A [`ChatTurn`] is one persisted user-message/assistant-response pair.
//! Turns are grouped into conversations by an opaque `session_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Session id used when no session is supplied.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Display format for turn timestamps (`2025-01-31 14:05:09`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Character budget for message previews in admin listings.
pub const PREVIEW_CHARS: usize = 50;

/// One persisted exchange: the user's message and the assistant's reply.
///
/// Turns are created only as a complete pair; a turn never exists with the
/// response missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Store-assigned, monotonically increasing id.
    pub id: i64,
    pub user_message: String,
    pub ai_response: String,
    /// Time of insertion.
    pub timestamp: DateTime<Utc>,
    pub session_id: String,
}

impl ChatTurn {
    /// Timestamp rendered with [`TIMESTAMP_FORMAT`].
    pub fn display_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Shortened user message for listings.
    pub fn user_message_preview(&self) -> String {
        preview(&self.user_message, PREVIEW_CHARS)
    }

    /// Shortened assistant response for listings.
    pub fn ai_response_preview(&self) -> String {
        preview(&self.ai_response, PREVIEW_CHARS)
    }
}

impl fmt::Display for ChatTurn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chat at {}", self.display_timestamp())
    }
}

/// Read order for turn listings.
///
/// History display and context assembly read oldest-first; administrative
/// listings read newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// SQL keyword for this order.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "ascending"),
            SortOrder::Descending => write!(f, "descending"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(format!("invalid sort order: '{other}'")),
        }
    }
}

/// Filter for the administrative turn listing (always newest-first).
#[derive(Debug, Clone, Default)]
pub struct TurnFilter {
    /// Restrict to one session.
    pub session_id: Option<String>,
    /// Case-insensitive substring matched against both message and response.
    pub search: Option<String>,
    /// Maximum rows returned; `None` means unbounded.
    pub limit: Option<i64>,
}

/// Aggregate view of one session's stored turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub turn_count: u64,
    pub last_activity: DateTime<Utc>,
}

/// Map an empty or whitespace-only session id onto [`DEFAULT_SESSION_ID`].
///
/// Any other id is opaque and returned byte-for-byte.
pub fn normalize_session_id(session_id: &str) -> &str {
    if session_id.trim().is_empty() {
        DEFAULT_SESSION_ID
    } else {
        session_id
    }
}

/// Truncate `text` to `max_chars` characters, appending `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_turn(user_message: &str) -> ChatTurn {
        ChatTurn {
            id: 7,
            user_message: user_message.to_string(),
            ai_response: "Sure.".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
            session_id: "abc".to_string(),
        }
    }

    #[test]
    fn test_display_uses_timestamp_format() {
        let turn = make_turn("hi");
        assert_eq!(turn.display_timestamp(), "2025-03-14 09:26:53");
        assert_eq!(turn.to_string(), "Chat at 2025-03-14 09:26:53");
    }

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("hello", 50), "hello");
        let exact = "x".repeat(50);
        assert_eq!(preview(&exact, 50), exact);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(60);
        let p = preview(&long, 50);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), 53);
    }

    #[test]
    fn test_turn_previews() {
        let turn = make_turn(&"a".repeat(80));
        assert_eq!(turn.user_message_preview().len(), 53);
        assert_eq!(turn.ai_response_preview(), "Sure.");
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Ascending);
        assert_eq!("Descending".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert!("sideways".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::Descending.as_sql(), "DESC");
    }

    #[test]
    fn test_normalize_session_id() {
        assert_eq!(normalize_session_id(""), DEFAULT_SESSION_ID);
        assert_eq!(normalize_session_id("   "), DEFAULT_SESSION_ID);
        assert_eq!(normalize_session_id("s1"), "s1");
    }

    #[test]
    fn test_normalize_session_id_keeps_padded_ids_distinct() {
        assert_eq!(normalize_session_id(" s1"), " s1");
        assert_eq!(normalize_session_id("s1\t"), "s1\t");
        assert_ne!(normalize_session_id(" s1"), normalize_session_id("s1"));
    }
}
