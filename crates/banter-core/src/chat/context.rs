//! Conversation Context Builder.
//!
//! Assembles the role-tagged message list sent to the completion service:
//! one system instruction, the last few persisted turns oldest-first, and the
//! new user message.

use banter_types::error::{ChatError, ValidationError};
use banter_types::llm::Message;
use banter_types::turn::SortOrder;

use crate::turn::repository::TurnRepository;

/// Fixed system instruction prepended to every context.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Provide clear, concise, and helpful responses.";

/// Number of prior turns included in each context.
pub const CONTEXT_WINDOW: usize = 5;

/// Trim a raw user message, rejecting empty input.
pub fn validate_message(raw: &str) -> Result<&str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyMessage)
    } else {
        Ok(trimmed)
    }
}

/// Builds bounded completion contexts from stored history.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    system_prompt: String,
    window: usize,
}

impl ContextBuilder {
    pub fn new(window: usize) -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            window,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Assemble `system + 2k history entries + user` for a session.
    ///
    /// Validation happens before the store is touched. The result always
    /// holds exactly one system entry first and the new message last.
    pub async fn build<R: TurnRepository>(
        &self,
        repo: &R,
        session_id: &str,
        new_message: &str,
    ) -> Result<Vec<Message>, ChatError> {
        let new_message = validate_message(new_message)?;

        let history = repo
            .recent(session_id, self.window as i64, SortOrder::Ascending)
            .await?;

        let mut messages = Vec::with_capacity(2 + history.len() * 2);
        messages.push(Message::system(self.system_prompt.as_str()));
        for turn in history {
            messages.push(Message::user(turn.user_message));
            messages.push(Message::assistant(turn.ai_response));
        }
        messages.push(Message::user(new_message));

        Ok(messages)
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(CONTEXT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryTurnRepository;
    use banter_types::error::ErrorKind;
    use banter_types::llm::MessageRole;

    #[tokio::test]
    async fn test_two_prior_turns_build_six_entries() {
        let repo = InMemoryTurnRepository::new();
        repo.append("abc", "Hello", "Hi there").await.unwrap();
        repo.append("abc", "Name a color", "Blue").await.unwrap();

        let context = ContextBuilder::default()
            .build(&repo, "abc", "What is 2+2?")
            .await
            .unwrap();

        assert_eq!(context.len(), 6);
        assert_eq!(context[0].role, MessageRole::System);
        assert_eq!(context[0].content, SYSTEM_PROMPT);
        assert_eq!(context[1], Message::user("Hello"));
        assert_eq!(context[2], Message::assistant("Hi there"));
        assert_eq!(context[3], Message::user("Name a color"));
        assert_eq!(context[4], Message::assistant("Blue"));
        assert_eq!(context[5], Message::user("What is 2+2?"));
    }

    #[tokio::test]
    async fn test_shape_for_fewer_than_window_turns() {
        for k in 0..CONTEXT_WINDOW {
            let repo = InMemoryTurnRepository::new();
            for i in 0..k {
                repo.append("s", &format!("q{i}"), &format!("a{i}")).await.unwrap();
            }

            let context = ContextBuilder::default().build(&repo, "s", "next").await.unwrap();

            assert_eq!(context.len(), 1 + 2 * k + 1);
            let systems = context.iter().filter(|m| m.role == MessageRole::System).count();
            assert_eq!(systems, 1);
            assert_eq!(context.last().unwrap(), &Message::user("next"));
        }
    }

    #[tokio::test]
    async fn test_window_keeps_most_recent_turns() {
        let repo = InMemoryTurnRepository::new();
        for i in 0..8 {
            repo.append("s", &format!("q{i}"), &format!("a{i}")).await.unwrap();
        }

        let context = ContextBuilder::default().build(&repo, "s", "next").await.unwrap();

        assert_eq!(context.len(), 1 + 2 * CONTEXT_WINDOW + 1);
        // Oldest included turn is q3; order stays chronological.
        assert_eq!(context[1], Message::user("q3"));
        assert_eq!(context[10], Message::assistant("a7"));
    }

    #[tokio::test]
    async fn test_other_sessions_are_excluded() {
        let repo = InMemoryTurnRepository::new();
        repo.append("other", "secret", "reply").await.unwrap();

        let context = ContextBuilder::default().build(&repo, "mine", "hi").await.unwrap();
        assert_eq!(context.len(), 2);
    }

    #[tokio::test]
    async fn test_new_message_is_trimmed() {
        let repo = InMemoryTurnRepository::new();
        let context = ContextBuilder::default()
            .build(&repo, "s", "  padded \n")
            .await
            .unwrap();
        assert_eq!(context.last().unwrap().content, "padded");
    }

    #[tokio::test]
    async fn test_blank_message_rejected_before_store_access() {
        let repo = InMemoryTurnRepository::new();
        let err = ContextBuilder::default()
            .build(&repo, "s", " \t ")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert_eq!(repo.read_count(), 0);
    }

    #[test]
    fn test_validate_message() {
        assert_eq!(validate_message(" hi ").unwrap(), "hi");
        assert!(matches!(validate_message(""), Err(ValidationError::EmptyMessage)));
    }
}
