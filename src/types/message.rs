//! Provider-neutral conversation payload.

use serde::{Deserialize, Serialize};

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: text.into(),
        }
    }
}

/// Message role. System prompts travel separately as
/// [`ConversationPayload::system_instruction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// Ordered messages plus an optional system instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPayload {
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
}

impl ConversationPayload {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            system_instruction: None,
        }
    }

    /// A single user turn.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::new(vec![Message::user(text)])
    }

    pub fn with_system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(text.into());
        self
    }

    /// The system instruction, ignoring blank strings.
    pub fn system(&self) -> Option<&str> {
        self.system_instruction
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Split into prior history and the final turn.
    pub fn split_last(&self) -> Option<(&Message, &[Message])> {
        self.messages.split_last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_accepts_camel_case_json() {
        let payload: ConversationPayload = serde_json::from_value(serde_json::json!({
            "messages": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"}
            ],
            "systemInstruction": "be brief"
        }))
        .unwrap();
        assert_eq!(payload.messages.len(), 2);
        assert_eq!(payload.messages[1].role, MessageRole::Assistant);
        assert_eq!(payload.system(), Some("be brief"));
    }

    #[test]
    fn blank_system_instruction_is_ignored() {
        let payload = ConversationPayload::prompt("hi").with_system_instruction("   ");
        assert_eq!(payload.system(), None);
    }
}
