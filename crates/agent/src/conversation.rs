//! Append-only conversation state for a single run

use std::fmt::Write as _;

use marketeer_provider::{Message, Role};

use crate::{AgentError, Result};

/// Ordered message history driving one `run()`.
///
/// Seeded with the directive and the goal. After that only assistant turns
/// and tool results answering the latest assistant turn can be appended.
/// Nothing is ever mutated or removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new(directive: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(directive), Message::user(goal)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Snapshot handed to the completion service
    pub fn to_vec(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Messages with the given role, in order
    pub fn with_role(&self, role: Role) -> impl Iterator<Item = &Message> + '_ {
        self.messages.iter().filter(move |m| m.role == role)
    }

    pub fn push_assistant(&mut self, message: Message) -> Result<()> {
        if message.role != Role::Assistant {
            return Err(AgentError::Conversation(format!(
                "expected an assistant message, got {}",
                message.role
            )));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Check that a result for `call_id` could be appended: the id must come
    /// from the most recent assistant turn and must not be answered yet.
    pub fn accepts_tool_result(&self, call_id: &str) -> Result<()> {
        let assistant_idx = self
            .messages
            .iter()
            .rposition(|m| m.role == Role::Assistant)
            .ok_or_else(|| {
                AgentError::Conversation(format!(
                    "tool result '{}' has no assistant turn to answer",
                    call_id
                ))
            })?;

        let issued = self.messages[assistant_idx]
            .requested_calls()
            .iter()
            .any(|call| call.id == call_id);
        if !issued {
            return Err(AgentError::Conversation(format!(
                "tool call id '{}' was not issued by the latest assistant turn",
                call_id
            )));
        }

        let answered = self.messages[assistant_idx + 1..]
            .iter()
            .any(|m| m.tool_call_id.as_deref() == Some(call_id));
        if answered {
            return Err(AgentError::Conversation(format!(
                "tool call id '{}' already has a result",
                call_id
            )));
        }
        Ok(())
    }

    pub fn push_tool_result(
        &mut self,
        call_id: &str,
        name: &str,
        content: impl Into<String>,
    ) -> Result<()> {
        self.accepts_tool_result(call_id)?;
        self.messages.push(Message::tool(call_id, name, content));
        Ok(())
    }

    /// Human-readable dump of the run, one block per message
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for (i, msg) in self.messages.iter().enumerate() {
            let _ = write!(out, "[{}] {}", i, msg.role);
            if let Some(name) = &msg.name {
                let _ = write!(out, " ({})", name);
            }
            out.push('\n');

            if let Some(content) = msg.content.as_deref().filter(|c| !c.is_empty()) {
                let _ = writeln!(out, "{}", content.trim());
            }
            for call in msg.requested_calls() {
                let _ = writeln!(
                    out,
                    "-> {}({}) [{}]",
                    call.function.name, call.function.arguments, call.id
                );
            }
        }
        out
    }
}
