//! Chat templates for the hosted instruct models.
//!
//! The hosted endpoints take a single raw string, so the role-tagged
//! conversation is rendered here exactly as the model was fine-tuned to see
//! it, followed by the cue that opens the assistant turn.

use serde::{Deserialize, Serialize};

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Prompt format expected by a model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatTemplate {
    /// Zephyr: `<|system|>`, `<|user|>`, `<|assistant|>` headers, `</s>` after each turn.
    Zephyr,
    /// Mistral Instruct: `[INST] ... [/INST]` pairs, no system role.
    Mistral,
}

const EOS: &str = "</s>";
const BOS: &str = "<s>";

impl ChatTemplate {
    /// Render messages and append the generation cue.
    pub fn render(&self, messages: &[ChatMessage]) -> String {
        match self {
            ChatTemplate::Zephyr => render_zephyr(messages),
            ChatTemplate::Mistral => render_mistral(messages),
        }
    }

    /// Literal text that opens the assistant turn in rendered output.
    pub const fn assistant_marker(&self) -> &'static str {
        match self {
            ChatTemplate::Zephyr => "<|assistant|>",
            ChatTemplate::Mistral => "[/INST]",
        }
    }
}

fn render_zephyr(messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        out.push_str("<|");
        out.push_str(&message.role);
        out.push_str("|>\n");
        out.push_str(&message.content);
        out.push_str(EOS);
        out.push('\n');
    }
    out.push_str("<|assistant|>\n");
    out
}

/// System text is folded into the first user turn.
fn render_mistral(messages: &[ChatMessage]) -> String {
    let mut out = String::from(BOS);
    let mut pending_system: Option<&str> = None;

    for message in messages {
        match message.role.as_str() {
            "system" => pending_system = Some(&message.content),
            "user" => {
                out.push_str("[INST] ");
                if let Some(system) = pending_system.take() {
                    out.push_str(system);
                    out.push_str("\n\n");
                }
                out.push_str(&message.content);
                out.push_str(" [/INST]");
            }
            _ => {
                out.push_str(&message.content);
                out.push_str(EOS);
            }
        }
    }
    out
}
