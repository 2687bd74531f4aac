//! Output cleanup for raw decoded model text.
//!
//! The hosted endpoints echo the rendered prompt in front of the generation,
//! so the raw text starts with the system instruction, the user turn and the
//! assistant cue. Normalization drops that echo and any chatter the model
//! emits before the expected section heading.

use crate::chat_template::ChatTemplate;

/// Assistant-turn markers of every supported template.
pub const ASSISTANT_MARKERS: [&str; 2] = [
    ChatTemplate::Zephyr.assistant_marker(),
    ChatTemplate::Mistral.assistant_marker(),
];

/// Section heading everything before which is discarded.
pub const SECTION_HEADING: &str = "## Workflow";

/// Clean raw model text.
///
/// 1. Drop everything up to and including the first assistant-turn marker.
/// 2. Drop everything before the first [`SECTION_HEADING`], keeping the heading.
/// 3. Trim surrounding whitespace.
///
/// Each step passes the text through unchanged when its marker is absent.
pub fn normalize(raw: &str) -> String {
    let text = strip_through_assistant_marker(raw);
    let text = strip_before_heading(text);
    text.trim().to_string()
}

fn strip_through_assistant_marker(text: &str) -> &str {
    ASSISTANT_MARKERS
        .iter()
        .filter_map(|marker| text.find(marker).map(|idx| (idx, marker.len())))
        .min_by_key(|(idx, _)| *idx)
        .map_or(text, |(idx, len)| &text[idx + len..])
}

fn strip_before_heading(text: &str) -> &str {
    text.find(SECTION_HEADING).map_or(text, |idx| &text[idx..])
}
