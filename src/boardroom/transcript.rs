//! Rendering of the persisted message log into prompt text.

use crate::store::StoredMessage;

/// Number of trailing messages fed to per-turn prompts.
pub const HISTORY_WINDOW: usize = 10;

/// Characters kept from each message in the bounded window.
pub const HISTORY_PREVIEW_CHARS: usize = 200;

/// The last [`HISTORY_WINDOW`] messages as `[sender]: prefix...` lines.
///
/// Every line gets the `...` suffix, truncated or not.
pub fn render_window(messages: &[StoredMessage]) -> String {
    let start = messages.len().saturating_sub(HISTORY_WINDOW);
    messages[start..]
        .iter()
        .map(|message| {
            let prefix: String = message.content.chars().take(HISTORY_PREVIEW_CHARS).collect();
            format!("[{}]: {}...", message.sender, prefix)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The whole log as `sender: content` lines, for report synthesis.
pub fn render_full(messages: &[StoredMessage]) -> String {
    messages
        .iter()
        .map(|message| format!("{}: {}", message.sender, message.content))
        .collect::<Vec<_>>()
        .join("\n")
}
