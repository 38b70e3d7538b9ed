//! Outbound notifications.

pub mod telegram;

pub use telegram::TelegramNotifier;

/// Cap applied to error text before it is sent out.
pub const ERROR_TEXT_LIMIT: usize = 1000;

/// Truncate a message to at most `max` characters.
///
/// Operates on characters, not bytes, so multi-byte text stays intact.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
