//! One-off warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used for soft tolerances that are not tied to a particular input stream,
//! such as multi-value input truncated by a single-value element.

use std::collections::HashSet;
use std::sync::Mutex;

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn once per unique message.
///
/// The message is always forwarded to `log::warn!`; the colored stderr copy
/// is printed only the first time.
///
/// # Example
/// ```ignore
/// warn_once("Elements", "AmbientColorElement only supports one value");
/// ```
pub fn warn_once(component: &str, message: &str) {
    log::warn!("[{component}] {message}");

    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .map(|mut guard| guard.get_or_insert_with(HashSet::new).insert(key))
        .unwrap_or(false);

    if should_print {
        eprintln!("{}", format!("[Coin {component}] ⚠ {message}").yellow());
    }
}

/// Clear all recorded warnings (call when starting a new traversal or file).
pub fn clear_warnings() {
    if let Ok(mut guard) = WARNED.lock() {
        if let Some(set) = guard.as_mut() {
            set.clear();
        }
    }
}

/// Returns true if `message` from `component` has already been printed.
pub fn was_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED
        .lock()
        .map(|guard| guard.as_ref().is_some_and(|set| set.contains(&key)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_records_message() {
        warn_once("Test", "unique message for warn_once");
        assert!(was_warned("Test", "unique message for warn_once"));
        assert!(!was_warned("Test", "never posted"));
    }
}
