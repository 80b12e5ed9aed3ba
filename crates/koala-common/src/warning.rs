//! Deduplicated diagnostics with colored terminal output.
//!
//! The text engine degrades instead of failing when it meets input it cannot
//! handle fully: an inline style declaration the layout does not understand, a
//! range whose boundary node is not in the tree, an unknown field in a JSON
//! document fixture. Each of those situations is reported here exactly once
//! per unique message.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// ANSI color codes for terminal output
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Every `[component] message` key printed since the last [`clear_warnings`].
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// A poisoned lock only means another thread panicked while printing; the
/// set itself is still usable.
fn warned() -> MutexGuard<'static, Option<HashSet<String>>> {
    WARNED.lock().unwrap_or_else(PoisonError::into_inner)
}

fn key(component: &str, message: &str) -> String {
    format!("[{component}] {message}")
}

/// Report a degraded or unsupported situation (prints once per unique message).
///
/// # Example
/// ```ignore
/// warn_once("Layout", "unsupported declaration 'column-count: 2'");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let should_print = warned()
        .get_or_insert_with(HashSet::new)
        .insert(key(component, message));

    if should_print {
        eprintln!("{YELLOW}[Koala {component}] ⚠ {message}{RESET}");
    }
}

/// Whether `message` has been reported for `component` since the last clear.
#[must_use]
pub fn has_warned(component: &str, message: &str) -> bool {
    warned()
        .as_ref()
        .is_some_and(|set| set.contains(&key(component, message)))
}

/// Forget all recorded warnings (call before loading a new document).
pub fn clear_warnings() {
    if let Some(set) = warned().as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_is_recorded_once() {
        warn_once("Test", "recorded once");
        warn_once("Test", "recorded once");
        assert!(has_warned("Test", "recorded once"));
        assert!(!has_warned("Other", "recorded once"));
    }

    #[test]
    fn test_unknown_message_not_recorded() {
        assert!(!has_warned("Test", "never reported"));
    }
}
