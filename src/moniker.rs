//! Moniker formatting and diagnostic parsing.
//!
//! A moniker is a fixed-width, printable label. The counter token is a lowercase
//! hexadecimal value, right-justified in [`TOKEN_WIDTH`] columns. The prefixed form puts
//! a single character and a colon in front of the token; the unprefixed form pads the
//! same two columns with spaces, so both forms are [`MONIKER_WIDTH`] characters wide.
//!
//! ```text
//! "e:   2a"   prefixed with PREFIX_EXECUTOR
//! "     2b"   unprefixed
//! ```

use crate::MonikerError;

/// Prefix reserved for monikers of task-executor worker threads.
pub const PREFIX_EXECUTOR: char = 'e';

/// Prefix reserved for monikers of timer threads.
pub const PREFIX_TIMER: char = 't';

/// Number of characters of the counter token.
pub const TOKEN_WIDTH: usize = 5;

/// Total number of characters of every generated moniker.
pub const MONIKER_WIDTH: usize = TOKEN_WIDTH + 2;

/// Number of distinct counter values a token can hold (`16^TOKEN_WIDTH`).
///
/// Counter values wrap silently once this range is exhausted.
pub const COUNTER_CYCLE: u32 = 1 << (4 * TOKEN_WIDTH);

const SEPARATOR: char = ':';

/// Formats a counter value into a moniker.
///
/// `value` is reduced modulo [`COUNTER_CYCLE`]. A `'\0'` prefix is treated like `None`.
///
/// # Examples
///
/// ```
/// use thread_moniker::{format_moniker, PREFIX_TIMER};
///
/// assert_eq!(format_moniker(None, 0x2a), "     2a");
/// assert_eq!(format_moniker(Some(PREFIX_TIMER), 0x2a), "t:   2a");
/// ```
pub fn format_moniker(prefix: Option<char>, value: u32) -> String {
    let value = value % COUNTER_CYCLE;
    match prefix.filter(|p| *p != '\0') {
        Some(prefix) => format!("{prefix}{SEPARATOR}{value:>TOKEN_WIDTH$x}"),
        None => format!("{value:>MONIKER_WIDTH$x}"),
    }
}

/// Returns the prefix character of a prefixed moniker.
///
/// ```
/// use thread_moniker::prefix_of;
///
/// assert_eq!(prefix_of("e:    1"), Some('e'));
/// assert_eq!(prefix_of("      1"), None);
/// ```
pub fn prefix_of(moniker: &str) -> Option<char> {
    let mut chars = moniker.chars();
    match (chars.next(), chars.next()) {
        (Some(prefix), Some(SEPARATOR)) if !prefix.is_whitespace() => Some(prefix),
        _ => None,
    }
}

/// Returns the moniker without its leading padding.
///
/// ```
/// use thread_moniker::trimmed;
///
/// assert_eq!(trimmed("     2a"), "2a");
/// assert_eq!(trimmed("e:   2a"), "e:   2a");
/// ```
pub fn trimmed(moniker: &str) -> &str {
    moniker.trim_start_matches(' ')
}

/// Extracts the counter value embedded in a generated moniker.
///
/// Intended for diagnostics only; log consumers should treat monikers as opaque labels.
///
/// # Errors
///
/// - [`MonikerError::Empty`] if the moniker carries no counter token
/// - [`MonikerError::InvalidCounter`] if the token is not a hexadecimal value
pub fn counter_value(moniker: &str) -> Result<u32, MonikerError> {
    let token = match prefix_of(moniker) {
        Some(prefix) => &moniker[prefix.len_utf8() + SEPARATOR.len_utf8()..],
        None => moniker,
    };
    let token = token.trim_matches(' ');
    if token.is_empty() {
        return Err(MonikerError::Empty);
    }

    // from_str_radix alone would also accept a sign
    if !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(MonikerError::InvalidCounter {
            token: token.to_string(),
        });
    }

    u32::from_str_radix(token, 16).map_err(|_| MonikerError::InvalidCounter {
        token: token.to_string(),
    })
}
