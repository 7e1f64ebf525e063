//! The process-wide default moniker registry.
//!
//! Logging front-ends read the calling thread's moniker from here; executor and timer
//! facilities generate a prefixed moniker when they start a worker and bind it on the
//! worker thread before running any work.
//!
//! # Examples
//!
//! ```
//! use thread_moniker::{generate, get_this_thread_moniker, set_this_thread_moniker, PREFIX_EXECUTOR};
//!
//! let moniker = generate(Some(PREFIX_EXECUTOR));
//! assert!(moniker.starts_with("e:"));
//!
//! std::thread::spawn(move || {
//!     set_this_thread_moniker(moniker.clone());
//!     assert_eq!(get_this_thread_moniker(), moniker);
//! })
//! .join()
//! .unwrap();
//! ```

use std::cell::RefCell;
use std::sync::atomic::AtomicU32;
use std::thread::LocalKey;

use crate::{MonikerApi, MonikerEvent, MonikerSlot, TraceHook};

/// Process-wide counter of the default registry.
static COUNTER: AtomicU32 = AtomicU32::new(1);

/// Holds an optional user-defined tracing callback.
static TRACE: TraceHook = TraceHook::new();

thread_local! {
    /// Moniker bound to the current thread.
    static BINDING: MonikerSlot = const { RefCell::new(None) };
}

/// The default registry, behind the free functions of this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRegistry;

impl MonikerApi for DefaultRegistry {
    fn counter() -> &'static AtomicU32 {
        &COUNTER
    }

    fn binding() -> &'static LocalKey<MonikerSlot> {
        &BINDING
    }

    fn trace() -> &'static TraceHook {
        &TRACE
    }
}

/// Constant for trait-based access to the default registry.
pub const DEFAULT_REGISTRY: DefaultRegistry = DefaultRegistry;

/// Generates a unique moniker.
///
/// Pass `None` for an unprefixed moniker, or a prefix character such as
/// [`PREFIX_EXECUTOR`](crate::PREFIX_EXECUTOR) or [`PREFIX_TIMER`](crate::PREFIX_TIMER).
/// Both forms have the same width.
///
/// ```
/// use thread_moniker::{generate, MONIKER_WIDTH, PREFIX_TIMER};
///
/// let plain = generate(None);
/// let timer = generate(Some(PREFIX_TIMER));
///
/// assert_eq!(plain.len(), MONIKER_WIDTH);
/// assert_eq!(timer.len(), MONIKER_WIDTH);
/// assert!(timer.starts_with("t:"));
/// assert_ne!(plain.trim(), timer[2..].trim());
/// ```
pub fn generate(prefix: Option<char>) -> String {
    DEFAULT_REGISTRY.generate(prefix)
}

/// Binds `moniker` to the calling thread, replacing any previous binding.
///
/// ```
/// use thread_moniker::{get_this_thread_moniker, set_this_thread_moniker};
///
/// set_this_thread_moniker("main");
/// assert_eq!(get_this_thread_moniker(), "main");
/// ```
pub fn set_this_thread_moniker(moniker: impl Into<String>) {
    DEFAULT_REGISTRY.set_this_thread_moniker(moniker)
}

/// Returns the moniker bound to the calling thread, binding a fresh one if there is none.
///
/// ```
/// use thread_moniker::get_this_thread_moniker;
///
/// let first = get_this_thread_moniker();
/// assert_eq!(get_this_thread_moniker(), first);
/// ```
pub fn get_this_thread_moniker() -> String {
    DEFAULT_REGISTRY.get_this_thread_moniker()
}

/// Runs `f` with the moniker bound to the calling thread, without copying it.
///
/// ```
/// use thread_moniker::{set_this_thread_moniker, with_this_thread_moniker};
///
/// set_this_thread_moniker("io");
/// let line = with_this_thread_moniker(|m| format!("[{m}] ready"));
/// assert_eq!(line, "[io] ready");
/// ```
pub fn with_this_thread_moniker<R>(f: impl FnOnce(&str) -> R) -> R {
    DEFAULT_REGISTRY.with_this_thread_moniker(f)
}

/// Sets a tracing callback that will be invoked on every generation and binding.
///
/// # Example
/// ```rust
/// use thread_moniker::{clear_trace_callback, set_trace_callback};
///
/// set_trace_callback(|event| println!("[moniker-trace] {}", event));
/// clear_trace_callback();
/// ```
pub fn set_trace_callback(callback: impl Fn(&MonikerEvent) + Send + Sync + 'static) {
    DEFAULT_REGISTRY.set_trace_callback(callback)
}

/// Clears the tracing callback (disables registry tracing).
pub fn clear_trace_callback() {
    DEFAULT_REGISTRY.clear_trace_callback()
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
