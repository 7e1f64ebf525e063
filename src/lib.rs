//! # Thread Moniker
//!
//! Short, stable, human-readable labels ("monikers") for threads of execution.
//!
//! A logging front-end asks for the calling thread's moniker once per record and
//! prepends it to the message; executor and timer facilities bind a prefixed moniker to
//! each worker thread they start, so every line logged by work running there is
//! attributable to the same executor or timer without passing identifiers around.
//!
//! ## Quick Start
//!
//! ```rust
//! use thread_moniker::{generate, get_this_thread_moniker, set_this_thread_moniker, PREFIX_TIMER};
//!
//! // A timer names its thread before running any work
//! let moniker = generate(Some(PREFIX_TIMER));
//! std::thread::spawn(move || {
//!     set_this_thread_moniker(moniker);
//!     println!("[{}] tick", get_this_thread_moniker());
//! })
//! .join()
//! .unwrap();
//!
//! // Any other thread gets a moniker on first read
//! let label = get_this_thread_moniker();
//! assert_eq!(label, get_this_thread_moniker());
//! ```
//!
//! ## Guarantees
//!
//! - **Unique**: generated monikers never repeat within one cycle of the counter
//!   ([`COUNTER_CYCLE`] values); after that the counter wraps silently
//! - **Fixed width**: every generated moniker is [`MONIKER_WIDTH`] characters wide
//! - **Thread-local**: a binding is only ever visible to the thread that owns it
//! - **Total**: no operation fails, panics, or performs I/O
//!
//! The same moniker may be bound by several threads on purpose: a moniker identifies an
//! execution context, not a physical thread.
//!
//! ## Main Functions
//!
//! - [`generate`] - Generate a unique moniker, optionally prefixed
//! - [`set_this_thread_moniker`] - Bind a moniker to the calling thread
//! - [`get_this_thread_moniker`] - Read the calling thread's moniker, binding one if absent
//! - [`with_this_thread_moniker`] - Same as above without copying the string
//! - [`set_trace_callback`] - Set up tracing for registry operations
//! - [`define_moniker_registry!`] - Create an isolated registry

mod macros;
mod moniker;
mod registry;
mod registry_error;
mod registry_event;
mod registry_trait;

pub use moniker::{
    counter_value, format_moniker, prefix_of, trimmed, COUNTER_CYCLE, MONIKER_WIDTH,
    PREFIX_EXECUTOR, PREFIX_TIMER, TOKEN_WIDTH,
};
pub use registry::{
    clear_trace_callback, generate, get_this_thread_moniker, set_this_thread_moniker,
    set_trace_callback, with_this_thread_moniker, DefaultRegistry, DEFAULT_REGISTRY,
};
pub use registry_error::MonikerError;
pub use registry_event::MonikerEvent;
pub use registry_trait::{MonikerApi, MonikerSlot, TraceFn, TraceHook};
