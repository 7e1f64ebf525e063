//! Macros for creating isolated moniker registries.

/// Creates a complete, isolated moniker registry with a single macro invocation.
///
/// The macro generates a module containing:
/// - Counter static (hidden)
/// - Thread-local binding slot (hidden)
/// - Trace hook static (hidden)
/// - An `Api` struct that implements `MonikerApi`, and an `API` constant
/// - Free functions delegating to `API`
///
/// Monikers generated by one registry are independent of every other registry,
/// including the default one: each has its own counter and its own per-thread binding.
///
/// # Examples
///
/// ```rust
/// use thread_moniker::define_moniker_registry;
///
/// define_moniker_registry!(pool);
///
/// let worker = pool::generate(Some('p'));
/// assert!(worker.starts_with("p:"));
///
/// pool::set_this_thread_moniker(worker.clone());
/// assert_eq!(pool::get_this_thread_moniker(), worker);
/// ```
///
/// # Trait-Based Usage
///
/// ```rust
/// use thread_moniker::{define_moniker_registry, MonikerApi};
///
/// define_moniker_registry!(app);
///
/// let moniker = app::API.generate(None);
/// assert_eq!(moniker, "      1");
/// ```
#[macro_export]
macro_rules! define_moniker_registry {
    ($name:ident) => {
        pub mod $name {
            use std::cell::RefCell;
            use std::sync::atomic::AtomicU32;
            use std::thread::LocalKey;

            // Process-wide counter (module-private)
            static COUNTER: AtomicU32 = AtomicU32::new(1);

            // Trace callback storage (module-private)
            static TRACE: $crate::TraceHook = $crate::TraceHook::new();

            ::std::thread_local! {
                static BINDING: $crate::MonikerSlot = const { RefCell::new(None) };
            }

            /// Zero-sized type that implements the registry API.
            pub struct Api;

            impl $crate::MonikerApi for Api {
                fn counter() -> &'static AtomicU32 {
                    &COUNTER
                }

                fn binding() -> &'static LocalKey<$crate::MonikerSlot> {
                    &BINDING
                }

                fn trace() -> &'static $crate::TraceHook {
                    &TRACE
                }
            }

            /// Convenient constant for accessing the registry API.
            pub const API: Api = Api;

            /// Generate a unique moniker.
            pub fn generate(prefix: Option<char>) -> String {
                use $crate::MonikerApi;
                API.generate(prefix)
            }

            /// Bind a moniker to the calling thread.
            pub fn set_this_thread_moniker(moniker: impl Into<String>) {
                use $crate::MonikerApi;
                API.set_this_thread_moniker(moniker)
            }

            /// Get the moniker bound to the calling thread.
            pub fn get_this_thread_moniker() -> String {
                use $crate::MonikerApi;
                API.get_this_thread_moniker()
            }

            /// Run a closure with the moniker bound to the calling thread.
            pub fn with_this_thread_moniker<R>(f: impl FnOnce(&str) -> R) -> R {
                use $crate::MonikerApi;
                API.with_this_thread_moniker(f)
            }

            /// Set a tracing callback for registry operations.
            pub fn set_trace_callback(
                callback: impl Fn(&$crate::MonikerEvent) + Send + Sync + 'static,
            ) {
                use $crate::MonikerApi;
                API.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                use $crate::MonikerApi;
                API.clear_trace_callback()
            }
        }
    };
}
