/// Events emitted by a moniker registry.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// Reading a moniker that is already bound emits nothing.
///
/// # Examples
///
/// ```rust
/// use thread_moniker::MonikerEvent;
///
/// let event = MonikerEvent::Bind { moniker: "worker".to_string() };
/// assert_eq!(event.to_string(), "bind { moniker: \"worker\" }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonikerEvent {
    /// A fresh moniker was generated.
    Generate {
        /// The generated moniker, padding included
        moniker: String,
    },

    /// A moniker was explicitly bound to the calling thread.
    Bind {
        /// The bound moniker, exactly as supplied by the caller
        moniker: String,
    },

    /// A read found the calling thread unbound and bound a fresh moniker to it.
    AutoBind {
        /// The generated and bound moniker
        moniker: String,
    },
}

impl MonikerEvent {
    /// The moniker carried by the event.
    pub fn moniker(&self) -> &str {
        match self {
            MonikerEvent::Generate { moniker }
            | MonikerEvent::Bind { moniker }
            | MonikerEvent::AutoBind { moniker } => moniker,
        }
    }
}

impl std::fmt::Display for MonikerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonikerEvent::Generate { moniker } => {
                write!(f, "generate {{ moniker: {:?} }}", moniker)
            }
            MonikerEvent::Bind { moniker } => write!(f, "bind {{ moniker: {:?} }}", moniker),
            MonikerEvent::AutoBind { moniker } => {
                write!(f, "auto-bind {{ moniker: {:?} }}", moniker)
            }
        }
    }
}
