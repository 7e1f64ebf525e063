//! Core trait defining moniker registry behavior.
//!
//! This module provides the `MonikerApi` trait with default implementations for
//! generating monikers and binding them to the calling thread.
//!
//! A registry owns a process-wide counter, which is the only shared mutable state, and a
//! thread-local slot per thread. A slot starts unbound and becomes bound either by an
//! explicit `set_this_thread_moniker` or by the first read. There is no way to unbind a
//! slot; it is dropped together with the thread's storage.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::LocalKey;

use crate::{format_moniker, MonikerEvent};

/// Type alias for a user-supplied trace callback.
pub type TraceFn = dyn Fn(&MonikerEvent) + Send + Sync + 'static;

/// Storage for a registry's optional trace callback.
///
/// `installed` mirrors whether a callback is stored and is only written under the lock.
/// Emitting an event checks it first, so a registry without a callback never touches
/// the mutex.
pub struct TraceHook {
    installed: AtomicBool,
    callback: Mutex<Option<Arc<TraceFn>>>,
}

impl TraceHook {
    /// Creates an empty hook, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            installed: AtomicBool::new(false),
            callback: Mutex::new(None),
        }
    }

    /// Whether a callback is currently installed.
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }

    // Poisoning is recovered: the slot holds no invariant a panic could break.
    fn lock(&self) -> MutexGuard<'_, Option<Arc<TraceFn>>> {
        self.callback.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn replace(&self, callback: Option<Arc<TraceFn>>) {
        let mut guard = self.lock();
        self.installed.store(callback.is_some(), Ordering::Release);
        *guard = callback;
    }

    fn current(&self) -> Option<Arc<TraceFn>> {
        if !self.is_installed() {
            return None;
        }
        self.lock().clone()
    }
}

impl Default for TraceHook {
    fn default() -> Self {
        Self::new()
    }
}

/// Type alias for the per-thread binding slot.
pub type MonikerSlot = RefCell<Option<Rc<str>>>;

/// Advances `counter` and formats the value `fetch_add` returned, i.e. the value before
/// the increment.
///
/// `fetch_add` wraps on overflow, which together with the token width reduction in
/// `format_moniker` is the accepted wraparound.
fn next_moniker(counter: &AtomicU32, prefix: Option<char>) -> String {
    format_moniker(prefix, counter.fetch_add(1, Ordering::Relaxed))
}

/// Core trait defining moniker registry behavior.
///
/// Provides default implementations for all registry operations, requiring only
/// three accessor methods (`counter`, `binding` and `trace`) to be implemented by the
/// implementor.
///
/// None of the operations fail. With no trace callback installed, they touch nothing but
/// the atomic counter and the caller's own slot; with one installed, emitting an event
/// takes the hook's lock just long enough to clone the callback.
pub trait MonikerApi {
    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Access the trace hook static.
    fn trace() -> &'static TraceHook;

    /// Set a tracing callback for registry operations.
    ///
    /// The callback will be invoked for every generation and binding. Reads of an
    /// already-bound moniker are not traced.
    ///
    /// The callback runs without any registry lock held and after the thread-local slot
    /// has been released, so it may read the calling thread's moniker. It must not call
    /// `generate` unconditionally, since that emits another event.
    fn set_trace_callback(&self, callback: impl Fn(&MonikerEvent) + Send + Sync + 'static) {
        Self::trace().replace(Some(Arc::new(callback)));
    }

    /// Clear the tracing callback.
    fn clear_trace_callback(&self) {
        Self::trace().replace(None);
    }

    /// Emit the event built by `event` to the current callback, if any.
    ///
    /// The event is only built when a callback is installed.
    ///
    /// # Lock Poisoning Recovery
    ///
    /// Lock poisoning is automatically recovered by extracting the inner value. The lock
    /// is released before the callback runs.
    fn emit_event(&self, event: impl FnOnce() -> MonikerEvent) {
        if let Some(callback) = Self::trace().current() {
            callback(&event());
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Registry
    // -------------------------------------------------------------------------------------------------

    /// Access the process-wide counter static.
    ///
    /// The counter should start at `1`, so the first generated moniker carries value `1`.
    fn counter() -> &'static AtomicU32;

    /// Access the thread-local binding slot.
    fn binding() -> &'static LocalKey<MonikerSlot>;

    /// Generate a unique moniker.
    ///
    /// Advances the counter with a single atomic increment, so concurrent callers never
    /// observe the same value. If `prefix` is `Some` and not `'\0'`, the moniker is the
    /// prefix, a colon and the padded token; otherwise it is the padded token alone, of
    /// the same total width.
    ///
    /// Never reads or writes any thread's binding.
    fn generate(&self, prefix: Option<char>) -> String {
        let moniker = next_moniker(Self::counter(), prefix);
        tracing::trace!(moniker = %moniker, "generated moniker");

        self.emit_event(|| MonikerEvent::Generate {
            moniker: moniker.clone(),
        });

        moniker
    }

    /// Bind `moniker` to the calling thread.
    ///
    /// Overwrites any previous binding. The value is not validated, so callers may bind
    /// any string, not only one produced by `generate`.
    ///
    /// During thread teardown, after the slot has been destroyed, the call is a no-op.
    fn set_this_thread_moniker(&self, moniker: impl Into<String>) {
        let moniker: Rc<str> = moniker.into().into();

        let bound = Self::binding()
            .try_with(|slot| *slot.borrow_mut() = Some(moniker.clone()))
            .is_ok();
        if !bound {
            return;
        }

        tracing::trace!(moniker = %moniker, "bound moniker to thread");
        self.emit_event(|| MonikerEvent::Bind {
            moniker: moniker.to_string(),
        });
    }

    /// Get the moniker bound to the calling thread.
    ///
    /// If the thread is unbound, a fresh unprefixed moniker is generated, bound and
    /// returned in one step: a second call on the same thread returns the same string
    /// unless `set_this_thread_moniker` was called in between.
    fn get_this_thread_moniker(&self) -> String {
        self.with_this_thread_moniker(str::to_string)
    }

    /// Run `f` with the moniker bound to the calling thread.
    ///
    /// Same semantics as `get_this_thread_moniker`, without copying the moniker. The
    /// slot is not borrowed while `f` runs, so `f` may rebind the thread.
    ///
    /// During thread teardown, after the slot has been destroyed, `f` receives a fresh
    /// moniker that is not bound to anything.
    fn with_this_thread_moniker<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let lookup = Self::binding().try_with(|slot| {
            let mut slot = slot.borrow_mut();
            match slot.as_ref() {
                Some(moniker) => (moniker.clone(), false),
                None => {
                    let moniker: Rc<str> = next_moniker(Self::counter(), None).into();
                    *slot = Some(moniker.clone());
                    (moniker, true)
                }
            }
        });

        match lookup {
            Ok((moniker, false)) => f(&*moniker),
            Ok((moniker, true)) => {
                tracing::trace!(moniker = %moniker, "bound generated moniker to thread");
                self.emit_event(|| MonikerEvent::AutoBind {
                    moniker: moniker.to_string(),
                });
                f(&*moniker)
            }
            Err(_) => f(next_moniker(Self::counter(), None).as_str()),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::{MonikerApi, MonikerSlot, TraceHook};
    use crate::{counter_value, MonikerEvent, MONIKER_WIDTH};

    use serial_test::serial;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{mpsc, Arc, Mutex};
    use std::thread::{self, LocalKey};
    use std::time::Duration;

    static COUNTER: AtomicU32 = AtomicU32::new(1);

    static TRACE: TraceHook = TraceHook::new();

    thread_local! {
        static BINDING: MonikerSlot = const { RefCell::new(None) };
    }

    struct Api;

    impl MonikerApi for Api {
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

    const API: Api = Api;

    fn capture_events() -> Arc<Mutex<Vec<String>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        API.set_trace_callback(move |e| {
            events_clone.lock().unwrap().push(format!("{}", e));
        });

        events
    }

    #[test]
    #[serial]
    fn test_generate_advances_counter() {
        let before = COUNTER.load(Ordering::SeqCst);
        let first = API.generate(None);
        let second = API.generate(None);

        assert_eq!(counter_value(&first).unwrap(), before);
        assert_eq!(counter_value(&second).unwrap(), before + 1);
    }

    #[test]
    #[serial]
    fn test_generate_does_not_touch_binding() {
        thread::spawn(|| {
            API.generate(Some('x'));
            assert!(BINDING.with_borrow(|slot| slot.is_none()));
        })
        .join()
        .unwrap();
    }

    #[test]
    #[serial]
    fn test_read_is_idempotent() {
        thread::spawn(|| {
            let first = API.get_this_thread_moniker();
            let second = API.get_this_thread_moniker();
            assert_eq!(first, second);
            assert_eq!(first.len(), MONIKER_WIDTH);
            assert!(!first.contains(':'));
        })
        .join()
        .unwrap();
    }

    #[test]
    #[serial]
    fn test_explicit_override_wins() {
        thread::spawn(|| {
            let generated = API.get_this_thread_moniker();
            API.set_this_thread_moniker("X");
            assert_eq!(API.get_this_thread_moniker(), "X");
            assert_ne!(generated, "X");

            API.set_this_thread_moniker("Y");
            assert_eq!(API.get_this_thread_moniker(), "Y");
        })
        .join()
        .unwrap();
    }

    #[test]
    #[serial]
    fn test_set_before_first_read_skips_generation() {
        thread::spawn(|| {
            let before = COUNTER.load(Ordering::SeqCst);
            API.set_this_thread_moniker(String::from("worker-7"));
            assert_eq!(API.get_this_thread_moniker(), "worker-7");
            assert_eq!(COUNTER.load(Ordering::SeqCst), before);
        })
        .join()
        .unwrap();
    }

    #[test]
    #[serial]
    fn test_with_this_thread_moniker_matches_get() {
        thread::spawn(|| {
            let len = API.with_this_thread_moniker(|m| m.len());
            assert_eq!(len, MONIKER_WIDTH);

            let lent = API.with_this_thread_moniker(str::to_owned);
            assert_eq!(lent, API.get_this_thread_moniker());
        })
        .join()
        .unwrap();
    }

    #[test]
    #[serial]
    fn test_with_this_thread_moniker_allows_rebinding() {
        thread::spawn(|| {
            API.set_this_thread_moniker("outer");
            let seen = API.with_this_thread_moniker(|m| {
                API.set_this_thread_moniker("inner");
                m.to_string()
            });
            assert_eq!(seen, "outer");
            assert_eq!(API.get_this_thread_moniker(), "inner");
        })
        .join()
        .unwrap();
    }

    #[test]
    #[serial]
    fn test_thread_isolation() {
        use std::sync::Barrier;

        let barrier = Arc::new(Barrier::new(2));

        let barrier_a = barrier.clone();
        let a = thread::spawn(move || {
            API.set_this_thread_moniker("A");
            barrier_a.wait();
            API.get_this_thread_moniker()
        });

        let barrier_b = barrier.clone();
        let b = thread::spawn(move || {
            API.set_this_thread_moniker("B");
            barrier_b.wait();
            API.get_this_thread_moniker()
        });

        assert_eq!(a.join().unwrap(), "A");
        assert_eq!(b.join().unwrap(), "B");
    }

    #[test]
    #[serial]
    fn test_concurrent_generation_is_unique() {
        let handles: Vec<_> = (0..64)
            .map(|_| thread::spawn(|| (0..100).map(|_| API.generate(None)).collect::<Vec<_>>()))
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for moniker in handle.join().unwrap() {
                assert!(seen.insert(moniker), "duplicate moniker generated");
            }
        }
        assert_eq!(seen.len(), 64 * 100);
    }

    #[test]
    #[serial]
    fn test_counter_wraps_silently() {
        let saved = COUNTER.swap(u32::MAX, Ordering::SeqCst);

        let last = API.generate(None);
        let wrapped = API.generate(None);

        assert_eq!(last, "  fffff");
        assert_eq!(wrapped, "      0");

        COUNTER.store(saved, Ordering::SeqCst);
    }

    #[test]
    #[serial]
    fn test_trace_callback_generate_event() {
        let events = capture_events();

        let moniker = API.generate(Some('e'));

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0], format!("generate {{ moniker: {:?} }}", moniker));

        API.clear_trace_callback();
    }

    #[test]
    #[serial]
    fn test_trace_callback_bind_and_auto_bind_events() {
        let events = capture_events();

        let generated = thread::spawn(|| {
            let generated = API.get_this_thread_moniker();
            let _ = API.get_this_thread_moniker();
            API.set_this_thread_moniker("main");
            generated
        })
        .join()
        .unwrap();

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 2);
        assert_eq!(
            captured[0],
            format!("auto-bind {{ moniker: {:?} }}", generated)
        );
        assert_eq!(captured[1], "bind { moniker: \"main\" }");

        API.clear_trace_callback();
    }

    #[test]
    #[serial]
    fn test_trace_callback_may_read_moniker() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        API.set_trace_callback(move |event| {
            if let MonikerEvent::Bind { .. } = event {
                seen_clone
                    .lock()
                    .unwrap()
                    .push(API.get_this_thread_moniker());
            }
        });

        thread::spawn(|| API.set_this_thread_moniker("reentrant"))
            .join()
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["reentrant".to_string()]);

        API.clear_trace_callback();
    }

    #[test]
    #[serial]
    fn test_clear_trace_callback_stops_events() {
        let events = capture_events();

        API.generate(None);
        API.clear_trace_callback();
        API.generate(None);

        assert_eq!(events.lock().unwrap().len(), 1);
    }

    #[test]
    #[serial]
    fn test_poisoned_trace_lock_is_recovered() {
        let _ = thread::spawn(|| {
            let _guard = TRACE.callback.lock().unwrap();
            panic!("poison the trace lock");
        })
        .join();
        assert!(TRACE.callback.is_poisoned());

        let events = capture_events();
        API.generate(None);
        assert_eq!(events.lock().unwrap().len(), 1);

        API.clear_trace_callback();
        TRACE.callback.clear_poison();
    }

    #[test]
    #[serial]
    fn test_generation_ignores_held_hook_lock_without_callback() {
        API.clear_trace_callback();
        assert!(!TRACE.is_installed());

        let (locked_tx, locked_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let holder = thread::spawn(move || {
            let _guard = TRACE.callback.lock().unwrap_or_else(|p| p.into_inner());
            locked_tx.send(()).unwrap();
            let _ = release_rx.recv();
        });
        locked_rx.recv().unwrap();

        let (done_tx, done_rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            let generated = API.generate(None);
            let bound = API.get_this_thread_moniker();
            API.set_this_thread_moniker("rebound");
            let _ = done_tx.send((generated, bound));
        });

        let finished = done_rx.recv_timeout(Duration::from_secs(5));

        release_tx.send(()).unwrap();
        holder.join().unwrap();
        worker.join().unwrap();

        let (generated, bound) = finished.expect("registry operation waited on the trace hook");
        assert_eq!(generated.len(), MONIKER_WIDTH);
        assert_eq!(bound.len(), MONIKER_WIDTH);
        assert_ne!(generated, bound);
    }

    #[test]
    #[serial]
    fn test_installed_flag_tracks_callback() {
        API.clear_trace_callback();
        assert!(!TRACE.is_installed());

        API.set_trace_callback(|_| {});
        assert!(TRACE.is_installed());

        API.clear_trace_callback();
        assert!(!TRACE.is_installed());
    }

    #[test]
    #[serial]
    fn test_event_not_built_without_callback() {
        API.clear_trace_callback();

        let built = std::cell::Cell::new(false);
        API.emit_event(|| {
            built.set(true);
            MonikerEvent::Bind {
                moniker: "unused".to_string(),
            }
        });
        assert!(!built.get());

        let events = capture_events();
        API.emit_event(|| {
            built.set(true);
            MonikerEvent::Bind {
                moniker: "used".to_string(),
            }
        });
        assert!(built.get());
        assert_eq!(*events.lock().unwrap(), vec!["bind { moniker: \"used\" }".to_string()]);

        API.clear_trace_callback();
    }
}
