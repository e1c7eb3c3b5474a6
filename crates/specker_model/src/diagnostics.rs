//! Diagnostic sink shared by readers, renderers and transformators.
//!
//! A [`Diagnostics`] value wraps a `tracing` dispatcher. Components take it
//! as an explicit dependency and route their events through it, so a caller
//! decides where diagnostics of a given document go without touching any
//! process-wide state. Emitting never influences parsing or rendering.

use std::fmt;
use std::io;

use tracing::dispatcher::{self, Dispatch};
use tracing::Level;

/// Explicitly passed diagnostic channel.
#[derive(Clone)]
pub struct Diagnostics {
    dispatch: Dispatch,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::current()
    }
}

impl Diagnostics {
    /// Diagnostics written to standard error, up to `level`.
    pub fn stderr(level: Level) -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_max_level(level)
            .with_target(false)
            .finish();
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Diagnostics that are discarded.
    pub fn silent() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Diagnostics routed to the dispatcher in effect right now
    /// (the global subscriber, if the driver installed one).
    pub fn current() -> Self {
        Self {
            dispatch: dispatcher::get_default(|dispatch| dispatch.clone()),
        }
    }

    pub fn from_dispatch(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Run `f` with this sink as the active dispatcher; events emitted with
    /// the `tracing` macros inside `f` land here.
    pub fn emit<R>(&self, f: impl FnOnce() -> R) -> R {
        dispatcher::with_default(&self.dispatch, f)
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::debug;
    use tracing::span::{Attributes, Id, Record};
    use tracing::{Event, Metadata, Subscriber};

    struct CountingSubscriber(Arc<AtomicUsize>);

    impl Subscriber for CountingSubscriber {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }
        fn new_span(&self, _: &Attributes<'_>) -> Id {
            Id::from_u64(1)
        }
        fn record(&self, _: &Id, _: &Record<'_>) {}
        fn record_follows_from(&self, _: &Id, _: &Id) {}
        fn event(&self, _: &Event<'_>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        fn enter(&self, _: &Id) {}
        fn exit(&self, _: &Id) {}
    }

    #[test]
    fn test_emit_routes_to_own_dispatch() {
        let count = Arc::new(AtomicUsize::new(0));
        let diagnostics =
            Diagnostics::from_dispatch(Dispatch::new(CountingSubscriber(count.clone())));

        diagnostics.emit(|| debug!("first"));
        diagnostics.emit(|| debug!("second"));

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_silent_returns_closure_value() {
        let value = Diagnostics::silent().emit(|| {
            debug!("dropped");
            42
        });
        assert_eq!(value, 42);
    }
}
