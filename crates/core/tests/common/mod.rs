//! Shared test helpers for `cmdgraph_core` integration tests.

#![allow(unreachable_pub)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cmdgraph_core::{CommandContext, ResultConsumer, SyntaxError};

// ─── Result consumer ─────────────────────────────────────────────────────────

/// One completion notification: source, success flag, result.
pub type Completion<S> = (S, bool, i32);

/// Records every completion notification in order.
#[derive(Clone)]
pub struct Recorder<S> {
    seen: Arc<Mutex<Vec<Completion<S>>>>,
}

impl<S> Default for Recorder<S> {
    fn default() -> Self {
        Self {
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<S: Clone> Recorder<S> {
    /// Snapshot of the notifications so far.
    #[allow(dead_code)]
    pub fn seen(&self) -> Vec<Completion<S>> {
        self.seen.lock().unwrap().clone()
    }
}

impl<S: Clone + Send + Sync> ResultConsumer<S> for Recorder<S> {
    fn on_command_complete(&self, context: &CommandContext<S>, success: bool, result: i32) {
        self.seen
            .lock()
            .unwrap()
            .push((context.source().clone(), success, result));
    }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// A shared invocation counter.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    /// Number of recorded invocations.
    #[allow(dead_code)]
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// A handler that bumps the counter and returns `result`.
    #[allow(dead_code)]
    pub fn handler<S: 'static>(
        &self,
        result: i32,
    ) -> impl Fn(&CommandContext<S>) -> Result<i32, SyntaxError> + Send + Sync + 'static {
        let counter = Arc::clone(&self.0);
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(result)
        }
    }
}
