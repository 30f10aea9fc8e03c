//! Rollback registration context handed to a unit of work.

use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;

/// A compensating action paired with a description for the logs.
///
/// The undo closure must be idempotent: a sweep may be retried by an
/// operator after a partial failure.
pub struct RollbackAction {
    /// What the action undoes, for operator-facing logs.
    pub description: String,

    /// The undo itself. `Err` carries a human-readable reason.
    pub undo: Box<dyn FnOnce() -> BoxFuture<'static, Result<(), String>> + Send>,
}

/// Collects compensating actions while a unit of work runs.
///
/// Cloning is cheap and clones share the same stack, so a unit of work can
/// pass the context into helpers freely.
#[derive(Clone, Default)]
pub struct SagaContext {
    rollbacks: Arc<Mutex<Vec<RollbackAction>>>,
}

impl SagaContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a compensating action for a mutation just applied.
    ///
    /// Actions are swept in reverse registration order: register the undo
    /// for each mutation immediately after the mutation succeeds, and the
    /// sweep will observe the same state the action was registered against.
    pub fn add_rollback<F>(&self, description: impl Into<String>, undo: F)
    where
        F: FnOnce() -> BoxFuture<'static, Result<(), String>> + Send + 'static,
    {
        let action = RollbackAction {
            description: description.into(),
            undo: Box::new(undo),
        };
        self.stack().push(action);
    }

    /// Returns the number of registered actions.
    pub fn len(&self) -> usize {
        self.stack().len()
    }

    /// Returns true if no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains the stack in registration order. The coordinator pops from
    /// the returned vector to sweep LIFO.
    pub(crate) fn take(&self) -> Vec<RollbackAction> {
        std::mem::take(&mut *self.stack())
    }

    fn stack(&self) -> std::sync::MutexGuard<'_, Vec<RollbackAction>> {
        // The mutex is never held across an await; recover it if a
        // panicking holder poisoned it.
        match self.rollbacks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl std::fmt::Debug for SagaContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SagaContext")
            .field("rollbacks", &self.len())
            .finish()
    }
}
