//! Saga coordinator: runs a unit of work and sweeps its rollback stack on failure.

use std::fmt::Display;
use std::future::Future;

use crate::context::SagaContext;
use crate::outcome::SagaOutcome;

/// Executes units of work with compensating rollback on failure.
///
/// A run is synchronous from the caller's point of view: it proceeds to
/// completion or failure with no retries, timeouts, or cancellation. The
/// coordinator holds no state between runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coordinator;

impl Coordinator {
    /// Creates a new coordinator.
    pub fn new() -> Self {
        Self
    }

    /// Runs `operation` and returns its outcome.
    ///
    /// The operation receives a [`SagaContext`] and registers a compensating
    /// action after each mutation it applies. If the operation returns
    /// `Err`, every registered action is executed in strict reverse
    /// registration order before the failure is surfaced. If it returns
    /// `Ok`, the stack is discarded without execution.
    pub async fn run<T, E, F, Fut>(&self, name: &'static str, operation: F) -> SagaOutcome<T>
    where
        F: FnOnce(SagaContext) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        metrics::counter!("saga_runs_total", "saga" => name).increment(1);
        let ctx = SagaContext::new();

        match operation(ctx.clone()).await {
            Ok(data) => {
                // Commit: registered rollbacks are dropped unexecuted.
                let discarded = ctx.take().len();
                metrics::counter!("saga_commits_total", "saga" => name).increment(1);
                tracing::debug!(saga = name, discarded, "saga committed");
                SagaOutcome::committed(data)
            }
            Err(error) => {
                let error = error.to_string();
                let rolled_back = self.sweep(name, &ctx).await;
                metrics::counter!("saga_failures_total", "saga" => name).increment(1);
                tracing::warn!(saga = name, error = %error, rolled_back, "saga failed");
                SagaOutcome::failed(error, rolled_back)
            }
        }
    }

    /// Executes all registered rollbacks, newest first.
    ///
    /// Returns true if at least one action was swept. A failing action is
    /// logged and the sweep continues; nothing deeper can recover it.
    async fn sweep(&self, name: &'static str, ctx: &SagaContext) -> bool {
        let mut actions = ctx.take();
        if actions.is_empty() {
            return false;
        }

        tracing::info!(saga = name, actions = actions.len(), "sweeping rollback stack");
        while let Some(action) = actions.pop() {
            match (action.undo)().await {
                Ok(()) => {
                    tracing::debug!(saga = name, action = %action.description, "compensation applied");
                }
                Err(reason) => {
                    metrics::counter!("saga_compensation_failures_total", "saga" => name)
                        .increment(1);
                    tracing::error!(
                        saga = name,
                        action = %action.description,
                        reason = %reason,
                        "compensation failed, continuing sweep"
                    );
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) + Clone) {
        let seen: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));
        let record = {
            let seen = seen.clone();
            move |label: &'static str| seen.lock().unwrap().push(label)
        };
        (seen, record)
    }

    #[tokio::test]
    async fn commit_discards_rollbacks() {
        let (seen, record) = recorder();
        let coordinator = Coordinator::new();

        let outcome = coordinator
            .run("test", |ctx| {
                let record = record.clone();
                async move {
                    ctx.add_rollback("undo step", move || {
                        Box::pin(async move {
                            record("undo");
                            Ok(())
                        })
                    });
                    Ok::<_, String>(42)
                }
            })
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.data, Some(42));
        assert!(!outcome.rolled_back);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_sweeps_lifo() {
        let (seen, record) = recorder();
        let coordinator = Coordinator::new();

        let outcome = coordinator
            .run("test", |ctx| {
                let record = record.clone();
                async move {
                    for label in ["first", "second", "third"] {
                        let record = record.clone();
                        ctx.add_rollback(label, move || {
                            Box::pin(async move {
                                record(label);
                                Ok(())
                            })
                        });
                    }
                    Err::<(), _>("step four exploded".to_string())
                }
            })
            .await;

        assert!(!outcome.success);
        assert!(outcome.rolled_back);
        assert_eq!(outcome.error.as_deref(), Some("step four exploded"));
        assert_eq!(*seen.lock().unwrap(), vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn failing_compensation_does_not_halt_sweep() {
        let (seen, record) = recorder();
        let coordinator = Coordinator::new();

        let outcome = coordinator
            .run("test", |ctx| {
                let record = record.clone();
                async move {
                    {
                        let record = record.clone();
                        ctx.add_rollback("good", move || {
                            Box::pin(async move {
                                record("good");
                                Ok(())
                            })
                        });
                    }
                    ctx.add_rollback("bad", move || {
                        Box::pin(async move { Err("undo refused".to_string()) })
                    });
                    Err::<(), _>("boom".to_string())
                }
            })
            .await;

        assert!(outcome.rolled_back);
        // The failing "bad" action ran first (LIFO) and "good" still ran.
        assert_eq!(*seen.lock().unwrap(), vec!["good"]);
    }

    #[tokio::test]
    async fn failure_with_empty_stack_reports_no_rollback() {
        let coordinator = Coordinator::new();
        let outcome = coordinator
            .run("test", |_ctx| async move {
                Err::<(), _>("rejected before any mutation".to_string())
            })
            .await;

        assert!(!outcome.success);
        assert!(!outcome.rolled_back);
    }

    #[tokio::test]
    async fn into_result_maps_both_paths() {
        let coordinator = Coordinator::new();
        let ok = coordinator
            .run("test", |_ctx| async move { Ok::<_, String>("done") })
            .await;
        assert_eq!(ok.into_result(), Ok("done"));

        let err = coordinator
            .run("test", |_ctx| async move { Err::<(), _>("nope".to_string()) })
            .await;
        assert_eq!(err.into_result(), Err("nope".to_string()));
    }
}
