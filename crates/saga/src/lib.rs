//! Generic saga executor.
//!
//! A unit of work runs to completion or failure; while it runs it registers
//! compensating actions for each mutation it applies. On failure the
//! coordinator sweeps the registered actions in strict reverse registration
//! order (LIFO). On success the stack is discarded without execution.
//!
//! Compensation is best-effort: a failing rollback action is logged but
//! does not halt the sweep of the remaining actions, since there is no
//! deeper recovery layer behind it.

pub mod context;
pub mod coordinator;
pub mod outcome;

pub use context::{RollbackAction, SagaContext};
pub use coordinator::Coordinator;
pub use outcome::SagaOutcome;
