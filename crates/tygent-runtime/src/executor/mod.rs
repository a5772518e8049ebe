//! Adaptive DAG execution: context, dispatch, handlers, cancellation.

mod adaptive;
mod cancel;
mod context;
mod dispatcher;
pub mod handlers;

pub use adaptive::{AdaptiveExecutor, EarlyStop};
pub use cancel::CancelHandle;
pub use context::ExecutionContext;
pub use dispatcher::NodeDispatcher;
