//! Traits at the engine boundary.
//!
//! Providers plug in behind [`ToolExecutor`] and [`ModelBackend`]; the
//! engine never sees credentials, transports, or provider SDKs.

mod model;
mod tool;

pub use model::{ModelBackend, ModelRequest, ModelResponse};
pub use tool::{FnTool, ToolExecutor};
