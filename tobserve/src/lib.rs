//! Production-friendly observability hooks for tool dispatch.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use tobserve::{MetricsToolHooks, SafeToolHooks, TracingToolHooks};
//! use ttooling::CompositeToolHooks;
//!
//! let _hooks = CompositeToolHooks::new()
//!     .with(Arc::new(SafeToolHooks::new(TracingToolHooks)))
//!     .with(Arc::new(SafeToolHooks::new(MetricsToolHooks)));
//! ```

mod metrics_hooks;
mod safe_hooks;
mod tracing_hooks;

pub use metrics_hooks::MetricsToolHooks;
pub use safe_hooks::SafeToolHooks;
pub use tracing_hooks::TracingToolHooks;

pub mod prelude {
    pub use crate::{MetricsToolHooks, SafeToolHooks, TracingToolHooks};
}
