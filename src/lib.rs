//! Screen stack and lifecycle management for host-rendered car apps.
//!
//! The host drives the app lifecycle and pulls templates; the app navigates
//! by pushing and popping [`Screen`]s on the [`ScreenManager`]. The manager
//! keeps exactly the top screen resumed and asks the host to re-render
//! whenever the visible top changes.
//!
//! All stack operations must run on the thread that created the
//! [`AppContext`].

pub mod context;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod metrics;
pub mod runtime;
pub mod screen;
pub mod template;

#[cfg(test)]
mod test_support;

pub use context::{AppConfig, AppContext, DEFAULT_LOG_TARGET, HostRenderer, MainExecutor, Task};
pub use error::{Result, ScreenError};
pub use lifecycle::{HostLifecycle, HostObserver, LifecycleEvent, LifecycleState};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{MetricSnapshot, StackMetrics};
pub use runtime::screens::{ScreenManager, SharedScreenManager};
pub use runtime::{RootScreenFactory, Session};
pub use screen::{OnScreenResultListener, Screen, ScreenResult, ScreenStrategy};
pub use template::{Template, TemplateInfo, TemplateWrapper};
