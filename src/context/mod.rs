//! Application context shared by the screen stack and its screens.
//!
//! Bundles the collaborators the stack engine needs from its host: the
//! main-thread identity, the serial task queue, the re-render channel, and
//! the logging/metrics configuration.

use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use serde_json::Value;

use crate::logging::{LogLevel, Logger, event_with_fields};
use crate::metrics::StackMetrics;
use crate::{Result, ScreenError};

mod executor;

pub use executor::{MainExecutor, Task};

pub const DEFAULT_LOG_TARGET: &str = "car_screens::screens";

/// Host side of the re-render channel.
///
/// Called whenever the visible top screen changed or a screen asked to be
/// redrawn. May be called redundantly; hosts are expected to debounce.
pub trait HostRenderer: Send + Sync {
    fn invalidate(&self);
}

/// Configuration knobs for the screen stack.
#[derive(Clone)]
pub struct AppConfig {
    /// Optional structured logger used by the stack engine.
    pub logger: Option<Logger>,
    /// Metrics accumulator shared with the host.
    pub metrics: Option<Arc<Mutex<StackMetrics>>>,
    /// Target field used on emitted log events.
    pub log_target: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            log_target: DEFAULT_LOG_TARGET.to_string(),
        }
    }
}

impl AppConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(StackMetrics::new())));
        }
    }

    /// Access the shared metrics handle if metrics are enabled.
    pub fn metrics_handle(&self) -> Option<Arc<Mutex<StackMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

struct ContextInner {
    main_thread: ThreadId,
    executor: MainExecutor,
    renderer: Arc<dyn HostRenderer>,
    config: AppConfig,
}

/// Cloneable handle to the running application's context.
///
/// The thread that constructs the context becomes the main thread.
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<ContextInner>,
}

impl AppContext {
    pub fn new<R>(renderer: Arc<R>, config: AppConfig) -> Self
    where
        R: HostRenderer + 'static,
    {
        Self {
            inner: Arc::new(ContextInner {
                main_thread: thread::current().id(),
                executor: MainExecutor::new(),
                renderer,
                config,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn executor(&self) -> &MainExecutor {
        &self.inner.executor
    }

    pub fn is_main_thread(&self) -> bool {
        thread::current().id() == self.inner.main_thread
    }

    pub fn check_main_thread(&self, operation: &'static str) -> Result<()> {
        if self.is_main_thread() {
            Ok(())
        } else {
            Err(ScreenError::WrongThread { operation })
        }
    }

    /// Ask the host to fetch a fresh template from the top screen.
    ///
    /// The signal is posted to the main executor, so the host only sees it
    /// once the current stack operation has finished and may pull the top
    /// template from inside [`HostRenderer::invalidate`].
    pub fn invalidate(&self) {
        self.record_metrics(StackMetrics::record_invalidation);
        let renderer = Arc::clone(&self.inner.renderer);
        self.inner.executor.post(move || renderer.invalidate());
    }

    /// Run the callbacks queued on the main executor.
    pub fn run_pending(&self) -> Result<usize> {
        self.check_main_thread("run_pending")?;
        Ok(self.inner.executor.drain())
    }

    pub(crate) fn record_metrics(&self, record: impl FnOnce(&mut StackMetrics)) {
        if let Some(metrics) = self.inner.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut *guard);
            }
        }
    }

    /// Emit a snapshot of the stack metrics, if both a logger and metrics are
    /// configured.
    pub(crate) fn log_metrics_snapshot(&self) {
        let config = &self.inner.config;
        if let (Some(logger), Some(metrics)) = (config.logger.as_ref(), config.metrics.as_ref()) {
            if let Ok(guard) = metrics.lock() {
                let _ = logger.log_event(guard.snapshot().to_log_event(&config.log_target));
            }
        }
    }

    pub(crate) fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.inner.config.logger.as_ref() {
            let event = event_with_fields(level, &self.inner.config.log_target, message, fields);
            let _ = logger.log_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CountingRenderer;

    #[test]
    fn wrong_thread_is_reported() {
        let context = AppContext::new(Arc::new(CountingRenderer::default()), AppConfig::default());
        assert!(context.check_main_thread("probe").is_ok());

        let remote = context.clone();
        let outcome = thread::spawn(move || remote.check_main_thread("probe"))
            .join()
            .unwrap();
        assert!(matches!(
            outcome,
            Err(ScreenError::WrongThread { operation: "probe" })
        ));
    }

    #[test]
    fn invalidate_is_delivered_through_the_executor() {
        let renderer = Arc::new(CountingRenderer::default());
        let mut config = AppConfig::default();
        config.enable_metrics();
        let metrics = config.metrics_handle().unwrap();
        let context = AppContext::new(renderer.clone(), config);

        context.invalidate();
        context.invalidate();
        assert_eq!(renderer.count(), 0);
        assert_eq!(context.executor().pending(), 2);

        assert_eq!(context.run_pending().unwrap(), 2);
        assert_eq!(renderer.count(), 2);
        assert_eq!(metrics.lock().unwrap().snapshot().invalidations, 2);
    }
}
