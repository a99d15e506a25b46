//! A single navigable unit of UI and its lifecycle.
//!
//! [`Screen`] is a cheap handle: clones refer to the same screen, and equality
//! is handle identity. App code supplies behaviour through a
//! [`ScreenStrategy`]; the screen owns the lifecycle state, the marker, the
//! pending result and the template identity bookkeeping.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Value, json};

use crate::context::AppContext;
use crate::lifecycle::{LifecycleEvent, LifecycleState};
use crate::logging::{LogLevel, json_kv};
use crate::metrics::StackMetrics;
use crate::template::{Template, TemplateInfo, TemplateWrapper};
use crate::Result;

/// Value a screen hands back to whoever pushed it for a result.
pub type ScreenResult = Value;

/// Single-use callback receiving the result of a screen pushed for result.
pub type OnScreenResultListener = Box<dyn FnOnce(Option<ScreenResult>) + Send>;

/// Behaviour supplied by the app for one screen.
pub trait ScreenStrategy: Send {
    /// Produce the current render output. Must not touch the screen stack.
    fn on_get_template(&mut self) -> Template;

    /// Observe a lifecycle transition. Errors propagate to the caller of the
    /// stack operation that triggered the transition.
    fn on_lifecycle(&mut self, _event: LifecycleEvent) -> Result<()> {
        Ok(())
    }
}

static NEXT_SCREEN_ID: AtomicU64 = AtomicU64::new(1);

struct ScreenState {
    lifecycle: LifecycleState,
    marker: Option<String>,
    result: Option<ScreenResult>,
    result_listener: Option<OnScreenResultListener>,
    use_last_template_id: bool,
    last_template: Option<TemplateWrapper>,
}

struct ScreenInner {
    id: u64,
    context: AppContext,
    state: Mutex<ScreenState>,
    strategy: Mutex<Box<dyn ScreenStrategy>>,
}

#[derive(Clone)]
pub struct Screen {
    inner: Arc<ScreenInner>,
}

impl Screen {
    pub fn new<S>(context: &AppContext, strategy: S) -> Self
    where
        S: ScreenStrategy + 'static,
    {
        Self {
            inner: Arc::new(ScreenInner {
                id: NEXT_SCREEN_ID.fetch_add(1, Ordering::Relaxed),
                context: context.clone(),
                state: Mutex::new(ScreenState {
                    lifecycle: LifecycleState::Initialized,
                    marker: None,
                    result: None,
                    result_listener: None,
                    use_last_template_id: false,
                    last_template: None,
                }),
                strategy: Mutex::new(Box::new(strategy)),
            }),
        }
    }

    /// Process-unique id, used in logs and errors.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn context(&self) -> &AppContext {
        &self.inner.context
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.state().lifecycle
    }

    pub fn marker(&self) -> Option<String> {
        self.state().marker.clone()
    }

    /// Tag this screen so [`crate::ScreenManager::pop_to`] can find it.
    pub fn set_marker(&self, marker: Option<String>) -> Result<()> {
        self.inner.context.check_main_thread("set_marker")?;
        self.state().marker = marker;
        Ok(())
    }

    pub(crate) fn has_marker(&self, marker: &str) -> bool {
        self.state().marker.as_deref() == Some(marker)
    }

    /// Record the value delivered to the result listener once this screen is
    /// destroyed.
    pub fn set_result(&self, result: ScreenResult) -> Result<()> {
        self.inner.context.check_main_thread("set_result")?;
        self.state().result = Some(result);
        Ok(())
    }

    /// Attach the result listener, replacing any listener not yet fired.
    pub fn set_on_screen_result_listener<F>(&self, listener: F) -> Result<()>
    where
        F: FnOnce(Option<ScreenResult>) + Send + 'static,
    {
        self.inner
            .context
            .check_main_thread("set_on_screen_result_listener")?;
        self.state().result_listener = Some(Box::new(listener));
        Ok(())
    }

    /// Request a re-render from the host. Ignored unless the screen is at
    /// least started.
    pub fn invalidate(&self) -> Result<()> {
        self.inner.context.check_main_thread("invalidate")?;
        if self.lifecycle_state().is_at_least(LifecycleState::Started) {
            self.inner.context.invalidate();
        }
        Ok(())
    }

    /// Deliver `event` to this screen.
    ///
    /// Skipped intermediate events are delivered first, events that would not
    /// move the lifecycle in their direction are ignored, and nothing is
    /// delivered after `Destroy`. The result listener is posted to the main
    /// executor once the screen has been destroyed.
    pub fn dispatch_lifecycle_event(&self, event: LifecycleEvent) -> Result<()> {
        self.inner.context.check_main_thread("dispatch_lifecycle_event")?;

        let steps = self.lifecycle_state().plan(event);
        if steps.is_empty() {
            return Ok(());
        }
        self.inner.context.record_metrics(|metrics: &mut StackMetrics| {
            metrics.record_lifecycle_events(steps.len())
        });

        for step in steps {
            self.state().lifecycle = step.target_state();
            self.inner.context.log(
                LogLevel::Trace,
                "screen_lifecycle",
                [
                    json_kv("screen", json!(self.id())),
                    json_kv("event", json!(step.as_str())),
                ],
            );
            self.strategy().on_lifecycle(step)?;

            if step == LifecycleEvent::Destroy {
                self.post_result();
            }
        }
        Ok(())
    }

    fn post_result(&self) {
        let (listener, result) = {
            let mut state = self.state();
            (state.result_listener.take(), state.result.take())
        };
        if let Some(listener) = listener {
            self.inner.context.executor().post(move || listener(result));
        }
    }

    /// Current render output, straight from the strategy.
    pub fn template(&self) -> Template {
        self.strategy().on_get_template()
    }

    pub fn uses_last_template_id(&self) -> bool {
        self.state().use_last_template_id
    }

    pub(crate) fn set_use_last_template_id(&self, value: bool) {
        self.state().use_last_template_id = value;
    }

    /// Render and wrap the template, reusing the previous template id when
    /// the screen was just revealed by a pop.
    pub(crate) fn template_wrapper(&self) -> TemplateWrapper {
        let template = self.template();
        let mut state = self.state();
        let reused_id = if state.use_last_template_id {
            state
                .last_template
                .as_ref()
                .map(|wrapper| wrapper.id().to_string())
        } else {
            None
        };
        let wrapper = match reused_id {
            Some(id) => TemplateWrapper::wrap_with_id(template, id),
            None => TemplateWrapper::wrap(template),
        };
        state.use_last_template_id = false;
        state.last_template = Some(wrapper.clone());
        wrapper
    }

    /// Identity of the last template handed to the host, rendering one if the
    /// screen never rendered.
    pub(crate) fn last_template_info(&self) -> TemplateInfo {
        if let Some(wrapper) = self.state().last_template.as_ref() {
            return wrapper.info();
        }
        let wrapper = TemplateWrapper::wrap(self.template());
        let info = wrapper.info();
        self.state().last_template = Some(wrapper);
        info
    }

    fn state(&self) -> MutexGuard<'_, ScreenState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn strategy(&self) -> MutexGuard<'_, Box<dyn ScreenStrategy>> {
        self.inner
            .strategy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl PartialEq for Screen {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Screen {}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Screen")
            .field("id", &self.inner.id)
            .field("lifecycle", &state.lifecycle)
            .field("marker", &state.marker)
            .finish()
    }
}
