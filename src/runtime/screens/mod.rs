//! The screen stack engine.
//!
//! [`ScreenManager`] owns the ordered stack of screens (front of the deque is
//! the top) and is the only place that turns stack mutations and host
//! lifecycle events into per-screen lifecycle transitions.
//!
//! Invariants held after every public operation:
//! - once a screen was pushed the stack is never emptied by pop, pop_to,
//!   pop_to_root or remove; only host teardown clears it;
//! - only the top screen may be resumed;
//! - a screen appears at most once; pushing it again moves it to the top.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::context::AppContext;
use crate::lifecycle::{HostLifecycle, LifecycleEvent, LifecycleState};
use crate::logging::{LogLevel, json_kv};
use crate::metrics::StackMetrics;
use crate::screen::{Screen, ScreenResult};
use crate::template::TemplateWrapper;
use crate::{Result, ScreenError};

/// Manager shared with the host lifecycle observer.
pub type SharedScreenManager = Arc<Mutex<ScreenManager>>;

pub struct ScreenManager {
    stack: VecDeque<Screen>,
    context: AppContext,
    host: HostLifecycle,
}

impl ScreenManager {
    /// Build a manager that is not yet observing `host`. Most callers want
    /// [`ScreenManager::create`].
    pub fn new(context: AppContext, host: HostLifecycle) -> Self {
        Self {
            stack: VecDeque::new(),
            context,
            host,
        }
    }

    /// Build a shared manager and register it as an observer of `host`.
    pub fn create(context: AppContext, host: HostLifecycle) -> SharedScreenManager {
        let manager = Arc::new(Mutex::new(Self::new(context, host.clone())));
        super::observer::forward_host_events(&host, &manager);
        manager
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Screen at the top of the stack.
    pub fn top(&self) -> Result<Screen> {
        self.enter("top")?;
        self.peek()
    }

    pub fn push(&mut self, screen: Screen) -> Result<()> {
        self.enter("push")?;
        self.push_internal(screen)
    }

    /// Push `screen` and deliver its result to `listener` once it has been
    /// destroyed.
    pub fn push_for_result<F>(&mut self, screen: Screen, listener: F) -> Result<()>
    where
        F: FnOnce(Option<ScreenResult>) + Send + 'static,
    {
        self.enter("push_for_result")?;
        ensure_alive(&screen)?;
        screen.set_on_screen_result_listener(listener)?;
        self.push_internal(screen)
    }

    /// Pop the top screen. The root screen is never popped.
    pub fn pop(&mut self) -> Result<()> {
        self.enter("pop")?;
        if self.stack.len() > 1 {
            if let Some(popped) = self.stack.pop_front() {
                return self.pop_internal(vec![popped]);
            }
        }
        Ok(())
    }

    /// Pop screens until the top carries `marker` or only the root is left.
    pub fn pop_to(&mut self, marker: &str) -> Result<()> {
        self.enter("pop_to")?;
        let mut popped = Vec::new();
        while self.stack.len() > 1 && !self.top_has_marker(marker) {
            if let Some(screen) = self.stack.pop_front() {
                popped.push(screen);
            }
        }
        if popped.is_empty() {
            return Ok(());
        }
        self.pop_internal(popped)
    }

    /// Pop every screen except the root.
    pub fn pop_to_root(&mut self) -> Result<()> {
        self.enter("pop_to_root")?;
        if self.stack.len() <= 1 {
            return Ok(());
        }
        let root = self.stack.len() - 1;
        let popped: Vec<Screen> = self.stack.drain(..root).collect();
        self.pop_internal(popped)
    }

    /// Remove `screen` from the stack. Removing the top behaves like
    /// [`ScreenManager::pop`]; a screen further down is destroyed in place.
    /// The last remaining screen is never removed.
    pub fn remove(&mut self, screen: &Screen) -> Result<()> {
        self.enter("remove")?;
        if self.stack.len() <= 1 {
            return Ok(());
        }

        if self.stack.front() == Some(screen) {
            if let Some(popped) = self.stack.pop_front() {
                return self.pop_internal(vec![popped]);
            }
        } else if let Some(position) = self.stack.iter().position(|s| s == screen) {
            if let Some(removed) = self.stack.remove(position) {
                self.log_screen("screen_removed", &removed);
                self.context.record_metrics(|m: &mut StackMetrics| m.record_pops(1));
                removed.dispatch_lifecycle_event(LifecycleEvent::Destroy)?;
            }
        }
        Ok(())
    }

    /// Render the top screen for the host, attaching the template identities
    /// of the whole stack (top first).
    pub fn top_template(&self) -> Result<TemplateWrapper> {
        self.enter("top_template")?;
        let top = self.peek()?;
        self.log_screen("template_requested", &top);

        let mut wrapper = top.template_wrapper();
        let infos = self.stack.iter().map(Screen::last_template_info).collect();
        wrapper.set_template_infos(infos);
        Ok(wrapper)
    }

    /// Forward a host lifecycle event. Only the top screen follows start,
    /// resume, pause and stop; destroy tears down the whole stack.
    pub fn on_host_event(&mut self, event: LifecycleEvent) -> Result<()> {
        self.enter("on_host_event")?;
        match event {
            LifecycleEvent::Create => Ok(()),
            LifecycleEvent::Destroy => self.destroy_and_clear(),
            LifecycleEvent::Start
            | LifecycleEvent::Resume
            | LifecycleEvent::Pause
            | LifecycleEvent::Stop => match self.stack.front().cloned() {
                Some(top) => top.dispatch_lifecycle_event(event),
                None => {
                    self.context.log(
                        LogLevel::Warn,
                        "host_event_dropped",
                        [
                            json_kv("event", json!(event.as_str())),
                            json_kv("reason", json!("screen stack empty")),
                        ],
                    );
                    self.context
                        .record_metrics(StackMetrics::record_dropped_host_event);
                    Ok(())
                }
            },
        }
    }

    /// Destroy every screen, top to bottom, and clear the stack. No re-render
    /// is requested.
    pub fn destroy_and_clear(&mut self) -> Result<()> {
        self.enter("destroy_and_clear")?;
        let screens: Vec<Screen> = self.stack.drain(..).collect();
        self.context.log(
            LogLevel::Debug,
            "screen_stack_cleared",
            [json_kv("screens", json!(screens.len()))],
        );
        for screen in &screens {
            self.stop(screen, true)?;
        }
        self.context.log_metrics_snapshot();
        Ok(())
    }

    pub fn stack_depth(&self) -> Result<usize> {
        self.enter("stack_depth")?;
        Ok(self.stack.len())
    }

    pub fn contains(&self, screen: &Screen) -> Result<bool> {
        self.enter("contains")?;
        Ok(self.stack.contains(screen))
    }

    /// Snapshot of the stack, top first.
    pub fn screens(&self) -> Result<Vec<Screen>> {
        self.enter("screens")?;
        Ok(self.stack.iter().cloned().collect())
    }

    fn enter(&self, operation: &'static str) -> Result<()> {
        self.context.check_main_thread(operation)?;
        self.context.log(
            LogLevel::Trace,
            "screen_manager_call",
            [
                json_kv("operation", json!(operation)),
                json_kv("depth", json!(self.stack.len())),
            ],
        );
        Ok(())
    }

    fn peek(&self) -> Result<Screen> {
        self.stack.front().cloned().ok_or(ScreenError::EmptyStack)
    }

    fn top_has_marker(&self, marker: &str) -> bool {
        self.stack
            .front()
            .is_some_and(|screen| screen.has_marker(marker))
    }

    fn host_is_at_least(&self, state: LifecycleState) -> bool {
        self.host.current_state().is_at_least(state)
    }

    fn push_internal(&mut self, screen: Screen) -> Result<()> {
        ensure_alive(&screen)?;
        self.log_screen("screen_pushed", &screen);
        self.context.record_metrics(StackMetrics::record_push);

        if self.stack.contains(&screen) {
            return self.move_to_top(screen);
        }

        let previous = self.stack.front().cloned();
        self.push_and_start(&screen, true)?;

        if let Some(previous) = previous {
            self.stop(&previous, false)?;
        }

        if self.host_is_at_least(LifecycleState::Resumed) {
            screen.dispatch_lifecycle_event(LifecycleEvent::Resume)?;
        }
        Ok(())
    }

    /// Shared tail of every pop: reveal the new top, tear down `popped` in
    /// order, then resume the new top.
    fn pop_internal(&mut self, popped: Vec<Screen>) -> Result<()> {
        let new_top = self.peek()?;
        self.context
            .record_metrics(|m: &mut StackMetrics| m.record_pops(popped.len()));

        // The host detects back navigation by the template id staying the same.
        new_top.set_use_last_template_id(true);
        self.context.invalidate();

        if self.host_is_at_least(LifecycleState::Started) {
            new_top.dispatch_lifecycle_event(LifecycleEvent::Start)?;
        }

        for screen in &popped {
            self.log_screen("screen_popped", screen);
            self.stop(screen, true)?;
        }

        self.log_screen("screen_on_top", &new_top);
        if self.host_is_at_least(LifecycleState::Resumed) {
            new_top.dispatch_lifecycle_event(LifecycleEvent::Resume)?;
        }
        Ok(())
    }

    fn push_and_start(&mut self, screen: &Screen, should_create: bool) -> Result<()> {
        self.stack.push_front(screen.clone());
        if should_create && self.host_is_at_least(LifecycleState::Created) {
            screen.dispatch_lifecycle_event(LifecycleEvent::Create)?;
        }

        if self.host_is_at_least(LifecycleState::Started) {
            self.context.invalidate();
            screen.dispatch_lifecycle_event(LifecycleEvent::Start)?;
        }
        Ok(())
    }

    fn stop(&self, screen: &Screen, destroy: bool) -> Result<()> {
        for event in screen.lifecycle_state().unwind(destroy) {
            screen.dispatch_lifecycle_event(event)?;
        }
        Ok(())
    }

    fn move_to_top(&mut self, screen: Screen) -> Result<()> {
        let Some(previous) = self.stack.front().cloned() else {
            return Ok(());
        };
        if previous == screen {
            return Ok(());
        }

        self.stack.retain(|s| s != &screen);
        self.push_and_start(&screen, false)?;
        self.stop(&previous, false)?;

        if self.host_is_at_least(LifecycleState::Resumed) {
            screen.dispatch_lifecycle_event(LifecycleEvent::Resume)?;
        }
        Ok(())
    }

    fn log_screen(&self, message: &str, screen: &Screen) {
        self.context.log(
            LogLevel::Debug,
            message,
            [
                json_kv("screen", json!(screen.id())),
                json_kv("marker", json!(screen.marker())),
                json_kv("depth", json!(self.stack.len())),
            ],
        );
    }
}

fn ensure_alive(screen: &Screen) -> Result<()> {
    if screen.lifecycle_state() == LifecycleState::Destroyed {
        return Err(ScreenError::ScreenDestroyed(screen.id()));
    }
    Ok(())
}
