//! Session wiring between the host application and the screen stack.

use std::sync::{Arc, MutexGuard};

use serde_json::json;

use crate::context::AppContext;
use crate::lifecycle::{HostLifecycle, LifecycleEvent};
use crate::logging::{LogLevel, json_kv};
use crate::screen::Screen;
use crate::template::TemplateWrapper;
use crate::{Result, ScreenError};

mod observer;
pub mod screens;

use screens::{ScreenManager, SharedScreenManager};

/// Produces the root screen when the host creates the session.
pub type RootScreenFactory = Box<dyn FnMut(&AppContext) -> Screen + Send>;

/// One running app session: a host lifecycle and the screen stack that
/// follows it.
pub struct Session {
    context: AppContext,
    lifecycle: HostLifecycle,
    screens: SharedScreenManager,
}

impl Session {
    pub fn new<F>(context: AppContext, root: F) -> Self
    where
        F: FnMut(&AppContext) -> Screen + Send + 'static,
    {
        let lifecycle = HostLifecycle::new();
        let screens = ScreenManager::create(context.clone(), lifecycle.clone());
        install_root_screen(&context, &lifecycle, &screens, Box::new(root));
        Self {
            context,
            lifecycle,
            screens,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn lifecycle(&self) -> &HostLifecycle {
        &self.lifecycle
    }

    /// Host entry point for lifecycle changes of the whole app.
    pub fn dispatch_host_event(&self, event: LifecycleEvent) -> Result<()> {
        self.context.check_main_thread("dispatch_host_event")?;
        self.context.log(
            LogLevel::Debug,
            "host_event",
            [json_kv("event", json!(event.as_str()))],
        );
        self.lifecycle.handle_event(event)
    }

    pub fn screen_manager(&self) -> Result<MutexGuard<'_, ScreenManager>> {
        self.screens.lock().map_err(|_| ScreenError::Poisoned)
    }

    pub fn shared_screen_manager(&self) -> SharedScreenManager {
        Arc::clone(&self.screens)
    }

    /// Template of the current top screen, as requested by the host after an
    /// invalidation.
    pub fn top_template(&self) -> Result<TemplateWrapper> {
        self.screen_manager()?.top_template()
    }

    /// Drain callbacks queued on the main executor.
    pub fn run_pending(&self) -> Result<usize> {
        self.context.run_pending()
    }
}

fn install_root_screen(
    context: &AppContext,
    lifecycle: &HostLifecycle,
    screens: &SharedScreenManager,
    mut root: RootScreenFactory,
) {
    let context = context.clone();
    let screens = Arc::downgrade(screens);
    lifecycle.add_observer(move |event| {
        if event != LifecycleEvent::Create {
            return Ok(());
        }
        let Some(screens) = screens.upgrade() else {
            return Ok(());
        };
        let screen = root(&context);
        let mut manager = screens.lock().map_err(|_| ScreenError::Poisoned)?;
        manager.push(screen)
    });
}
