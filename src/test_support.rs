//! Recorders shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::context::{AppConfig, AppContext, HostRenderer};
use crate::lifecycle::LifecycleEvent;
use crate::screen::{Screen, ScreenStrategy};
use crate::template::Template;
use crate::{Result, ScreenError};

#[derive(Default)]
pub struct CountingRenderer {
    count: AtomicUsize,
}

impl CountingRenderer {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl HostRenderer for CountingRenderer {
    fn invalidate(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Lifecycle events observed across all screens, in delivery order.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<(String, LifecycleEvent)>>>,
}

impl Recorder {
    pub fn all(&self) -> Vec<(String, LifecycleEvent)> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, name: &str) -> Vec<LifecycleEvent> {
        self.all()
            .into_iter()
            .filter(|(screen, _)| screen == name)
            .map(|(_, event)| event)
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

pub struct RecordingStrategy {
    name: String,
    recorder: Recorder,
    fail_on: Option<LifecycleEvent>,
}

impl ScreenStrategy for RecordingStrategy {
    fn on_get_template(&mut self) -> Template {
        Template::new("message", json!({ "title": self.name }))
    }

    fn on_lifecycle(&mut self, event: LifecycleEvent) -> Result<()> {
        self.recorder
            .events
            .lock()
            .unwrap()
            .push((self.name.clone(), event));
        if self.fail_on == Some(event) {
            return Err(ScreenError::Callback(format!("{} refused {:?}", self.name, event)));
        }
        Ok(())
    }
}

pub fn test_context() -> (AppContext, Arc<CountingRenderer>) {
    let renderer = Arc::new(CountingRenderer::default());
    let context = AppContext::new(renderer.clone(), AppConfig::default());
    (context, renderer)
}

pub fn recording_screen(context: &AppContext, name: &str, recorder: &Recorder) -> Screen {
    Screen::new(
        context,
        RecordingStrategy {
            name: name.to_string(),
            recorder: recorder.clone(),
            fail_on: None,
        },
    )
}

pub fn failing_screen(
    context: &AppContext,
    name: &str,
    recorder: &Recorder,
    fail_on: LifecycleEvent,
) -> Screen {
    Screen::new(
        context,
        RecordingStrategy {
            name: name.to_string(),
            recorder: recorder.clone(),
            fail_on: Some(fail_on),
        },
    )
}
