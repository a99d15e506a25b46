use std::sync::{Arc, Mutex, PoisonError};

use crate::Result;

use super::{LifecycleEvent, LifecycleState};

/// Observer invoked after the host lifecycle handled an event.
pub type HostObserver = Box<dyn FnMut(LifecycleEvent) -> Result<()> + Send>;

/// Lifecycle source of the host application.
///
/// Clones share the same state and observer list. Observers run in
/// registration order after the state has moved; they must not dispatch host
/// events themselves.
#[derive(Clone)]
pub struct HostLifecycle {
    state: Arc<Mutex<LifecycleState>>,
    observers: Arc<Mutex<Vec<HostObserver>>>,
}

impl Default for HostLifecycle {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(LifecycleState::Initialized)),
            observers: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl HostLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_observer<F>(&self, observer: F)
    where
        F: FnMut(LifecycleEvent) -> Result<()> + Send + 'static,
    {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(observer));
    }

    /// Move the host lifecycle by `event` and notify observers.
    ///
    /// Skipped intermediate events are delivered first, so observers always
    /// see adjacent transitions. Events that do not change the state
    /// (including anything after `Destroy`) are dropped.
    ///
    /// Observers may register further observers while being notified; those
    /// join from the next transition on.
    pub fn handle_event(&self, event: LifecycleEvent) -> Result<()> {
        let steps = self.current_state().plan(event);
        for step in steps {
            *self.state.lock().unwrap_or_else(PoisonError::into_inner) = step.target_state();
            self.notify(step)?;
        }
        Ok(())
    }

    fn notify(&self, event: LifecycleEvent) -> Result<()> {
        let mut current = std::mem::take(
            &mut *self.observers.lock().unwrap_or_else(PoisonError::into_inner),
        );

        let mut outcome = Ok(());
        for observer in current.iter_mut() {
            outcome = observer(event);
            if outcome.is_err() {
                break;
            }
        }

        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        let added = std::mem::replace(&mut *observers, current);
        observers.extend(added);
        outcome
    }
}
