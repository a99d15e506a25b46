//! Lifecycle states and events shared by screens and the host application.
//!
//! States are totally ordered (`Destroyed < Initialized < Created < Started <
//! Resumed`) so callers can ask "is at least" questions the same way the host
//! runtime does. Transition planning lives here as pure functions so the stack
//! engine never hand-rolls pause/stop/destroy branching.

pub mod host;

pub use host::{HostLifecycle, HostObserver};

/// Ordered lifecycle states. `Destroyed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleState {
    Destroyed,
    Initialized,
    Created,
    Started,
    Resumed,
}

/// Events that move a lifecycle between adjacent states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Create,
    Start,
    Resume,
    Pause,
    Stop,
    Destroy,
}

impl LifecycleEvent {
    /// State reached once this event has been handled.
    pub fn target_state(self) -> LifecycleState {
        match self {
            LifecycleEvent::Create => LifecycleState::Created,
            LifecycleEvent::Start => LifecycleState::Started,
            LifecycleEvent::Resume => LifecycleState::Resumed,
            LifecycleEvent::Pause => LifecycleState::Started,
            LifecycleEvent::Stop => LifecycleState::Created,
            LifecycleEvent::Destroy => LifecycleState::Destroyed,
        }
    }

    /// `true` for events that move a lifecycle towards `Resumed`.
    pub fn is_upward(self) -> bool {
        matches!(
            self,
            LifecycleEvent::Create | LifecycleEvent::Start | LifecycleEvent::Resume
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleEvent::Create => "on_create",
            LifecycleEvent::Start => "on_start",
            LifecycleEvent::Resume => "on_resume",
            LifecycleEvent::Pause => "on_pause",
            LifecycleEvent::Stop => "on_stop",
            LifecycleEvent::Destroy => "on_destroy",
        }
    }
}

impl LifecycleState {
    pub fn is_at_least(self, other: LifecycleState) -> bool {
        self >= other
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Destroyed => "destroyed",
            LifecycleState::Initialized => "initialized",
            LifecycleState::Created => "created",
            LifecycleState::Started => "started",
            LifecycleState::Resumed => "resumed",
        }
    }

    /// Events needed to advance from `self` to at least `target`.
    ///
    /// Empty when already there, or when `self` is `Destroyed`.
    pub fn events_up_to(self, target: LifecycleState) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();
        if self == LifecycleState::Destroyed {
            return events;
        }
        let mut state = self;
        while state < target {
            let event = match state {
                LifecycleState::Initialized => LifecycleEvent::Create,
                LifecycleState::Created => LifecycleEvent::Start,
                LifecycleState::Started => LifecycleEvent::Resume,
                LifecycleState::Resumed | LifecycleState::Destroyed => break,
            };
            events.push(event);
            state = event.target_state();
        }
        events
    }

    /// Events needed to unwind from `self` to at most `target`.
    ///
    /// Reaching `Destroyed` always ends with a single `Destroy`; an
    /// `Initialized` lifecycle is destroyed without passing through `Created`.
    pub fn events_down_to(self, target: LifecycleState) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();
        let mut state = self;
        while state > target {
            let event = match state {
                LifecycleState::Resumed => LifecycleEvent::Pause,
                LifecycleState::Started => LifecycleEvent::Stop,
                LifecycleState::Created | LifecycleState::Initialized => {
                    if target == LifecycleState::Destroyed {
                        LifecycleEvent::Destroy
                    } else {
                        break;
                    }
                }
                LifecycleState::Destroyed => break,
            };
            events.push(event);
            state = event.target_state();
        }
        events
    }

    /// Pause/stop unwind of a screen leaving the top, optionally followed by
    /// `Destroy`.
    pub fn unwind(self, destroy: bool) -> Vec<LifecycleEvent> {
        if self == LifecycleState::Destroyed {
            return Vec::new();
        }
        let mut events = self.events_down_to(LifecycleState::Created);
        if destroy {
            events.push(LifecycleEvent::Destroy);
        }
        events
    }

    /// Events a lifecycle in state `self` actually observes when `event` is
    /// delivered: intermediate steps are filled in, and events that would not
    /// move the lifecycle in their own direction are dropped.
    pub fn plan(self, event: LifecycleEvent) -> Vec<LifecycleEvent> {
        if self == LifecycleState::Destroyed {
            return Vec::new();
        }
        let target = event.target_state();
        if event.is_upward() {
            self.events_up_to(target)
        } else {
            self.events_down_to(target)
        }
    }
}
