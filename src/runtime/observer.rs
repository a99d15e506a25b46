//! Bridges the host lifecycle to the screen stack.

use std::sync::Arc;

use crate::ScreenError;
use crate::lifecycle::HostLifecycle;

use super::screens::SharedScreenManager;

/// Register `manager` as an observer of `host`.
///
/// The observer holds a weak handle, so dropping the manager silently stops
/// forwarding.
pub(crate) fn forward_host_events(host: &HostLifecycle, manager: &SharedScreenManager) {
    let manager = Arc::downgrade(manager);
    host.add_observer(move |event| {
        let Some(manager) = manager.upgrade() else {
            return Ok(());
        };
        let mut manager = manager.lock().map_err(|_| ScreenError::Poisoned)?;
        manager.on_host_event(event)
    });
}
