//! Host-facing event surface
//!
//! Hosts forward these to [`InstanceScheduler::handle_event`], either
//! directly or through [`run_events`] on the runtime that owns the
//! scheduler.
//!
//! [`InstanceScheduler::handle_event`]: crate::scheduler::InstanceScheduler::handle_event

use countdown_types::Settings;
use tokio::sync::mpsc;

use crate::scheduler::InstanceScheduler;

#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    /// Global settings changed; every instance is remounted under them
    SettingsChanged(Settings),
    /// Re-render every instance under the current settings
    RerenderRequested,
    /// Cancel every timer and drop every instance
    Teardown,
}

/// Apply events until `Teardown` arrives or every sender is gone.
///
/// The scheduler is always torn down on return.
pub async fn run_events(scheduler: &mut InstanceScheduler, rx: &mut mpsc::Receiver<SchedulerEvent>) {
    while let Some(event) = rx.recv().await {
        tracing::debug!(?event, "Scheduler event");
        if !scheduler.handle_event(event) {
            return;
        }
    }
    scheduler.teardown();
}
