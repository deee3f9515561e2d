//! Live instance registry
//!
//! The scheduler owns every mounted instance and its update timer.
//!
//! ```text
//!  mount(source, sink)
//!        │
//!        ▼
//!  Block::prepare ──Err──► sink.set_error_text
//!        │ Ok
//!        ▼
//!  Block::evaluate ──► sink.set_progress / set_info_text
//!        │
//!        ▼ (real-time updates enabled)
//!  start_repeating ──► tick: evaluate + render against the pinned interval
//! ```
//!
//! Timers are cancelled explicitly: on `unmount`, before a settings-driven
//! remount, and for every instance on `teardown`.

mod timer;


pub use timer::{TimerHandle, start_repeating};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use countdown_types::Settings;
use rand::Rng;

use crate::block::Block;
use crate::clock::{Clock, SystemClock};
use crate::events::SchedulerEvent;
use crate::sink::ProgressSink;

/// Prefix for error text delivered to a sink
pub const ERROR_PREFIX: &str = "Error rendering countdown: ";

const ID_LENGTH: usize = 13;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque identifier, unique among currently-live instances
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of candidate instance identifiers
pub trait IdSource: Send {
    fn next_id(&mut self) -> String;
}

/// Random 13-character base36 identifiers
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self) -> String {
        let mut rng = rand::thread_rng();
        (0..ID_LENGTH)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }
}

struct Instance {
    sink: Arc<dyn ProgressSink>,
    source: String,
    timer: Option<TimerHandle>,
}

impl Instance {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
    }
}

pub struct InstanceScheduler {
    settings: Settings,
    clock: Arc<dyn Clock>,
    ids: Box<dyn IdSource>,
    instances: HashMap<InstanceId, Instance>,
}

impl InstanceScheduler {
    /// Scheduler on the local wall clock with random identifiers
    pub fn new(settings: Settings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: Settings, clock: Arc<dyn Clock>) -> Self {
        Self {
            settings,
            clock,
            ids: Box::new(RandomIds),
            instances: HashMap::new(),
        }
    }

    pub fn with_id_source(mut self, ids: impl IdSource + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.instances.contains_key(id)
    }

    /// Whether the instance currently has a running update timer
    pub fn is_armed(&self, id: &InstanceId) -> bool {
        self.instances
            .get(id)
            .and_then(|instance| instance.timer.as_ref())
            .is_some_and(|timer| !timer.is_finished())
    }

    // --- Lifecycle ---

    /// Register a block and render it.
    ///
    /// Parse and validation failures are rendered through the sink's error
    /// path; the instance is still registered so the host can unmount it.
    pub fn mount(&mut self, source: impl Into<String>, sink: Arc<dyn ProgressSink>) -> InstanceId {
        let id = self.allocate_id();
        let source = source.into();
        let timer = self.start(&id, &source, &sink);

        tracing::debug!(instance = %id, armed = timer.is_some(), "Mounted countdown");
        self.instances
            .insert(id.clone(), Instance { sink, source, timer });
        id
    }

    /// Cancel the instance's timer and drop it. Returns false for unknown ids.
    pub fn unmount(&mut self, id: &InstanceId) -> bool {
        let Some(mut instance) = self.instances.remove(id) else {
            return false;
        };
        instance.cancel_timer();
        tracing::debug!(instance = %id, "Unmounted countdown");
        true
    }

    /// Replace the global settings and remount every live instance under them.
    pub fn on_settings_changed(&mut self, settings: Settings) {
        self.settings = settings;
        self.rerender_all();
    }

    /// Run the full mount pipeline again for every live instance.
    pub fn rerender_all(&mut self) {
        let ids: Vec<InstanceId> = self.instances.keys().cloned().collect();
        for id in ids {
            // Take the instance out so `start` can borrow `self` immutably
            let Some(mut instance) = self.instances.remove(&id) else {
                continue;
            };
            instance.cancel_timer();
            instance.timer = self.start(&id, &instance.source, &instance.sink);
            self.instances.insert(id, instance);
        }
        tracing::info!(count = self.instances.len(), "Re-rendered all countdowns");
    }

    /// Cancel every timer and forget every instance.
    pub fn teardown(&mut self) {
        let count = self.instances.len();
        for (_, mut instance) in self.instances.drain() {
            instance.cancel_timer();
        }
        if count > 0 {
            tracing::info!(count, "Tore down all countdowns");
        }
    }

    /// Apply a host event. Returns false once the scheduler has been torn down.
    pub fn handle_event(&mut self, event: SchedulerEvent) -> bool {
        match event {
            SchedulerEvent::SettingsChanged(settings) => {
                self.on_settings_changed(settings);
                true
            }
            SchedulerEvent::RerenderRequested => {
                self.rerender_all();
                true
            }
            SchedulerEvent::Teardown => {
                self.teardown();
                false
            }
        }
    }

    // --- Internals ---

    /// Retry until the candidate collides with no live instance
    fn allocate_id(&mut self) -> InstanceId {
        loop {
            let id = InstanceId(self.ids.next_id());
            if !self.instances.contains_key(&id) {
                return id;
            }
            tracing::debug!(instance = %id, "Instance id collision, retrying");
        }
    }

    /// Prepare, render and (if enabled) arm the update timer
    fn start(
        &self,
        id: &InstanceId,
        source: &str,
        sink: &Arc<dyn ProgressSink>,
    ) -> Option<TimerHandle> {
        let now = self.clock.now();
        let block = match Block::prepare(source, &self.settings, now) {
            Ok(block) => block,
            Err(e) => {
                tracing::warn!(instance = %id, error = %e, "Failed to render countdown");
                sink.set_error_text(&format!("{}{}", ERROR_PREFIX, e));
                return None;
            }
        };

        block.render(now, sink.as_ref());

        let options = block.options();
        if !options.update_in_real_time {
            return None;
        }

        let period = options.update_interval;
        let clock = Arc::clone(&self.clock);
        let tick_sink = Arc::clone(sink);
        let timer = start_repeating(period, move || {
            block.evaluate(clock.now()).apply(tick_sink.as_ref());
        });

        if timer.is_some() {
            tracing::debug!(instance = %id, period_secs = period.as_secs(), "Armed update timer");
        }
        timer
    }
}

impl Drop for InstanceScheduler {
    fn drop(&mut self) {
        self.teardown();
    }
}
