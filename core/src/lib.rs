pub mod block;
pub mod clock;
pub mod error;
pub mod events;
pub mod params;
pub mod scheduler;
pub mod settings;
pub mod sink;
pub mod temporal;
pub mod template;

// Re-exports for convenience
pub use block::{Block, BlockOptions, Frame};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CountdownError, Endpoint, ValidationError};
pub use events::{SchedulerEvent, run_events};
pub use params::{Params, parse, parse_at};
pub use scheduler::{IdSource, InstanceId, InstanceScheduler, RandomIds};
pub use sink::{Appearance, BarSink, ProgressBar, ProgressSink};
pub use temporal::{Instants, Interval, Phase, ProgressState};
pub use countdown_types::{BarType, DurationRounding, ProgressType, Settings};
