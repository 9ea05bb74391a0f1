pub mod cell;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod remote;
mod slot;
mod unit;

pub use cell::{Observable, ObserverId};
pub use dispatcher::{Dispatcher, DispatcherBuilder, DispatcherConfig, Results};
pub use error::CoreError;
pub use executor::{Executor, RequestId, ScheduledHandle, UnitToken, WorkHandle};
pub use metrics::{MetricsBackend, MetricsHandle, NoOpMetrics, RequestOutcome, noop_metrics};
pub use remote::{RemoteService, TransportError};

pub mod prelude {
    pub use crate::cell::Observable;
    pub use crate::dispatcher::{Dispatcher, DispatcherConfig};
    pub use crate::error::CoreError;
    pub use crate::remote::{RemoteService, TransportError};
}
