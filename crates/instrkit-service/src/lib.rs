//! Instruments service client.
//!
//! This is the layer callers use. [`Instruments`] launches, kills and lists
//! processes and applications and reads device information; every call goes
//! through the [`Invoker`], which opens a channel, sends the selector and
//! separates remote faults from values. [`TelemetryTap`] owns one push
//! subscription to the system monitor.

pub mod error;
pub mod invoker;
pub mod options;
pub mod service;
pub mod tap;

pub use error::{Result, ServiceError};
pub use invoker::{classify, Invoker, RemoteFault, Reply};
pub use options::{AppListOptions, LaunchOptions};
pub use service::Instruments;
pub use tap::{TapStats, TelemetryConfig, TelemetryTap};
