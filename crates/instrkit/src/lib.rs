//! Client for selector-based device instrumentation services.
//!
//! instrkit launches, kills and lists processes and applications on a device,
//! reads device information, and subscribes to system-monitor telemetry, all
//! over a multiplexed channel transport supplied by the caller.
//!
//! # Crate Structure
//!
//! - [`object`]: the generic reply value, invocation envelope and wire names
//! - [`transport`]: the channel transport trait and an in-memory replay transport
//! - [`decode`]: tolerant decoding of replies into typed records
//! - [`service`]: the [`Instruments`](service::Instruments) client and telemetry taps

/// Re-export object types.
pub mod object {
    pub use instrkit_object::*;
}

/// Re-export transport types.
pub mod transport {
    pub use instrkit_transport::*;
}

/// Re-export decode types.
pub mod decode {
    pub use instrkit_decode::*;
}

/// Re-export service types.
pub mod service {
    pub use instrkit_service::*;
}
