//! Channel transport abstraction.
//!
//! A transport multiplexes named logical channels over one physical
//! connection, carries [`Invocation`]s to the remote side, and dispatches
//! server-initiated push messages to registered handlers. The physical
//! connection and the binary codec belong to the implementor.
//!
//! [`ReplayTransport`] is an in-memory implementation that answers from
//! scripted replies. It backs the tests of every layer above and the CLI's
//! fixture mode.
//!
//! [`Invocation`]: instrkit_object::Invocation

pub mod error;
pub mod replay;
pub mod traits;

pub use error::{Result, TransportError};
pub use replay::{RecordedInvocation, ReplayTransport};
pub use traits::{ChannelTransport, PushHandler, PushMessage};
