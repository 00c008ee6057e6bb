//! Object model and wire contract for selector-based instrumentation RPC.
//!
//! Every argument and result crossing the channel transport is an [`Object`]:
//! a closed tagged value (scalar, string, bytes, ordered list, or string-keyed
//! mapping). The binary codec that turns objects into wire bytes lives outside
//! this workspace; this crate only fixes the value shape, the [`Invocation`]
//! envelope, and the service/selector names the remote side expects.

pub mod error;
pub mod invocation;
pub mod object;
pub mod wire;

pub use error::{CodecError, Result};
pub use invocation::{ChannelId, Invocation};
pub use object::Object;
