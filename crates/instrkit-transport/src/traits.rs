use std::sync::Arc;

use instrkit_object::{ChannelId, CodecError, Invocation, Object};

use crate::error::Result;

/// A server-initiated message received on a channel.
#[derive(Debug, Clone)]
pub struct PushMessage {
    /// Channel the message arrived on.
    pub channel: ChannelId,
    /// Decoded payload, or the codec failure for a payload that did not decode.
    pub body: std::result::Result<Object, CodecError>,
}

/// Callback invoked on the transport's dispatch thread for each push message.
pub type PushHandler = Arc<dyn Fn(PushMessage) + Send + Sync>;

/// A multiplexed, selector-based RPC connection.
///
/// Implementations must be shareable across threads: replies are awaited on
/// the calling thread while push messages arrive on a transport-owned one.
/// Requests and replies on one channel are assumed FIFO; nothing is assumed
/// across channels.
pub trait ChannelTransport: Send + Sync {
    /// Open a new logical channel to `service`.
    ///
    /// Every call is an independent allocation; the same service may be
    /// opened any number of times.
    fn open_channel(&self, service: &str) -> Result<ChannelId>;

    /// Send an invocation.
    ///
    /// For a reply-expecting invocation this blocks until the reply (or a
    /// failure) arrives and returns `Some(reply)`. A fire-and-forget
    /// invocation returns `None` once the send is accepted.
    fn invoke(&self, invocation: Invocation) -> Result<Option<Object>>;

    /// Route push messages for `channel` to `handler`, replacing any previous one.
    fn register_push_handler(&self, channel: ChannelId, handler: PushHandler) -> Result<()>;

    /// Stop routing push messages for `channel`. Removing an absent handler is not an error.
    fn unregister_push_handler(&self, channel: ChannelId) -> Result<()>;
}

impl<T: ChannelTransport + ?Sized> ChannelTransport for Arc<T> {
    fn open_channel(&self, service: &str) -> Result<ChannelId> {
        (**self).open_channel(service)
    }

    fn invoke(&self, invocation: Invocation) -> Result<Option<Object>> {
        (**self).invoke(invocation)
    }

    fn register_push_handler(&self, channel: ChannelId, handler: PushHandler) -> Result<()> {
        (**self).register_push_handler(channel, handler)
    }

    fn unregister_push_handler(&self, channel: ChannelId) -> Result<()> {
        (**self).unregister_push_handler(channel)
    }
}
