use std::fmt;

use crate::object::Object;

/// Transport-assigned identifier of an open logical channel.
///
/// Valid only while the connection that issued it is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u32);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single remote call: selector, target channel and ordered arguments.
///
/// Built once and moved into the transport, which consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    selector: String,
    channel: ChannelId,
    args: Vec<Object>,
    expects_reply: bool,
}

impl Invocation {
    /// Create an invocation that waits for a reply.
    pub fn new(channel: ChannelId, selector: impl Into<String>, args: Vec<Object>) -> Self {
        Self {
            selector: selector.into(),
            channel,
            args,
            expects_reply: true,
        }
    }

    /// Create a fire-and-forget invocation.
    pub fn oneway(channel: ChannelId, selector: impl Into<String>, args: Vec<Object>) -> Self {
        Self {
            expects_reply: false,
            ..Self::new(channel, selector, args)
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Arguments in wire order.
    pub fn args(&self) -> &[Object] {
        &self.args
    }

    pub fn expects_reply(&self) -> bool {
        self.expects_reply
    }
}
