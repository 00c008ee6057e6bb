use std::time::Duration;

use instrkit_object::ChannelId;

/// Errors that can occur in channel transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The remote side refused to open the named service channel.
    #[error("channel for {service} refused: {reason}")]
    ChannelRefused { service: String, reason: String },

    /// The channel id was never issued by this transport, or has been closed.
    #[error("unknown channel {0}")]
    UnknownChannel(ChannelId),

    /// A reply was expected but the remote side produced none.
    #[error("no reply to {selector}")]
    NoReply { selector: String },

    /// The call did not complete in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The connection dropped or the send failed.
    #[error("disconnected: {0}")]
    Disconnected(String),

    /// An I/O error occurred on the underlying connection.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
