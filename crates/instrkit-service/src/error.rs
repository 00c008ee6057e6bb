use instrkit_decode::DecodeError;
use instrkit_object::ChannelId;
use instrkit_transport::TransportError;

use crate::invoker::RemoteFault;

/// Errors that can occur in service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The named service channel could not be opened.
    #[error("failed to open {service} channel: {source}")]
    ChannelOpen {
        service: String,
        #[source]
        source: TransportError,
    },

    /// The send or receive failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The remote side answered with a structured error.
    #[error("remote fault: {0}")]
    RemoteFault(RemoteFault),

    /// The reply did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// `start` was called on a tap that is already streaming.
    #[error("telemetry tap already active on channel {channel}")]
    AlreadyActive { channel: ChannelId },
}

pub type Result<T> = std::result::Result<T, ServiceError>;
