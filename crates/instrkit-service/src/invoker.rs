use std::fmt;
use std::sync::Arc;

use instrkit_object::{wire, ChannelId, Invocation, Object};
use instrkit_transport::{ChannelTransport, TransportError};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, ServiceError};

/// A structured error returned by the remote side in place of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteFault {
    /// The localized description carried in the fault's user info.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

impl fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        match (&self.domain, self.code) {
            (Some(domain), Some(code)) => write!(f, " ({domain} {code})"),
            (Some(domain), None) => write!(f, " ({domain})"),
            (None, Some(code)) => write!(f, " (code {code})"),
            (None, None) => Ok(()),
        }
    }
}

/// Classified reply to a reply-expecting invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Value(Object),
    Fault(RemoteFault),
}

impl Reply {
    /// Return the value, or the fault as an error.
    pub fn into_value(self) -> Result<Object> {
        match self {
            Reply::Value(object) => Ok(object),
            Reply::Fault(fault) => Err(ServiceError::RemoteFault(fault)),
        }
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Reply::Fault(_))
    }
}

/// Separate remote faults from ordinary values.
///
/// A fault is a mapping whose `NSUserInfo` mapping carries a string
/// `NSLocalizedDescription`. Everything else, including null and empty
/// collections, is a value.
pub fn classify(object: Object) -> Reply {
    let fault = object
        .get(wire::fault::USER_INFO)
        .and_then(|info| info.get(wire::fault::LOCALIZED_DESCRIPTION))
        .and_then(Object::as_str)
        .map(|message| RemoteFault {
            message: message.to_string(),
            domain: object
                .get(wire::fault::DOMAIN)
                .and_then(Object::as_str)
                .map(str::to_string),
            code: object.get(wire::fault::CODE).and_then(Object::as_i64),
        });

    match fault {
        Some(fault) => Reply::Fault(fault),
        None => Reply::Value(object),
    }
}

/// Sends selectors over a channel transport.
///
/// Arguments are passed through in order without inspection. Nothing is
/// retried: channel-open and transport failures surface immediately.
pub struct Invoker<T: ?Sized> {
    transport: Arc<T>,
}

impl<T: ?Sized> Clone for Invoker<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: ChannelTransport + ?Sized> Invoker<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Open a fresh channel to `service`.
    pub fn open(&self, service: &str) -> Result<ChannelId> {
        let channel = self
            .transport
            .open_channel(service)
            .map_err(|source| ServiceError::ChannelOpen {
                service: service.to_string(),
                source,
            })?;
        debug!(%channel, service = wire::service_name(service), "opened channel");
        Ok(channel)
    }

    /// Open a channel to `service` and send `selector`.
    ///
    /// Returns `Some(reply)` when `expects_reply` is set, `None` otherwise.
    pub fn invoke(
        &self,
        service: &str,
        selector: &str,
        args: Vec<Object>,
        expects_reply: bool,
    ) -> Result<Option<Reply>> {
        let channel = self.open(service)?;
        if expects_reply {
            self.call_on(channel, selector, args).map(Some)
        } else {
            self.send_on(channel, selector, args).map(|()| None)
        }
    }

    /// Open a channel, send `selector` and wait for the reply.
    pub fn call(&self, service: &str, selector: &str, args: Vec<Object>) -> Result<Reply> {
        let channel = self.open(service)?;
        self.call_on(channel, selector, args)
    }

    /// Open a channel and send `selector` without waiting for a reply.
    pub fn send(&self, service: &str, selector: &str, args: Vec<Object>) -> Result<()> {
        let channel = self.open(service)?;
        self.send_on(channel, selector, args)
    }

    /// Send `selector` on an open channel and wait for the reply.
    pub fn call_on(&self, channel: ChannelId, selector: &str, args: Vec<Object>) -> Result<Reply> {
        debug!(%channel, selector, args = args.len(), "invoke (reply expected)");
        let reply = self
            .transport
            .invoke(Invocation::new(channel, selector, args))?
            .ok_or_else(|| TransportError::NoReply {
                selector: selector.to_string(),
            })?;

        let reply = classify(reply);
        if let Reply::Fault(fault) = &reply {
            debug!(%channel, selector, %fault, "remote fault");
        }
        Ok(reply)
    }

    /// Send `selector` on an open channel without waiting for a reply.
    pub fn send_on(&self, channel: ChannelId, selector: &str, args: Vec<Object>) -> Result<()> {
        debug!(%channel, selector, args = args.len(), "invoke (fire-and-forget)");
        self.transport
            .invoke(Invocation::oneway(channel, selector, args))?;
        Ok(())
    }
}
