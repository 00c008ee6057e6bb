use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use instrkit_object::{wire, ChannelId, CodecError, Invocation, Object};
use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::traits::{ChannelTransport, PushHandler, PushMessage};

type HandlerTable = Arc<Mutex<HashMap<ChannelId, PushHandler>>>;

/// An invocation observed by [`ReplayTransport`], with the service its channel was opened for.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedInvocation {
    pub service: String,
    pub invocation: Invocation,
}

#[derive(Default)]
struct Script {
    replies: HashMap<(String, String), Object>,
    streams: HashMap<String, Vec<std::result::Result<Object, CodecError>>>,
    refused: HashMap<String, String>,
    failing: HashMap<(String, String), String>,
}

#[derive(Default)]
struct Session {
    channels: HashMap<ChannelId, String>,
    log: Vec<RecordedInvocation>,
}

/// In-memory transport answering from scripted replies.
///
/// Replies are keyed by `(service, selector)` and returned for every matching
/// reply-expecting call. Streams scripted for a service are pushed when a
/// `start` invocation is sent on a channel of that service. Push messages are
/// dispatched from a dedicated thread, never from the invoking thread.
pub struct ReplayTransport {
    script: Mutex<Script>,
    session: Mutex<Session>,
    handlers: HandlerTable,
    dispatch: Sender<PushMessage>,
    next_channel: AtomicU32,
}

impl ReplayTransport {
    /// Create a transport with an empty script.
    pub fn new() -> Self {
        let handlers: HandlerTable = Arc::new(Mutex::new(HashMap::new()));
        let (dispatch, queue) = mpsc::channel::<PushMessage>();

        let table = Arc::clone(&handlers);
        // Ends when the transport (the only sender) is dropped.
        thread::spawn(move || {
            for message in queue {
                let handler = lock(&table).get(&message.channel).cloned();
                match handler {
                    Some(handler) => handler(message),
                    None => trace!(channel = %message.channel, "push without handler dropped"),
                }
            }
        });

        Self {
            script: Mutex::new(Script::default()),
            session: Mutex::new(Session::default()),
            handlers,
            dispatch,
            next_channel: AtomicU32::new(1),
        }
    }

    /// Script the reply returned for `selector` on channels of `service`.
    pub fn with_reply(self, service: &str, selector: &str, reply: impl Into<Object>) -> Self {
        lock(&self.script)
            .replies
            .insert((service.to_string(), selector.to_string()), reply.into());
        self
    }

    /// Script push messages delivered after `start` is sent to `service`.
    pub fn with_stream(self, service: &str, messages: Vec<Object>) -> Self {
        lock(&self.script)
            .streams
            .entry(service.to_string())
            .or_default()
            .extend(messages.into_iter().map(Ok));
        self
    }

    /// Script an undecodable push message in the stream of `service`.
    pub fn with_malformed_push(self, service: &str, error: CodecError) -> Self {
        lock(&self.script)
            .streams
            .entry(service.to_string())
            .or_default()
            .push(Err(error));
        self
    }

    /// Make every channel open for `service` fail.
    pub fn with_refused_channel(self, service: &str, reason: &str) -> Self {
        lock(&self.script)
            .refused
            .insert(service.to_string(), reason.to_string());
        self
    }

    /// Make every invocation of `selector` on `service` fail as a dropped connection.
    pub fn with_failing_selector(self, service: &str, selector: &str, reason: &str) -> Self {
        lock(&self.script).failing.insert(
            (service.to_string(), selector.to_string()),
            reason.to_string(),
        );
        self
    }

    /// Services with a scripted stream.
    pub fn stream_services(&self) -> Vec<String> {
        lock(&self.script).streams.keys().cloned().collect()
    }

    /// Returns true if a reply is scripted for `selector` on `service`.
    pub fn has_reply(&self, service: &str, selector: &str) -> bool {
        lock(&self.script)
            .replies
            .contains_key(&(service.to_string(), selector.to_string()))
    }

    /// Queue a push message for `channel` on the dispatch thread.
    pub fn push(&self, channel: ChannelId, body: Object) -> Result<()> {
        self.enqueue(PushMessage {
            channel,
            body: Ok(body),
        })
    }

    /// Queue an undecodable push message for `channel`.
    pub fn push_malformed(&self, channel: ChannelId, error: CodecError) -> Result<()> {
        self.enqueue(PushMessage {
            channel,
            body: Err(error),
        })
    }

    /// Every invocation sent so far, in send order.
    pub fn invocations(&self) -> Vec<RecordedInvocation> {
        lock(&self.session).log.clone()
    }

    /// Invocations of one selector, in send order.
    pub fn invocations_of(&self, selector: &str) -> Vec<RecordedInvocation> {
        lock(&self.session)
            .log
            .iter()
            .filter(|recorded| recorded.invocation.selector() == selector)
            .cloned()
            .collect()
    }

    /// Number of channels opened so far.
    pub fn channels_opened(&self) -> usize {
        lock(&self.session).channels.len()
    }

    /// Returns true if a push handler is registered for `channel`.
    pub fn has_push_handler(&self, channel: ChannelId) -> bool {
        lock(&self.handlers).contains_key(&channel)
    }

    fn enqueue(&self, message: PushMessage) -> Result<()> {
        self.dispatch
            .send(message)
            .map_err(|_| TransportError::Disconnected("dispatch thread stopped".to_string()))
    }
}

impl Default for ReplayTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelTransport for ReplayTransport {
    fn open_channel(&self, service: &str) -> Result<ChannelId> {
        if let Some(reason) = lock(&self.script).refused.get(service) {
            return Err(TransportError::ChannelRefused {
                service: service.to_string(),
                reason: reason.clone(),
            });
        }

        let id = ChannelId(self.next_channel.fetch_add(1, Ordering::Relaxed));
        lock(&self.session)
            .channels
            .insert(id, service.to_string());
        debug!(channel = %id, service = wire::service_name(service), "channel opened");
        Ok(id)
    }

    fn invoke(&self, invocation: Invocation) -> Result<Option<Object>> {
        let channel = invocation.channel();
        let service = {
            let mut session = lock(&self.session);
            let service = session
                .channels
                .get(&channel)
                .cloned()
                .ok_or(TransportError::UnknownChannel(channel))?;
            session.log.push(RecordedInvocation {
                service: service.clone(),
                invocation: invocation.clone(),
            });
            service
        };

        let selector = invocation.selector().to_string();
        let key = (service, selector);
        let script = lock(&self.script);

        if let Some(reason) = script.failing.get(&key) {
            return Err(TransportError::Disconnected(reason.clone()));
        }

        if key.1 == wire::selector::START {
            if let Some(stream) = script.streams.get(&key.0) {
                for body in stream.iter().cloned() {
                    self.enqueue(PushMessage { channel, body })?;
                }
            }
        }

        if !invocation.expects_reply() {
            return Ok(None);
        }

        script
            .replies
            .get(&key)
            .cloned()
            .map(Some)
            .ok_or(TransportError::NoReply { selector: key.1 })
    }

    fn register_push_handler(&self, channel: ChannelId, handler: PushHandler) -> Result<()> {
        if !lock(&self.session).channels.contains_key(&channel) {
            return Err(TransportError::UnknownChannel(channel));
        }
        lock(&self.handlers).insert(channel, handler);
        Ok(())
    }

    fn unregister_push_handler(&self, channel: ChannelId) -> Result<()> {
        lock(&self.handlers).remove(&channel);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use instrkit_object::wire::{selector, DEVICE_INFO, SYSMONTAP};

    use super::*;

    #[test]
    fn each_open_allocates_a_new_channel() {
        let transport = ReplayTransport::new();
        let first = transport.open_channel(DEVICE_INFO).unwrap();
        let second = transport.open_channel(DEVICE_INFO).unwrap();
        assert_ne!(first, second);
        assert_eq!(transport.channels_opened(), 2);
    }

    #[test]
    fn scripted_reply_is_returned_and_recorded() {
        let transport = ReplayTransport::new().with_reply(
            DEVICE_INFO,
            selector::RUNNING_PROCESSES,
            Object::empty_list(),
        );
        let channel = transport.open_channel(DEVICE_INFO).unwrap();

        let reply = transport
            .invoke(Invocation::new(channel, selector::RUNNING_PROCESSES, vec![]))
            .unwrap();
        assert_eq!(reply, Some(Object::empty_list()));

        let log = transport.invocations();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].service, DEVICE_INFO);
        assert_eq!(log[0].invocation.selector(), selector::RUNNING_PROCESSES);
    }

    #[test]
    fn missing_reply_is_an_error_only_when_expected() {
        let transport = ReplayTransport::new();
        let channel = transport.open_channel(DEVICE_INFO).unwrap();

        let err = transport
            .invoke(Invocation::new(channel, selector::SYSTEM_INFORMATION, vec![]))
            .unwrap_err();
        assert!(matches!(err, TransportError::NoReply { .. }));

        let sent = transport
            .invoke(Invocation::oneway(channel, selector::STOP, vec![]))
            .unwrap();
        assert!(sent.is_none());
    }

    #[test]
    fn refused_channel_and_unknown_channel() {
        let transport = ReplayTransport::new().with_refused_channel(SYSMONTAP, "denied");
        let err = transport.open_channel(SYSMONTAP).unwrap_err();
        assert!(matches!(err, TransportError::ChannelRefused { .. }));

        let err = transport
            .invoke(Invocation::new(ChannelId(99), selector::START, vec![]))
            .unwrap_err();
        assert!(matches!(err, TransportError::UnknownChannel(ChannelId(99))));
    }

    #[test]
    fn failing_selector_reports_disconnect() {
        let transport = ReplayTransport::new().with_failing_selector(
            DEVICE_INFO,
            selector::RUNNING_PROCESSES,
            "socket closed",
        );
        let channel = transport.open_channel(DEVICE_INFO).unwrap();
        let err = transport
            .invoke(Invocation::new(channel, selector::RUNNING_PROCESSES, vec![]))
            .unwrap_err();
        assert!(matches!(err, TransportError::Disconnected(reason) if reason == "socket closed"));
    }

    #[test]
    fn start_releases_stream_to_registered_handler() {
        let transport = ReplayTransport::new()
            .with_stream(SYSMONTAP, vec![Object::UInt(1), Object::UInt(2)])
            .with_malformed_push(SYSMONTAP, CodecError::Malformed("truncated".to_string()));
        let channel = transport.open_channel(SYSMONTAP).unwrap();

        let (tx, rx) = mpsc::channel();
        let invoking_thread = thread::current().id();
        transport
            .register_push_handler(
                channel,
                Arc::new(move |message: PushMessage| {
                    assert_ne!(thread::current().id(), invoking_thread);
                    let _ = tx.send(message.body);
                }),
            )
            .unwrap();

        transport
            .invoke(Invocation::oneway(channel, selector::START, vec![]))
            .unwrap();

        let timeout = Duration::from_secs(2);
        assert_eq!(rx.recv_timeout(timeout).unwrap(), Ok(Object::UInt(1)));
        assert_eq!(rx.recv_timeout(timeout).unwrap(), Ok(Object::UInt(2)));
        assert!(rx.recv_timeout(timeout).unwrap().is_err());
    }

    #[test]
    fn unregistered_channel_receives_nothing() {
        let transport = ReplayTransport::new();
        let channel = transport.open_channel(SYSMONTAP).unwrap();

        let (tx, rx) = mpsc::channel();
        transport
            .register_push_handler(
                channel,
                Arc::new(move |message: PushMessage| {
                    let _ = tx.send(message.body);
                }),
            )
            .unwrap();
        assert!(transport.has_push_handler(channel));

        transport.unregister_push_handler(channel).unwrap();
        assert!(!transport.has_push_handler(channel));
        transport.push(channel, Object::Bool(true)).unwrap();

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }
}
