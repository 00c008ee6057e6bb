use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use instrkit_decode::DiagnosticSink;
use instrkit_object::wire::{self, selector, sysmon};
use instrkit_object::{ChannelId, Object};
use instrkit_transport::{ChannelTransport, PushHandler, PushMessage};
use tracing::{debug, info, warn};

use crate::error::{Result, ServiceError};
use crate::invoker::Invoker;

/// Process attributes sampled by default.
pub const DEFAULT_PROC_ATTRS: &[&str] = &[
    "pid",
    "cpuUsage",
    "threadCount",
    "memVirtualSize",
    "vmPageIns",
    "memRShrd",
    "memCompressed",
];

/// System attributes sampled by default.
pub const DEFAULT_SYS_ATTRS: &[&str] = &[
    "diskWriteOps",
    "diskBytesRead",
    "diskBytesWritten",
    "threadCount",
    "vmCompressorPageCount",
    "vmExtPageCount",
    "vmFreeCount",
    "vmIntPageCount",
    "vmPurgeableCount",
    "netPacketsIn",
    "vmWireCount",
    "netBytesIn",
    "netPacketsOut",
    "diskReadOps",
    "vmUsedCount",
    "__vmSwapUsage",
    "netBytesOut",
];

/// Sampling configuration sent with `setConfig:` before a stream starts.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryConfig {
    /// Sampling rate (`ur`).
    pub sample_rate: i64,
    /// Baseline mode flag (`bm`).
    pub baseline_mode: i64,
    pub proc_attrs: Vec<String>,
    pub sys_attrs: Vec<String>,
    pub cpu_usage: bool,
    /// Encoded as integer nanoseconds.
    pub sample_interval: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            sample_rate: 1000,
            baseline_mode: 0,
            proc_attrs: DEFAULT_PROC_ATTRS.iter().map(|s| s.to_string()).collect(),
            sys_attrs: DEFAULT_SYS_ATTRS.iter().map(|s| s.to_string()).collect(),
            cpu_usage: true,
            sample_interval: Duration::from_secs(1),
        }
    }
}

impl TelemetryConfig {
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn with_proc_attrs<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.proc_attrs = attrs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sys_attrs<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sys_attrs = attrs.into_iter().map(Into::into).collect();
        self
    }

    /// The `setConfig:` record.
    pub fn to_object(&self) -> Object {
        let interval_ns = i64::try_from(self.sample_interval.as_nanos()).unwrap_or(i64::MAX);
        [
            (sysmon::SAMPLE_RATE, Object::Int(self.sample_rate)),
            (sysmon::BASELINE_MODE, Object::Int(self.baseline_mode)),
            (sysmon::PROC_ATTRS, Object::from(self.proc_attrs.clone())),
            (sysmon::SYS_ATTRS, Object::from(self.sys_attrs.clone())),
            (sysmon::CPU_USAGE, Object::Bool(self.cpu_usage)),
            (sysmon::SAMPLE_INTERVAL, Object::Int(interval_ns)),
        ]
        .into_iter()
        .collect()
    }
}

/// Push-message counters for one tap, across all of its runs.
#[derive(Debug, Default)]
pub struct TapStats {
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl TapStats {
    /// Messages handed to the callback.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Undecodable messages dropped.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

enum TapState {
    Idle,
    Active {
        channel: ChannelId,
        live: Arc<AtomicBool>,
    },
}

/// One system-monitor push subscription.
///
/// `Idle -> Active -> Idle`. Each tap owns its channel and callback, so
/// independent taps can stream concurrently. Dropping an active tap stops it.
///
/// `start` and `stop` are serialized with each other; state queries never
/// wait on a remote call.
pub struct TelemetryTap<T: ChannelTransport + ?Sized> {
    invoker: Invoker<T>,
    config: TelemetryConfig,
    sink: Arc<dyn DiagnosticSink>,
    transition: Mutex<()>,
    state: Mutex<TapState>,
    stats: Arc<TapStats>,
}

impl<T: ChannelTransport + ?Sized> TelemetryTap<T> {
    pub fn new(
        invoker: Invoker<T>,
        config: TelemetryConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            invoker,
            config,
            sink,
            transition: Mutex::new(()),
            state: Mutex::new(TapState::Idle),
            stats: Arc::new(TapStats::default()),
        }
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    pub fn stats(&self) -> &TapStats {
        &self.stats
    }

    pub fn is_active(&self) -> bool {
        matches!(*lock(&self.state), TapState::Active { .. })
    }

    /// Channel of the running stream, if any.
    pub fn channel(&self) -> Option<ChannelId> {
        match *lock(&self.state) {
            TapState::Active { channel, .. } => Some(channel),
            TapState::Idle => None,
        }
    }

    /// Configure the sampler and start streaming into `callback`.
    ///
    /// `callback` runs on the transport's dispatch thread. Fails with
    /// [`ServiceError::AlreadyActive`] if this tap is already streaming; the
    /// running stream is left alone.
    pub fn start<F>(&self, callback: F) -> Result<ChannelId>
    where
        F: FnMut(Object) + Send + 'static,
    {
        let _transition = lock(&self.transition);
        if let Some(channel) = self.channel() {
            return Err(ServiceError::AlreadyActive { channel });
        }

        let channel = self.invoker.open(wire::SYSMONTAP)?;
        let ack = self
            .invoker
            .call_on(channel, selector::SET_CONFIG, vec![self.config.to_object()])?
            .into_value()?;
        debug!(%channel, ack = %ack.to_json(), "sampler configured");

        let live = Arc::new(AtomicBool::new(true));
        let handler = self.push_handler(callback, Arc::clone(&live));
        self.invoker
            .transport()
            .register_push_handler(channel, handler)?;

        if let Err(err) = self.invoker.send_on(channel, selector::START, Vec::new()) {
            live.store(false, Ordering::Release);
            if let Err(unregister) = self.invoker.transport().unregister_push_handler(channel) {
                warn!(%channel, error = %unregister, "failed to unregister push handler");
            }
            return Err(err);
        }

        info!(%channel, interval = ?self.config.sample_interval, "telemetry tap started");
        *lock(&self.state) = TapState::Active { channel, live };
        Ok(channel)
    }

    /// Ask the remote side to stop streaming and release the callback.
    ///
    /// A no-op when idle. The tap is idle afterwards even if the stop request
    /// could not be sent; that failure is still returned. Messages arriving
    /// after this returns are ignored, though one already being dispatched
    /// may still complete.
    pub fn stop(&self) -> Result<()> {
        let _transition = lock(&self.transition);
        let previous = std::mem::replace(&mut *lock(&self.state), TapState::Idle);
        let TapState::Active { channel, live } = previous else {
            return Ok(());
        };

        live.store(false, Ordering::Release);
        let sent = self.invoker.send_on(channel, selector::STOP, Vec::new());
        let unregistered = self.invoker.transport().unregister_push_handler(channel);
        info!(
            %channel,
            delivered = self.stats.delivered(),
            dropped = self.stats.dropped(),
            "telemetry tap stopped"
        );

        sent?;
        unregistered?;
        Ok(())
    }

    fn push_handler<F>(&self, callback: F, live: Arc<AtomicBool>) -> PushHandler
    where
        F: FnMut(Object) + Send + 'static,
    {
        let callback = Mutex::new(callback);
        let stats = Arc::clone(&self.stats);
        let sink = Arc::clone(&self.sink);

        Arc::new(move |message: PushMessage| {
            if !live.load(Ordering::Acquire) {
                return;
            }
            match message.body {
                Ok(object) => {
                    stats.delivered.fetch_add(1, Ordering::Relaxed);
                    let mut callback = lock(&callback);
                    (*callback)(object);
                }
                Err(err) => {
                    stats.dropped.fetch_add(1, Ordering::Relaxed);
                    sink.push_dropped(message.channel, &err.to_string());
                }
            }
        })
    }
}

impl<T: ChannelTransport + ?Sized> Drop for TelemetryTap<T> {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            warn!(error = %err, "failed to stop telemetry tap on drop");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
