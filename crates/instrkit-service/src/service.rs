use std::sync::Arc;

use instrkit_decode::{
    decode_many, decode_one, Application, DecodeConfig, DecodeError, DecodeReport, DeviceInfo,
    DiagnosticSink, Process, RecordKind, TracingSink,
};
use instrkit_object::wire::{self, selector};
use instrkit_object::Object;
use instrkit_transport::ChannelTransport;
use tracing::{debug, info};

use crate::error::Result;
use crate::invoker::Invoker;
use crate::options::{AppListOptions, LaunchOptions};
use crate::tap::{TelemetryConfig, TelemetryTap};

/// Client for the instruments services of one device connection.
///
/// Every operation opens its own channel; nothing is cached or retried.
pub struct Instruments<T: ?Sized> {
    invoker: Invoker<T>,
    sink: Arc<dyn DiagnosticSink>,
    decode_config: DecodeConfig,
}

impl<T: ChannelTransport + ?Sized> Instruments<T> {
    /// Create a client that reports diagnostics through `tracing`.
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            invoker: Invoker::new(transport),
            sink: Arc::new(TracingSink),
            decode_config: DecodeConfig::default(),
        }
    }

    /// Route decode and push diagnostics to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Override collection decode behavior.
    pub fn with_decode_config(mut self, config: DecodeConfig) -> Self {
        self.decode_config = config;
        self
    }

    /// Launch the app identified by `bundle_id` and return its pid.
    pub fn launch_app(&self, bundle_id: &str, options: &LaunchOptions) -> Result<i64> {
        let reply = self
            .invoker
            .call(
                wire::PROCESS_CONTROL,
                selector::LAUNCH_SUSPENDED_PROCESS,
                options.to_args(bundle_id),
            )?
            .into_value()?;
        let pid = pid_from_reply(&reply)?;
        info!(bundle_id, pid, "launched app");
        Ok(pid)
    }

    /// Resolve the pid of a running app.
    pub fn process_identifier_for(&self, bundle_id: &str) -> Result<i64> {
        let reply = self
            .invoker
            .call(
                wire::PROCESS_CONTROL,
                selector::PROCESS_IDENTIFIER_FOR_BUNDLE,
                vec![Object::from(bundle_id)],
            )?
            .into_value()?;
        Ok(pid_from_reply(&reply)?)
    }

    /// Ask the device to observe `pid`.
    pub fn start_observing(&self, pid: i64) -> Result<()> {
        self.invoker
            .call(
                wire::PROCESS_CONTROL,
                selector::START_OBSERVING_PID,
                vec![Object::Int(pid)],
            )?
            .into_value()?;
        debug!(pid, "observing process");
        Ok(())
    }

    /// Kill `pid`. Fire-and-forget: success means the request was sent.
    pub fn kill(&self, pid: i64) -> Result<()> {
        self.invoker.send(
            wire::PROCESS_CONTROL,
            selector::KILL_PID,
            vec![Object::Int(pid)],
        )?;
        info!(pid, "kill requested");
        Ok(())
    }

    /// List running processes. Malformed entries are skipped and reported.
    pub fn running_processes(&self) -> Result<DecodeReport<Process>> {
        let reply = self
            .invoker
            .call(wire::DEVICE_INFO, selector::RUNNING_PROCESSES, Vec::new())?
            .into_value()?;
        let report = decode_many(&reply, &self.decode_config, self.sink.as_ref())?;
        debug!(
            kept = report.kept(),
            skipped = report.skipped_count(),
            "decoded running processes"
        );
        Ok(report)
    }

    /// List installed applications. Malformed entries are skipped and reported.
    pub fn installed_applications(
        &self,
        options: &AppListOptions,
    ) -> Result<DecodeReport<Application>> {
        let reply = self
            .invoker
            .call(
                wire::APPLICATION_LISTING,
                selector::INSTALLED_APPLICATIONS,
                options.to_args(),
            )?
            .into_value()?;
        let report = decode_many(&reply, &self.decode_config, self.sink.as_ref())?;
        debug!(
            kept = report.kept(),
            skipped = report.skipped_count(),
            "decoded installed applications"
        );
        Ok(report)
    }

    /// Read the device description. Any decode failure fails the call.
    pub fn device_info(&self) -> Result<DeviceInfo> {
        let reply = self
            .invoker
            .call(wire::DEVICE_INFO, selector::SYSTEM_INFORMATION, Vec::new())?
            .into_value()?;
        let info = decode_one(&reply)?;
        self.sink.record_decoded(RecordKind::DeviceInfo, &reply);
        Ok(info)
    }

    /// Create an idle telemetry tap sharing this client's transport and sink.
    pub fn telemetry_tap(&self, config: TelemetryConfig) -> TelemetryTap<T> {
        TelemetryTap::new(self.invoker.clone(), config, Arc::clone(&self.sink))
    }
}

/// Pid replies arrive as unsigned 64-bit integers and are cast to `i64`
/// without a range check; pids above `i64::MAX` are assumed not to occur.
fn pid_from_reply(reply: &Object) -> std::result::Result<i64, DecodeError> {
    match reply {
        Object::UInt(pid) => Ok(*pid as i64),
        Object::Int(pid) => Ok(*pid),
        other => Err(DecodeError::UnexpectedValue {
            expected: "integer pid",
            found: other.kind(),
        }),
    }
}
