use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use instrkit_service::TelemetryConfig;
use tracing::info;

use crate::cmd::{parse_duration, Context, SysmontapArgs};
use crate::exit::{service_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::print_sample;

const POLL: Duration = Duration::from_millis(100);

pub fn run(args: SysmontapArgs, ctx: &Context) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let idle_timeout = args.idle_timeout.as_deref().map(parse_duration).transpose()?;

    let instruments = ctx.connect()?;
    let tap = instruments.telemetry_tap(telemetry_config(&args, interval));

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let (tx, rx) = mpsc::channel();
    tap.start(move |sample| {
        let _ = tx.send(sample);
    })
    .map_err(|err| service_error("starting sysmontap failed", err))?;

    let mut printed = 0usize;
    let mut last_sample = Instant::now();

    while running.load(Ordering::SeqCst) {
        if args.count.is_some_and(|count| printed >= count) {
            break;
        }
        match rx.recv_timeout(POLL) {
            Ok(sample) => {
                print_sample(printed, &sample, ctx.format);
                printed = printed.saturating_add(1);
                last_sample = Instant::now();
            }
            Err(RecvTimeoutError::Timeout) => {
                if idle_timeout.is_some_and(|idle| last_sample.elapsed() >= idle) {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    tap.stop()
        .map_err(|err| service_error("stopping sysmontap failed", err))?;
    info!(
        delivered = tap.stats().delivered(),
        dropped = tap.stats().dropped(),
        "sysmontap finished"
    );

    Ok(SUCCESS)
}

fn telemetry_config(args: &SysmontapArgs, interval: Duration) -> TelemetryConfig {
    let mut config = TelemetryConfig::default().with_sample_interval(interval);
    if !args.proc_attrs.is_empty() {
        config = config.with_proc_attrs(args.proc_attrs.iter().cloned());
    }
    if !args.sys_attrs.is_empty() {
        config = config.with_sys_attrs(args.sys_attrs.iter().cloned());
    }
    config
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
