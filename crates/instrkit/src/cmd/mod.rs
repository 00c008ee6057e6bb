use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use instrkit_object::Object;
use instrkit_service::Instruments;
use instrkit_transport::ReplayTransport;

use crate::exit::{CliError, CliResult, USAGE};
use crate::fixture::Fixture;
use crate::output::OutputFormat;

pub mod apps;
pub mod device_info;
pub mod kill;
pub mod launch;
pub mod ps;
pub mod sysmontap;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List running processes.
    Ps,
    /// List installed applications.
    Apps(AppsArgs),
    /// Launch an application and print its pid.
    Launch(LaunchArgs),
    /// Kill a process.
    Kill(KillArgs),
    /// Print device information.
    DeviceInfo,
    /// Stream system monitor samples.
    Sysmontap(SysmontapArgs),
    /// Show version information.
    Version(VersionArgs),
}

/// Settings shared by every device command.
pub struct Context {
    pub fixture: Option<PathBuf>,
    pub format: OutputFormat,
}

impl Context {
    /// Connect to the device described by the replay fixture.
    pub fn connect(&self) -> CliResult<Instruments<ReplayTransport>> {
        let path = self
            .fixture
            .as_ref()
            .ok_or_else(|| CliError::new(USAGE, "no device: pass --fixture <FILE>"))?;
        let transport = Fixture::load(path)?.into_transport();
        Ok(Instruments::new(Arc::new(transport)))
    }
}

pub fn run(command: Command, ctx: &Context) -> CliResult<i32> {
    match command {
        Command::Ps => ps::run(ctx),
        Command::Apps(args) => apps::run(args, ctx),
        Command::Launch(args) => launch::run(args, ctx),
        Command::Kill(args) => kill::run(args, ctx),
        Command::DeviceInfo => device_info::run(ctx),
        Command::Sysmontap(args) => sysmontap::run(args, ctx),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct AppsArgs {
    /// Only list applications whose KEY equals VALUE (repeatable).
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub filter: Vec<(String, String)>,
    /// Token for an incremental listing.
    #[arg(long, default_value = "")]
    pub update_token: String,
}

#[derive(Args, Debug)]
pub struct LaunchArgs {
    /// Bundle identifier of the app to launch.
    pub bundle_id: String,
    /// Environment variable for the launched process (repeatable).
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,
    /// Command-line argument for the launched process (repeatable).
    #[arg(long = "arg", value_name = "ARG", allow_hyphen_values = true)]
    pub args: Vec<String>,
    /// Raw launch option (repeatable). Integers and booleans are typed.
    #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub option: Vec<(String, String)>,
    /// Launch the process suspended.
    #[arg(long)]
    pub suspended: bool,
    /// Kill a running instance first.
    #[arg(long)]
    pub kill_existing: bool,
}

#[derive(Args, Debug)]
pub struct KillArgs {
    /// Process identifier.
    pub pid: i64,
}

#[derive(Args, Debug)]
pub struct SysmontapArgs {
    /// Exit after receiving N samples.
    #[arg(long)]
    pub count: Option<usize>,
    /// Sampling interval (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub interval: String,
    /// Exit when no sample arrives for this long (e.g. 5s).
    #[arg(long)]
    pub idle_timeout: Option<String>,
    /// Process attribute to sample (repeatable). Replaces the default set.
    #[arg(long = "proc-attr", value_name = "ATTR")]
    pub proc_attrs: Vec<String>,
    /// System attribute to sample (repeatable). Replaces the default set.
    #[arg(long = "sys-attr", value_name = "ATTR")]
    pub sys_attrs: Vec<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_key_value(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{input}`")),
    }
}

/// Type a command-line option value: integers and booleans keep their type.
pub fn typed_value(value: &str) -> Object {
    if let Ok(n) = value.parse::<u64>() {
        return Object::UInt(n);
    }
    if let Ok(n) = value.parse::<i64>() {
        return Object::Int(n);
    }
    match value {
        "true" => Object::Bool(true),
        "false" => Object::Bool(false),
        other => Object::from(other),
    }
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
