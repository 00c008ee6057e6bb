use instrkit_service::LaunchOptions;
use serde_json::Value;

use crate::cmd::{typed_value, Context, LaunchArgs};
use crate::exit::{service_error, CliResult, SUCCESS};
use crate::output::print_fields;

pub fn run(args: LaunchArgs, ctx: &Context) -> CliResult<i32> {
    let instruments = ctx.connect()?;
    let options = launch_options(&args);

    let pid = instruments
        .launch_app(&args.bundle_id, &options)
        .map_err(|err| service_error("launch failed", err))?;

    print_fields(
        "launch",
        vec![
            ("bundle_id".to_string(), Value::from(args.bundle_id)),
            ("pid".to_string(), Value::from(pid)),
        ],
        ctx.format,
    );
    Ok(SUCCESS)
}

fn launch_options(args: &LaunchArgs) -> LaunchOptions {
    let mut options = LaunchOptions::new()
        .with_args(args.args.iter().cloned())
        .start_suspended(args.suspended)
        .kill_existing(args.kill_existing);
    for (key, value) in &args.env {
        options = options.with_env(key.clone(), value.clone());
    }
    // Explicit options win over the flags above.
    for (key, value) in &args.option {
        options = options.with_option(key.clone(), typed_value(value));
    }
    options
}
