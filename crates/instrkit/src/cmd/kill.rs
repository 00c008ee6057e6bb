use serde_json::Value;

use crate::cmd::{Context, KillArgs};
use crate::exit::{service_error, CliResult, SUCCESS};
use crate::output::print_fields;

pub fn run(args: KillArgs, ctx: &Context) -> CliResult<i32> {
    let instruments = ctx.connect()?;
    instruments
        .kill(args.pid)
        .map_err(|err| service_error("kill failed", err))?;

    print_fields(
        "kill",
        vec![
            ("pid".to_string(), Value::from(args.pid)),
            ("sent".to_string(), Value::from(true)),
        ],
        ctx.format,
    );
    Ok(SUCCESS)
}
