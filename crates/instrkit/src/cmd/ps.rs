use crate::cmd::Context;
use crate::exit::{service_error, CliResult, SUCCESS};
use crate::output::print_processes;

pub fn run(ctx: &Context) -> CliResult<i32> {
    let instruments = ctx.connect()?;
    let report = instruments
        .running_processes()
        .map_err(|err| service_error("listing processes failed", err))?;
    print_processes(&report, ctx.format);
    Ok(SUCCESS)
}
