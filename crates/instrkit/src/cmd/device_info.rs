use crate::cmd::Context;
use crate::exit::{service_error, CliResult, SUCCESS};
use crate::output::{fields_of, print_fields};

pub fn run(ctx: &Context) -> CliResult<i32> {
    let instruments = ctx.connect()?;
    let info = instruments
        .device_info()
        .map_err(|err| service_error("reading device info failed", err))?;
    print_fields("device-info", fields_of(&info), ctx.format);
    Ok(SUCCESS)
}
