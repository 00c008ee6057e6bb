use instrkit_service::AppListOptions;

use crate::cmd::{AppsArgs, Context};
use crate::exit::{service_error, CliResult, SUCCESS};
use crate::output::print_applications;

pub fn run(args: AppsArgs, ctx: &Context) -> CliResult<i32> {
    let instruments = ctx.connect()?;
    let options = args
        .filter
        .into_iter()
        .fold(AppListOptions::new(), |options, (key, value)| {
            options.with_match(key, value)
        })
        .with_update_token(args.update_token);

    let report = instruments
        .installed_applications(&options)
        .map_err(|err| service_error("listing applications failed", err))?;
    print_applications(&report, ctx.format);
    Ok(SUCCESS)
}
