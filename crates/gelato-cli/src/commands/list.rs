use gelato_core::timeline::build_timeline;
use gelato_core::ShopFilter;

use crate::commands::common::{format_timeline_lines, Context};
use crate::error::CliError;

pub async fn run_list(filter: &ShopFilter, as_json: bool, ctx: &Context) -> Result<(), CliError> {
    let session = ctx.loaded_session().await?;
    let entries = filter.apply(&session.snapshot().await);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for line in format_timeline_lines(&build_timeline(&entries)) {
            println!("{line}");
        }
    }

    Ok(())
}
