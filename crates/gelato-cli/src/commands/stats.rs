use gelato_core::stats::{AnalyticsAggregator, FlavourStats};
use gelato_core::ShopFilter;

use crate::commands::common::{format_stats_lines, today, Context};
use crate::error::CliError;

pub async fn run_stats(
    filter: &ShopFilter,
    as_json: bool,
    ctx: &Context,
) -> Result<FlavourStats, CliError> {
    let session = ctx.loaded_session().await?;
    let aggregator = AnalyticsAggregator::new(ctx.config.shops.clone());
    let stats = aggregator.aggregate(&session.snapshot().await, filter, today());

    if as_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        for line in format_stats_lines(&stats) {
            println!("{line}");
        }
    }

    Ok(stats)
}
