use std::env;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use gelato_core::cache::{FileEntryCache, CACHE_SLOT_NAME};
use gelato_core::config::ClientConfig;
use gelato_core::remote::HttpEntryClient;
use gelato_core::stats::FlavourStats;
use gelato_core::timeline::TimelineDay;
use gelato_core::{EntrySynchronizer, SyncOutcome};

use crate::error::CliError;

/// Synchronizer used by every command: HTTP remote, file cache.
pub type Session = EntrySynchronizer<HttpEntryClient, FileEntryCache>;

/// Months shown in the trend section.
const TREND_MONTHS: usize = 6;

/// Resolved settings shared by all commands.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: ClientConfig,
    pub cache_path: PathBuf,
}

impl Context {
    pub fn resolve(
        api_url: Option<String>,
        cache_path: Option<PathBuf>,
    ) -> Result<Self, CliError> {
        let config = ClientConfig::from_env()?.with_api_url(api_url);
        Ok(Self {
            config,
            cache_path: resolve_cache_path(cache_path),
        })
    }

    pub fn session(&self) -> Result<Session, CliError> {
        Ok(EntrySynchronizer::new(
            self.config.http_client()?,
            FileEntryCache::new(&self.cache_path),
        ))
    }

    /// Open a session and load the collection, reporting any fallback.
    pub async fn loaded_session(&self) -> Result<Session, CliError> {
        let session = self.session()?;
        let outcome = session.load().await;
        if let Some(source) = outcome.value() {
            tracing::debug!(?source, "Loaded entries");
        }
        report_warning(&session).await;
        Ok(session)
    }
}

/// Print the session's warning banner to stderr, if one is raised.
pub async fn report_warning(session: &Session) {
    if let Some(warning) = session.warning().await {
        eprintln!("Warning: {warning}");
    }
}

/// Unwrap an outcome, keeping degraded values and failing on rejection.
pub fn settle<T>(outcome: SyncOutcome<T>) -> Result<T, CliError> {
    Ok(outcome.into_result()?)
}

pub fn resolve_cache_path(cli_cache_path: Option<PathBuf>) -> PathBuf {
    cli_cache_path
        .or_else(|| env::var_os("GELATO_CACHE_PATH").map(PathBuf::from))
        .unwrap_or_else(default_cache_path)
}

pub fn default_cache_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gelato")
        .join(format!("{CACHE_SLOT_NAME}.json"))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(value: Option<&str>) -> Result<NaiveDate, CliError> {
    match value.map(str::trim) {
        None | Some("") => Ok(today()),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| CliError::InvalidDate(value.to_string())),
    }
}

pub fn format_timeline_lines(days: &[TimelineDay]) -> Vec<String> {
    if days.is_empty() {
        return vec!["No entries yet.".to_string()];
    }

    let mut lines = Vec::new();
    for day in days {
        let count = day.flavour_count();
        let noun = if count == 1 { "flavour" } else { "flavours" };
        lines.push(format!("{} ({count} {noun})", day.date.format("%a %d %b %Y")));
        for visit in &day.shops {
            let flavors = visit
                .flavors
                .iter()
                .map(|tasted| format!("{} [{}]", tasted.flavor, tasted.id))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!(
                "  {}: {flavors} - {}",
                visit.shop,
                visit.people.join(", ")
            ));
        }
    }
    lines
}

pub fn format_stats_lines(stats: &FlavourStats) -> Vec<String> {
    if stats.is_empty() {
        return vec!["No entries to summarize.".to_string()];
    }

    let mut lines = vec![
        format!("Total flavours: {}", stats.total_flavours),
        format!("Unique flavours: {}", stats.unique_flavours),
        format!(
            "Most common flavour: {} ({})",
            stats.most_common_flavour.name, stats.most_common_flavour.count
        ),
    ];

    if let Some(shop) = &stats.most_popular_shop {
        lines.push(format!("Most popular shop: {} ({})", shop.name, shop.count));
    }
    if let Some(taster) = &stats.most_active_taster {
        lines.push(format!("Most active taster: {} ({})", taster.name, taster.count));
    }
    if let Some(visits) = &stats.visits {
        lines.push(format!(
            "Visits: {} (avg {:.1}, median {:.1}, min {}, max {} flavours)",
            visits.visits, visits.average, visits.median, visits.min, visits.max
        ));
    }
    if let Some(range) = &stats.date_range {
        lines.push(format!(
            "Dates: {} to {} ({} days, {:.2} flavours/day)",
            range.first_visit, range.last_visit, range.days_between, stats.flavours_per_day
        ));
    }

    let comparison = &stats.shop_comparison;
    lines.push(format!(
        "{} vs {}: {} vs {} ({})",
        comparison.primary.name,
        comparison.secondary.name,
        comparison.primary.count,
        comparison.secondary.count,
        comparison.ratio_label()
    ));
    lines.push(format!(
        "Last 7 days: {} ({:.1}%)",
        stats.recent.count, stats.recent.percentage
    ));
    lines.push(format!("Tasted today: {}", stats.todays_flavours));

    lines.push("Top flavours:".to_string());
    for (rank, flavour) in stats.top_flavours.iter().enumerate() {
        lines.push(format!("  {}. {} ({})", rank + 1, flavour.name, flavour.count));
    }

    lines.push("Monthly trend:".to_string());
    for bucket in stats.recent_months(TREND_MONTHS) {
        lines.push(format!("  {}: {}", bucket.label, bucket.count));
    }

    lines.push("Favourites:".to_string());
    for (person, favourite) in &stats.favourites_by_person {
        lines.push(format!("  {person}: {} ({})", favourite.name, favourite.count));
    }

    lines.push("Variety by shop:".to_string());
    for (shop, distinct) in &stats.shop_variety {
        lines.push(format!("  {shop}: {distinct}"));
    }

    lines
}
