use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use gelato_core::cache::{EntryCache, FileEntryCache};
use gelato_core::config::ClientConfig;
use gelato_core::demo::demo_entries;
use gelato_core::stats::AnalyticsAggregator;
use gelato_core::timeline::build_timeline;
use gelato_core::ShopFilter;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::commands::add::{run_add, AddArgs};
use crate::commands::common::{
    default_cache_path, format_stats_lines, format_timeline_lines, parse_date,
    resolve_cache_path, today, Context,
};
use crate::commands::delete::{resolve_password, run_delete};
use crate::commands::list::run_list;
use crate::commands::stats::run_stats;
use crate::error::CliError;

/// Nothing listens on the discard port, so every request fails fast.
const UNREACHABLE_API: &str = "http://127.0.0.1:9";

fn offline_context(dir: &TempDir) -> Context {
    let mut config = ClientConfig::default().with_api_url(Some(UNREACHABLE_API.to_string()));
    config.timeout = Duration::from_secs(2);
    Context {
        config,
        cache_path: dir.path().join("ice-cream-entries.json"),
    }
}

fn add_args<'a>(flavors: &'a [String], person: &'a str) -> AddArgs<'a> {
    AddArgs {
        flavors,
        person,
        shop: None,
        date: Some("2024-03-01"),
        notes: Some("after dinner"),
    }
}

#[test]
fn parse_date_accepts_iso_and_defaults_to_today() {
    assert_eq!(
        parse_date(Some("2024-03-01")).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    );
    assert_eq!(parse_date(None).unwrap(), today());
    assert_eq!(parse_date(Some("  ")).unwrap(), today());
    assert!(matches!(
        parse_date(Some("01/03/2024")),
        Err(CliError::InvalidDate(_))
    ));
}

#[test]
fn cache_path_prefers_flag() {
    let explicit = PathBuf::from("/tmp/gelato-cache.json");
    assert_eq!(resolve_cache_path(Some(explicit.clone())), explicit);
    assert!(default_cache_path().ends_with("gelato/ice-cream-entries.json"));
}

#[test]
fn password_flag_is_trimmed() {
    assert_eq!(
        resolve_password(Some(" hunter2 ".to_string())).unwrap(),
        "hunter2"
    );
}

#[test]
fn add_draft_defaults_to_primary_shop() {
    let dir = TempDir::new().unwrap();
    let ctx = offline_context(&dir);
    let flavors = vec!["Mint".to_string()];

    let draft = add_args(&flavors, " Ana ").draft(&ctx).unwrap();

    assert_eq!(draft.shop, "Joelato");
    assert_eq!(draft.person, "Ana");
    assert_eq!(draft.notes.as_deref(), Some("after dinner"));
}

#[test]
fn timeline_lines_show_ids_and_tasters() {
    let entries = demo_entries();
    let lines = format_timeline_lines(&build_timeline(&entries));
    assert_eq!(
        lines,
        vec![
            "Mon 15 Jan 2024 (1 flavour)".to_string(),
            format!("  Joelato: Chocolate [{}] - Demo", entries[0].id),
            "Sun 14 Jan 2024 (1 flavour)".to_string(),
            format!("  Mary's Milk Bar: Vanilla [{}] - Demo", entries[1].id),
        ]
    );
    assert_eq!(format_timeline_lines(&[]), vec!["No entries yet."]);
}

#[test]
fn stats_lines_cover_headline_figures() {
    let today = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
    let stats = AnalyticsAggregator::default().aggregate(&demo_entries(), &ShopFilter::All, today);

    let lines = format_stats_lines(&stats);

    assert_eq!(lines[0], "Total flavours: 2");
    assert!(lines.contains(&"Joelato vs Mary's Milk Bar: 1 vs 1 (1 : 1.00)".to_string()));
    assert!(lines.contains(&"Last 7 days: 2 (100.0%)".to_string()));
}

#[tokio::test]
async fn list_falls_back_to_demo_when_offline() {
    let dir = TempDir::new().unwrap();
    let ctx = offline_context(&dir);

    run_list(&ShopFilter::All, true, &ctx).await.unwrap();

    // Demo data is never written to the cache.
    assert!(!ctx.cache_path.exists());
}

#[tokio::test]
async fn add_commits_locally_when_offline() {
    let dir = TempDir::new().unwrap();
    let ctx = offline_context(&dir);
    let flavors = vec!["Mint".to_string(), " ".to_string(), "Lemon".to_string()];

    let created = run_add(&add_args(&flavors, "Ana"), &ctx).await.unwrap();

    assert_eq!(created.len(), 2);
    assert!(created.iter().all(|entry| entry.id.is_local()));

    let cached = FileEntryCache::new(&ctx.cache_path).load().unwrap().unwrap();
    assert_eq!(cached.len(), 4);
    assert_eq!(cached[0].flavor, "Mint");
    assert_eq!(cached[1].flavor, "Lemon");
}

#[tokio::test]
async fn add_rejects_blank_flavours_before_loading() {
    let dir = TempDir::new().unwrap();
    let ctx = offline_context(&dir);
    let flavors = vec!["  ".to_string()];

    let err = run_add(&add_args(&flavors, "Ana"), &ctx).await.unwrap_err();

    assert!(matches!(err, CliError::Core(gelato_core::Error::Validation(_))));
    assert!(!ctx.cache_path.exists());
}

#[tokio::test]
async fn stats_read_cached_entries_when_offline() {
    let dir = TempDir::new().unwrap();
    let ctx = offline_context(&dir);
    let mut entries = demo_entries();
    entries.extend(demo_entries());
    FileEntryCache::new(&ctx.cache_path).store(&entries).unwrap();

    let stats = run_stats(&ShopFilter::from("Joelato"), true, &ctx)
        .await
        .unwrap();

    assert_eq!(stats.total_flavours, 2);
    assert_eq!(stats.shop_comparison.secondary.count, 2);
}

#[tokio::test]
async fn delete_rejects_malformed_id() {
    let dir = TempDir::new().unwrap();
    let ctx = offline_context(&dir);

    let err = run_delete("not-an-id", Some("secret".to_string()), &ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Core(gelato_core::Error::Validation(_))));
}

#[tokio::test]
async fn delete_fails_when_admin_cannot_be_verified() {
    let dir = TempDir::new().unwrap();
    let ctx = offline_context(&dir);

    let err = run_delete("1", Some("secret".to_string()), &ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, CliError::Core(gelato_core::Error::Transport(_))));
}
