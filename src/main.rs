use anyhow::Result;
use clap::Parser;
use serde_json::Value;

use campaign_sync_client::api::ApiClient;
use campaign_sync_client::http::fetcher::AuthToken;
use campaign_sync_client::http::transport::ReqwestTransport;
use campaign_sync_client::notify::NotificationStore;
use campaign_sync_client::sync::driver::SyncDriver;
use campaign_sync_client::SyncConfig;

/// Schedules one campaign-settings edit through the debounced sync driver
/// and reports what happened.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "http://localhost:8000")]
    base_url: String,

    #[arg(long)]
    campaign_id: u64,

    /// UI-facing field name, e.g. maxDailyPosts or engagementHours.start
    #[arg(long)]
    field: String,

    /// JSON-encoded value, e.g. 12 or "\"10:30\""
    #[arg(long)]
    value: String,

    /// Workspace access token; sent as a Bearer credential when present.
    #[arg(long)]
    token: Option<String>,

    #[arg(long, default_value_t = 500)]
    settle_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let value: Value = serde_json::from_str(&args.value)?;

    let auth = args.token.map(AuthToken::bearer);
    let api = ApiClient::new(ReqwestTransport::new(), args.base_url.clone()).with_auth(auth);

    let cfg = SyncConfig {
        settle_delay: std::time::Duration::from_millis(args.settle_ms),
        ..SyncConfig::default()
    };

    let notifications = NotificationStore::new();
    let driver = SyncDriver::new(api, args.campaign_id, notifications.clone(), cfg.clone());
    let handle = driver.handle();
    let cache = driver.cache();

    println!("[MAIN] Campaign:  {}", args.campaign_id);
    println!("[MAIN] Edit:      {} = {}", args.field, value);

    let loop_task = tokio::spawn(driver.run());

    handle.schedule(&args.field, value);

    // Settle delay, then headroom for the write and refetch round-trips.
    tokio::time::sleep(cfg.settle_delay + std::time::Duration::from_secs(2)).await;

    println!("[MAIN] Outcome");
    println!("-----------------------------------");
    for note in notifications.visible() {
        println!("{:?}: {}", note.kind, note.message);
    }
    let snapshot = cache.snapshot();
    match snapshot.get(args.field.split('.').next().unwrap_or(&args.field)) {
        Some(current) => println!("Cached value:     {current}"),
        None => println!("Cached value:     <not in snapshot>"),
    }
    println!("-----------------------------------");

    handle.shutdown();
    let _ = loop_task.await;

    Ok(())
}
