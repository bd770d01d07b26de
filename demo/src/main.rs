//! VTN 注册表演示
//!
//! 用法：
//!   demo --config vtn.json --verbose
//!   RUST_LOG=vtn_domain=debug demo
//!
//! 构造全部存储，注册审计监听器与事件广播流，然后走一遍
//! 计划、事件、VEN 与资源的增删改查，并打印列表计数头。

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use futures_util::StreamExt;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use vtn_application::VtnRegistry;
use vtn_application::audit::AuditListener;
use vtn_application::config::VtnConfig;
use vtn_application::context::RequestContext;
use vtn_application::filters::EventFilter;
use vtn_application::model::{Event, Interval, IntervalPeriod, Program, Resource, ValuesMap, Ven};
use vtn_application::service::{FILTERED_COUNT, ListParams, TOTAL_COUNT};
use vtn_domain::entity::Entity;

#[derive(Parser, Debug)]
#[command(name = "vtn-demo")]
#[command(about = "In-memory OpenADR VTN registry walkthrough")]
struct Args {
    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of events to seed
    #[arg(short, long, default_value = "5")]
    events: usize,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    // RUST_LOG 优先；未设置时按 --verbose 选择级别
    let default_level = if args.verbose { "debug" } else { "info" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    let config = match &args.config {
        Some(path) => VtnConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => VtnConfig::default(),
    };
    let registry = VtnRegistry::from_config(config);
    registry.attach_audit(Arc::new(AuditListener::default()));

    let feed = registry.events().change_feed("event-notifier");
    let mut changes = feed.subscribe();
    let notifier = tokio::spawn(async move {
        let mut seen = 0usize;
        while let Some(item) = changes.next().await {
            match item {
                Ok(change) => {
                    seen += 1;
                    info!(change = ?change.kind, event = ?change.entity.event_name, "notify subscribers");
                }
                Err(err) => warn!(error = %err, "notifier fell behind"),
            }
        }
        seen
    });

    let ctx = RequestContext::builder()
        .correlation_id("demo-run")
        .client_name("demo")
        .build();

    let program = registry
        .programs()
        .create(&ctx, Program::named("Summer Peak Saver"))?
        .body;
    let program_id = program
        .id()
        .cloned()
        .context("store always assigns an id")?;

    let start = Utc::now();
    for i in 0..args.events {
        let event = Event {
            program_id: program_id.clone(),
            event_name: Some(format!("peak-{i}")),
            intervals: vec![Interval {
                id: 0,
                interval_period: Some(IntervalPeriod {
                    start: Some(start + Duration::hours(i as i64)),
                    duration: Some("PT1H".into()),
                    randomize_start: None,
                }),
                payloads: vec![ValuesMap::new("PRICE", vec![json!(0.25 + i as f64 * 0.05)])],
            }],
            ..Default::default()
        };
        let resp = registry.events().create(&ctx, event)?;
        info!(status = %resp.status, "event created");
    }

    let ven = registry.vens().create(&ctx, Ven::named("ven-001"))?.body;
    let ven_id = ven.id().cloned().context("store always assigns an id")?;
    let meter = Resource {
        resource_name: "meter-1".into(),
        ..Default::default()
    };
    registry.create_resource(&ctx, &ven_id, meter)?;

    let page = registry.events().list(
        ListParams {
            limit: Some(3),
            ..Default::default()
        },
        &EventFilter {
            program_id: Some(program_id.clone()),
            ..Default::default()
        },
    );
    info!(
        total = ?page.headers.get(TOTAL_COUNT),
        filtered = ?page.headers.get(FILTERED_COUNT),
        returned = page.items.len(),
        "events listed"
    );

    // 过期的更新会被拒绝
    let mut stale = program.clone();
    stale.metadata.last_modification = program.created().map(|c| c - Duration::minutes(1));
    if let Err(err) = registry.programs().put(&ctx, stale) {
        info!(status = %err.status_code(), error = %err, "stale program update rejected");
    }

    registry.delete_ven(&ctx, &ven_id)?;

    for (kind, count) in registry.counts() {
        info!(%kind, count, "store size");
    }

    drop(registry);
    drop(feed);
    let notified = notifier.await?;
    info!(notified, "done");
    Ok(())
}
