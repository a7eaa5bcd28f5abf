//! Publishes the fleet overview dashboard and keeps the alarm e-mail subscribed.

use clap::Parser;
use mq_dashboards::{
    config::Settings,
    dashboard::DashboardTemplates,
    runner::run_overview_dashboard,
    services::{Services, aws::AwsServices},
};
use tracing::{info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![
        ("mq_dashboards", LevelFilter::DEBUG),
        ("overview_dashboard", LevelFilter::TRACE),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init();
    let settings = Settings::parse();
    trace!("started with settings: {settings:?}");

    let templates = DashboardTemplates::load(settings.template_dir.as_deref())?;
    let services: Services = AwsServices::load(settings.region.clone()).await.into();

    let report = run_overview_dashboard(&services, &settings, &templates).await?;
    info!("wrote {} dashboards", report.dashboards.len());

    Ok(())
}
