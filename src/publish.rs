use tracing::{info, instrument, trace};

use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::services::DashboardStore;

/// Writes `dashboard` under `name`, replacing whatever was stored before.
#[instrument(skip(store, dashboard))]
pub async fn publish(store: &dyn DashboardStore, name: &str, dashboard: &Dashboard) -> Result<()> {
    let body = dashboard.to_body()?;
    trace!("{name}: {body}");

    store.put_dashboard(name, body).await?;
    info!("published dashboard {name}");
    Ok(())
}
