//! The three provisioning runs
//!
//! Each run recomputes its dashboards and alarms from the current broker
//! listing and overwrites remote state:
//!
//! ```text
//! brokers ─► instances ─► discover objects ─► compose ─► toggle alarms ─► publish
//! ```
//!
//! Work is strictly sequential. The first failing external call aborts the
//! run; whatever was already written stays and the next run repairs the rest.

use tracing::{debug, info, instrument};

use crate::alarms::{AlarmChanges, AlarmMode, AlarmToggler, broker_alarms, object_alarms};
use crate::config::Settings;
use crate::dashboard::{
    DashboardTemplates, compose_broker_dashboard, compose_object_dashboard,
    compose_overview_dashboard,
};
use crate::discovery::{discover_objects, list_brokers};
use crate::error::Result;
use crate::notifications::{SubscriptionChanges, desired_email, sync_email_subscription};
use crate::publish::publish;
use crate::services::Services;
use crate::util::{OVERVIEW_DASHBOARD_NAME, broker_dashboard_name};

/// What a run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Dashboard names in publication order
    pub dashboards: Vec<String>,
    pub alarms: AlarmChanges,
    pub subscriptions: Option<SubscriptionChanges>,
}

async fn alarm_mode(services: &Services, settings: &Settings) -> AlarmMode {
    AlarmMode::resolve(
        services.parameters.as_ref(),
        &settings.alarms_enabled_parameter,
        settings.alarms_enabled,
    )
    .await
}

/// One dashboard per broker instance plus the broker usage alarms.
#[instrument(skip_all)]
pub async fn run_broker_dashboards(
    services: &Services,
    settings: &Settings,
    templates: &DashboardTemplates,
) -> Result<RunReport> {
    let toggler = AlarmToggler::new(
        services.alarms.as_ref(),
        alarm_mode(services, settings).await,
    );
    let mut report = RunReport::default();

    for broker in list_brokers(services.directory.as_ref()).await? {
        for instance in broker.instances() {
            let inventory = discover_objects(
                services.metrics.as_ref(),
                &instance,
                settings.include_advisory,
            )
            .await?;

            let dashboard = compose_broker_dashboard(&templates.broker, &instance, &inventory)?;
            report.alarms += toggler
                .apply(&broker_alarms(&instance, &settings.topic_arn))
                .await?;

            let name = broker_dashboard_name(&instance.name);
            publish(services.dashboards.as_ref(), &name, &dashboard).await?;
            report.dashboards.push(name);
        }
    }

    info!(
        "broker run finished: {} dashboards, {:?}",
        report.dashboards.len(),
        report.alarms
    );
    Ok(report)
}

/// The fleet overview dashboard, and upkeep of the alarm e-mail
/// subscription.
#[instrument(skip_all)]
pub async fn run_overview_dashboard(
    services: &Services,
    settings: &Settings,
    templates: &DashboardTemplates,
) -> Result<RunReport> {
    let brokers = list_brokers(services.directory.as_ref()).await?;
    let dashboard =
        compose_overview_dashboard(&templates.overview, &settings.customer_name, &brokers)?;

    let mut report = RunReport::default();
    let email = desired_email(
        services.parameters.as_ref(),
        &settings.alarm_email_parameter,
        settings.alarm_email.clone(),
    )
    .await;
    if let Some(email) = email {
        report.subscriptions = Some(
            sync_email_subscription(services.notifications.as_ref(), &settings.topic_arn, &email)
                .await?,
        );
    }

    publish(
        services.dashboards.as_ref(),
        OVERVIEW_DASHBOARD_NAME,
        &dashboard,
    )
    .await?;
    report.dashboards.push(OVERVIEW_DASHBOARD_NAME.to_string());

    info!("overview run finished for {} brokers", brokers.len());
    Ok(report)
}

/// One dashboard per queue and topic plus their zero-consumer alarms.
#[instrument(skip_all)]
pub async fn run_object_dashboards(
    services: &Services,
    settings: &Settings,
    templates: &DashboardTemplates,
) -> Result<RunReport> {
    let toggler = AlarmToggler::new(
        services.alarms.as_ref(),
        alarm_mode(services, settings).await,
    );
    let mut report = RunReport::default();

    for broker in list_brokers(services.directory.as_ref()).await? {
        for instance in broker.instances() {
            let inventory = discover_objects(
                services.metrics.as_ref(),
                &instance,
                settings.include_advisory,
            )
            .await?;
            if inventory.is_empty() {
                debug!("{}: no queues or topics reported", instance.name);
            }

            for object in inventory.objects(&instance) {
                let template = templates.for_object(object.kind);
                let dashboard = compose_object_dashboard(template, &object)?;
                report.alarms += toggler
                    .apply(&object_alarms(&object, &settings.topic_arn))
                    .await?;

                let name = object.dashboard_name();
                publish(services.dashboards.as_ref(), &name, &dashboard).await?;
                report.dashboards.push(name);
            }
        }
    }

    info!(
        "object run finished: {} dashboards, {:?}",
        report.dashboards.len(),
        report.alarms
    );
    Ok(report)
}
