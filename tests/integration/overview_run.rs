//! Overview run: fleet dashboard and alarm e-mail subscription upkeep

use mq_dashboards::runner::run_overview_dashboard;
use mq_dashboards::{Broker, DeploymentMode};

use crate::helpers::*;

#[tokio::test]
async fn overview_is_published_under_a_fixed_name() {
    let cloud = active_standby_cloud();
    let mut settings = settings();
    settings.customer_name = "Acme".to_string();

    let report = run_overview_dashboard(&cloud.services(), &settings, &templates())
        .await
        .unwrap();

    assert_eq!(report.dashboards, vec!["AmazonMQ"]);
    assert_eq!(report.subscriptions, None);

    let body = dashboard_json(&cloud, "AmazonMQ");
    let heading = body["widgets"][0]["properties"]["markdown"].as_str().unwrap();
    assert!(heading.contains("# Acme MQ Operations"));
    assert!(!heading.contains("{customer}"));

    let brokers = body["widgets"][1]["properties"]["markdown"].as_str().unwrap();
    assert!(brokers.contains("* B [Primary]("));
    assert!(brokers.contains("dashboards:name=B-1"));
    assert!(brokers.contains("dashboards:name=B-2"));
}

#[tokio::test]
async fn brokers_are_listed_by_name() {
    let cloud = active_standby_cloud();
    cloud.directory.set(vec![
        Broker::new("orders", "us-east-1", DeploymentMode::SingleInstance),
        Broker::new("billing", "us-east-1", DeploymentMode::Cluster),
    ]);

    run_overview_dashboard(&cloud.services(), &settings(), &templates())
        .await
        .unwrap();

    let body = dashboard_json(&cloud, "AmazonMQ");
    let brokers = body["widgets"][1]["properties"]["markdown"].as_str().unwrap();
    let billing = brokers.find("* billing").unwrap();
    let orders = brokers.find("* [orders]").unwrap();
    assert!(billing < orders);
}

#[tokio::test]
async fn empty_fleet_still_gets_an_overview() {
    let cloud = active_standby_cloud();
    cloud.directory.set(Vec::new());

    run_overview_dashboard(&cloud.services(), &settings(), &templates())
        .await
        .unwrap();

    let body = dashboard_json(&cloud, "AmazonMQ");
    let brokers = body["widgets"][1]["properties"]["markdown"].as_str().unwrap();
    assert!(brokers.contains("_no brokers found_"));
}

#[tokio::test]
async fn configured_email_is_subscribed() {
    let cloud = active_standby_cloud();
    let mut settings = settings();
    settings.alarm_email = Some("ops@example.com".to_string());

    let report = run_overview_dashboard(&cloud.services(), &settings, &templates())
        .await
        .unwrap();

    let changes = report.subscriptions.unwrap();
    assert_eq!(changes.subscribed.as_deref(), Some("ops@example.com"));
    assert_eq!(cloud.notifications.endpoints(TOPIC_ARN), vec!["ops@example.com"]);
}

#[tokio::test]
async fn parameter_store_email_replaces_the_old_address() {
    let cloud = active_standby_cloud();
    let mut settings = settings();
    settings.alarm_email = Some("default@example.com".to_string());
    cloud
        .notifications
        .add_confirmed(TOPIC_ARN, "email", "former@example.com");
    cloud
        .parameters
        .set(&settings.alarm_email_parameter, " oncall@example.com ");

    let report = run_overview_dashboard(&cloud.services(), &settings, &templates())
        .await
        .unwrap();

    let changes = report.subscriptions.unwrap();
    assert_eq!(changes.subscribed.as_deref(), Some("oncall@example.com"));
    assert_eq!(changes.unsubscribed, vec!["former@example.com".to_string()]);
    assert_eq!(
        cloud.notifications.endpoints(TOPIC_ARN),
        vec!["oncall@example.com"]
    );
}

#[tokio::test]
async fn blank_email_parameter_disables_upkeep() {
    let cloud = active_standby_cloud();
    let mut settings = settings();
    settings.alarm_email = Some("default@example.com".to_string());
    cloud.parameters.set(&settings.alarm_email_parameter, "  ");

    let report = run_overview_dashboard(&cloud.services(), &settings, &templates())
        .await
        .unwrap();

    assert_eq!(report.subscriptions, None);
    assert!(cloud.notifications.endpoints(TOPIC_ARN).is_empty());
}
