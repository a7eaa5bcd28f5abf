//! Broker dashboard run: instance fan-out, object links and broker alarms

use mq_dashboards::alarms::AlarmChanges;
use mq_dashboards::runner::run_broker_dashboards;

use crate::helpers::*;

#[tokio::test]
async fn active_standby_broker_gets_two_dashboards() {
    let cloud = active_standby_cloud();

    let report = run_broker_dashboards(&cloud.services(), &settings(), &templates())
        .await
        .unwrap();

    assert_eq!(report.dashboards, vec!["B-1", "B-2"]);
    assert_eq!(cloud.dashboards.names(), vec!["B-1", "B-2"]);

    for instance in ["B-1", "B-2"] {
        let body = dashboard_json(&cloud, instance);
        for widget in body["widgets"].as_array().unwrap() {
            if widget["type"] == "metric" {
                assert_eq!(widget["properties"]["metrics"][0][3], instance);
                assert_eq!(widget["properties"]["region"], "us-east-1");
            }
        }
    }
}

#[tokio::test]
async fn single_instance_broker_is_suffixed_once() {
    let cloud = single_instance_cloud();

    let report = run_broker_dashboards(&cloud.services(), &settings(), &templates())
        .await
        .unwrap();

    assert_eq!(report.dashboards, vec!["S-1"]);
}

#[tokio::test]
async fn broker_dashboard_links_its_objects() {
    let cloud = active_standby_cloud();
    run_broker_dashboards(&cloud.services(), &settings(), &templates())
        .await
        .unwrap();

    let body = dashboard_json(&cloud, "B-2");
    let markdown = body["widgets"][0]["properties"]["markdown"].as_str().unwrap();
    assert!(markdown.contains("## Broker metrics for **B-2**"));
    assert!(markdown.contains(
        "* [Q.1](https://console.aws.amazon.com/cloudwatch/home?region=us-east-1#dashboards:name=Q-1-B-2)"
    ));
    assert!(!markdown.contains("Advisory.T"));
}

#[tokio::test]
async fn advisory_topics_are_linked_when_included() {
    let cloud = active_standby_cloud();
    let mut settings = settings();
    settings.include_advisory = true;

    run_broker_dashboards(&cloud.services(), &settings, &templates())
        .await
        .unwrap();

    let body = dashboard_json(&cloud, "B-1");
    let markdown = body["widgets"][0]["properties"]["markdown"].as_str().unwrap();
    assert!(markdown.contains("[Advisory.T]"));
    assert!(markdown.contains("dashboards:name=Advisory-T-B-1"));
}

#[tokio::test]
async fn topic_sharing_a_queue_name_links_its_own_dashboard() {
    let cloud = single_instance_cloud();
    report_object(&cloud, "S-1", "Queue", "prices");

    run_broker_dashboards(&cloud.services(), &settings(), &templates())
        .await
        .unwrap();

    let body = dashboard_json(&cloud, "S-1");
    let markdown = body["widgets"][0]["properties"]["markdown"].as_str().unwrap();
    assert!(markdown.contains("dashboards:name=prices-S-1)"));
    assert!(markdown.contains("dashboards:name=prices-Topic-S-1)"));
}

#[tokio::test]
async fn enabled_alarms_cover_every_instance() {
    let cloud = active_standby_cloud();
    let mut settings = settings();
    settings.alarms_enabled = true;

    let report = run_broker_dashboards(&cloud.services(), &settings, &templates())
        .await
        .unwrap();

    assert_eq!(
        report.alarms,
        AlarmChanges {
            upserted: 6,
            deleted: 0
        }
    );
    assert_eq!(
        cloud.alarms.names(),
        vec![
            "CpuUtilization-B-1",
            "CpuUtilization-B-2",
            "HeapUsage-B-1",
            "HeapUsage-B-2",
            "StorePercentUsage-B-1",
            "StorePercentUsage-B-2",
        ]
    );
    let heap = cloud.alarms.get("HeapUsage-B-2").unwrap();
    assert_eq!(heap.actions, vec![TOPIC_ARN.to_string()]);
}

#[tokio::test]
async fn parameter_store_overrides_the_default() {
    let cloud = active_standby_cloud();
    let settings = settings();
    cloud
        .parameters
        .set(&settings.alarms_enabled_parameter, "true");

    run_broker_dashboards(&cloud.services(), &settings, &templates())
        .await
        .unwrap();
    assert_eq!(cloud.alarms.names().len(), 6);

    cloud
        .parameters
        .set(&settings.alarms_enabled_parameter, "false");
    let report = run_broker_dashboards(&cloud.services(), &settings, &templates())
        .await
        .unwrap();

    assert_eq!(report.alarms.deleted, 6);
    assert!(cloud.alarms.names().is_empty());
}

#[tokio::test]
async fn disabled_alarms_are_deleted_even_when_absent() {
    let cloud = single_instance_cloud();

    let report = run_broker_dashboards(&cloud.services(), &settings(), &templates())
        .await
        .unwrap();

    assert_eq!(report.alarms.deleted, 3);
    assert_eq!(
        cloud.alarms.deletes(),
        vec!["HeapUsage-S-1", "StorePercentUsage-S-1", "CpuUtilization-S-1"]
    );
}
