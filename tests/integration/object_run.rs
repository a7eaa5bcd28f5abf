//! Object dashboard run: per queue/topic dashboards and zero-consumer alarms

use mq_dashboards::runner::run_object_dashboards;

use crate::helpers::*;

#[tokio::test]
async fn queue_dashboards_are_suffixed_per_instance() {
    let cloud = active_standby_cloud();

    let report = run_object_dashboards(&cloud.services(), &settings(), &templates())
        .await
        .unwrap();

    assert_eq!(report.dashboards, vec!["Q-1-B-1", "Q-1-B-2"]);
    assert_eq!(cloud.dashboards.names(), vec!["Q-1-B-1", "Q-1-B-2"]);
}

#[tokio::test]
async fn object_dashboard_targets_broker_and_queue() {
    let cloud = active_standby_cloud();
    run_object_dashboards(&cloud.services(), &settings(), &templates())
        .await
        .unwrap();

    let body = dashboard_json(&cloud, "Q-1-B-2");
    let widgets = body["widgets"].as_array().unwrap();
    let markdown = widgets[0]["properties"]["markdown"].as_str().unwrap();
    assert!(markdown.contains("## Queue metrics for **Q.1**"));
    assert!(markdown.contains("dashboards:name=B-2"));

    for widget in widgets.iter().filter(|w| w["type"] == "metric") {
        let row = &widget["properties"]["metrics"][0];
        assert_eq!(row[3], "B-2");
        assert_eq!(row[4], "Queue");
        assert_eq!(row[5], "Q.1");
        assert_eq!(widget["properties"]["region"], "us-east-1");
    }
}

#[tokio::test]
async fn topics_use_the_topic_template() {
    let cloud = single_instance_cloud();

    let report = run_object_dashboards(&cloud.services(), &settings(), &templates())
        .await
        .unwrap();
    assert_eq!(report.dashboards, vec!["orders-in-S-1", "prices-S-1"]);

    let body = dashboard_json(&cloud, "prices-S-1");
    let row = &body["widgets"][1]["properties"]["metrics"][0];
    assert_eq!(row[4], "Topic");
    assert_eq!(row[5], "prices");
    assert_eq!(body["widgets"][1]["properties"]["region"], "eu-west-1");
}

#[tokio::test]
async fn advisory_topic_dashboards_are_opt_in() {
    let cloud = active_standby_cloud();
    let mut settings = settings();
    settings.include_advisory = true;

    let report = run_object_dashboards(&cloud.services(), &settings, &templates())
        .await
        .unwrap();

    assert_eq!(
        report.dashboards,
        vec!["Q-1-B-1", "Advisory-T-B-1", "Q-1-B-2", "Advisory-T-B-2"]
    );
}

#[tokio::test]
async fn one_zero_consumer_alarm_per_object() {
    let cloud = single_instance_cloud();
    let mut settings = settings();
    settings.alarms_enabled = true;

    let report = run_object_dashboards(&cloud.services(), &settings, &templates())
        .await
        .unwrap();

    assert_eq!(report.alarms.upserted, 2);
    assert_eq!(
        cloud.alarms.names(),
        vec!["ZeroConsumers-orders-in-S-1", "ZeroConsumers-prices-S-1"]
    );

    let alarm = cloud.alarms.get("ZeroConsumers-prices-S-1").unwrap();
    assert_eq!(alarm.metric_name, "ConsumerCount");
    assert_eq!(alarm.evaluation_periods, 2);
    assert_eq!(alarm.threshold, 0.0);
}

#[tokio::test]
async fn disabling_removes_object_alarms() {
    let cloud = single_instance_cloud();
    let mut settings = settings();
    settings.alarms_enabled = true;
    run_object_dashboards(&cloud.services(), &settings, &templates())
        .await
        .unwrap();

    settings.alarms_enabled = false;
    let report = run_object_dashboards(&cloud.services(), &settings, &templates())
        .await
        .unwrap();

    assert_eq!(report.alarms.deleted, 2);
    assert!(cloud.alarms.names().is_empty());
}

#[tokio::test]
async fn queue_and_topic_sharing_a_name_stay_apart() {
    let cloud = single_instance_cloud();
    report_object(&cloud, "S-1", "Queue", "prices");
    let mut settings = settings();
    settings.alarms_enabled = true;

    let report = run_object_dashboards(&cloud.services(), &settings, &templates())
        .await
        .unwrap();

    assert_eq!(
        report.dashboards,
        vec!["orders-in-S-1", "prices-S-1", "prices-Topic-S-1"]
    );
    assert_eq!(cloud.dashboards.names().len(), 3);
    assert_eq!(report.alarms.upserted, 3);
    assert_eq!(
        cloud.alarms.names(),
        vec![
            "ZeroConsumers-orders-in-S-1",
            "ZeroConsumers-prices-S-1",
            "ZeroConsumers-prices-Topic-S-1",
        ]
    );

    let queue = dashboard_json(&cloud, "prices-S-1");
    assert_eq!(queue["widgets"][1]["properties"]["metrics"][0][4], "Queue");
    let topic = dashboard_json(&cloud, "prices-Topic-S-1");
    assert_eq!(topic["widgets"][1]["properties"]["metrics"][0][4], "Topic");
}

#[tokio::test]
async fn broker_without_objects_publishes_nothing() {
    let cloud = active_standby_cloud();
    cloud.directory.set(vec![mq_dashboards::Broker::new(
        "empty",
        "us-east-1",
        mq_dashboards::DeploymentMode::SingleInstance,
    )]);

    let report = run_object_dashboards(&cloud.services(), &settings(), &templates())
        .await
        .unwrap();
    assert!(report.dashboards.is_empty());
    assert_eq!(cloud.dashboards.writes(), 0);
}
