//! Helper functions for integration tests

use mq_dashboards::{
    Broker, DeploymentMode, MQ_NAMESPACE,
    config::Settings,
    dashboard::DashboardTemplates,
    services::{Dimension, MetricDescriptor, memory::MemoryCloud},
};

pub const TOPIC_ARN: &str = "arn:aws:sns:us-east-1:123456789012:mq-alarms";

pub fn settings() -> Settings {
    Settings::new(TOPIC_ARN)
}

pub fn templates() -> DashboardTemplates {
    DashboardTemplates::embedded().unwrap()
}

/// A metric reported by `instance` for a queue or topic.
pub fn object_metric(metric: &str, instance: &str, kind: &str, object: &str) -> MetricDescriptor {
    MetricDescriptor {
        metric_name: metric.to_string(),
        dimensions: vec![Dimension::new("Broker", instance), Dimension::new(kind, object)],
    }
}

/// A broker-level metric reported by `instance`.
pub fn broker_metric(metric: &str, instance: &str) -> MetricDescriptor {
    MetricDescriptor {
        metric_name: metric.to_string(),
        dimensions: vec![Dimension::new("Broker", instance)],
    }
}

/// Registers the usual metrics for a queue or topic on `instance`.
pub fn report_object(cloud: &MemoryCloud, instance: &str, kind: &str, object: &str) {
    for metric in ["EnqueueCount", "DequeueCount", "ConsumerCount"] {
        cloud
            .metrics
            .add(MQ_NAMESPACE, object_metric(metric, instance, kind, object));
    }
}

/// Active/standby broker `B` in us-east-1 whose instances both report queue
/// `Q.1` and topic `Advisory.T`.
pub fn active_standby_cloud() -> MemoryCloud {
    let cloud = MemoryCloud::default();
    cloud.directory.set(vec![Broker::new(
        "B",
        "us-east-1",
        DeploymentMode::ActiveStandby,
    )]);

    for instance in ["B-1", "B-2"] {
        cloud.metrics.add(MQ_NAMESPACE, broker_metric("HeapUsage", instance));
        report_object(&cloud, instance, "Queue", "Q.1");
        report_object(&cloud, instance, "Topic", "Advisory.T");
    }
    cloud
}

/// Single-instance broker `S` in eu-west-1 with queue `orders.in` and topic
/// `prices`.
pub fn single_instance_cloud() -> MemoryCloud {
    let cloud = MemoryCloud::default();
    cloud.directory.set(vec![Broker::new(
        "S",
        "eu-west-1",
        DeploymentMode::SingleInstance,
    )]);

    report_object(&cloud, "S-1", "Queue", "orders.in");
    report_object(&cloud, "S-1", "Topic", "prices");
    cloud
}

pub fn dashboard_json(cloud: &MemoryCloud, name: &str) -> serde_json::Value {
    let body = cloud
        .dashboards
        .get(name)
        .unwrap_or_else(|| panic!("dashboard {name} was not published"));
    serde_json::from_str(&body).unwrap()
}
