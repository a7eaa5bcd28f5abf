//! Name derivation for dashboards and alarms
//!
//! Dashboard names may only contain alphanumerics, dashes and underscores,
//! while queue and topic names use dots for namespacing. Names are made unique
//! across the account by suffixing the owning broker instance.

const CONSOLE_URL: &str = "https://console.aws.amazon.com/cloudwatch/home";

/// Name of the fleet overview dashboard.
pub const OVERVIEW_DASHBOARD_NAME: &str = "AmazonMQ";

/// Replaces every `.` with `-`, leaving all other characters as they are.
pub fn dashboard_safe(name: &str) -> String {
    name.replace('.', "-")
}

pub fn broker_dashboard_name(instance: &str) -> String {
    dashboard_safe(instance)
}

pub fn object_dashboard_name(object: &str, instance: &str) -> String {
    format!("{}-{}", dashboard_safe(object), dashboard_safe(instance))
}

/// Dashboard name for an object whose plain name is taken by an object of
/// another kind on the same instance.
pub fn qualified_object_dashboard_name(kind: &str, object: &str, instance: &str) -> String {
    format!("{}-{kind}-{}", dashboard_safe(object), dashboard_safe(instance))
}

pub fn broker_alarm_name(metric: &str, instance: &str) -> String {
    format!("{metric}-{}", dashboard_safe(instance))
}

/// Alarm names follow the dashboard name of the object they watch.
pub fn object_alarm_name(alarm: &str, dashboard: &str) -> String {
    format!("{alarm}-{dashboard}")
}

pub fn dashboard_url(region: &str, dashboard: &str) -> String {
    format!("{CONSOLE_URL}?region={region}#dashboards:name={dashboard}")
}

/// Markdown link to a dashboard in the CloudWatch console.
pub fn dashboard_link(label: &str, region: &str, dashboard: &str) -> String {
    format!("[{label}]({})", dashboard_url(region, dashboard))
}

/// Region of a resource, taken from the fourth field of its ARN.
pub fn region_from_arn(arn: &str) -> Option<&str> {
    arn.split(':').nth(3).filter(|region| !region.is_empty())
}
