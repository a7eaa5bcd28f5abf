use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::{trace, warn};

use crate::services::ParameterStore;

/// Run configuration, read once per invocation.
///
/// Every option is backed by an environment variable so scheduled runs can be
/// configured without arguments.
#[derive(Debug, Clone, Parser)]
#[command(version)]
pub struct Settings {
    /// Region the AWS clients talk to (SDK default chain if unset)
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Customer name shown on the fleet overview dashboard
    #[arg(long, env = "CUSTOMER_NAME", default_value = "Customer")]
    pub customer_name: String,

    /// Notification topic alarms publish to
    #[arg(long, env = "SNS_TOPIC_ARN")]
    pub topic_arn: String,

    /// Keep topics whose name contains "Advisory"
    #[arg(long, env = "INCLUDE_ADVISORY_TOPICS", default_value_t = false, action = ArgAction::Set, value_parser = parse_flag)]
    pub include_advisory: bool,

    /// Alarm provisioning when the parameter store has no override
    #[arg(long, env = "ALARMS_ENABLED", default_value_t = false, action = ArgAction::Set, value_parser = parse_flag)]
    pub alarms_enabled: bool,

    /// Alarm e-mail address when the parameter store has no override
    #[arg(long, env = "ALARM_EMAIL")]
    pub alarm_email: Option<String>,

    #[arg(
        long,
        env = "ALARMS_ENABLED_PARAMETER",
        default_value = "/mq-dashboards/alarms-enabled"
    )]
    pub alarms_enabled_parameter: String,

    #[arg(
        long,
        env = "ALARM_EMAIL_PARAMETER",
        default_value = "/mq-dashboards/alarm-email"
    )]
    pub alarm_email_parameter: String,

    /// Directory with dashboard template overrides
    #[arg(long, env = "TEMPLATE_DIR")]
    pub template_dir: Option<PathBuf>,
}

impl Settings {
    pub fn new(topic_arn: impl ToString) -> Settings {
        Settings {
            region: None,
            customer_name: "Customer".to_string(),
            topic_arn: topic_arn.to_string(),
            include_advisory: false,
            alarms_enabled: false,
            alarm_email: None,
            alarms_enabled_parameter: "/mq-dashboards/alarms-enabled".to_string(),
            alarm_email_parameter: "/mq-dashboards/alarm-email".to_string(),
            template_dir: None,
        }
    }
}

/// Lenient boolean used for environment and parameter store flags.
pub fn parse_flag(value: &str) -> Result<bool, String> {
    Ok(matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "on" | "1" | "enabled"
    ))
}

/// Reads `name` from the parameter store, falling back to `default` on any
/// failure. The kind of failure does not matter.
pub async fn resolve_parameter(
    store: &dyn ParameterStore,
    name: &str,
    default: Option<String>,
) -> Option<String> {
    match store.get_parameter(name).await {
        Ok(value) => {
            trace!("parameter {name} resolved to {value:?}");
            Some(value)
        }
        Err(e) => {
            warn!("{e}; using configured default");
            default
        }
    }
}
