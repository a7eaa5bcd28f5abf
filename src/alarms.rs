//! Threshold alarms for brokers and their objects
//!
//! Alarms are stateless toggles. Each run computes the fixed alarm set for
//! everything it discovered and either upserts every definition or deletes
//! every name:
//!
//! ```text
//! AlarmMode::Enabled   → put_alarm(definition)   (overwrites by name)
//! AlarmMode::Disabled  → delete_alarm(name)      (absent alarms are fine)
//! ```

use tracing::{debug, info, instrument};

use crate::config::{parse_flag, resolve_parameter};
use crate::error::Result;
use crate::services::{AlarmService, Dimension, ParameterStore};
use crate::util::{broker_alarm_name, object_alarm_name};
use crate::{BrokerInstance, MQ_NAMESPACE, MonitoredObject};

/// Broker metrics alarmed on, with a readable label for descriptions.
pub const BROKER_ALARM_METRICS: [(&str, &str); 3] = [
    ("HeapUsage", "heap usage"),
    ("StorePercentUsage", "store usage"),
    ("CpuUtilization", "CPU utilization"),
];

const USAGE_THRESHOLD_PERCENT: f64 = 70.0;
const USAGE_EVALUATION_PERIODS: i32 = 5;

const CONSUMER_METRIC: &str = "ConsumerCount";
const ZERO_CONSUMER_ALARM: &str = "ZeroConsumers";
const CONSUMER_EVALUATION_PERIODS: i32 = 2;

const PERIOD_SECONDS: i32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmMode {
    Enabled,
    Disabled,
}

impl AlarmMode {
    /// Reads the toggle from the parameter store, using `default` when the
    /// parameter cannot be read.
    pub async fn resolve(store: &dyn ParameterStore, parameter: &str, default: bool) -> AlarmMode {
        let value = resolve_parameter(store, parameter, Some(default.to_string())).await;
        let enabled = value
            .as_deref()
            .map(|v| parse_flag(v).unwrap_or(default))
            .unwrap_or(default);

        let mode = if enabled {
            AlarmMode::Enabled
        } else {
            AlarmMode::Disabled
        };
        debug!("alarm provisioning is {mode:?}");
        mode
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    GreaterThanThreshold,
    LessThanOrEqualToThreshold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statistic {
    Average,
    SampleCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Percent,
    Count,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlarmDefinition {
    pub name: String,
    pub description: String,
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
    pub statistic: Statistic,
    pub period_seconds: i32,
    pub evaluation_periods: i32,
    pub threshold: f64,
    pub comparison: ComparisonOperator,
    pub unit: Unit,

    /// Notified on both ALARM and OK transitions
    pub actions: Vec<String>,
}

/// Heap, store and CPU usage alarms for one broker instance.
pub fn broker_alarms(instance: &BrokerInstance, topic_arn: &str) -> Vec<AlarmDefinition> {
    BROKER_ALARM_METRICS
        .iter()
        .map(|(metric, label)| AlarmDefinition {
            name: broker_alarm_name(metric, &instance.name),
            description: format!(
                "{label} of broker {} above {USAGE_THRESHOLD_PERCENT}%",
                instance.name
            ),
            namespace: MQ_NAMESPACE.to_string(),
            metric_name: metric.to_string(),
            dimensions: vec![Dimension::new("Broker", &instance.name)],
            statistic: Statistic::Average,
            period_seconds: PERIOD_SECONDS,
            evaluation_periods: USAGE_EVALUATION_PERIODS,
            threshold: USAGE_THRESHOLD_PERCENT,
            comparison: ComparisonOperator::GreaterThanThreshold,
            unit: Unit::Percent,
            actions: vec![topic_arn.to_string()],
        })
        .collect()
}

/// Zero-consumer alarm for one queue or topic.
pub fn object_alarms(object: &MonitoredObject, topic_arn: &str) -> Vec<AlarmDefinition> {
    vec![AlarmDefinition {
        name: object_alarm_name(ZERO_CONSUMER_ALARM, &object.dashboard_name()),
        description: format!(
            "{} {} on broker {} has no consumers",
            object.kind, object.name, object.instance.name
        ),
        namespace: MQ_NAMESPACE.to_string(),
        metric_name: CONSUMER_METRIC.to_string(),
        dimensions: vec![
            Dimension::new("Broker", &object.instance.name),
            Dimension::new(object.kind.dimension(), &object.name),
        ],
        statistic: Statistic::SampleCount,
        period_seconds: PERIOD_SECONDS,
        evaluation_periods: CONSUMER_EVALUATION_PERIODS,
        threshold: 0.0,
        comparison: ComparisonOperator::LessThanOrEqualToThreshold,
        unit: Unit::Count,
        actions: vec![topic_arn.to_string()],
    }]
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlarmChanges {
    pub upserted: usize,
    pub deleted: usize,
}

impl std::ops::AddAssign for AlarmChanges {
    fn add_assign(&mut self, other: AlarmChanges) {
        self.upserted += other.upserted;
        self.deleted += other.deleted;
    }
}

/// Applies the run's [`AlarmMode`] to alarm definitions.
pub struct AlarmToggler<'a> {
    service: &'a dyn AlarmService,
    mode: AlarmMode,
}

impl<'a> AlarmToggler<'a> {
    pub fn new(service: &'a dyn AlarmService, mode: AlarmMode) -> Self {
        Self { service, mode }
    }

    #[instrument(skip_all, fields(mode = ?self.mode))]
    pub async fn apply(&self, alarms: &[AlarmDefinition]) -> Result<AlarmChanges> {
        let mut changes = AlarmChanges::default();
        for alarm in alarms {
            match self.mode {
                AlarmMode::Enabled => {
                    self.service.put_alarm(alarm).await?;
                    info!("asserted alarm {}", alarm.name);
                    changes.upserted += 1;
                }
                AlarmMode::Disabled => {
                    self.service.delete_alarm(&alarm.name).await?;
                    debug!("removed alarm {}", alarm.name);
                    changes.deleted += 1;
                }
            }
        }
        Ok(changes)
    }
}
