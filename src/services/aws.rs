//! AWS-backed collaborators
//!
//! One struct holds the four SDK clients and implements every collaborator
//! trait. Listings that the upstream APIs paginate are drained here, except
//! for metric listings whose paging is driven by discovery.

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_cloudwatch::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_cloudwatch::types as cw;
use tracing::{debug, instrument, trace};

use super::Services;
use super::backend::{
    AlarmService, BrokerDirectory, DashboardStore, Dimension, MetricDescriptor, MetricPage,
    MetricQuery, MetricsCatalog, NotificationService, ParameterStore, Subscription,
};
use crate::alarms::{AlarmDefinition, ComparisonOperator, Statistic, Unit};
use crate::error::{Error, Result};
use crate::util::region_from_arn;
use crate::{Broker, DeploymentMode};

const BROKER_PAGE_SIZE: i32 = 100;

/// Error code CloudWatch answers with when deleting an unknown alarm.
const ALARM_NOT_FOUND: &str = "ResourceNotFound";

#[derive(Debug, Clone)]
pub struct AwsServices {
    mq: aws_sdk_mq::Client,
    cloudwatch: aws_sdk_cloudwatch::Client,
    ssm: aws_sdk_ssm::Client,
    sns: aws_sdk_sns::Client,
}

impl AwsServices {
    /// Loads credentials and region from the default provider chain,
    /// overriding the region when one is given.
    pub async fn load(region: Option<String>) -> AwsServices {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;
        trace!("loaded AWS config for region {:?}", config.region());

        Self::from_config(&config)
    }

    pub fn from_config(config: &SdkConfig) -> AwsServices {
        AwsServices {
            mq: aws_sdk_mq::Client::new(config),
            cloudwatch: aws_sdk_cloudwatch::Client::new(config),
            ssm: aws_sdk_ssm::Client::new(config),
            sns: aws_sdk_sns::Client::new(config),
        }
    }
}

impl From<AwsServices> for Services {
    fn from(aws: AwsServices) -> Self {
        let shared = Arc::new(aws);
        Services {
            directory: shared.clone(),
            metrics: shared.clone(),
            dashboards: shared.clone(),
            alarms: shared.clone(),
            parameters: shared.clone(),
            notifications: shared,
        }
    }
}

fn describe<E>(err: &E) -> String
where
    E: std::error::Error,
{
    DisplayErrorContext(err).to_string()
}

fn comparison(operator: ComparisonOperator) -> cw::ComparisonOperator {
    match operator {
        ComparisonOperator::GreaterThanThreshold => cw::ComparisonOperator::GreaterThanThreshold,
        ComparisonOperator::LessThanOrEqualToThreshold => {
            cw::ComparisonOperator::LessThanOrEqualToThreshold
        }
    }
}

fn statistic(statistic: Statistic) -> cw::Statistic {
    match statistic {
        Statistic::Average => cw::Statistic::Average,
        Statistic::SampleCount => cw::Statistic::SampleCount,
    }
}

fn unit(unit: Unit) -> cw::StandardUnit {
    match unit {
        Unit::Percent => cw::StandardUnit::Percent,
        Unit::Count => cw::StandardUnit::Count,
    }
}

#[async_trait]
impl BrokerDirectory for AwsServices {
    #[instrument(skip(self))]
    async fn list_brokers(&self) -> Result<Vec<Broker>> {
        let mut brokers = Vec::new();
        let mut next_token = None;

        loop {
            let output = self
                .mq
                .list_brokers()
                .max_results(BROKER_PAGE_SIZE)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| Error::Directory(describe(&e)))?;

            for summary in output.broker_summaries() {
                let Some(name) = summary.broker_name() else {
                    continue;
                };
                let region = summary
                    .broker_arn()
                    .and_then(region_from_arn)
                    .unwrap_or_default();
                // required in newer models, optional in older ones
                let mode: Option<&aws_sdk_mq::types::DeploymentMode> =
                    summary.deployment_mode().into();
                let mode = mode
                    .map(|m| DeploymentMode::from_wire(m.as_str()))
                    .unwrap_or(DeploymentMode::SingleInstance);

                brokers.push(Broker::new(name, region, mode));
            }

            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        debug!("broker directory returned {} brokers", brokers.len());
        Ok(brokers)
    }
}

#[async_trait]
impl MetricsCatalog for AwsServices {
    async fn list_metrics(
        &self,
        query: &MetricQuery,
        next_token: Option<String>,
    ) -> Result<MetricPage> {
        let filter = cw::DimensionFilter::builder()
            .name(&query.dimension_name)
            .value(&query.dimension_value)
            .build()
            .map_err(|e| Error::Metrics(e.to_string()))?;

        let output = self
            .cloudwatch
            .list_metrics()
            .namespace(&query.namespace)
            .dimensions(filter)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| Error::Metrics(describe(&e)))?;

        let metrics = output
            .metrics()
            .iter()
            .map(|metric| MetricDescriptor {
                metric_name: metric.metric_name().unwrap_or_default().to_string(),
                dimensions: metric
                    .dimensions()
                    .iter()
                    .map(|d| {
                        let name: Option<&str> = d.name().into();
                        let value: Option<&str> = d.value().into();
                        Dimension::new(name.unwrap_or_default(), value.unwrap_or_default())
                    })
                    .collect(),
            })
            .collect();

        Ok(MetricPage {
            metrics,
            next_token: output.next_token().map(str::to_string),
        })
    }
}

#[async_trait]
impl DashboardStore for AwsServices {
    async fn put_dashboard(&self, name: &str, body: String) -> Result<()> {
        let output = self
            .cloudwatch
            .put_dashboard()
            .dashboard_name(name)
            .dashboard_body(body)
            .send()
            .await
            .map_err(|e| Error::Dashboard {
                name: name.to_string(),
                message: describe(&e),
            })?;

        for message in output.dashboard_validation_messages() {
            debug!(
                "dashboard {name}: validation message {:?}",
                message.message()
            );
        }
        Ok(())
    }
}

#[async_trait]
impl AlarmService for AwsServices {
    async fn put_alarm(&self, alarm: &AlarmDefinition) -> Result<()> {
        let alarm_error = |message: String| Error::Alarm {
            name: alarm.name.clone(),
            message,
        };

        let dimensions = alarm
            .dimensions
            .iter()
            .map(|d| {
                cw::Dimension::builder()
                    .name(&d.name)
                    .value(&d.value)
                    .build()
                    .map_err(|e| alarm_error(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        self.cloudwatch
            .put_metric_alarm()
            .alarm_name(&alarm.name)
            .alarm_description(&alarm.description)
            .actions_enabled(true)
            .set_alarm_actions(Some(alarm.actions.clone()))
            .set_ok_actions(Some(alarm.actions.clone()))
            .namespace(&alarm.namespace)
            .metric_name(&alarm.metric_name)
            .set_dimensions(Some(dimensions))
            .statistic(statistic(alarm.statistic))
            .period(alarm.period_seconds)
            .evaluation_periods(alarm.evaluation_periods)
            .threshold(alarm.threshold)
            .comparison_operator(comparison(alarm.comparison))
            .unit(unit(alarm.unit))
            .send()
            .await
            .map_err(|e| alarm_error(describe(&e)))?;

        Ok(())
    }

    async fn delete_alarm(&self, name: &str) -> Result<()> {
        match self.cloudwatch.delete_alarms().alarm_names(name).send().await {
            Ok(_) => Ok(()),
            Err(e) if e.code() == Some(ALARM_NOT_FOUND) => {
                trace!("alarm {name} was already absent");
                Ok(())
            }
            Err(e) => Err(Error::Alarm {
                name: name.to_string(),
                message: describe(&e),
            }),
        }
    }
}

#[async_trait]
impl ParameterStore for AwsServices {
    async fn get_parameter(&self, name: &str) -> Result<String> {
        let parameter_error = |message: String| Error::Parameter {
            name: name.to_string(),
            message,
        };

        let output = self
            .ssm
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| parameter_error(describe(&e)))?;

        output
            .parameter()
            .and_then(|parameter| parameter.value())
            .map(str::to_string)
            .ok_or_else(|| parameter_error("parameter has no value".to_string()))
    }
}

#[async_trait]
impl NotificationService for AwsServices {
    async fn list_subscriptions(&self, topic: &str) -> Result<Vec<Subscription>> {
        let mut subscriptions = Vec::new();
        let mut next_token = None;

        loop {
            let output = self
                .sns
                .list_subscriptions_by_topic()
                .topic_arn(topic)
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|e| Error::Notification(describe(&e)))?;

            subscriptions.extend(output.subscriptions().iter().map(|s| Subscription {
                arn: s.subscription_arn().unwrap_or_default().to_string(),
                protocol: s.protocol().unwrap_or_default().to_string(),
                endpoint: s.endpoint().unwrap_or_default().to_string(),
            }));

            next_token = output.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        Ok(subscriptions)
    }

    async fn subscribe(&self, topic: &str, protocol: &str, endpoint: &str) -> Result<()> {
        self.sns
            .subscribe()
            .topic_arn(topic)
            .protocol(protocol)
            .endpoint(endpoint)
            .send()
            .await
            .map_err(|e| Error::Notification(describe(&e)))?;
        Ok(())
    }

    async fn unsubscribe(&self, subscription_arn: &str) -> Result<()> {
        self.sns
            .unsubscribe()
            .subscription_arn(subscription_arn)
            .send()
            .await
            .map_err(|e| Error::Notification(describe(&e)))?;
        Ok(())
    }
}
