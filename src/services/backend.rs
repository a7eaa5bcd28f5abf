//! Collaborator trait definitions
//!
//! These traits are thin: each method maps to one request against the
//! upstream service. Paging through metric listings is left to the caller so
//! discovery can follow continuation tokens itself.

use async_trait::async_trait;

use crate::Broker;
use crate::alarms::AlarmDefinition;
use crate::error::Result;

/// Metric listing filter: one namespace, one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    pub namespace: String,
    pub dimension_name: String,
    pub dimension_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl ToString, value: impl ToString) -> Dimension {
        Dimension {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// A metric as returned by a listing: its name and dimension set, no values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Clone, Default)]
pub struct MetricPage {
    pub metrics: Vec<MetricDescriptor>,

    /// Set when more results are available
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub arn: String,
    pub protocol: String,
    pub endpoint: String,
}

impl Subscription {
    /// Subscriptions awaiting confirmation have no real ARN and cannot be
    /// removed.
    pub fn is_pending(&self) -> bool {
        self.arn == "PendingConfirmation"
    }
}

/// Lists the managed brokers in the account.
#[async_trait]
pub trait BrokerDirectory: Send + Sync {
    /// Returns every broker, across all result pages.
    async fn list_brokers(&self) -> Result<Vec<Broker>>;
}

/// Enumerates metrics (not their values).
#[async_trait]
pub trait MetricsCatalog: Send + Sync {
    /// Fetches one page of metrics matching `query`, starting at `next_token`.
    async fn list_metrics(
        &self,
        query: &MetricQuery,
        next_token: Option<String>,
    ) -> Result<MetricPage>;
}

/// Stores dashboard documents by name.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    /// Creates or overwrites the dashboard `name`.
    async fn put_dashboard(&self, name: &str, body: String) -> Result<()>;
}

#[async_trait]
pub trait AlarmService: Send + Sync {
    /// Creates or overwrites the alarm named by `alarm.name`.
    async fn put_alarm(&self, alarm: &AlarmDefinition) -> Result<()>;

    /// Deletes an alarm. Deleting an alarm that does not exist is not an error.
    async fn delete_alarm(&self, name: &str) -> Result<()>;
}

#[async_trait]
pub trait ParameterStore: Send + Sync {
    async fn get_parameter(&self, name: &str) -> Result<String>;
}

/// Manages e-mail subscriptions on a notification topic.
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Returns every subscription of `topic`, across all result pages.
    async fn list_subscriptions(&self, topic: &str) -> Result<Vec<Subscription>>;

    async fn subscribe(&self, topic: &str, protocol: &str, endpoint: &str) -> Result<()>;

    async fn unsubscribe(&self, subscription_arn: &str) -> Result<()>;
}
