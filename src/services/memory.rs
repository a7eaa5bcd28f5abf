//! In-memory collaborators (no remote state)
//!
//! These hold everything in process memory behind mutexes. They are useful
//! for:
//! - Testing the runs without AWS credentials
//! - Inspecting exactly which documents and alarms a run would write
//!
//! ## Limitations
//!
//! - **No persistence**: all state is dropped with the value
//! - **Simplified semantics**: new e-mail subscriptions stay pending until
//!   [`MemoryNotificationService::confirm_all`] is called

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use super::Services;
use super::backend::{
    AlarmService, BrokerDirectory, DashboardStore, MetricDescriptor, MetricPage, MetricQuery,
    MetricsCatalog, NotificationService, ParameterStore, Subscription,
};
use crate::Broker;
use crate::alarms::AlarmDefinition;
use crate::error::{Error, Result};

const PENDING_CONFIRMATION: &str = "PendingConfirmation";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
pub struct MemoryBrokerDirectory {
    brokers: Mutex<Vec<Broker>>,
}

impl MemoryBrokerDirectory {
    pub fn set(&self, brokers: Vec<Broker>) {
        *lock(&self.brokers) = brokers;
    }
}

#[async_trait]
impl BrokerDirectory for MemoryBrokerDirectory {
    async fn list_brokers(&self) -> Result<Vec<Broker>> {
        Ok(lock(&self.brokers).clone())
    }
}

/// Metric listing with configurable page size; continuation tokens are
/// offsets into the filtered listing.
#[derive(Debug)]
pub struct MemoryMetricsCatalog {
    metrics: Mutex<Vec<(String, MetricDescriptor)>>,
    page_size: usize,
    requests: Mutex<usize>,
}

impl Default for MemoryMetricsCatalog {
    fn default() -> Self {
        Self::with_page_size(500)
    }
}

impl MemoryMetricsCatalog {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            metrics: Mutex::new(Vec::new()),
            page_size: page_size.max(1),
            requests: Mutex::new(0),
        }
    }

    pub fn add(&self, namespace: &str, metric: MetricDescriptor) {
        lock(&self.metrics).push((namespace.to_string(), metric));
    }

    /// Number of page requests served so far.
    pub fn requests(&self) -> usize {
        *lock(&self.requests)
    }
}

#[async_trait]
impl MetricsCatalog for MemoryMetricsCatalog {
    async fn list_metrics(
        &self,
        query: &MetricQuery,
        next_token: Option<String>,
    ) -> Result<MetricPage> {
        *lock(&self.requests) += 1;

        let offset = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| Error::Metrics(format!("invalid continuation token {token}")))?,
            None => 0,
        };

        let matching: Vec<MetricDescriptor> = lock(&self.metrics)
            .iter()
            .filter(|(namespace, _)| *namespace == query.namespace)
            .filter(|(_, metric)| {
                metric.dimensions.iter().any(|d| {
                    d.name == query.dimension_name && d.value == query.dimension_value
                })
            })
            .map(|(_, metric)| metric.clone())
            .collect();

        let end = (offset + self.page_size).min(matching.len());
        let metrics = matching.get(offset..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_token = (end < matching.len()).then(|| end.to_string());

        Ok(MetricPage { metrics, next_token })
    }
}

#[derive(Debug, Default)]
pub struct MemoryDashboardStore {
    dashboards: Mutex<BTreeMap<String, String>>,
    writes: Mutex<usize>,
    fail_on: Mutex<Option<String>>,
}

impl MemoryDashboardStore {
    pub fn get(&self, name: &str) -> Option<String> {
        lock(&self.dashboards).get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        lock(&self.dashboards).keys().cloned().collect()
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        lock(&self.dashboards).clone()
    }

    /// Total number of writes, overwrites included.
    pub fn writes(&self) -> usize {
        *lock(&self.writes)
    }

    /// Makes writes to `name` fail.
    pub fn fail_on(&self, name: &str) {
        *lock(&self.fail_on) = Some(name.to_string());
    }
}

#[async_trait]
impl DashboardStore for MemoryDashboardStore {
    async fn put_dashboard(&self, name: &str, body: String) -> Result<()> {
        if lock(&self.fail_on).as_deref() == Some(name) {
            return Err(Error::Dashboard {
                name: name.to_string(),
                message: "rejected by store".to_string(),
            });
        }

        debug!("in-memory store: writing dashboard {name}");
        lock(&self.dashboards).insert(name.to_string(), body);
        *lock(&self.writes) += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryAlarmService {
    alarms: Mutex<BTreeMap<String, AlarmDefinition>>,
    deletes: Mutex<Vec<String>>,
}

impl MemoryAlarmService {
    pub fn get(&self, name: &str) -> Option<AlarmDefinition> {
        lock(&self.alarms).get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        lock(&self.alarms).keys().cloned().collect()
    }

    /// Every delete request received, including those for absent alarms.
    pub fn deletes(&self) -> Vec<String> {
        lock(&self.deletes).clone()
    }
}

#[async_trait]
impl AlarmService for MemoryAlarmService {
    async fn put_alarm(&self, alarm: &AlarmDefinition) -> Result<()> {
        lock(&self.alarms).insert(alarm.name.clone(), alarm.clone());
        Ok(())
    }

    async fn delete_alarm(&self, name: &str) -> Result<()> {
        lock(&self.deletes).push(name.to_string());
        lock(&self.alarms).remove(name);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryParameterStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryParameterStore {
    pub fn set(&self, name: &str, value: &str) {
        lock(&self.values).insert(name.to_string(), value.to_string());
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn get_parameter(&self, name: &str) -> Result<String> {
        lock(&self.values)
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Parameter {
                name: name.to_string(),
                message: "parameter not found".to_string(),
            })
    }
}

#[derive(Debug, Default)]
pub struct MemoryNotificationService {
    subscriptions: Mutex<Vec<(String, Subscription)>>,
    issued: Mutex<usize>,
}

impl MemoryNotificationService {
    /// Adds an already confirmed subscription.
    pub fn add_confirmed(&self, topic: &str, protocol: &str, endpoint: &str) {
        let arn = self.next_arn(topic);
        lock(&self.subscriptions).push((
            topic.to_string(),
            Subscription {
                arn,
                protocol: protocol.to_string(),
                endpoint: endpoint.to_string(),
            },
        ));
    }

    /// Confirms every pending subscription.
    pub fn confirm_all(&self) {
        let mut subscriptions = lock(&self.subscriptions);
        for (topic, subscription) in subscriptions.iter_mut() {
            if subscription.is_pending() {
                subscription.arn = self.next_arn(topic);
            }
        }
    }

    pub fn endpoints(&self, topic: &str) -> Vec<String> {
        lock(&self.subscriptions)
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, s)| s.endpoint.clone())
            .collect()
    }

    fn next_arn(&self, topic: &str) -> String {
        let mut issued = lock(&self.issued);
        *issued += 1;
        format!("{topic}:sub-{}", *issued)
    }
}

#[async_trait]
impl NotificationService for MemoryNotificationService {
    async fn list_subscriptions(&self, topic: &str) -> Result<Vec<Subscription>> {
        Ok(lock(&self.subscriptions)
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn subscribe(&self, topic: &str, protocol: &str, endpoint: &str) -> Result<()> {
        lock(&self.subscriptions).push((
            topic.to_string(),
            Subscription {
                arn: PENDING_CONFIRMATION.to_string(),
                protocol: protocol.to_string(),
                endpoint: endpoint.to_string(),
            },
        ));
        Ok(())
    }

    async fn unsubscribe(&self, subscription_arn: &str) -> Result<()> {
        let mut subscriptions = lock(&self.subscriptions);
        let before = subscriptions.len();
        subscriptions.retain(|(_, s)| s.is_pending() || s.arn != subscription_arn);
        if subscriptions.len() == before {
            return Err(Error::Notification(format!(
                "subscription {subscription_arn} not found"
            )));
        }
        Ok(())
    }
}

/// All in-memory collaborators, kept addressable for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryCloud {
    pub directory: Arc<MemoryBrokerDirectory>,
    pub metrics: Arc<MemoryMetricsCatalog>,
    pub dashboards: Arc<MemoryDashboardStore>,
    pub alarms: Arc<MemoryAlarmService>,
    pub parameters: Arc<MemoryParameterStore>,
    pub notifications: Arc<MemoryNotificationService>,
}

impl MemoryCloud {
    pub fn services(&self) -> Services {
        Services {
            directory: self.directory.clone(),
            metrics: self.metrics.clone(),
            dashboards: self.dashboards.clone(),
            alarms: self.alarms.clone(),
            parameters: self.parameters.clone(),
            notifications: self.notifications.clone(),
        }
    }
}
