//! Broker and object discovery
//!
//! Amazon MQ has no API that lists queues or topics, so they are discovered
//! from the metrics service: every metric reported for a broker instance
//! carries a `Queue` or `Topic` dimension naming the object it measures.

use std::collections::BTreeSet;

use tracing::{debug, instrument, trace};

use crate::error::Result;
use crate::services::{BrokerDirectory, MetricQuery, MetricsCatalog};
use crate::{Broker, BrokerInstance, MQ_NAMESPACE, MonitoredObject, ObjectKind};

/// Topics whose name contains this are broker-internal diagnostics.
pub const ADVISORY_MARKER: &str = "Advisory";

/// Queues and topics of one broker instance, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectInventory {
    pub queues: BTreeSet<String>,
    pub topics: BTreeSet<String>,
}

impl ObjectInventory {
    pub fn is_empty(&self) -> bool {
        self.queues.is_empty() && self.topics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queues.len() + self.topics.len()
    }

    /// Queues first, then topics, each bound to `instance`. A topic named
    /// like one of the queues is qualified so their names stay distinct.
    pub fn objects(&self, instance: &BrokerInstance) -> Vec<MonitoredObject> {
        let bind = |kind: ObjectKind| {
            move |name: &String| MonitoredObject {
                kind,
                name: name.clone(),
                instance: instance.clone(),
                qualified: kind == ObjectKind::Topic && self.queues.contains(name),
            }
        };

        self.queues
            .iter()
            .map(bind(ObjectKind::Queue))
            .chain(self.topics.iter().map(bind(ObjectKind::Topic)))
            .collect()
    }

    /// Drops advisory topics unless `include_advisory` is set.
    pub fn filter_advisory(mut self, include_advisory: bool) -> ObjectInventory {
        if !include_advisory {
            self.topics.retain(|topic| !topic.contains(ADVISORY_MARKER));
        }
        self
    }
}

#[instrument(skip_all)]
pub async fn list_brokers(directory: &dyn BrokerDirectory) -> Result<Vec<Broker>> {
    let brokers = directory.list_brokers().await?;
    debug!("discovered {} brokers", brokers.len());
    Ok(brokers)
}

/// Collects the queues and topics reported for `instance`, following the
/// metric listing's continuation tokens until it is exhausted.
#[instrument(skip(metrics, instance), fields(instance = %instance.name))]
pub async fn discover_objects(
    metrics: &dyn MetricsCatalog,
    instance: &BrokerInstance,
    include_advisory: bool,
) -> Result<ObjectInventory> {
    let query = MetricQuery {
        namespace: MQ_NAMESPACE.to_string(),
        dimension_name: "Broker".to_string(),
        dimension_value: instance.name.clone(),
    };

    let mut inventory = ObjectInventory::default();
    let mut next_token = None;
    let mut pages = 0;

    loop {
        let page = metrics.list_metrics(&query, next_token).await?;
        pages += 1;

        for metric in &page.metrics {
            for dimension in &metric.dimensions {
                if dimension.name == ObjectKind::Queue.dimension() {
                    inventory.queues.insert(dimension.value.clone());
                } else if dimension.name == ObjectKind::Topic.dimension() {
                    inventory.topics.insert(dimension.value.clone());
                }
            }
        }

        next_token = page.next_token;
        if next_token.is_none() {
            break;
        }
        trace!("metric listing continues after page {pages}");
    }

    let inventory = inventory.filter_advisory(include_advisory);
    debug!(
        "{}: {} queues, {} topics over {pages} pages",
        instance.name,
        inventory.queues.len(),
        inventory.topics.len()
    );
    Ok(inventory)
}
