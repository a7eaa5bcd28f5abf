pub mod alarms;
pub mod config;
pub mod dashboard;
pub mod discovery;
pub mod error;
pub mod notifications;
pub mod publish;
pub mod runner;
pub mod services;
pub mod util;

use serde::{Deserialize, Serialize};

pub use error::{Error, Result};

/// CloudWatch namespace every Amazon MQ metric is reported under.
pub const MQ_NAMESPACE: &str = "AWS/AmazonMQ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentMode {
    SingleInstance,
    ActiveStandby,
    Cluster,
}

impl DeploymentMode {
    /// Maps the broker directory's wire value. Anything unknown is treated as a
    /// multi-instance deployment so both instances still get dashboards.
    pub fn from_wire(value: &str) -> DeploymentMode {
        match value {
            "SINGLE_INSTANCE" => DeploymentMode::SingleInstance,
            "CLUSTER_MULTI_AZ" => DeploymentMode::Cluster,
            _ => DeploymentMode::ActiveStandby,
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, DeploymentMode::SingleInstance)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broker {
    pub name: String,
    pub region: String,
    pub deployment_mode: DeploymentMode,
}

impl Broker {
    pub fn new(
        name: impl ToString,
        region: impl ToString,
        deployment_mode: DeploymentMode,
    ) -> Broker {
        Broker {
            name: name.to_string(),
            region: region.to_string(),
            deployment_mode,
        }
    }

    /// Addressable instances of this broker: `name-1` for single instance
    /// brokers, `name-1` and `name-2` for everything else.
    pub fn instances(&self) -> Vec<BrokerInstance> {
        let count = if self.deployment_mode.is_single() { 1 } else { 2 };
        (1..=count)
            .map(|index| BrokerInstance {
                broker: self.name.clone(),
                name: format!("{}-{index}", self.name),
                region: self.region.clone(),
            })
            .collect()
    }
}

/// One addressable member of a broker deployment. The metrics service reports
/// the instance name in its `Broker` dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrokerInstance {
    pub broker: String,
    pub name: String,
    pub region: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    Queue,
    Topic,
}

impl ObjectKind {
    /// Dimension key the metrics service uses for this kind of object.
    pub fn dimension(&self) -> &'static str {
        match self {
            ObjectKind::Queue => "Queue",
            ObjectKind::Topic => "Topic",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dimension())
    }
}

/// A queue or topic owned by a broker instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonitoredObject {
    pub kind: ObjectKind,
    pub name: String,
    pub instance: BrokerInstance,

    /// Set for a topic sharing its name with a queue on the same instance;
    /// its names then carry the kind.
    #[serde(default)]
    pub qualified: bool,
}

impl MonitoredObject {
    pub fn dashboard_name(&self) -> String {
        if self.qualified {
            util::qualified_object_dashboard_name(
                self.kind.dimension(),
                &self.name,
                &self.instance.name,
            )
        } else {
            util::object_dashboard_name(&self.name, &self.instance.name)
        }
    }
}
