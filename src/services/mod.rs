//! External collaborators of a provisioning run
//!
//! Every service the runs talk to sits behind a trait so the pipeline can be
//! driven against AWS or against in-memory fakes.
//!
//! ## Backends
//!
//! - **AWS**: Amazon MQ, CloudWatch, Systems Manager and SNS SDK clients
//! - **In-Memory**: no remote state, used by the test-suite and dry runs
//!
//! ## Usage
//!
//! ```no_run
//! use mq_dashboards::services::{Services, aws::AwsServices};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let services: Services = AwsServices::load(None).await.into();
//!     // Hand to one of the runs in `runner`
//!     Ok(())
//! }
//! ```

pub mod aws;
pub mod backend;
pub mod memory;

use std::sync::Arc;

pub use backend::{
    AlarmService, BrokerDirectory, DashboardStore, Dimension, MetricDescriptor, MetricPage,
    MetricQuery, MetricsCatalog, NotificationService, ParameterStore, Subscription,
};

/// The full set of collaborators a run needs.
#[derive(Clone)]
pub struct Services {
    pub directory: Arc<dyn BrokerDirectory>,
    pub metrics: Arc<dyn MetricsCatalog>,
    pub dashboards: Arc<dyn DashboardStore>,
    pub alarms: Arc<dyn AlarmService>,
    pub parameters: Arc<dyn ParameterStore>,
    pub notifications: Arc<dyn NotificationService>,
}
