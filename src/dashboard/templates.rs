//! Dashboard templates
//!
//! Templates are immutable for the duration of a run. Each one pairs a
//! dashboard skeleton with the positions, inside a metric row, of the
//! dimension values the composer overwrites.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, trace};

use super::Dashboard;
use crate::error::{Error, Result};

const BROKER_TEMPLATE: &str = include_str!("../../templates/broker.json");
const OVERVIEW_TEMPLATE: &str = include_str!("../../templates/overview.json");
const QUEUE_TEMPLATE: &str = include_str!("../../templates/queue.json");
const TOPIC_TEMPLATE: &str = include_str!("../../templates/topic.json");

/// Index of dimension values within a metric row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Slots {
    pub broker: usize,
    #[serde(default)]
    pub object: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardTemplate {
    /// Template kind, used in error messages
    pub kind: String,
    pub slots: Slots,
    dashboard: Dashboard,
}

#[derive(Deserialize)]
struct TemplateFile {
    slots: Slots,
    dashboard: Dashboard,
}

impl DashboardTemplate {
    pub fn parse(kind: &str, content: &str) -> Result<DashboardTemplate> {
        let TemplateFile { slots, dashboard } = serde_json::from_str(content)
            .map_err(|e| Error::template(kind, format!("invalid template: {e}")))?;
        trace!("parsed {kind} template with {} widgets", dashboard.widgets.len());

        Ok(DashboardTemplate {
            kind: kind.to_string(),
            slots,
            dashboard,
        })
    }

    /// A fresh copy of the skeleton; the template itself is never handed out
    /// mutably.
    pub fn instantiate(&self) -> Dashboard {
        self.dashboard.clone()
    }

    pub fn skeleton(&self) -> &Dashboard {
        &self.dashboard
    }
}

/// Every template a run may need.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardTemplates {
    pub broker: DashboardTemplate,
    pub overview: DashboardTemplate,
    pub queue: DashboardTemplate,
    pub topic: DashboardTemplate,
}

impl DashboardTemplates {
    /// Templates compiled into the binary.
    pub fn embedded() -> Result<DashboardTemplates> {
        Ok(DashboardTemplates {
            broker: DashboardTemplate::parse("broker", BROKER_TEMPLATE)?,
            overview: DashboardTemplate::parse("overview", OVERVIEW_TEMPLATE)?,
            queue: DashboardTemplate::parse("queue", QUEUE_TEMPLATE)?,
            topic: DashboardTemplate::parse("topic", TOPIC_TEMPLATE)?,
        })
    }

    /// Embedded templates, with `<kind>.json` files from `dir` taking
    /// precedence where they exist.
    pub fn load(dir: Option<&Path>) -> Result<DashboardTemplates> {
        let Some(dir) = dir else {
            return Self::embedded();
        };

        let load = |kind: &str, embedded: &str| -> Result<DashboardTemplate> {
            let path = dir.join(format!("{kind}.json"));
            if path.is_file() {
                debug!("loading {kind} template from {}", path.display());
                let content = std::fs::read_to_string(&path)?;
                DashboardTemplate::parse(kind, &content)
            } else {
                DashboardTemplate::parse(kind, embedded)
            }
        };

        Ok(DashboardTemplates {
            broker: load("broker", BROKER_TEMPLATE)?,
            overview: load("overview", OVERVIEW_TEMPLATE)?,
            queue: load("queue", QUEUE_TEMPLATE)?,
            topic: load("topic", TOPIC_TEMPLATE)?,
        })
    }

    pub fn for_object(&self, kind: crate::ObjectKind) -> &DashboardTemplate {
        match kind {
            crate::ObjectKind::Queue => &self.queue,
            crate::ObjectKind::Topic => &self.topic,
        }
    }
}
