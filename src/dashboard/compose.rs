//! Dashboard composition
//!
//! Composition starts from a fresh copy of a template and overwrites the
//! heading markdown, the dimension values of each metric row, the region and
//! widget titles. Positions and all other template fields pass through.

use serde_json::Value;
use tracing::trace;

use super::templates::DashboardTemplate;
use super::{Dashboard, MetricWidget};
use crate::discovery::ObjectInventory;
use crate::error::{Error, Result};
use crate::util::{broker_dashboard_name, dashboard_link};
use crate::{Broker, BrokerInstance, MonitoredObject, ObjectKind};

/// Value in a metric row meaning "same as the row above".
const REPEAT: &str = ".";

const CUSTOMER_PLACEHOLDER: &str = "{customer}";

fn set_dimension(row: &mut [Value], slot: usize, value: &str) -> bool {
    match row.get_mut(slot) {
        Some(Value::String(current)) if current.as_str() != REPEAT => {
            *current = value.to_string();
            true
        }
        _ => false,
    }
}

/// Points a metric widget at `broker` (and `object`) in `region`. The first
/// row must carry explicit dimension values at the slot positions.
fn retarget(
    template: &DashboardTemplate,
    widget: &mut MetricWidget,
    region: &str,
    broker: &str,
    object: Option<&str>,
) -> Result<()> {
    let slots = template.slots;
    let properties = &mut widget.properties;

    for (index, row) in properties.metrics.iter_mut().enumerate() {
        let broker_set = set_dimension(row, slots.broker, broker);
        let object_set = match (slots.object, object) {
            (Some(slot), Some(object)) => set_dimension(row, slot, object),
            _ => true,
        };

        if index == 0 && !(broker_set && object_set) {
            return Err(Error::template(
                &template.kind,
                "first metric row has no dimension value at a slot position",
            ));
        }
    }

    if properties.metrics.is_empty() {
        return Err(Error::template(&template.kind, "metric widget without metrics"));
    }

    properties.region = region.to_string();
    if let Some(title) = properties.title.as_mut() {
        *title = format!("{title} - {}", object.unwrap_or(broker));
    }
    Ok(())
}

fn set_heading(
    template: &DashboardTemplate,
    dashboard: &mut Dashboard,
    markdown: String,
) -> Result<()> {
    let heading = dashboard
        .text_widgets_mut()
        .next()
        .ok_or_else(|| Error::template(&template.kind, "no text widget for the heading"))?;
    heading.properties.markdown = markdown;
    Ok(())
}

fn link_list(title: &str, names: &[(String, String)], region: &str) -> String {
    let mut markdown = format!("\n## {title}\n\n");
    if names.is_empty() {
        markdown.push_str("_none discovered_\n");
    }
    for (label, dashboard) in names {
        markdown.push_str(&format!("* {}\n", dashboard_link(label, region, dashboard)));
    }
    markdown
}

/// Dashboard for one broker instance, linking the dashboards of its queues
/// and topics.
pub fn compose_broker_dashboard(
    template: &DashboardTemplate,
    instance: &BrokerInstance,
    inventory: &ObjectInventory,
) -> Result<Dashboard> {
    let mut dashboard = template.instantiate();

    let objects = inventory.objects(instance);
    let links = |kind: ObjectKind| -> Vec<(String, String)> {
        objects
            .iter()
            .filter(|object| object.kind == kind)
            .map(|object| (object.name.clone(), object.dashboard_name()))
            .collect()
    };

    let mut markdown = format!("\n## Broker metrics for **{}**\n", instance.name);
    markdown.push_str(&link_list("Queues", &links(ObjectKind::Queue), &instance.region));
    markdown.push_str(&link_list("Topics", &links(ObjectKind::Topic), &instance.region));
    set_heading(template, &mut dashboard, markdown)?;

    for widget in dashboard.metric_widgets_mut() {
        retarget(template, widget, &instance.region, &instance.name, None)?;
    }

    trace!("composed broker dashboard for {}", instance.name);
    Ok(dashboard)
}

/// Dashboard for one queue or topic.
pub fn compose_object_dashboard(
    template: &DashboardTemplate,
    object: &MonitoredObject,
) -> Result<Dashboard> {
    let mut dashboard = template.instantiate();
    let instance = &object.instance;

    let markdown = format!(
        "\n## {} metrics for **{}**\n\nBroker: {}\n",
        object.kind,
        object.name,
        dashboard_link(
            &instance.name,
            &instance.region,
            &broker_dashboard_name(&instance.name)
        )
    );
    set_heading(template, &mut dashboard, markdown)?;

    for widget in dashboard.metric_widgets_mut() {
        retarget(
            template,
            widget,
            &instance.region,
            &instance.name,
            Some(&object.name),
        )?;
    }

    trace!("composed dashboard {}", object.dashboard_name());
    Ok(dashboard)
}

fn broker_line(broker: &Broker) -> String {
    let instances = broker.instances();
    let link = |label: &str, instance: &BrokerInstance| {
        dashboard_link(label, &instance.region, &broker_dashboard_name(&instance.name))
    };

    match instances.as_slice() {
        [single] => format!("* {}\n", link(&broker.name, single)),
        [primary, standby, ..] => format!(
            "* {} {} {}\n",
            broker.name,
            link("Primary", primary),
            link("Standby", standby)
        ),
        [] => format!("* {}\n", broker.name),
    }
}

/// Fleet overview: a customer heading and one line per broker linking its
/// instance dashboards. Brokers are listed by name.
pub fn compose_overview_dashboard(
    template: &DashboardTemplate,
    customer: &str,
    brokers: &[Broker],
) -> Result<Dashboard> {
    let mut dashboard = template.instantiate();

    let mut sorted: Vec<&Broker> = brokers.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut broker_list = String::from("\n## Brokers\n\n");
    if sorted.is_empty() {
        broker_list.push_str("_no brokers found_\n");
    }
    for broker in sorted {
        broker_list.push_str(&broker_line(broker));
    }

    let mut texts = dashboard.text_widgets_mut();
    let heading = texts
        .next()
        .ok_or_else(|| Error::template(&template.kind, "no text widget for the heading"))?;
    heading.properties.markdown = heading
        .properties
        .markdown
        .replace(CUSTOMER_PLACEHOLDER, customer);

    let health = texts
        .next()
        .ok_or_else(|| Error::template(&template.kind, "no text widget for the broker list"))?;
    health.properties.markdown = broker_list;
    drop(texts);

    Ok(dashboard)
}
