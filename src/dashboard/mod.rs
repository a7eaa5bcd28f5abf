//! Dashboard documents
//!
//! A dashboard body is a list of positioned widgets. Only the fields the
//! composer rewrites are typed; everything else a template carries is kept
//! in `extra` maps and written back unchanged.

pub mod compose;
pub mod templates;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use compose::{compose_broker_dashboard, compose_object_dashboard, compose_overview_dashboard};
pub use templates::{DashboardTemplate, DashboardTemplates, Slots};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub widgets: Vec<Widget>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Widget {
    Text(TextWidget),
    Metric(MetricWidget),
}

/// Grid position and size, copied from the template unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextWidget {
    #[serde(flatten)]
    pub placement: Placement,
    pub properties: TextProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProperties {
    pub markdown: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricWidget {
    #[serde(flatten)]
    pub placement: Placement,
    pub properties: MetricProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricProperties {
    /// Rows of `[namespace, metric, dim, value, dim, value, ..., {options}]`.
    /// A `"."` repeats the value of the row above.
    pub metrics: Vec<Vec<Value>>,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dashboard {
    pub fn text_widgets_mut(&mut self) -> impl Iterator<Item = &mut TextWidget> {
        self.widgets.iter_mut().filter_map(|widget| match widget {
            Widget::Text(text) => Some(text),
            Widget::Metric(_) => None,
        })
    }

    pub fn metric_widgets_mut(&mut self) -> impl Iterator<Item = &mut MetricWidget> {
        self.widgets.iter_mut().filter_map(|widget| match widget {
            Widget::Metric(metric) => Some(metric),
            Widget::Text(_) => None,
        })
    }

    pub fn text_widgets(&self) -> impl Iterator<Item = &TextWidget> {
        self.widgets.iter().filter_map(|widget| match widget {
            Widget::Text(text) => Some(text),
            Widget::Metric(_) => None,
        })
    }

    pub fn metric_widgets(&self) -> impl Iterator<Item = &MetricWidget> {
        self.widgets.iter().filter_map(|widget| match widget {
            Widget::Metric(metric) => Some(metric),
            Widget::Text(_) => None,
        })
    }

    /// Serialized body as written to the dashboard store.
    pub fn to_body(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
