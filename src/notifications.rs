//! Alarm e-mail subscription upkeep
//!
//! The notification topic should carry exactly one e-mail subscription: the
//! address from the parameter store override, or the configured default.
//! Confirmed subscriptions to any other address are removed. Pending ones
//! have no ARN yet and are left to expire.

use tracing::{debug, info, instrument};

use crate::config::resolve_parameter;
use crate::error::Result;
use crate::services::{NotificationService, ParameterStore};

const EMAIL_PROTOCOL: &str = "email";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionChanges {
    pub subscribed: Option<String>,
    pub unsubscribed: Vec<String>,
}

/// Address alarms should be mailed to, if any.
pub async fn desired_email(
    store: &dyn ParameterStore,
    parameter: &str,
    default: Option<String>,
) -> Option<String> {
    resolve_parameter(store, parameter, default)
        .await
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty())
}

#[instrument(skip(service))]
pub async fn sync_email_subscription(
    service: &dyn NotificationService,
    topic: &str,
    email: &str,
) -> Result<SubscriptionChanges> {
    let mut changes = SubscriptionChanges::default();
    let subscriptions = service.list_subscriptions(topic).await?;

    let mut present = false;
    for subscription in subscriptions
        .iter()
        .filter(|s| s.protocol == EMAIL_PROTOCOL)
    {
        if subscription.endpoint.eq_ignore_ascii_case(email) {
            present = true;
        } else if subscription.is_pending() {
            debug!("leaving pending subscription for {}", subscription.endpoint);
        } else {
            service.unsubscribe(&subscription.arn).await?;
            info!("unsubscribed {} from {topic}", subscription.endpoint);
            changes.unsubscribed.push(subscription.endpoint.clone());
        }
    }

    if !present {
        service.subscribe(topic, EMAIL_PROTOCOL, email).await?;
        info!("subscribed {email} to {topic}");
        changes.subscribed = Some(email.to_string());
    }

    Ok(changes)
}
