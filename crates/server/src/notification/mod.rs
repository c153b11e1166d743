//! Outbound notifications for monitor state changes.

pub mod wecom;

use crate::entity::monitor;
use crate::error::NotificationError;
use crate::heartbeat::Heartbeat;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub use wecom::WeCom;

/// Confirmation returned by providers after a successful send.
pub const SENT_SUCCESSFULLY: &str = "Sent Successfully.";

/// Stored configuration of one notification target.
///
/// Only the fields of the providers built into this server are modelled.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Provider name, e.g. `WeCom`.
    #[serde(rename = "type")]
    pub provider: String,
    #[serde(default, rename = "weComBotKey", skip_serializing_if = "Option::is_none")]
    pub we_com_bot_key: Option<String>,
}

#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Provider name as stored in [`Notification::provider`].
    fn name(&self) -> &'static str;

    /// Deliver `msg` and return a human readable confirmation.
    async fn send(
        &self,
        notification: &Notification,
        msg: &str,
        monitor: Option<&monitor::Model>,
        heartbeat: Option<&Heartbeat>,
    ) -> Result<String, NotificationError>;
}

/// Provider registered under `name`.
pub fn provider_by_name(
    name: &str,
    client: reqwest::Client,
) -> Result<Box<dyn NotificationProvider>, NotificationError> {
    match name {
        wecom::PROVIDER_NAME => Ok(Box::new(WeCom::new(client))),
        other => Err(NotificationError::UnknownProvider(other.to_string())),
    }
}

/// Look up the provider for `notification` and send through it.
#[tracing::instrument(skip_all, fields(provider = %notification.provider))]
pub async fn dispatch(
    client: reqwest::Client,
    notification: &Notification,
    msg: &str,
    monitor: Option<&monitor::Model>,
    heartbeat: Option<&Heartbeat>,
) -> Result<String, NotificationError> {
    let provider = provider_by_name(&notification.provider, client)?;
    provider.send(notification, msg, monitor, heartbeat).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_uses_stored_field_names() {
        let n: Notification =
            serde_json::from_str(r#"{"type":"WeCom","weComBotKey":"abc"}"#).unwrap();
        assert_eq!(n.provider, "WeCom");
        assert_eq!(n.we_com_bot_key.as_deref(), Some("abc"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = provider_by_name("Pigeon", reqwest::Client::new()).err().unwrap();
        assert!(matches!(err, NotificationError::UnknownProvider(name) if name == "Pigeon"));
        assert_eq!(
            provider_by_name("WeCom", reqwest::Client::new()).unwrap().name(),
            "WeCom"
        );
    }
}
