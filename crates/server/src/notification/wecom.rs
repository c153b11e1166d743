//! WeCom (WeChat Work) group robot webhook.

use super::{Notification, NotificationProvider, SENT_SUCCESSFULLY};
use crate::entity::monitor;
use crate::error::NotificationError;
use crate::heartbeat::{Heartbeat, MonitorStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const PROVIDER_NAME: &str = "WeCom";
pub const DEFAULT_BASE_URL: &str = "https://qyapi.weixin.qq.com";
const SEND_PATH: &str = "/cgi-bin/webhook/send";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TextContent {
    pub content: String,
}

/// Request body of a plain-text robot message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WeComMessage {
    pub msgtype: &'static str,
    pub text: TextContent,
}

#[derive(Debug, Deserialize)]
struct WeComResponse {
    #[serde(default)]
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

/// Message title derived from the heartbeat that triggered the notification.
pub fn message_title(heartbeat: Option<&Heartbeat>) -> &'static str {
    match heartbeat.and_then(Heartbeat::status) {
        Some(MonitorStatus::Up) => "UptimeKuma Monitor Up",
        Some(MonitorStatus::Down) => "UptimeKuma Monitor Down",
        _ => "UptimeKuma Message",
    }
}

pub fn compose_message(heartbeat: Option<&Heartbeat>, msg: &str) -> WeComMessage {
    WeComMessage {
        msgtype: "text",
        text: TextContent {
            content: format!("{}{msg}", message_title(heartbeat)),
        },
    }
}

pub struct WeCom {
    client: reqwest::Client,
    base_url: String,
}

impl WeCom {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn failed(reason: impl ToString) -> NotificationError {
        NotificationError::SendFailed {
            provider: PROVIDER_NAME,
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl NotificationProvider for WeCom {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    #[tracing::instrument(skip_all, fields(provider = PROVIDER_NAME))]
    async fn send(
        &self,
        notification: &Notification,
        msg: &str,
        _monitor: Option<&monitor::Model>,
        heartbeat: Option<&Heartbeat>,
    ) -> Result<String, NotificationError> {
        let key = notification
            .we_com_bot_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| NotificationError::InvalidConfig("weComBotKey is required".into()))?;

        let body = compose_message(heartbeat, msg);
        let response = self
            .client
            .post(format!("{}{SEND_PATH}", self.base_url))
            .query(&[("key", key)])
            .json(&body)
            .send()
            .await
            // The request URL carries the bot key.
            .map_err(|e| Self::failed(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(
                name = "notification.wecom.http_error",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                status = %status,
                message = "WeCom webhook returned an error status"
            );
            return Err(Self::failed(format!("HTTP {status}: {text}")));
        }

        // The webhook answers 200 with a nonzero errcode for a bad key.
        if let Ok(reply) = response.json::<WeComResponse>().await
            && reply.errcode != 0
        {
            return Err(Self::failed(format!(
                "errcode {}: {}",
                reply.errcode, reply.errmsg
            )));
        }

        Ok(SENT_SUCCESSFULLY.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beat(status: i32) -> Heartbeat {
        Heartbeat {
            status,
            msg: String::new(),
            ..Default::default()
        }
    }

    #[test]
    fn title_follows_heartbeat_status() {
        assert_eq!(
            compose_message(Some(&beat(1)), "api is up").text.content,
            "UptimeKuma Monitor Upapi is up"
        );
        assert_eq!(
            compose_message(Some(&beat(0)), "api is down").text.content,
            "UptimeKuma Monitor Downapi is down"
        );
        assert_eq!(
            compose_message(Some(&beat(2)), "pending").text.content,
            "UptimeKuma Messagepending"
        );
        assert_eq!(
            compose_message(None, "hello").text.content,
            "UptimeKuma Messagehello"
        );
    }

    #[test]
    fn body_shape() {
        let json = serde_json::to_value(compose_message(None, "x")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"msgtype": "text", "text": {"content": "UptimeKuma Messagex"}})
        );
    }
}
