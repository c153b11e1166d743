//! Heartbeat and TLS probe results as reported by the monitor scheduler.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorStatus {
    Down,
    Up,
    Pending,
    Maintenance,
}

impl MonitorStatus {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Down),
            1 => Some(Self::Up),
            2 => Some(Self::Pending),
            3 => Some(Self::Maintenance),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Down => 0,
            Self::Up => 1,
            Self::Pending => 2,
            Self::Maintenance => 3,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Heartbeat {
    #[serde(rename = "monitorID", default)]
    pub monitor_id: Option<i32>,
    pub status: i32,
    #[serde(default)]
    pub msg: String,
    /// Response time in milliseconds. Anything that is not a JSON number reads as `None`.
    #[serde(default, deserialize_with = "number_or_none")]
    pub ping: Option<f64>,
}

impl Heartbeat {
    pub fn status(&self) -> Option<MonitorStatus> {
        MonitorStatus::from_code(self.status)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertInfo {
    pub days_remaining: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsInfo {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub cert_info: Option<CertInfo>,
}

fn number_or_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_numeric_ping_is_none() {
        let hb: Heartbeat = serde_json::from_str(r#"{"status":1,"ping":"n/a"}"#).unwrap();
        assert_eq!(hb.ping, None);
        assert_eq!(hb.status(), Some(MonitorStatus::Up));

        let hb: Heartbeat = serde_json::from_str(r#"{"status":0,"ping":12.5}"#).unwrap();
        assert_eq!(hb.ping, Some(12.5));
        assert_eq!(hb.status(), Some(MonitorStatus::Down));
    }

    #[test]
    fn tls_info_parses_camel_case() {
        let info: TlsInfo =
            serde_json::from_str(r#"{"valid":true,"certInfo":{"daysRemaining":42}}"#).unwrap();
        assert!(info.valid);
        assert_eq!(info.cert_info.map(|c| c.days_remaining), Some(42));
    }
}
