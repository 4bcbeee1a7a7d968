// ── Device domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque device identifier.
///
/// Config-driven servers use strings such as `192_168_20_1`, database-backed
/// ones use integers; both end up here as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Build from a JSON id that may be a string or a number.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Self(s.clone()),
            other => Self(other.to_string()),
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<i64> for DeviceId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

/// A percentage of the floor image's width or height.
///
/// Kept as the server sent it: no clamping on the render side.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percent(pub f64);

impl Percent {
    pub fn value(self) -> f64 {
        self.0
    }

    /// Parse `"64.3%"`, `"64.3"` or a JSON number.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n.as_f64().map(Self),
            serde_json::Value::String(s) => Self::parse(s),
            _ => None,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
        number.parse::<f64>().ok().filter(|v| v.is_finite()).map(Self)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Marker position on a floor image, in percent of its height/width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub top: Percent,
    pub left: Percent,
}

impl Position {
    pub fn new(top: f64, left: f64) -> Self {
        Self {
            top: Percent(top),
            left: Percent(left),
        }
    }
}

/// Reachability as judged by the server's health checker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceStatus {
    Online,
    /// Never checked or unreachable.
    #[default]
    Offline,
    /// Flapping or degraded.
    Unstable,
}

impl DeviceStatus {
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }

    /// Map the legacy boolean status.
    pub fn from_online_flag(online: bool) -> Self {
        if online { Self::Online } else { Self::Offline }
    }
}

/// A monitored device as shown on the floor map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    pub ip: String,
    #[serde(rename = "type")]
    pub device_type: String,
    pub floor_id: String,
    pub position: Position,
    pub status: DeviceStatus,
}

impl Device {
    pub fn is_online(&self) -> bool {
        self.status.is_online()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn percent_accepts_css_and_numbers() {
        assert_eq!(Percent::parse("64.3%"), Some(Percent(64.3)));
        assert_eq!(Percent::parse(" 12 % "), Some(Percent(12.0)));
        assert_eq!(Percent::from_json(&json!(20.25)), Some(Percent(20.25)));
        assert_eq!(Percent::from_json(&json!("7.5%")), Some(Percent(7.5)));
        assert_eq!(Percent::parse("left"), None);
        assert_eq!(Percent::parse("NaN"), None);
        assert_eq!(Percent::from_json(&json!(null)), None);
    }

    #[test]
    fn percent_is_not_clamped() {
        assert_eq!(Percent::parse("120%"), Some(Percent(120.0)));
        assert_eq!(Percent::parse("-5%"), Some(Percent(-5.0)));
    }

    #[test]
    fn device_id_from_string_or_integer() {
        assert_eq!(DeviceId::from_json(&json!("192_168_20_1")).as_str(), "192_168_20_1");
        assert_eq!(DeviceId::from_json(&json!(42)).as_str(), "42");
        assert_eq!(DeviceId::from(42_i64), DeviceId::new("42"));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Online".parse::<DeviceStatus>().unwrap(), DeviceStatus::Online);
        assert_eq!("UNSTABLE".parse::<DeviceStatus>().unwrap(), DeviceStatus::Unstable);
        assert!("maybe".parse::<DeviceStatus>().is_err());
        assert_eq!(DeviceStatus::Offline.to_string(), "offline");
        assert_eq!(DeviceStatus::from_online_flag(true), DeviceStatus::Online);
    }
}
