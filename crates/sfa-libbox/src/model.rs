// ── Engine wire models ──
//
// Payloads the engine pushes through a command connection. The session
// layer treats them as opaque and passes them through unchanged.

use serde::{Deserialize, Serialize};

/// Periodic status pushed on a [`Command::Status`](crate::Command::Status)
/// connection.
///
/// `uplink`/`downlink` are byte rates per second; the `*_total` fields are
/// cumulative byte counters since the engine started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusMessage {
    pub memory: i64,
    pub goroutines: i32,
    pub connections_in: i32,
    pub connections_out: i32,
    pub traffic_available: bool,
    pub uplink: i64,
    pub downlink: i64,
    pub uplink_total: i64,
    pub downlink_total: i64,
}

impl StatusMessage {
    /// Status carrying only the traffic rates.
    pub fn traffic(uplink: i64, downlink: i64) -> Self {
        Self {
            traffic_available: true,
            uplink,
            downlink,
            ..Self::default()
        }
    }
}

/// A routing target grouping reported by the engine, e.g. a selector of
/// candidate upstream proxies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundGroup {
    /// Group tag (its name in the engine configuration).
    pub tag: String,

    /// Group type: `"selector"`, `"urltest"`, etc.
    #[serde(rename = "type")]
    pub group_type: String,

    /// Whether the selected member can be switched at runtime.
    #[serde(default)]
    pub selectable: bool,

    /// Tag of the currently selected member.
    #[serde(default)]
    pub selected: String,

    /// UI hint: whether the group is shown expanded.
    #[serde(default)]
    pub is_expand: bool,

    /// Members in engine order.
    #[serde(default)]
    pub items: Vec<OutboundGroupItem>,
}

/// A single member of an [`OutboundGroup`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundGroupItem {
    pub tag: String,

    #[serde(rename = "type")]
    pub outbound_type: String,

    /// Unix timestamp of the last URL test, 0 if never tested.
    #[serde(default)]
    pub url_test_time: i64,

    /// Last measured delay in milliseconds, 0 if unknown.
    #[serde(default)]
    pub url_test_delay: i32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_missing_fields() {
        let status: StatusMessage =
            serde_json::from_str(r#"{"uplink": 1024, "downlink": 2048}"#).unwrap();
        assert_eq!(status.uplink, 1024);
        assert_eq!(status.downlink, 2048);
        assert_eq!(status.memory, 0);
        assert!(!status.traffic_available);
    }

    #[test]
    fn group_uses_type_key() {
        let group: OutboundGroup = serde_json::from_value(serde_json::json!({
            "tag": "proxy",
            "type": "selector",
            "selectable": true,
            "selected": "hk-01",
            "items": [
                { "tag": "hk-01", "type": "vmess", "url_test_delay": 42 },
                { "tag": "jp-02", "type": "trojan" }
            ]
        }))
        .unwrap();

        assert_eq!(group.group_type, "selector");
        assert_eq!(group.items.len(), 2);
        assert_eq!(group.items[0].url_test_delay, 42);
        assert_eq!(group.items[1].outbound_type, "trojan");
        assert!(!group.is_expand);
    }
}
