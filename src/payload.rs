//! Push message records.
//!
//! `RawPushData` is what the messaging service hands over, `PushMessage` is the
//! normalized view the router works on, and `NotificationPayload` is the flat
//! record that lands in the queue and goes back to the UI on drain.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const KEY_TITLE: &str = "title";
pub const KEY_BODY: &str = "body";
pub const KEY_IMAGE: &str = "image";
pub const KEY_URL: &str = "url";
pub const KEY_TYPE: &str = "type";

/// Display block some senders attach next to the data map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationBlock {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Inbound push as delivered by the platform messaging service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPushData {
    #[serde(default)]
    pub data: HashMap<String, String>,
    #[serde(default)]
    pub notification: Option<NotificationBlock>,
}

impl RawPushData {
    pub fn from_data<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            notification: None,
        }
    }

    pub fn with_notification(mut self, title: Option<&str>, body: Option<&str>) -> Self {
        self.notification = Some(NotificationBlock {
            title: title.map(str::to_string),
            body: body.map(str::to_string),
        });
        self
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

/// Normalized inbound message. Missing text fields are empty, never rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub deep_link: Option<String>,
    pub message_type: String,
}

impl PushMessage {
    pub fn from_raw(raw: &RawPushData, default_type: &str) -> Self {
        let block = raw.notification.as_ref();
        let title = raw
            .get(KEY_TITLE)
            .or_else(|| block.and_then(|n| n.title.as_deref()))
            .unwrap_or_default()
            .to_string();
        let body = raw
            .get(KEY_BODY)
            .or_else(|| block.and_then(|n| n.body.as_deref()))
            .unwrap_or_default()
            .to_string();

        Self {
            title,
            body,
            image_url: non_blank(raw.get(KEY_IMAGE)),
            deep_link: non_blank(raw.get(KEY_URL)),
            message_type: raw.get(KEY_TYPE).unwrap_or(default_type).to_string(),
        }
    }

    pub fn to_payload(&self, timestamp: i64) -> NotificationPayload {
        NotificationPayload {
            title: self.title.clone(),
            body: self.body.clone(),
            image_url: self.image_url.clone().unwrap_or_default(),
            deep_link: self.deep_link.clone().unwrap_or_default(),
            timestamp,
        }
    }

    pub fn to_dialog_event(&self) -> DialogEvent {
        DialogEvent {
            title: self.title.clone(),
            body: self.body.clone(),
            image: self.image_url.clone(),
            url: self.deep_link.clone(),
            message_type: self.message_type.clone(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Queued record, also the shape returned by the drain API.
///
/// Stored records are read with [`NotificationPayload::from_stored`], which
/// turns missing or mistyped fields into `""` / `0` so older and newer queue
/// files stay readable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    #[serde(rename = "image")]
    pub image_url: String,
    #[serde(rename = "url")]
    pub deep_link: String,
    /// Epoch millis at enqueue time.
    pub timestamp: i64,
}

impl NotificationPayload {
    /// Lenient read of one stored record. `None` only when `value` is not an
    /// object; individual fields never fail the record.
    pub fn from_stored(value: &Value) -> Option<Self> {
        let record = value.as_object()?;
        let text = |key: &str| record.get(key).map(lenient_string).unwrap_or_default();
        Some(Self {
            title: text(KEY_TITLE),
            body: text(KEY_BODY),
            image_url: text(KEY_IMAGE),
            deep_link: text(KEY_URL),
            timestamp: record.get("timestamp").map(lenient_millis).unwrap_or_default(),
        })
    }
}

fn lenient_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn lenient_millis(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or_default(),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
                .unwrap_or_default()
        },
        _ => 0,
    }
}

/// Event handed to the active UI for an immediate in-app dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogEvent {
    pub title: String,
    pub body: String,
    pub image: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub message_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_data_map_is_extracted() {
        let raw = RawPushData::from_data([
            ("title", "Flash sale"),
            ("body", "50% off"),
            ("image", "https://cdn.example.com/sale.jpg"),
            ("url", "https://m.jeeey.com/tabs/deals"),
            ("type", "transactional"),
        ]);
        let msg = PushMessage::from_raw(&raw, "promo");
        assert_eq!(msg.title, "Flash sale");
        assert_eq!(msg.body, "50% off");
        assert_eq!(msg.image_url.as_deref(), Some("https://cdn.example.com/sale.jpg"));
        assert_eq!(msg.deep_link.as_deref(), Some("https://m.jeeey.com/tabs/deals"));
        assert_eq!(msg.message_type, "transactional");
    }

    #[test]
    fn test_missing_fields_default() {
        let msg = PushMessage::from_raw(&RawPushData::default(), "promo");
        assert_eq!(msg.title, "");
        assert_eq!(msg.body, "");
        assert_eq!(msg.image_url, None);
        assert_eq!(msg.deep_link, None);
        assert_eq!(msg.message_type, "promo");
    }

    #[test]
    fn test_notification_block_fills_missing_text() {
        let raw = RawPushData::from_data([("body", "from data")])
            .with_notification(Some("from block"), Some("ignored"));
        let msg = PushMessage::from_raw(&raw, "promo");
        assert_eq!(msg.title, "from block");
        assert_eq!(msg.body, "from data");
    }

    #[test]
    fn test_blank_image_is_absent() {
        let raw = RawPushData::from_data([("image", "  ")]);
        assert_eq!(PushMessage::from_raw(&raw, "promo").image_url, None);
    }

    #[test]
    fn test_payload_wire_names() {
        let payload = NotificationPayload {
            title: "t".into(),
            body: "b".into(),
            image_url: "i".into(),
            deep_link: "u".into(),
            timestamp: 42,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"title": "t", "body": "b", "image": "i", "url": "u", "timestamp": 42})
        );
    }

    #[test]
    fn test_payload_missing_fields_read_as_empty() {
        let payload: NotificationPayload =
            serde_json::from_str(r#"{"title": "only title", "extra": true}"#).unwrap();
        assert_eq!(payload.title, "only title");
        assert_eq!(payload.body, "");
        assert_eq!(payload.deep_link, "");
        assert_eq!(payload.timestamp, 0);
    }

    #[test]
    fn test_stored_record_tolerates_mistyped_fields() {
        let value = serde_json::json!({
            "title": null,
            "body": 42,
            "image": ["not", "a", "string"],
            "url": "https://m.jeeey.com/tabs/deals",
            "timestamp": 1.7e12
        });
        let payload = NotificationPayload::from_stored(&value).unwrap();
        assert_eq!(payload.title, "");
        assert_eq!(payload.body, "42");
        assert_eq!(payload.image_url, "");
        assert_eq!(payload.deep_link, "https://m.jeeey.com/tabs/deals");
        assert_eq!(payload.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_stored_timestamp_as_string() {
        let value = serde_json::json!({"timestamp": "1700000000000"});
        assert_eq!(
            NotificationPayload::from_stored(&value).unwrap().timestamp,
            1_700_000_000_000
        );
        let value = serde_json::json!({"timestamp": "soon"});
        assert_eq!(NotificationPayload::from_stored(&value).unwrap().timestamp, 0);
    }

    #[test]
    fn test_stored_non_object_is_skipped() {
        assert_eq!(NotificationPayload::from_stored(&serde_json::json!("title")), None);
    }

    #[test]
    fn test_dialog_event_uses_type_key() {
        let msg = PushMessage::from_raw(&RawPushData::from_data([("title", "hi")]), "promo");
        let value = serde_json::to_value(msg.to_dialog_event()).unwrap();
        assert_eq!(value["type"], "promo");
        assert_eq!(value["image"], serde_json::Value::Null);
    }
}
