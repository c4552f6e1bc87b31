// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Anonymous client device models.

use crate::platform::DeviceMetadata;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server-side record for a registered device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Numeric id assigned by the server (absent until registered)
    #[serde(default)]
    pub id: Option<u64>,
    /// Stable client-generated device id
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub order_count: u32,
    /// When the server registered this device
    #[serde(default, alias = "created_at")]
    pub registered_at: Option<DateTime<Utc>>,
    /// Fields this client does not interpret, kept for round-trips
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeviceRecord {
    /// Placeholder record for a device the server has not acknowledged yet.
    pub fn unregistered(device_id: impl Into<String>) -> Self {
        Self {
            id: None,
            device_id: device_id.into(),
            device_name: None,
            customer_name: None,
            customer_phone: None,
            customer_email: None,
            order_count: 0,
            registered_at: None,
            extra: Map::new(),
        }
    }

    pub fn is_registered(&self) -> bool {
        self.id.is_some()
    }

    /// Apply the non-empty fields of an update.
    pub fn apply(&mut self, update: &ClientInfoUpdate) {
        if let Some(name) = &update.customer_name {
            self.customer_name = Some(name.clone());
        }
        if let Some(phone) = &update.customer_phone {
            self.customer_phone = Some(phone.clone());
        }
        if let Some(email) = &update.customer_email {
            self.customer_email = Some(email.clone());
        }
    }
}

/// The identity the app acts under in client mode.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub record: DeviceRecord,
}

impl DeviceIdentity {
    pub fn new(device_id: impl Into<String>, record: DeviceRecord) -> Self {
        Self {
            device_id: device_id.into(),
            record,
        }
    }

    pub fn registered_at(&self) -> Option<DateTime<Utc>> {
        self.record.registered_at
    }
}

/// Payload for `POST /accounts/devices/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceRegistration {
    pub device_id: String,
    pub device_name: String,
    pub device_model: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub push_token: Option<String>,
}

impl DeviceRegistration {
    pub fn new(device_id: &str, metadata: DeviceMetadata, push_token: Option<String>) -> Self {
        Self {
            device_id: device_id.to_string(),
            device_name: metadata.device_name,
            device_model: metadata.model,
            os_name: metadata.os_name,
            os_version: metadata.os_version,
            push_token,
        }
    }
}

/// Customer fields a client may edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientInfoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keeps_unknown_fields() {
        let raw = json!({
            "id": 7,
            "device_id": "abc",
            "customer_name": "Awa",
            "order_count": 3,
            "created_at": "2026-01-02T03:04:05Z",
            "loyalty_points": 120
        });

        let record: DeviceRecord = serde_json::from_value(raw).unwrap();
        assert!(record.is_registered());
        assert_eq!(record.order_count, 3);
        assert!(record.registered_at.is_some());
        assert_eq!(record.extra.get("loyalty_points"), Some(&json!(120)));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["loyalty_points"], json!(120));
    }

    #[test]
    fn test_apply_update_only_touches_given_fields() {
        let mut record = DeviceRecord::unregistered("abc");
        record.customer_phone = Some("97 00 00 00".to_string());

        record.apply(&ClientInfoUpdate {
            customer_name: Some("Koffi".to_string()),
            ..Default::default()
        });

        assert_eq!(record.customer_name.as_deref(), Some("Koffi"));
        assert_eq!(record.customer_phone.as_deref(), Some("97 00 00 00"));
        assert!(!record.is_registered());
    }

    #[test]
    fn test_update_skips_empty_fields() {
        let update = ClientInfoUpdate {
            customer_email: Some("a@b.c".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"customer_email": "a@b.c"})
        );
    }
}
