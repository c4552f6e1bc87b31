// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Snapshot of the client identity taken before a delivery login.

use super::{DeviceIdentity, DeviceRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client session backup.
///
/// The device record is kept as the exact serialized string that was stored,
/// so restoring writes back the same bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionBackup {
    pub device_record: String,
    pub device_id: String,
    pub captured_at: DateTime<Utc>,
}

impl SessionBackup {
    pub fn capture(identity: &DeviceIdentity, serialized_record: String) -> Self {
        Self {
            device_record: serialized_record,
            device_id: identity.device_id.clone(),
            captured_at: Utc::now(),
        }
    }

    /// Rebuild the identity held by this backup.
    pub fn identity(&self) -> Result<DeviceIdentity, serde_json::Error> {
        let record: DeviceRecord = serde_json::from_str(&self.device_record)?;
        Ok(DeviceIdentity::new(self.device_id.clone(), record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_restores_identity() {
        let mut record = DeviceRecord::unregistered("dev-1");
        record.id = Some(12);
        record.customer_name = Some("Awa".to_string());
        let identity = DeviceIdentity::new("dev-1", record.clone());
        let raw = serde_json::to_string(&record).unwrap();

        let backup = SessionBackup::capture(&identity, raw.clone());
        assert_eq!(backup.device_record, raw);
        assert_eq!(backup.identity().unwrap(), identity);
    }

    #[test]
    fn test_corrupt_backup_is_an_error() {
        let backup = SessionBackup {
            device_record: "{".to_string(),
            device_id: "dev-1".to_string(),
            captured_at: Utc::now(),
        };
        assert!(backup.identity().is_err());
    }
}
