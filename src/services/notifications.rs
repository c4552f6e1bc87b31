// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-app notifications.

use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};
use serde::Deserialize;
use serde_json::Value;

const NOTIFICATIONS: &str = "/notifications/notifications";

#[derive(Debug, Deserialize)]
struct UnreadCount {
    unread_count: u64,
}

/// Notifications API client.
#[derive(Clone)]
pub struct NotificationsApi {
    gateway: Gateway,
}

impl NotificationsApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Notifications for the logged-in user, or for `device_id` in client mode.
    pub async fn mine(&self, device_id: Option<&str>) -> Result<Value, ApiError> {
        let request = with_device(
            ApiRequest::get(format!("{}/my_notifications/", NOTIFICATIONS)),
            device_id,
        );
        self.gateway.send(request).await
    }

    pub async fn unread_count(&self, device_id: Option<&str>) -> Result<u64, ApiError> {
        let request = with_device(
            ApiRequest::get(format!("{}/unread_count/", NOTIFICATIONS)),
            device_id,
        );
        let count: UnreadCount = self.gateway.send_json(request).await?;
        Ok(count.unread_count)
    }

    pub async fn mark_as_read(&self, notification_id: u64) -> Result<Value, ApiError> {
        self.gateway
            .send(ApiRequest::post(format!(
                "{}/{}/mark_as_read/",
                NOTIFICATIONS, notification_id
            )))
            .await
    }

    pub async fn mark_all_as_read(&self, device_id: Option<&str>) -> Result<Value, ApiError> {
        let request = with_device(
            ApiRequest::post(format!("{}/mark_all_as_read/", NOTIFICATIONS))
                .with_body(Value::Object(Default::default())),
            device_id,
        );
        self.gateway.send(request).await
    }

    pub async fn delete_old(&self) -> Result<Value, ApiError> {
        self.gateway
            .delete(&format!("{}/delete_old_notifications/", NOTIFICATIONS))
            .await
    }
}

fn with_device(request: ApiRequest, device_id: Option<&str>) -> ApiRequest {
    match device_id {
        Some(id) => request.query("device_id", id),
        None => request,
    }
}
