// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Anonymous client devices.

use super::segment;
use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};
use crate::models::{ClientInfoUpdate, DeviceRecord, DeviceRegistration};
use serde_json::Value;

pub const REGISTER_PATH: &str = "/accounts/devices/register/";

/// Devices API client.
#[derive(Clone)]
pub struct DevicesApi {
    gateway: Gateway,
}

impl DevicesApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Register a device (idempotent on `device_id` server-side).
    pub async fn register(&self, registration: &DeviceRegistration) -> Result<DeviceRecord, ApiError> {
        let request = ApiRequest::post(REGISTER_PATH).json(registration)?;
        self.gateway.send_json(request).await
    }

    pub async fn get(&self, device_id: &str) -> Result<DeviceRecord, ApiError> {
        let path = format!("/accounts/devices/{}/", segment(device_id));
        self.gateway.send_json(ApiRequest::get(path)).await
    }

    /// Update the customer fields of a device. Returns the server's body.
    pub async fn update_info(
        &self,
        device_id: &str,
        update: &ClientInfoUpdate,
    ) -> Result<Value, ApiError> {
        let path = format!("/accounts/devices/{}/update-info/", segment(device_id));
        self.gateway.send(ApiRequest::patch(path).json(update)?).await
    }

    /// Order history placed from this device.
    pub async fn orders(&self, device_id: &str) -> Result<Value, ApiError> {
        let path = format!("/accounts/devices/{}/orders/", segment(device_id));
        self.gateway.get(&path).await
    }

    pub async fn delete(&self, device_id: &str) -> Result<Value, ApiError> {
        let path = format!("/accounts/devices/{}/", segment(device_id));
        self.gateway.delete(&path).await
    }
}
