// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Payments.

use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};
use serde_json::{json, Value};

/// Payments API client.
#[derive(Clone)]
pub struct PaymentsApi {
    gateway: Gateway,
}

impl PaymentsApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Start a payment. `amount` is a decimal string as the server expects.
    pub async fn create(
        &self,
        order_id: u64,
        amount: &str,
        payment_method: &str,
    ) -> Result<Value, ApiError> {
        let request = ApiRequest::post("/payments/")
            .with_body(json!({
                "order": order_id,
                "amount": amount,
                "payment_method": payment_method,
            }))
            .upload();
        self.gateway.send(request).await
    }

    pub async fn get(&self, payment_id: u64) -> Result<Value, ApiError> {
        self.gateway.get(&format!("/payments/{}/", payment_id)).await
    }

    pub async fn check_status(&self, payment_id: u64) -> Result<Value, ApiError> {
        self.gateway
            .get(&format!("/payments/{}/check_status/", payment_id))
            .await
    }

    pub async fn list(&self, filters: &Value) -> Result<Value, ApiError> {
        self.gateway
            .send(ApiRequest::get("/payments/").query_object(filters))
            .await
    }

    pub async fn statistics(&self) -> Result<Value, ApiError> {
        self.gateway.get("/payments/statistics/").await
    }
}
