// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Orders, including the delivery workflow transitions.

use super::segment;
use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};
use serde_json::{json, Value};

const ORDERS: &str = "/orders/orders";

/// Orders API client.
#[derive(Clone)]
pub struct OrdersApi {
    gateway: Gateway,
}

impl OrdersApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self, filters: &Value) -> Result<Value, ApiError> {
        self.gateway
            .send(ApiRequest::get(format!("{}/", ORDERS)).query_object(filters))
            .await
    }

    pub async fn create(&self, order: &Value) -> Result<Value, ApiError> {
        self.gateway
            .post(&format!("{}/", ORDERS), order.clone())
            .await
    }

    pub async fn get(&self, order_number: &str) -> Result<Value, ApiError> {
        self.gateway.get(&order_path(order_number, "")).await
    }

    /// Live status and courier position.
    pub async fn track(&self, order_number: &str) -> Result<Value, ApiError> {
        self.gateway.get(&order_path(order_number, "track/")).await
    }

    pub async fn cancel(&self, order_number: &str, reason: &str) -> Result<Value, ApiError> {
        self.gateway
            .post(
                &order_path(order_number, "cancel/"),
                json!({ "reason": reason }),
            )
            .await
    }

    pub async fn pending(&self) -> Result<Value, ApiError> {
        self.gateway.get(&format!("{}/pending/", ORDERS)).await
    }

    pub async fn active(&self) -> Result<Value, ApiError> {
        self.gateway.get(&format!("{}/active/", ORDERS)).await
    }

    pub async fn accept(&self, order_number: &str) -> Result<Value, ApiError> {
        self.transition(order_number, "accept/").await
    }

    pub async fn refuse(&self, order_number: &str, reason: &str) -> Result<Value, ApiError> {
        self.gateway
            .post(
                &order_path(order_number, "refuse/"),
                json!({ "reason": reason }),
            )
            .await
    }

    pub async fn start_preparing(&self, order_number: &str) -> Result<Value, ApiError> {
        self.transition(order_number, "start_preparing/").await
    }

    pub async fn mark_ready(&self, order_number: &str) -> Result<Value, ApiError> {
        self.transition(order_number, "mark_ready/").await
    }

    pub async fn statistics(&self) -> Result<Value, ApiError> {
        self.gateway.get(&format!("{}/statistics/", ORDERS)).await
    }

    async fn transition(&self, order_number: &str, action: &str) -> Result<Value, ApiError> {
        self.gateway
            .send(ApiRequest::post(order_path(order_number, action)))
            .await
    }
}

fn order_path(order_number: &str, action: &str) -> String {
    format!("{}/{}/{}", ORDERS, segment(order_number), action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_path() {
        assert_eq!(order_path("CMD-42", ""), "/orders/orders/CMD-42/");
        assert_eq!(
            order_path("CMD-42", "track/"),
            "/orders/orders/CMD-42/track/"
        );
    }
}
