// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Server-side cart of a device.

use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};
use serde::Serialize;
use serde_json::{json, Value};

/// Line to add to a cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub menu_item_id: u64,
    pub size_id: u64,
    pub quantity: u32,
    pub special_instructions: String,
}

/// Cart API client.
#[derive(Clone)]
pub struct CartApi {
    gateway: Gateway,
}

impl CartApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Get or lazily create the cart of `device_id`.
    pub async fn my_cart(&self, device_id: &str) -> Result<Value, ApiError> {
        self.gateway
            .send(ApiRequest::get("/orders/carts/my_cart/").query("device_id", device_id))
            .await
    }

    pub async fn add_item(&self, cart_id: u64, line: &CartLine) -> Result<Value, ApiError> {
        let path = format!("/orders/carts/{}/add_item/", cart_id);
        self.gateway.send(ApiRequest::post(path).json(line)?).await
    }

    pub async fn update_item(
        &self,
        cart_id: u64,
        item_id: u64,
        quantity: u32,
    ) -> Result<Value, ApiError> {
        self.gateway
            .post(
                &format!("/orders/carts/{}/update_item/", cart_id),
                json!({ "item_id": item_id, "quantity": quantity }),
            )
            .await
    }

    pub async fn remove_item(&self, cart_id: u64, item_id: u64) -> Result<Value, ApiError> {
        self.gateway
            .post(
                &format!("/orders/carts/{}/remove_item/", cart_id),
                json!({ "item_id": item_id }),
            )
            .await
    }

    pub async fn clear(&self, cart_id: u64) -> Result<Value, ApiError> {
        self.gateway
            .send(ApiRequest::post(format!("/orders/carts/{}/clear/", cart_id)))
            .await
    }

    /// Turn the cart into an order. `checkout` carries delivery address, phone, notes.
    pub async fn checkout(&self, cart_id: u64, checkout: &Value) -> Result<Value, ApiError> {
        let request = ApiRequest::post(format!("/orders/carts/{}/checkout/", cart_id))
            .with_body(checkout.clone())
            .upload();
        self.gateway.send(request).await
    }
}
