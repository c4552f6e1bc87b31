// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ratings of couriers and dishes.

use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};
use serde_json::Value;

const DELIVERY_RATINGS: &str = "/ratings/delivery-ratings/";
const MENU_ITEM_RATINGS: &str = "/ratings/menu-item-ratings/";

/// Ratings API client.
#[derive(Clone)]
pub struct RatingsApi {
    gateway: Gateway,
}

impl RatingsApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn delivery_ratings(&self, filters: &Value) -> Result<Value, ApiError> {
        self.gateway
            .send(ApiRequest::get(DELIVERY_RATINGS).query_object(filters))
            .await
    }

    pub async fn rate_delivery(&self, rating: &Value) -> Result<Value, ApiError> {
        self.gateway.post(DELIVERY_RATINGS, rating.clone()).await
    }

    pub async fn ratings_for_delivery_person(&self, delivery_person: u64) -> Result<Value, ApiError> {
        let request = ApiRequest::get(format!("{}by_delivery_person/", DELIVERY_RATINGS))
            .query("delivery_person_id", delivery_person);
        self.gateway.send(request).await
    }

    pub async fn menu_item_ratings(&self, filters: &Value) -> Result<Value, ApiError> {
        self.gateway
            .send(ApiRequest::get(MENU_ITEM_RATINGS).query_object(filters))
            .await
    }

    pub async fn rate_menu_item(&self, rating: &Value) -> Result<Value, ApiError> {
        self.gateway.post(MENU_ITEM_RATINGS, rating.clone()).await
    }

    /// Rate every dish of a delivered order at once.
    pub async fn rate_order_items(&self, ratings: &Value) -> Result<Value, ApiError> {
        self.gateway
            .post(
                &format!("{}rate_order_items/", MENU_ITEM_RATINGS),
                ratings.clone(),
            )
            .await
    }

    pub async fn ratings_for_menu_item(&self, menu_item: u64) -> Result<Value, ApiError> {
        let request = ApiRequest::get(format!("{}by_menu_item/", MENU_ITEM_RATINGS))
            .query("menu_item_id", menu_item);
        self.gateway.send(request).await
    }
}
