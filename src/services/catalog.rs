// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Menu catalog (public read endpoints).

use super::segment;
use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};
use serde_json::Value;

/// Catalog API client.
#[derive(Clone)]
pub struct CatalogApi {
    gateway: Gateway,
}

impl CatalogApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn categories(&self) -> Result<Value, ApiError> {
        self.gateway.get("/menu/categories/").await
    }

    pub async fn category(&self, slug: &str) -> Result<Value, ApiError> {
        self.gateway
            .get(&format!("/menu/categories/{}/", segment(slug)))
            .await
    }

    /// Items of one category.
    pub async fn category_items(&self, slug: &str) -> Result<Value, ApiError> {
        self.gateway
            .get(&format!("/menu/categories/{}/items/", segment(slug)))
            .await
    }

    /// Menu items, filtered by a flat JSON object (`category`, `search`, `is_available`, ...).
    pub async fn items(&self, filters: &Value) -> Result<Value, ApiError> {
        self.gateway
            .send(ApiRequest::get("/menu/items/").query_object(filters))
            .await
    }

    pub async fn item(&self, slug: &str) -> Result<Value, ApiError> {
        self.gateway
            .get(&format!("/menu/items/{}/", segment(slug)))
            .await
    }

    pub async fn popular_items(&self) -> Result<Value, ApiError> {
        self.gateway
            .send(ApiRequest::get("/menu/items/").query("is_popular", "true"))
            .await
    }

    pub async fn top_rated_items(&self) -> Result<Value, ApiError> {
        self.gateway.get("/menu/items/top_rated/").await
    }

    pub async fn item_ratings(&self, slug: &str) -> Result<Value, ApiError> {
        self.gateway
            .get(&format!("/menu/items/{}/ratings/", segment(slug)))
            .await
    }

    /// Portion sizes, optionally for one menu item.
    pub async fn sizes(&self, menu_item: Option<u64>) -> Result<Value, ApiError> {
        let mut request = ApiRequest::get("/menu/sizes/");
        if let Some(id) = menu_item {
            request = request.query("menu_item", id);
        }
        self.gateway.send(request).await
    }

    pub async fn size(&self, id: u64) -> Result<Value, ApiError> {
        self.gateway.get(&format!("/menu/sizes/{}/", id)).await
    }
}
