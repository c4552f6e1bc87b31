// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User accounts: login, profile, password management, delivery staff.

use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};
use crate::models::{DeliveryProfile, LoginResponse};
use serde_json::{json, Value};

pub const LOGIN_PATH: &str = "/accounts/users/login/";
pub const PROFILE_PATH: &str = "/accounts/users/me/";

/// Accounts API client.
#[derive(Clone)]
pub struct AccountsApi {
    gateway: Gateway,
}

impl AccountsApi {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Exchange credentials for a token pair. Sent without any stored token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = ApiRequest::post(LOGIN_PATH)
            .with_body(json!({ "username": username, "password": password }))
            .anonymous();
        self.gateway.send_json(request).await
    }

    /// Profile of the authenticated user.
    pub async fn profile(&self) -> Result<DeliveryProfile, ApiError> {
        self.gateway.send_json(ApiRequest::get(PROFILE_PATH)).await
    }

    /// Flip a delivery person's availability.
    pub async fn toggle_availability(&self, user_id: u64) -> Result<Value, ApiError> {
        let path = format!("/accounts/users/{}/toggle_availability/", user_id);
        self.gateway.send(ApiRequest::post(path)).await
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<Value, ApiError> {
        self.gateway
            .post(
                "/accounts/users/password_reset_request/",
                json!({ "email": email }),
            )
            .await
    }

    pub async fn confirm_password_reset(
        &self,
        uid: &str,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<Value, ApiError> {
        self.gateway
            .post(
                "/accounts/users/password_reset_confirm/",
                json!({
                    "uid": uid,
                    "token": token,
                    "new_password": new_password,
                    "confirm_password": confirm_password,
                }),
            )
            .await
    }

    /// Change the password of the logged-in user.
    pub async fn change_password(
        &self,
        old_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<Value, ApiError> {
        self.gateway
            .post(
                "/accounts/users/change_password/",
                json!({
                    "old_password": old_password,
                    "new_password": new_password,
                    "confirm_password": confirm_password,
                }),
            )
            .await
    }

    pub async fn delivery_persons(&self) -> Result<Value, ApiError> {
        self.gateway.get("/accounts/delivery-persons/").await
    }

    pub async fn available_delivery_persons(&self) -> Result<Value, ApiError> {
        self.gateway.get("/accounts/delivery-persons/available/").await
    }

    pub async fn delivery_person(&self, id: u64) -> Result<Value, ApiError> {
        self.gateway
            .get(&format!("/accounts/delivery-persons/{}/", id))
            .await
    }

    pub async fn delivery_person_statistics(&self, id: u64) -> Result<Value, ApiError> {
        self.gateway
            .get(&format!("/accounts/delivery-persons/{}/statistics/", id))
            .await
    }
}
