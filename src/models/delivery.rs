// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Delivery-person login models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// The only `user_type` allowed to open a delivery session.
pub const DELIVERY_ROLE: &str = "delivery";

/// Profile of a logged-in delivery person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryProfile {
    pub id: u64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Role discriminator
    #[serde(default)]
    pub user_type: String,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub total_deliveries: u32,
    /// Statistics and anything else the server sends
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeliveryProfile {
    pub fn is_delivery(&self) -> bool {
        self.user_type == DELIVERY_ROLE
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// An authenticated delivery session.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliverySession {
    pub access_token: String,
    pub refresh_token: String,
    pub profile: DeliveryProfile,
}

/// Raw `POST /accounts/users/login/` response.
///
/// All fields are optional on the wire; a usable login needs all three.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub user: Option<Value>,
}

/// `POST /token/refresh/` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    /// Present when the server rotates refresh tokens
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Login form input with the checks the login screen applies.
#[derive(Debug, Clone, Validate)]
pub struct LoginCredentials {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl LoginCredentials {
    /// Build credentials; the username is trimmed, the password is kept as typed.
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            password: password.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_role_and_name() {
        let profile: DeliveryProfile = serde_json::from_value(json!({
            "id": 4,
            "username": "driver1",
            "first_name": "Mohamed",
            "last_name": "",
            "user_type": "delivery",
            "is_available": true,
            "average_rating": "4.80"
        }))
        .unwrap();

        assert!(profile.is_delivery());
        assert_eq!(profile.display_name(), "Mohamed");
        assert_eq!(profile.extra.get("average_rating"), Some(&json!("4.80")));
    }

    #[test]
    fn test_credentials_validation() {
        assert!(LoginCredentials::new("  driver1 ", "secret1").validate().is_ok());

        let errors = LoginCredentials::new(" ab ", "secret1").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));

        let errors = LoginCredentials::new("driver1", "12345").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }
}
