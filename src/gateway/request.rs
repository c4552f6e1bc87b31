// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transport-neutral request and response values.

use crate::error::ApiError;
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

/// Which timeout budget a call gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutClass {
    #[default]
    Standard,
    /// Payload-heavy calls (uploads, checkout)
    Upload,
}

/// One API call, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path beginning with `/`, e.g. `/orders/orders/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: TimeoutClass,
    /// Whether the stored access token is attached
    pub authenticated: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            timeout: TimeoutClass::Standard,
            authenticated: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append every `(key, value)` pair of a flat JSON object as query parameters.
    pub fn query_object(mut self, filters: &Value) -> Self {
        if let Value::Object(map) = filters {
            for (key, value) in map {
                let value = match value {
                    Value::Null => continue,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                self.query.push((key.clone(), value));
            }
        }
        self
    }

    pub fn upload(mut self) -> Self {
        self.timeout = TimeoutClass::Upload;
        self
    }

    /// Never attach the stored access token.
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// Status and decoded body of a received response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// JSON body; a non-JSON body is kept as a string, an empty body is `Null`
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Successful body, or the classified error.
    pub fn into_result(self) -> Result<Value, ApiError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(ApiError::from_status(self.status, &self.body))
        }
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let body = self.into_result()?;
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_object_flattens_values() {
        let req = ApiRequest::get("/orders/orders/").query_object(&json!({
            "status": "pending",
            "page": 2,
            "device_id": null
        }));

        assert!(req.query.contains(&("status".to_string(), "pending".to_string())));
        assert!(req.query.contains(&("page".to_string(), "2".to_string())));
        assert_eq!(req.query.len(), 2);
    }

    #[test]
    fn test_response_into_result() {
        assert_eq!(
            ApiResponse::new(201, json!({"id": 1})).into_result().unwrap(),
            json!({"id": 1})
        );
        let err = ApiResponse::new(404, json!({"detail": "gone"}))
            .into_result()
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
