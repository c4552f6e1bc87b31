// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use food_delivery_client::gateway::{ApiRequest, ApiResponse, Gateway, Transport, TransportError};
use food_delivery_client::platform::{DeviceMetadata, Platform};
use food_delivery_client::storage::{keys, KeyValueStore, MemoryStore};
use food_delivery_client::SessionManager;
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How long `/orders/orders/history/` takes to answer.
#[allow(dead_code)]
pub const SLOW_RESPONSE: Duration = Duration::from_millis(200);

/// A registered backend account.
#[derive(Clone)]
struct Account {
    password: String,
    user: Value,
}

#[derive(Default)]
struct BackendState {
    accounts: HashMap<String, Account>,
    /// Access token the backend currently accepts
    valid_access: Option<String>,
    /// Refresh token the backend currently accepts
    valid_refresh: Option<String>,
    /// Username behind the current tokens
    current_user: Option<String>,
    issued: usize,
    refresh_delay: Duration,
    refresh_fails: bool,
    register_fails: bool,
    offline: bool,
    /// Protected endpoints answer 401 whatever token they get
    reject_protected: bool,
    login_override: Option<Value>,
    requests: Vec<(Method, String, Option<String>)>,
}

/// Scripted in-memory ordering API.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<BackendState>,
    refresh_calls: AtomicUsize,
    register_calls: AtomicUsize,
    login_calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    /// Add an account. `user_type` is the role discriminator.
    pub fn add_account(&self, id: u64, username: &str, password: &str, user_type: &str) {
        self.state().accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                user: json!({
                    "id": id,
                    "username": username,
                    "first_name": "Test",
                    "last_name": username,
                    "user_type": user_type,
                    "is_available": false,
                    "total_deliveries": 12
                }),
            },
        );
    }

    /// Pretend `username` already logged in with the given token pair.
    pub fn issue_tokens(&self, username: &str, access: &str, refresh: &str) {
        let mut state = self.state();
        state.valid_access = Some(access.to_string());
        state.valid_refresh = Some(refresh.to_string());
        state.current_user = Some(username.to_string());
    }

    /// Stop accepting the current access token. The refresh token still works.
    pub fn expire_access_token(&self) {
        self.state().valid_access = None;
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        self.state().refresh_delay = delay;
    }

    pub fn fail_refresh(&self) {
        self.state().refresh_fails = true;
    }

    pub fn fail_registration(&self, fail: bool) {
        self.state().register_fails = fail;
    }

    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    pub fn reject_protected(&self) {
        self.state().reject_protected = true;
    }

    /// Answer the next logins with `body` (status 200).
    pub fn override_login(&self, body: Value) {
        self.state().login_override = Some(body);
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    /// Bearer tokens sent to `path`, in order.
    pub fn bearers_for(&self, path: &str) -> Vec<Option<String>> {
        self.state()
            .requests
            .iter()
            .filter(|(_, p, _)| p == path)
            .map(|(_, _, bearer)| bearer.clone())
            .collect()
    }

    fn next_access(&self) -> String {
        let mut state = self.state();
        state.issued += 1;
        format!("a{}", state.issued + 1)
    }

    fn authorized(&self, bearer: Option<&str>) -> bool {
        let state = self.state();
        !state.reject_protected
            && bearer.is_some()
            && state.valid_access.as_deref() == bearer
    }

    fn current_account(&self) -> Option<Account> {
        let state = self.state();
        let username = state.current_user.as_ref()?;
        state.accounts.get(username).cloned()
    }

    fn login(&self, body: &Value) -> ApiResponse {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        if let Some(body) = state.login_override.clone() {
            return ApiResponse::new(200, body);
        }

        let username = body["username"].as_str().unwrap_or_default();
        let password = body["password"].as_str().unwrap_or_default();
        let Some(account) = state.accounts.get(username).cloned() else {
            return unauthorized("No active account found with the given credentials");
        };
        if account.password != password {
            return unauthorized("No active account found with the given credentials");
        }

        state.valid_access = Some("a1".to_string());
        state.valid_refresh = Some("r1".to_string());
        state.current_user = Some(username.to_string());
        ApiResponse::new(
            200,
            json!({ "access": "a1", "refresh": "r1", "user": account.user }),
        )
    }

    async fn refresh(&self, body: &Value) -> ApiResponse {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.state().refresh_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let accepted = {
            let state = self.state();
            !state.refresh_fails
                && state.valid_refresh.is_some()
                && state.valid_refresh.as_deref() == body["refresh"].as_str()
        };
        if !accepted {
            return unauthorized("Token is invalid or expired");
        }

        let access = self.next_access();
        self.state().valid_access = Some(access.clone());
        ApiResponse::new(200, json!({ "access": access }))
    }

    fn register(&self, body: &Value) -> ApiResponse {
        let n = self.register_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.state().register_fails {
            return ApiResponse::new(500, json!({ "detail": "Registration unavailable" }));
        }
        ApiResponse::new(
            201,
            json!({
                "id": n,
                "device_id": body["device_id"],
                "device_name": body["device_name"],
                "order_count": 0,
                "created_at": "2026-01-01T00:00:00Z"
            }),
        )
    }
}

fn unauthorized(detail: &str) -> ApiResponse {
    ApiResponse::new(401, json!({ "detail": detail }))
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, TransportError> {
        {
            let mut state = self.state();
            state.requests.push((
                request.method.clone(),
                request.path.clone(),
                bearer.map(str::to_string),
            ));
            if state.offline {
                return Err(TransportError::Connect("connection refused".to_string()));
            }
        }

        let body = request.body.clone().unwrap_or(Value::Null);
        let path = request.path.as_str();

        let response = match (request.method.as_str(), path) {
            ("POST", "/accounts/users/login/") => self.login(&body),
            ("POST", "/token/refresh/") => self.refresh(&body).await,
            ("POST", "/accounts/devices/register/") => self.register(&body),
            ("GET", "/accounts/users/me/") => {
                if !self.authorized(bearer) {
                    return Ok(unauthorized("Given token not valid for any token type"));
                }
                match self.current_account() {
                    Some(account) => ApiResponse::new(200, account.user),
                    None => unauthorized("User not found"),
                }
            }
            ("GET", "/menu/items/") => {
                // Public catalog, but a stale token is still rejected
                if bearer.is_some() && !self.authorized(bearer) {
                    unauthorized("Given token not valid for any token type")
                } else {
                    ApiResponse::new(200, json!([]))
                }
            }
            ("GET", "/orders/orders/history/") => {
                // Authorized on arrival, answered late
                let authorized = self.authorized(bearer);
                tokio::time::sleep(SLOW_RESPONSE).await;
                if !authorized {
                    return Ok(unauthorized("Given token not valid for any token type"));
                }
                ApiResponse::new(200, json!({ "results": [] }))
            }
            ("GET", "/orders/orders/active/") => {
                if !self.authorized(bearer) {
                    return Ok(unauthorized("Given token not valid for any token type"));
                }
                ApiResponse::new(200, json!({ "results": [{ "id": 31, "status": "ready" }] }))
            }
            ("POST", p)
                if p.starts_with("/accounts/users/") && p.ends_with("/toggle_availability/") =>
            {
                if !self.authorized(bearer) {
                    return Ok(unauthorized("Given token not valid for any token type"));
                }
                let mut state = self.state();
                let Some(username) = state.current_user.clone() else {
                    return Ok(unauthorized("User not found"));
                };
                let Some(account) = state.accounts.get_mut(&username) else {
                    return Ok(unauthorized("User not found"));
                };
                let flipped = !account.user["is_available"].as_bool().unwrap_or(false);
                account.user["is_available"] = json!(flipped);
                ApiResponse::new(200, json!({ "is_available": flipped }))
            }
            ("PATCH", p)
                if p.starts_with("/accounts/devices/") && p.ends_with("/update-info/") =>
            {
                let device_id = p
                    .trim_start_matches("/accounts/devices/")
                    .trim_end_matches("/update-info/");
                let mut record = json!({
                    "id": 1,
                    "device_id": device_id,
                    "order_count": 0
                });
                if let (Value::Object(record), Value::Object(update)) = (&mut record, &body) {
                    record.extend(update.clone());
                }
                ApiResponse::new(200, record)
            }
            _ => ApiResponse::new(404, json!({ "detail": "Not found." })),
        };
        Ok(response)
    }
}

/// Platform whose push-token provider always fails.
pub struct TestPlatform;

#[async_trait]
impl Platform for TestPlatform {
    fn metadata(&self) -> DeviceMetadata {
        DeviceMetadata {
            device_name: "Test Phone".to_string(),
            model: Some("Pixel Test".to_string()),
            os_name: Some("android".to_string()),
            os_version: Some("14".to_string()),
        }
    }

    async fn push_token(&self) -> anyhow::Result<String> {
        anyhow::bail!("Push notifications not permitted")
    }
}

/// Everything a session test needs, wired to one fake backend and store.
#[allow(dead_code)]
pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub store: MemoryStore,
    pub gateway: Gateway,
    pub session: SessionManager,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Harness over an existing store, as after an app restart.
    pub fn with_store(store: MemoryStore) -> Self {
        Self::with(FakeBackend::new(), store)
    }

    pub fn with(backend: Arc<FakeBackend>, store: MemoryStore) -> Self {
        let gateway = Gateway::new(backend.clone(), Arc::new(store.clone()));
        let session = SessionManager::new(gateway.clone(), Arc::new(TestPlatform));
        Self {
            backend,
            store,
            gateway,
            session,
        }
    }

    pub async fn stored(&self, key: &str) -> Option<String> {
        self.store.get(key).await.unwrap()
    }
}

/// Gateway over a fake backend whose stored tokens are `access`/`refresh`.
#[allow(dead_code)]
pub async fn delivery_gateway(access: &str, refresh: &str) -> (Arc<FakeBackend>, MemoryStore, Gateway) {
    let backend = FakeBackend::new();
    backend.add_account(4, "driver1", "correct", "delivery");
    backend.issue_tokens("driver1", access, refresh);

    let store = MemoryStore::new();
    store.set(keys::ACCESS_TOKEN, access).await.unwrap();
    store.set(keys::REFRESH_TOKEN, refresh).await.unwrap();

    let gateway = Gateway::new(backend.clone(), Arc::new(store.clone()));
    (backend, store, gateway)
}
