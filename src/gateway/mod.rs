// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP request gateway.
//!
//! Wraps a raw [`Transport`] with:
//! - Bearer attachment from the persisted access token
//! - Single-flight token refresh when a protected call gets a 401
//! - One replay per request with the refreshed token
//! - Forced teardown of delivery credentials when refresh is impossible

pub mod request;
pub mod retry;
pub mod transport;

pub use request::{ApiRequest, ApiResponse, TimeoutClass};
pub use retry::{retry_api_call, RetryPolicy};
pub use transport::{HttpTransport, Transport, TransportError};

use crate::error::ApiError;
use crate::models::RefreshResponse;
use crate::storage::{keys, KeyValueStore};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, oneshot};

/// Token refresh endpoint.
pub const REFRESH_PATH: &str = "/token/refresh/";

/// Paths whose 401 is returned as-is instead of triggering a refresh.
pub const NO_REFRESH_PATHS: [&str; 10] = [
    "/accounts/users/login/",
    REFRESH_PATH,
    "/accounts/devices/register/",
    "/accounts/users/password_reset_request/",
    "/accounts/users/password_reset_confirm/",
    "/menu/sizes/",
    "/menu/items/",
    "/menu/categories/",
    "/orders/carts/my_cart/",
    "/orders/carts/",
];

/// Whether a 401 on `path` is surfaced without a refresh attempt.
pub fn is_refresh_exempt(path: &str) -> bool {
    NO_REFRESH_PATHS.iter().any(|exempt| path.contains(exempt))
}

/// Credential lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEvent {
    AccessTokenRefreshed,
    /// Refresh was impossible and delivery credentials were wiped.
    CredentialsRevoked,
}

type RefreshOutcome = Result<String, ApiError>;

/// Callers parked behind the in-flight refresh.
#[derive(Default)]
struct RefreshQueue {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
    /// Last successful rotation: (rejected token, replacement)
    last_rotation: Option<(Option<String>, String)>,
}

struct GatewayInner {
    transport: Arc<dyn Transport>,
    store: Arc<dyn KeyValueStore>,
    queue: Mutex<RefreshQueue>,
    events: broadcast::Sender<GatewayEvent>,
}

impl GatewayInner {
    fn queue(&self) -> MutexGuard<'_, RefreshQueue> {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Authenticated API gateway. Clones share the refresh queue.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

enum Slot {
    Leader(RefreshFlight),
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

impl Gateway {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(GatewayInner {
                transport,
                store,
                queue: Mutex::new(RefreshQueue::default()),
                events,
            }),
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.inner.events.subscribe()
    }

    /// Send a request and return its JSON body.
    pub async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        self.execute(&request).await?.into_result()
    }

    /// Send a request and deserialize its body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.execute(&request).await?.decode()
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.send(ApiRequest::post(path).with_body(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.send(ApiRequest::patch(path).with_body(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Run a request through attachment and the refresh protocol.
    ///
    /// Returns the final response whatever its status; only a missing
    /// response or an unrecoverable 401 is an `Err`.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let token = if request.authenticated {
            self.access_token().await?
        } else {
            None
        };

        let response = self.dispatch(request, token.as_deref()).await?;

        if response.status != 401 || !request.authenticated || is_refresh_exempt(&request.path) {
            return Ok(response);
        }

        let original = ApiError::from_status(response.status, &response.body);
        tracing::debug!(path = %request.path, "Access token rejected, recovering");

        let fresh = self.recover(token.as_deref(), original).await?;

        // Replayed once; a second 401 goes back to the caller untouched.
        self.dispatch(request, Some(&fresh)).await
    }

    /// Currently persisted access token.
    pub async fn access_token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.inner.store.get(keys::ACCESS_TOKEN).await?)
    }

    /// Remove delivery tokens and profile without announcing a revocation.
    pub async fn clear_credentials(&self) -> Result<(), ApiError> {
        self.inner.queue().last_rotation = None;
        self.inner
            .store
            .remove_many(&keys::DELIVERY_CREDENTIALS)
            .await?;
        Ok(())
    }

    /// Forced teardown after an unrecoverable refresh.
    pub async fn revoke_credentials(&self) {
        if let Err(e) = self.clear_credentials().await {
            tracing::error!(error = %e, "Failed to wipe delivery credentials");
        }
        tracing::info!("Delivery credentials revoked");
        let _ = self.inner.events.send(GatewayEvent::CredentialsRevoked);
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        self.inner
            .transport
            .send(request, bearer)
            .await
            .map_err(|e| {
                tracing::warn!(path = %request.path, error = %e, "No response from server");
                ApiError::Connectivity(e.to_string())
            })
    }

    /// Obtain a usable access token after `stale` was rejected.
    async fn recover(&self, stale: Option<&str>, original: ApiError) -> RefreshOutcome {
        // Someone else may have stored a different token since this request left.
        if let Some(current) = self.access_token().await? {
            if stale != Some(current.as_str()) {
                return Ok(current);
            }
        }

        let slot = {
            let mut queue = self.inner.queue();
            if let Some((replaced, fresh)) = &queue.last_rotation {
                if replaced.as_deref() == stale {
                    return Ok(fresh.clone());
                }
            }
            if queue.in_flight {
                let (tx, rx) = oneshot::channel();
                queue.waiters.push(tx);
                Slot::Waiter(rx)
            } else {
                queue.in_flight = true;
                Slot::Leader(RefreshFlight {
                    inner: self.inner.clone(),
                    settled: false,
                })
            }
        };

        let flight = match slot {
            Slot::Waiter(rx) => {
                tracing::debug!("Token refresh in flight, queueing request");
                return match rx.await {
                    Ok(outcome) => outcome,
                    // Leader dropped before settling
                    Err(_) => Err(original),
                };
            }
            Slot::Leader(flight) => flight,
        };

        match self.refresh_access_token().await {
            Ok(fresh) => {
                flight.settle(Ok(fresh.clone()), stale);
                let _ = self.inner.events.send(GatewayEvent::AccessTokenRefreshed);
                Ok(fresh)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, logging out");
                // Still in flight while wiping, so late 401s queue instead of refreshing again
                self.revoke_credentials().await;
                flight.settle(Err(original.clone()), stale);
                Err(original)
            }
        }
    }

    async fn refresh_access_token(&self) -> RefreshOutcome {
        let refresh = self
            .inner
            .store
            .get(keys::REFRESH_TOKEN)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("No refresh token available".to_string()))?;

        tracing::info!("Refreshing access token");

        let request = ApiRequest::post(REFRESH_PATH)
            .with_body(json!({ "refresh": refresh }))
            .anonymous();
        let tokens: RefreshResponse = self.dispatch(&request, None).await?.decode()?;

        self.inner
            .store
            .set(keys::ACCESS_TOKEN, &tokens.access)
            .await?;
        if let Some(rotated) = &tokens.refresh {
            self.inner.store.set(keys::REFRESH_TOKEN, rotated).await?;
        }

        tracing::info!("Access token refreshed");
        Ok(tokens.access)
    }
}

/// Ownership of the in-flight refresh.
///
/// Settling hands the outcome to every waiter. Dropping it unsettled clears
/// the queue, which rejects the waiters through their closed channels.
struct RefreshFlight {
    inner: Arc<GatewayInner>,
    settled: bool,
}

impl RefreshFlight {
    fn settle(mut self, outcome: RefreshOutcome, replaced: Option<&str>) {
        let waiters = {
            let mut queue = self.inner.queue();
            queue.in_flight = false;
            queue.last_rotation = match &outcome {
                Ok(fresh) => Some((replaced.map(str::to_string), fresh.clone())),
                Err(_) => None,
            };
            std::mem::take(&mut queue.waiters)
        };
        self.settled = true;

        tracing::debug!(
            waiters = waiters.len(),
            success = outcome.is_ok(),
            "Token refresh settled"
        );
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for RefreshFlight {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut queue = self.inner.queue();
        queue.in_flight = false;
        queue.waiters.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exempt_paths() {
        assert!(is_refresh_exempt("/accounts/users/login/"));
        assert!(is_refresh_exempt("/token/refresh/"));
        assert!(is_refresh_exempt("/menu/items/jollof-rice/"));
        assert!(is_refresh_exempt("/orders/carts/12/add_item/"));

        assert!(!is_refresh_exempt("/accounts/users/me/"));
        assert!(!is_refresh_exempt("/orders/orders/active/"));
        assert!(!is_refresh_exempt("/accounts/devices/abc/update-info/"));
    }
}
