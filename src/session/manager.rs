// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session manager.
//!
//! Owns the current [`SessionState`] and every transition between client and
//! delivery mode:
//! - `initialize` resumes a delivery login or resolves the device identity
//! - `login_delivery` backs up the client identity before trying to log in,
//!   and restores it on any failure
//! - `logout` always lands in client mode, restoring the backup when leaving
//!   delivery mode
//!
//! Operations take `&mut self`; one manager never runs two transitions at once.

use super::state::{SessionPhase, SessionState};
use crate::error::{ApiError, LoginError, SessionError};
use crate::gateway::Gateway;
use crate::models::{
    ClientInfoUpdate, DeliveryProfile, DeliverySession, DeviceIdentity, DeviceRecord,
    DeviceRegistration, SessionBackup,
};
use crate::platform::{best_effort_push_token, Platform};
use crate::services::{AccountsApi, DevicesApi};
use crate::storage::{get_json, keys, set_json, KeyValueStore, StoreError};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;

pub struct SessionManager {
    gateway: Gateway,
    accounts: AccountsApi,
    devices: DevicesApi,
    store: Arc<dyn KeyValueStore>,
    platform: Arc<dyn Platform>,
    state: SessionState,
}

impl SessionManager {
    /// Create a manager in the `Unauthenticated` state. Call [`initialize`](Self::initialize) next.
    pub fn new(gateway: Gateway, platform: Arc<dyn Platform>) -> Self {
        Self {
            accounts: AccountsApi::new(gateway.clone()),
            devices: DevicesApi::new(gateway.clone()),
            store: gateway.store().clone(),
            gateway,
            platform,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn device(&self) -> Option<&DeviceIdentity> {
        self.state.device()
    }

    pub fn delivery_profile(&self) -> Option<&DeliveryProfile> {
        self.state.delivery_profile()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    // ─── Startup ─────────────────────────────────────────────────────────────

    /// Resolve the session from persisted state. Never fails; ends in
    /// `Client` or `Delivery`.
    pub async fn initialize(&mut self) -> SessionPhase {
        if let Some(session) = self.resume_delivery().await {
            tracing::info!(user_id = session.profile.id, "Resumed delivery session");
            self.state = SessionState::Delivery(session);
        } else {
            let identity = self.resolve_client().await;
            tracing::info!(device_id = %identity.device_id, "Client session ready");
            self.state = SessionState::Client(identity);
        }
        self.phase()
    }

    /// Validate a persisted token pair against the profile endpoint.
    async fn resume_delivery(&self) -> Option<DeliverySession> {
        self.read(keys::ACCESS_TOKEN).await?;
        self.read(keys::REFRESH_TOKEN).await?;

        match self.accounts.profile().await {
            Ok(profile) if profile.is_delivery() => {
                self.persist_profile(&profile).await;
                // The profile call may have refreshed the access token
                Some(DeliverySession {
                    access_token: self.read(keys::ACCESS_TOKEN).await?,
                    refresh_token: self.read(keys::REFRESH_TOKEN).await?,
                    profile,
                })
            }
            Ok(profile) => {
                tracing::warn!(
                    role = %profile.user_type,
                    "Stored credentials do not belong to a delivery account"
                );
                self.discard_credentials().await;
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not resume delivery session");
                self.discard_credentials().await;
                None
            }
        }
    }

    /// Read or create the device identity. Network failures degrade to a
    /// local-only identity.
    async fn resolve_client(&self) -> DeviceIdentity {
        let device_id = self.resolve_device_id().await;

        match get_json::<DeviceRecord>(self.store.as_ref(), keys::DEVICE_RECORD).await {
            Ok(Some(record)) if record.device_id == device_id && record.is_registered() => {
                return DeviceIdentity::new(device_id, record);
            }
            Ok(Some(record)) if record.device_id == device_id => {
                tracing::info!(
                    device_id = %device_id,
                    "Stored device record was never registered, retrying"
                );
            }
            Ok(Some(record)) => {
                tracing::warn!(
                    stored = %record.device_id,
                    device_id = %device_id,
                    "Stored device record belongs to another device id, re-registering"
                );
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read device record"),
        }

        self.register_device(&device_id).await
    }

    async fn resolve_device_id(&self) -> String {
        if let Some(id) = self.read(keys::DEVICE_ID).await {
            return id;
        }

        if let Some(legacy) = self.read(keys::LEGACY_DEVICE_ID).await {
            tracing::info!(device_id = %legacy, "Migrating legacy device id");
            self.write(keys::DEVICE_ID, &legacy).await;
            return legacy;
        }

        let id = uuid::Uuid::new_v4().to_string();
        tracing::info!(device_id = %id, "Generated new device id");
        self.write(keys::DEVICE_ID, &id).await;
        id
    }

    async fn register_device(&self, device_id: &str) -> DeviceIdentity {
        let push_token = best_effort_push_token(self.platform.as_ref()).await;
        let registration =
            DeviceRegistration::new(device_id, self.platform.metadata(), push_token);

        match self.devices.register(&registration).await {
            Ok(mut record) => {
                if record.device_id.is_empty() {
                    record.device_id = device_id.to_string();
                }
                if record.registered_at.is_none() {
                    record.registered_at = Some(Utc::now());
                }
                if let Err(e) = set_json(self.store.as_ref(), keys::DEVICE_RECORD, &record).await {
                    tracing::warn!(error = %e, "Failed to persist device record");
                }
                tracing::info!(device_id, server_id = ?record.id, "Device registered");
                DeviceIdentity::new(device_id, record)
            }
            Err(e) => {
                tracing::warn!(
                    device_id,
                    error = %e,
                    "Device registration failed, continuing with local identity"
                );
                DeviceIdentity::new(device_id, DeviceRecord::unregistered(device_id))
            }
        }
    }

    // ─── Delivery login ──────────────────────────────────────────────────────

    /// Log in as a delivery person.
    ///
    /// The client identity is backed up first. On any failure the identity is
    /// restored from that backup and the manager stays in client mode. Refused
    /// while a delivery session is active, which is then left untouched.
    pub async fn login_delivery(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<DeliveryProfile, LoginError> {
        if self.phase() == SessionPhase::Delivery {
            return Err(LoginError::SessionActive);
        }

        self.backup_client_identity().await;

        match self.attempt_login(username, password).await {
            Ok(session) => {
                tracing::info!(
                    user_id = session.profile.id,
                    username = %session.profile.username,
                    "Delivery login succeeded"
                );
                let profile = session.profile.clone();
                self.state = SessionState::Delivery(session);
                Ok(profile)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Delivery login failed, restoring client session");
                self.discard_credentials().await;
                let identity = self.restore_client_identity().await;
                self.state = SessionState::Client(identity);
                Err(e)
            }
        }
    }

    async fn attempt_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<DeliverySession, LoginError> {
        let response = self.accounts.login(username, password).await?;

        let (Some(access), Some(refresh), Some(user)) =
            (response.access, response.refresh, response.user)
        else {
            return Err(LoginError::IncompleteResponse);
        };
        if access.is_empty() || refresh.is_empty() {
            return Err(LoginError::IncompleteResponse);
        }

        let profile: DeliveryProfile =
            serde_json::from_value(user).map_err(|_| LoginError::IncompleteResponse)?;
        if !profile.is_delivery() {
            return Err(LoginError::RoleMismatch {
                role: profile.user_type,
            });
        }

        let session = DeliverySession {
            access_token: access,
            refresh_token: refresh,
            profile,
        };
        self.persist_delivery(&session)
            .await
            .map_err(|e| LoginError::Unexpected(e.to_string()))?;
        Ok(session)
    }

    async fn persist_delivery(&self, session: &DeliverySession) -> Result<(), StoreError> {
        self.store
            .set(keys::ACCESS_TOKEN, &session.access_token)
            .await?;
        self.store
            .set(keys::REFRESH_TOKEN, &session.refresh_token)
            .await?;
        set_json(self.store.as_ref(), keys::DELIVERY_PROFILE, &session.profile).await
    }

    /// Snapshot the active client identity, keeping the stored record bytes.
    async fn backup_client_identity(&self) {
        let SessionState::Client(identity) = &self.state else {
            tracing::debug!(phase = %self.phase(), "No active client identity to back up");
            return;
        };

        let stored = self.read(keys::DEVICE_RECORD).await.filter(|raw| {
            serde_json::from_str::<DeviceRecord>(raw).ok().as_ref() == Some(&identity.record)
        });
        let raw = match stored {
            Some(raw) => raw,
            None => match serde_json::to_string(&identity.record) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize device record for backup");
                    return;
                }
            },
        };

        let backup = SessionBackup::capture(identity, raw);
        match set_json(self.store.as_ref(), keys::SESSION_BACKUP, &backup).await {
            Ok(()) => tracing::debug!(device_id = %identity.device_id, "Client session backed up"),
            Err(e) => tracing::error!(error = %e, "Failed to back up client session"),
        }
    }

    /// Bring back the client identity from the backup, or rebuild one.
    async fn restore_client_identity(&self) -> DeviceIdentity {
        match self.take_backup().await {
            Some(identity) => identity,
            None => self.resolve_client().await,
        }
    }

    async fn take_backup(&self) -> Option<DeviceIdentity> {
        let backup = match get_json::<SessionBackup>(self.store.as_ref(), keys::SESSION_BACKUP).await
        {
            Ok(Some(backup)) => backup,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session backup");
                return None;
            }
        };

        let identity = match backup.identity() {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "Session backup is unreadable, ignoring it");
                return None;
            }
        };

        self.write(keys::DEVICE_ID, &backup.device_id).await;
        if identity.record.is_registered() {
            self.write(keys::DEVICE_RECORD, &backup.device_record).await;
        } else if let Err(e) = self.store.remove(keys::DEVICE_RECORD).await {
            // A local-only record must stay unpersisted so the next launch registers
            tracing::warn!(error = %e, "Failed to clear unregistered device record");
        }
        if let Err(e) = self.store.remove(keys::SESSION_BACKUP).await {
            tracing::warn!(error = %e, "Failed to clear used session backup");
        }

        tracing::info!(
            device_id = %identity.device_id,
            captured_at = %backup.captured_at,
            "Client session restored from backup"
        );
        Some(identity)
    }

    // ─── Logout ──────────────────────────────────────────────────────────────

    /// Leave the current session. Always ends in `Client`.
    pub async fn logout(&mut self) {
        match self.phase() {
            SessionPhase::Delivery => {
                self.discard_credentials().await;
                let identity = self.restore_client_identity().await;
                tracing::info!(device_id = %identity.device_id, "Delivery session closed");
                self.state = SessionState::Client(identity);
            }
            SessionPhase::Client => {
                tracing::info!("Resetting client session");
                self.state = SessionState::Unauthenticated;
                if let Err(e) = self.store.remove(keys::DEVICE_RECORD).await {
                    tracing::warn!(error = %e, "Failed to clear device record");
                }
                let identity = self.resolve_client().await;
                self.state = SessionState::Client(identity);
            }
            SessionPhase::Unauthenticated => {
                let identity = self.resolve_client().await;
                self.state = SessionState::Client(identity);
            }
        }
    }

    /// React to the gateway wiping credentials after a failed refresh.
    pub async fn handle_credentials_revoked(&mut self) {
        if self.phase() == SessionPhase::Delivery {
            tracing::info!("Delivery credentials revoked, returning to client mode");
            self.logout().await;
        }
    }

    // ─── Delivery operations ─────────────────────────────────────────────────

    /// Flip availability server-side, then mirror it locally. Returns the new flag.
    pub async fn toggle_delivery_availability(&mut self) -> Result<bool, SessionError> {
        let user_id = self.delivery_session_mut()?.profile.id;

        let body = self.accounts.toggle_availability(user_id).await?;

        let session = self.delivery_session_mut()?;
        let available = body
            .get("is_available")
            .and_then(Value::as_bool)
            .unwrap_or(!session.profile.is_available);
        session.profile.is_available = available;
        let profile = session.profile.clone();

        self.persist_profile(&profile).await;
        tracing::info!(user_id, available, "Delivery availability changed");
        Ok(available)
    }

    /// Re-fetch the delivery profile (statistics, availability).
    pub async fn refresh_delivery_profile(&mut self) -> Result<DeliveryProfile, SessionError> {
        self.delivery_session_mut()?;

        let profile = self.accounts.profile().await?;
        if !profile.is_delivery() {
            tracing::warn!(role = %profile.user_type, "Account is no longer a delivery account");
            self.logout().await;
            return Err(ApiError::Forbidden("Not a delivery account".to_string()).into());
        }

        self.persist_profile(&profile).await;
        self.delivery_session_mut()?.profile = profile.clone();
        Ok(profile)
    }

    fn delivery_session_mut(&mut self) -> Result<&mut DeliverySession, SessionError> {
        let actual = self.phase().as_str();
        match &mut self.state {
            SessionState::Delivery(session) => Ok(session),
            _ => Err(SessionError::WrongState {
                expected: SessionPhase::Delivery.as_str(),
                actual,
            }),
        }
    }

    // ─── Client operations ───────────────────────────────────────────────────

    /// Update customer details. The local record changes only after the server accepts.
    pub async fn update_client_info(
        &mut self,
        update: ClientInfoUpdate,
    ) -> Result<DeviceIdentity, SessionError> {
        let device_id = self.client_identity_mut()?.device_id.clone();
        if device_id.is_empty() {
            return Err(SessionError::MissingDeviceId);
        }

        let body = self.devices.update_info(&device_id, &update).await?;

        let identity = self.client_identity_mut()?;
        let mut record = identity.record.clone();
        record.apply(&update);
        // Prefer the server's copy when it echoes the full record
        if let Ok(mut echoed) = serde_json::from_value::<DeviceRecord>(body) {
            if echoed.device_id == device_id {
                echoed.registered_at = echoed.registered_at.or(record.registered_at);
                record = echoed;
            }
        }
        identity.record = record;
        let identity = identity.clone();

        if let Err(e) = set_json(self.store.as_ref(), keys::DEVICE_RECORD, &identity.record).await
        {
            tracing::warn!(error = %e, "Failed to persist updated device record");
        }
        tracing::info!(device_id = %device_id, "Client info updated");
        Ok(identity)
    }

    fn client_identity_mut(&mut self) -> Result<&mut DeviceIdentity, SessionError> {
        let actual = self.phase().as_str();
        match &mut self.state {
            SessionState::Client(identity) => Ok(identity),
            _ => Err(SessionError::WrongState {
                expected: SessionPhase::Client.as_str(),
                actual,
            }),
        }
    }

    // ─── Storage helpers ─────────────────────────────────────────────────────

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read stored value");
                None
            }
        }
    }

    async fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value).await {
            tracing::warn!(key, error = %e, "Failed to write stored value");
        }
    }

    async fn persist_profile(&self, profile: &DeliveryProfile) {
        if let Err(e) = set_json(self.store.as_ref(), keys::DELIVERY_PROFILE, profile).await {
            tracing::warn!(error = %e, "Failed to persist delivery profile");
        }
    }

    async fn discard_credentials(&self) {
        if let Err(e) = self.gateway.clear_credentials().await {
            tracing::warn!(error = %e, "Failed to clear delivery credentials");
        }
    }
}
