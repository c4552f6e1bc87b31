// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for identities, sessions and API payloads.

pub mod backup;
pub mod delivery;
pub mod device;

pub use backup::SessionBackup;
pub use delivery::{
    DeliveryProfile, DeliverySession, LoginCredentials, LoginResponse, RefreshResponse,
    DELIVERY_ROLE,
};
pub use device::{ClientInfoUpdate, DeviceIdentity, DeviceRecord, DeviceRegistration};
