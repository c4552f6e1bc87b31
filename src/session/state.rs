// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session states.

use crate::models::{DeliveryProfile, DeliverySession, DeviceIdentity};
use std::fmt;

/// Who the app is acting as. Exactly one at any time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Nothing resolved yet (only before `initialize` completes)
    #[default]
    Unauthenticated,
    /// Anonymous customer device
    Client(DeviceIdentity),
    /// Logged-in delivery person; the client identity sits in the backup
    Delivery(DeliverySession),
}

/// Data-free discriminant of [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Client,
    Delivery,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Unauthenticated => "unauthenticated",
            SessionPhase::Client => "client",
            SessionPhase::Delivery => "delivery",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Unauthenticated => SessionPhase::Unauthenticated,
            SessionState::Client(_) => SessionPhase::Client,
            SessionState::Delivery(_) => SessionPhase::Delivery,
        }
    }

    pub fn device(&self) -> Option<&DeviceIdentity> {
        match self {
            SessionState::Client(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn delivery(&self) -> Option<&DeliverySession> {
        match self {
            SessionState::Delivery(session) => Some(session),
            _ => None,
        }
    }

    pub fn delivery_profile(&self) -> Option<&DeliveryProfile> {
        self.delivery().map(|session| &session.profile)
    }
}
