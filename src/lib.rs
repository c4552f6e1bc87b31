// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Food-Delivery Client: session and request core for the ordering app
//!
//! This crate keeps one process in exactly one of two sessions, an anonymous
//! customer device or a logged-in delivery person, and routes every API call
//! through a gateway that refreshes expired delivery tokens once for all
//! concurrent callers.

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod platform;
pub mod services;
pub mod session;
pub mod storage;

pub use error::{ApiError, FailureKind, LoginError, SessionError};
pub use gateway::{Gateway, GatewayEvent};
pub use session::{SessionManager, SessionPhase, SessionState};
