// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dual-session management: anonymous client device vs. delivery login.

pub mod manager;
pub mod state;

pub use manager::SessionManager;
pub use state::{SessionPhase, SessionState};
