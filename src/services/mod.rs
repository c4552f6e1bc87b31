// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - typed wrappers over the ordering API.
//!
//! Every call goes through the [`Gateway`](crate::gateway::Gateway), so token
//! attachment and refresh apply uniformly.

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod devices;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod ratings;

pub use accounts::AccountsApi;
pub use cart::CartApi;
pub use catalog::CatalogApi;
pub use devices::DevicesApi;
pub use notifications::NotificationsApi;
pub use orders::OrdersApi;
pub use payments::PaymentsApi;
pub use ratings::RatingsApi;

use std::borrow::Cow;

/// Percent-encode one path segment (slugs, device ids, order numbers).
pub(crate) fn segment(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}
