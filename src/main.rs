// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Food-Delivery Client CLI
//!
//! Drives the session core against a running ordering API:
//!
//! ```text
//! food-delivery-client status
//! food-delivery-client login <username> <password>
//! food-delivery-client toggle
//! food-delivery-client logout
//! food-delivery-client favorites
//! ```

use anyhow::Context;
use food_delivery_client::{
    config::Config,
    gateway::{Gateway, HttpTransport},
    models::LoginCredentials,
    platform::HostPlatform,
    storage::{FavoritesStore, FileStore},
    GatewayEvent, SessionManager, SessionPhase,
};
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validator::Validate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Starting food delivery client");

    let store = Arc::new(
        FileStore::open(&config.storage_path)
            .await
            .with_context(|| format!("Failed to open {}", config.storage_path.display()))?,
    );
    tracing::info!(path = %store.path().display(), "Key-value store opened");

    let transport = Arc::new(HttpTransport::new(&config));
    tracing::info!(base_url = transport.base_url(), "HTTP transport ready");
    let platform = Arc::new(HostPlatform::from_config(&config));

    let favorites = FavoritesStore::new(store.clone());
    let gateway = Gateway::new(transport, store);
    let mut events = gateway.subscribe();
    let mut session = SessionManager::new(gateway, platform);

    let phase = session.initialize().await;
    tracing::info!(%phase, "Session initialized");

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["status"] => {}
        ["login", username, password] => {
            let credentials = LoginCredentials::new(username, password);
            credentials
                .validate()
                .context("Invalid login form input")?;
            match session
                .login_delivery(&credentials.username, &credentials.password)
                .await
            {
                Ok(profile) => println!("Logged in as {}", profile.display_name()),
                Err(e) => println!("Login failed: {e}"),
            }
        }
        ["toggle"] => match session.toggle_delivery_availability().await {
            Ok(available) => println!("Available: {available}"),
            Err(e) => println!("Toggle failed: {e}"),
        },
        ["logout"] => session.logout().await,
        ["favorites"] => println!(
            "{}",
            favorites
                .export()
                .await
                .context("Failed to read favorites")?
        ),
        other => anyhow::bail!("Unknown command: {}", other.join(" ")),
    }

    // The gateway may have torn down delivery credentials along the way
    loop {
        match events.try_recv() {
            Ok(GatewayEvent::CredentialsRevoked) => session.handle_credentials_revoked().await,
            Ok(GatewayEvent::AccessTokenRefreshed) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
        }
    }

    print_status(&session);
    Ok(())
}

fn print_status(session: &SessionManager) {
    match session.phase() {
        SessionPhase::Delivery => {
            if let Some(profile) = session.delivery_profile() {
                println!(
                    "Delivery session: {} (available: {})",
                    profile.display_name(),
                    profile.is_available
                );
            }
        }
        SessionPhase::Client => {
            if let Some(device) = session.device() {
                println!(
                    "Client session: device {} ({})",
                    device.device_id,
                    if device.record.is_registered() {
                        "registered"
                    } else {
                        "not registered"
                    }
                );
            }
        }
        SessionPhase::Unauthenticated => println!("No session"),
    }
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("food_delivery_client=debug,info")
            }),
        )
        .with(format)
        .init();
}
