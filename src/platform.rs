// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Platform port: device metadata and push-token provisioning.

use async_trait::async_trait;

/// Best-effort description of the hardware and OS.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMetadata {
    pub device_name: String,
    pub model: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
}

/// What the session manager needs from the host platform.
#[async_trait]
pub trait Platform: Send + Sync {
    fn metadata(&self) -> DeviceMetadata;

    /// Ask the platform for a push-notification token.
    async fn push_token(&self) -> anyhow::Result<String>;
}

/// Fetch a push token, collapsing every failure to `None`.
pub async fn best_effort_push_token(platform: &dyn Platform) -> Option<String> {
    match platform.push_token().await {
        Ok(token) if !token.trim().is_empty() => Some(token),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "Push token unavailable, registering without one");
            None
        }
    }
}

/// Platform backed by the host process and static configuration.
#[derive(Debug, Clone)]
pub struct HostPlatform {
    device_name: String,
    push_token: Option<String>,
}

impl HostPlatform {
    pub fn new(device_name: impl Into<String>, push_token: Option<String>) -> Self {
        Self {
            device_name: device_name.into(),
            push_token,
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(config.device_name.clone(), config.push_token.clone())
    }
}

#[async_trait]
impl Platform for HostPlatform {
    fn metadata(&self) -> DeviceMetadata {
        DeviceMetadata {
            device_name: self.device_name.clone(),
            model: Some(std::env::consts::ARCH.to_string()),
            os_name: Some(std::env::consts::OS.to_string()),
            os_version: None,
        }
    }

    async fn push_token(&self) -> anyhow::Result<String> {
        self.push_token
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No push token provisioned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_token_failures_collapse_to_none() {
        let without = HostPlatform::new("Test", None);
        assert_eq!(best_effort_push_token(&without).await, None);

        let blank = HostPlatform::new("Test", Some("  ".to_string()));
        assert_eq!(best_effort_push_token(&blank).await, None);

        let with = HostPlatform::new("Test", Some("ExponentPushToken[x]".to_string()));
        assert_eq!(
            best_effort_push_token(&with).await.as_deref(),
            Some("ExponentPushToken[x]")
        );
    }

    #[test]
    fn test_host_metadata() {
        let meta = HostPlatform::new("Kitchen tablet", None).metadata();
        assert_eq!(meta.device_name, "Kitchen tablet");
        assert_eq!(meta.os_name.as_deref(), Some(std::env::consts::OS));
    }
}
