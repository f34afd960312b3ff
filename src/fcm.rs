//! FCM (Firebase Cloud Messaging) registration and platform queries.
//!
//! The messaging service hands out a registration token whenever it rotates
//! one; the registry keeps the latest so the WebView can send it to the
//! backend for push targeting.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Result type for FCM token lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcmTokenResult {
    pub token: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub struct PushTokenRegistry {
    token: RwLock<Option<String>>,
}

impl PushTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a refreshed token. Blank tokens are ignored.
    pub fn on_new_token(&self, token: &str) -> bool {
        let token = token.trim();
        if token.is_empty() {
            log::warn!("[FCM] ignoring blank registration token");
            return false;
        }
        log::info!("[FCM] registration token refreshed");
        *self.token.write() = Some(token.to_string());
        true
    }

    pub fn current(&self) -> Option<String> {
        self.token.read().clone()
    }

    pub fn token_result(&self) -> FcmTokenResult {
        match self.current() {
            Some(token) => FcmTokenResult {
                token: Some(token),
                error: None,
            },
            None if is_push_supported() => FcmTokenResult {
                token: None,
                error: Some("No registration token received yet".to_string()),
            },
            None => FcmTokenResult {
                token: None,
                error: Some("Push notifications not available on desktop".to_string()),
            },
        }
    }
}

/// Get the current platform type
///
/// Returns:
/// - "android" on Android devices
/// - "ios" on iOS devices
/// - "desktop" on desktop platforms
#[cfg_attr(feature = "shell", tauri::command)]
pub fn get_platform() -> String {
    #[cfg(target_os = "android")]
    {
        "android".to_string()
    }
    #[cfg(target_os = "ios")]
    {
        "ios".to_string()
    }
    #[cfg(not(any(target_os = "android", target_os = "ios")))]
    {
        "desktop".to_string()
    }
}

/// Check if push notifications are supported on this platform
#[cfg_attr(feature = "shell", tauri::command)]
pub fn is_push_supported() -> bool {
    cfg!(any(target_os = "android", target_os = "ios"))
}
