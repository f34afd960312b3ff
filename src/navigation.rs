//! Deep link waiting for the UI after a notification tap.

use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct PendingNavigation {
    url: Mutex<Option<String>>,
}

impl PendingNavigation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `url`, replacing any earlier one. Blank links are ignored.
    pub fn record(&self, url: &str) -> bool {
        let url = url.trim();
        if url.is_empty() {
            return false;
        }
        log::debug!("[NAV] pending deep link {}", url);
        *self.url.lock() = Some(url.to_string());
        true
    }

    pub fn pending(&self) -> Option<String> {
        self.url.lock().clone()
    }

    pub fn take(&self) -> Option<String> {
        self.url.lock().take()
    }

    pub fn clear(&self) {
        *self.url.lock() = None;
    }
}
