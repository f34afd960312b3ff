//! Push routing policy.
//!
//! Each inbound push goes to exactly one place, decided by the lifecycle
//! flags at the moment it arrives:
//!
//! | foreground | on home | route                |
//! |------------|---------|----------------------|
//! | yes        | yes     | in-app dialog        |
//! | yes        | no      | deferred queue       |
//! | no         | any     | system notification  |
//!
//! Nothing here fails outward. Sink, storage and image errors are logged and
//! the message degrades (a notification without its picture, a dropped
//! enqueue) instead of aborting the route.

use std::sync::Arc;

use crate::config::PushConfig;
use crate::error::PushResult;
use crate::lifecycle::{LifecycleState, LifecycleTracker};
use crate::media::{FetchedImage, ImageFetcher};
use crate::navigation::PendingNavigation;
use crate::payload::{NotificationPayload, PushMessage, RawPushData};
use crate::queue::NotificationQueue;
use crate::sink::{DialogSink, SystemNotification, SystemNotifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dialog,
    Deferred,
    SystemNotification,
}

impl Route {
    pub fn decide(state: LifecycleState) -> Self {
        match (state.is_foreground, state.is_on_home) {
            (true, true) => Route::Dialog,
            (true, false) => Route::Deferred,
            (false, _) => Route::SystemNotification,
        }
    }
}

pub struct PushRouter {
    lifecycle: Arc<LifecycleTracker>,
    queue: Arc<NotificationQueue>,
    navigation: Arc<PendingNavigation>,
    dialog: Arc<dyn DialogSink>,
    notifier: Arc<dyn SystemNotifier>,
    images: Arc<dyn ImageFetcher>,
    default_type: String,
}

impl PushRouter {
    pub fn new(
        lifecycle: Arc<LifecycleTracker>,
        queue: Arc<NotificationQueue>,
        dialog: Arc<dyn DialogSink>,
        notifier: Arc<dyn SystemNotifier>,
        images: Arc<dyn ImageFetcher>,
    ) -> Self {
        Self {
            lifecycle,
            queue,
            navigation: Arc::new(PendingNavigation::new()),
            dialog,
            notifier,
            images,
            default_type: PushConfig::default().default_message_type,
        }
    }

    pub fn with_config(mut self, config: &PushConfig) -> Self {
        self.default_type = config.default_message_type.clone();
        self
    }

    pub fn with_navigation(mut self, navigation: Arc<PendingNavigation>) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn lifecycle(&self) -> &LifecycleTracker {
        &self.lifecycle
    }

    pub fn navigation(&self) -> &PendingNavigation {
        &self.navigation
    }

    /// Route one inbound push. Identical pushes are routed independently.
    pub fn handle_incoming(&self, raw: &RawPushData) -> Route {
        let message = PushMessage::from_raw(raw, &self.default_type);
        let state = self.lifecycle.snapshot();
        let route = Route::decide(state);
        log::info!(
            "[PUSH] '{}' type={} foreground={} on_home={} -> {:?}",
            message.title,
            message.message_type,
            state.is_foreground,
            state.is_on_home,
            route
        );

        match route {
            Route::Dialog => {
                if let Err(e) = self.dialog.show_dialog(&message.to_dialog_event()) {
                    log::error!("[PUSH] dialog event not delivered: {}", e);
                }
            },
            Route::Deferred => {
                let payload = message.to_payload(now_millis());
                if let Err(e) = self.queue.enqueue(payload) {
                    log::error!("[PUSH] failed to queue notification: {}", e);
                }
            },
            Route::SystemNotification => self.show_system_notification(&message),
        }
        route
    }

    /// Drain API for the UI: every queued payload, oldest first. Clears the queue.
    pub fn drain_queued(&self) -> PushResult<Vec<NotificationPayload>> {
        self.queue.dequeue_all()
    }

    pub fn has_queued(&self) -> bool {
        self.queue.has_pending()
    }

    pub fn set_on_home_page(&self, on_home: bool) {
        self.lifecycle.set_on_home_page(on_home);
    }

    /// App came back to the foreground. Returns whether the UI should drain.
    pub fn on_resume(&self) -> bool {
        self.lifecycle.on_foreground_enter();
        self.queue.has_pending()
    }

    pub fn on_background(&self) {
        self.lifecycle.on_foreground_exit();
    }

    /// A system notification (or OS deep link) was opened.
    pub fn notification_opened(&self, deep_link: &str) -> bool {
        self.navigation.record(deep_link)
    }

    fn show_system_notification(&self, message: &PushMessage) {
        let image = message.image_url.as_deref().and_then(|url| self.fetch_image(url));
        let notification = SystemNotification {
            id: SystemNotification::id_from_millis(now_millis()),
            title: message.title.clone(),
            body: message.body.clone(),
            message_type: message.message_type.clone(),
            deep_link: message.deep_link.clone(),
            image,
        };
        if let Err(e) = self.notifier.notify(&notification) {
            log::error!("[PUSH] system notification failed: {}", e);
        }
    }

    fn fetch_image(&self, url: &str) -> Option<FetchedImage> {
        match self.images.fetch(url) {
            Ok(image) => Some(image),
            Err(e) => {
                log::warn!("[PUSH] image {} unavailable, showing text only: {}", url, e);
                None
            },
        }
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
