//! Outbound surfaces the router dispatches to.

use serde::Serialize;

use crate::error::PushResult;
use crate::media::FetchedImage;
use crate::payload::DialogEvent;

/// Receives pushes that should appear as an in-app dialog right now.
pub trait DialogSink: Send + Sync {
    fn show_dialog(&self, event: &DialogEvent) -> PushResult<()>;
}

/// Platform notification tray.
pub trait SystemNotifier: Send + Sync {
    fn notify(&self, notification: &SystemNotification) -> PushResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemNotification {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub message_type: String,
    /// Carried into the tap action so the app can navigate on launch.
    pub deep_link: Option<String>,
    #[serde(skip)]
    pub image: Option<FetchedImage>,
}

impl SystemNotification {
    /// Ids come from the wall clock, truncated to the platform's `i32`.
    pub fn id_from_millis(millis: i64) -> i32 {
        millis as i32
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}
