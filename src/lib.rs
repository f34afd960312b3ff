pub mod config;
pub mod error;
pub mod fcm;
pub mod lifecycle;
pub mod media;
pub mod navigation;
pub mod payload;
pub mod queue;
pub mod router;
pub mod sink;
pub mod storage;

#[cfg(feature = "shell")]
mod shell;

pub use config::PushConfig;
pub use error::{PushError, PushResult};
pub use lifecycle::{LifecycleState, LifecycleTracker};
pub use payload::{DialogEvent, NotificationPayload, PushMessage, RawPushData};
pub use queue::NotificationQueue;
pub use router::{PushRouter, Route};

#[cfg(feature = "shell")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_notification::init())
        .plugin(tauri_plugin_deep_link::init())
        .invoke_handler(tauri::generate_handler![
            fcm::get_platform,
            fcm::is_push_supported,
            shell::handle_push,
            shell::get_queued_notifications,
            shell::has_queued_notifications,
            shell::set_on_home_page,
            shell::notification_opened,
            shell::get_pending_navigation,
            shell::clear_pending_navigation,
            shell::register_push_token,
            shell::get_fcm_token,
        ])
        .setup(|app| {
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }

            shell::setup(app.handle())?;
            Ok(())
        })
        .on_window_event(shell::handle_window_event)
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
