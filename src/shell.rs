//! Tauri bindings for the push router.
//!
//! The WebView talks to the router through the commands below; the router
//! talks back through `push://` events and the notification plugin.

use std::path::PathBuf;
use std::sync::Arc;

use tauri::{AppHandle, Emitter, Manager, State, Window, WindowEvent};
use tauri_plugin_deep_link::DeepLinkExt;
use tauri_plugin_notification::{Attachment, NotificationExt};

use crate::config::PushConfig;
use crate::error::{PushError, PushResult};
use crate::fcm::{FcmTokenResult, PushTokenRegistry};
use crate::lifecycle::LifecycleTracker;
use crate::media::HttpImageFetcher;
use crate::payload::{DialogEvent, NotificationPayload, RawPushData};
use crate::queue::NotificationQueue;
use crate::router::PushRouter;
use crate::sink::{DialogSink, SystemNotification, SystemNotifier};
use crate::storage::FileStorage;

pub const EVENT_DIALOG: &str = "push://dialog";
pub const EVENT_RESUME: &str = "push://resume";
pub const EVENT_OPEN_DEEP_LINK: &str = "push://open-deep-link";

const CONFIG_FILE_NAME: &str = "push.json";

pub struct PushRuntime {
    pub router: PushRouter,
    pub tokens: PushTokenRegistry,
}

struct WebviewDialogSink {
    app: AppHandle,
}

impl DialogSink for WebviewDialogSink {
    fn show_dialog(&self, event: &DialogEvent) -> PushResult<()> {
        self.app
            .emit(EVENT_DIALOG, event)
            .map_err(|e| PushError::Notification(e.to_string()))
    }
}

struct PluginNotifier {
    app: AppHandle,
    cache_dir: PathBuf,
}

impl PluginNotifier {
    fn attach_image(&self, notification: &SystemNotification) -> PushResult<Option<Attachment>> {
        let Some(image) = &notification.image else {
            return Ok(None);
        };
        std::fs::create_dir_all(&self.cache_dir)?;
        let path = self.cache_dir.join(format!("push-{}.img", notification.id));
        std::fs::write(&path, &image.bytes)?;
        let url = tauri::Url::from_file_path(&path)
            .map_err(|_| PushError::Notification(format!("bad path {}", path.display())))?;
        Ok(Some(Attachment::new(notification.id.to_string(), url)))
    }
}

impl SystemNotifier for PluginNotifier {
    fn notify(&self, notification: &SystemNotification) -> PushResult<()> {
        let mut builder = self
            .app
            .notification()
            .builder()
            .id(notification.id)
            .title(&notification.title)
            .body(&notification.body)
            .auto_cancel();

        if let Some(link) = &notification.deep_link {
            builder = builder.extra("deep_link", link);
        }
        // A failed attachment only costs the picture.
        match self.attach_image(notification) {
            Ok(Some(attachment)) => builder = builder.attachment(attachment),
            Ok(None) => {},
            Err(e) => log::warn!("[PUSH] could not attach image: {}", e),
        }

        builder
            .show()
            .map_err(|e| PushError::Notification(e.to_string()))
    }
}

fn build_runtime(app: &AppHandle) -> tauri::Result<PushRuntime> {
    let paths = app.path();
    let config = PushConfig::load(&paths.app_config_dir()?.join(CONFIG_FILE_NAME))
        .unwrap_or_else(|e| {
            log::warn!("[PUSH] {}; using default push config", e);
            PushConfig::default()
        });

    let storage = FileStorage::new(paths.app_data_dir()?.join(&config.queue_file_name));
    let queue = NotificationQueue::with_capacity(storage, config.queue_capacity);
    let router = PushRouter::new(
        Arc::new(LifecycleTracker::new()),
        Arc::new(queue),
        Arc::new(WebviewDialogSink { app: app.clone() }),
        Arc::new(PluginNotifier {
            app: app.clone(),
            cache_dir: paths.app_cache_dir()?.join("push-images"),
        }),
        Arc::new(HttpImageFetcher::from_config(&config)),
    )
    .with_config(&config);

    Ok(PushRuntime {
        router,
        tokens: PushTokenRegistry::new(),
    })
}

/// Install the push runtime and hook OS deep-link opens into it.
pub fn setup(app: &AppHandle) -> tauri::Result<()> {
    let runtime = Arc::new(build_runtime(app)?);

    if let Ok(Some(urls)) = app.deep_link().get_current() {
        for url in urls {
            runtime.router.notification_opened(url.as_str());
        }
    }

    let handle = app.clone();
    let on_open = Arc::clone(&runtime);
    app.deep_link().on_open_url(move |event| {
        for url in event.urls() {
            if on_open.router.notification_opened(url.as_str()) {
                let payload = serde_json::json!({ "url": url.as_str() });
                if let Err(e) = handle.emit(EVENT_OPEN_DEEP_LINK, payload) {
                    log::warn!("[PUSH] {} not delivered: {}", EVENT_OPEN_DEEP_LINK, e);
                }
            }
        }
    });

    app.manage(runtime);
    Ok(())
}

/// Main-window focus drives the foreground flag.
pub fn handle_window_event(window: &Window, event: &WindowEvent) {
    if window.label() != "main" {
        return;
    }
    let Some(runtime) = window.try_state::<Arc<PushRuntime>>() else {
        return;
    };
    match event {
        WindowEvent::Focused(true) => {
            if runtime.router.on_resume() {
                if let Err(e) = window.emit(EVENT_RESUME, ()) {
                    log::warn!("[PUSH] {} not delivered: {}", EVENT_RESUME, e);
                }
            }
        },
        WindowEvent::Focused(false) => runtime.router.on_background(),
        _ => {},
    }
}

/// Platform messaging adapter entry point. Routing (and any image fetch)
/// runs on a blocking worker, never the UI thread.
#[tauri::command]
pub async fn handle_push(
    runtime: State<'_, Arc<PushRuntime>>,
    push: RawPushData,
) -> Result<String, PushError> {
    let runtime = Arc::clone(runtime.inner());
    let route = tauri::async_runtime::spawn_blocking(move || runtime.router.handle_incoming(&push))
        .await
        .map_err(|e| PushError::Notification(e.to_string()))?;
    Ok(format!("{:?}", route))
}

#[tauri::command]
pub fn get_queued_notifications(
    runtime: State<'_, Arc<PushRuntime>>,
) -> Result<Vec<NotificationPayload>, PushError> {
    runtime.router.drain_queued()
}

#[tauri::command]
pub fn has_queued_notifications(runtime: State<'_, Arc<PushRuntime>>) -> bool {
    runtime.router.has_queued()
}

#[tauri::command]
pub fn set_on_home_page(runtime: State<'_, Arc<PushRuntime>>, on_home: bool) {
    runtime.router.set_on_home_page(on_home);
}

#[tauri::command]
pub fn notification_opened(runtime: State<'_, Arc<PushRuntime>>, deep_link: String) -> bool {
    runtime.router.notification_opened(&deep_link)
}

#[tauri::command]
pub fn get_pending_navigation(runtime: State<'_, Arc<PushRuntime>>) -> Option<String> {
    runtime.router.navigation().pending()
}

#[tauri::command]
pub fn clear_pending_navigation(runtime: State<'_, Arc<PushRuntime>>) {
    runtime.router.navigation().clear();
}

#[tauri::command]
pub fn register_push_token(runtime: State<'_, Arc<PushRuntime>>, token: String) -> bool {
    runtime.tokens.on_new_token(&token)
}

#[tauri::command]
pub fn get_fcm_token(runtime: State<'_, Arc<PushRuntime>>) -> FcmTokenResult {
    runtime.tokens.token_result()
}
