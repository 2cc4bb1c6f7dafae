use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::app::{Message, Model, ToastLevel};
use crate::watcher::DraftWatcher;

const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);

pub(super) fn make_draft_watcher(path: &Path) -> notify::Result<DraftWatcher> {
    DraftWatcher::new(path, WATCH_DEBOUNCE)
}

/// Turn a settled watcher change into a message.
///
/// Notifications caused by our own save leave the file equal to the text we
/// wrote and are dropped.
pub(super) fn file_change_message(model: &Model) -> Option<Message> {
    if model.disk_differs() {
        Some(Message::FileChanged)
    } else {
        crate::perf::log_event(
            "watcher.unchanged",
            format!("path={}", model.file_path.display()),
        );
        None
    }
}

/// Run the I/O a message asks for after `update` has applied it.
pub(super) fn handle_message_side_effects(
    model: &mut Model,
    watcher: &mut Option<DraftWatcher>,
    msg: &Message,
) {
    match msg {
        Message::Save => save(model),
        Message::Export => export(model),
        Message::ToggleWatch => {
            if model.watch_enabled {
                match make_draft_watcher(&model.file_path) {
                    Ok(w) => {
                        *watcher = Some(w);
                        model.show_toast(ToastLevel::Info, "Watching file changes");
                    }
                    Err(err) => {
                        model.watch_enabled = false;
                        *watcher = None;
                        model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                        crate::perf::log_event(
                            "watcher.error",
                            format!("failed path={} err={err}", model.file_path.display()),
                        );
                    }
                }
            } else {
                *watcher = None;
                model.show_toast(ToastLevel::Info, "Watch disabled");
            }
        }
        Message::ForceReload | Message::FileChanged if model.reload_requested => {
            model.reload_requested = false;
            match model.reload_from_disk() {
                Ok(()) => {
                    if matches!(msg, Message::ForceReload) {
                        model.show_toast(ToastLevel::Info, "Reloaded");
                    }
                }
                Err(err) => {
                    model.show_toast(ToastLevel::Error, format!("Reload failed: {err}"));
                    crate::perf::log_event(
                        "reload.error",
                        format!("failed path={} err={err}", model.file_path.display()),
                    );
                }
            }
        }
        _ => {}
    }
}

fn save(model: &mut Model) {
    let _scope = crate::perf::scope("app.save");
    match model.save_to_disk() {
        Ok(()) => {
            tracing::info!(path = %model.file_path.display(), "saved draft");
            model.show_toast(
                ToastLevel::Info,
                format!("Saved {}", model.file_path.display()),
            );
        }
        Err(err) => {
            tracing::warn!(%err, "save failed");
            model.show_toast(ToastLevel::Error, format!("Save failed: {err:#}"));
        }
    }
}

fn export(model: &mut Model) {
    let path = model.export_path();
    match write_payload(model, &path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "exported post");
            model.show_toast(ToastLevel::Info, format!("Exported {}", path.display()));
        }
        Err(err) => {
            // Validation errors are warnings.
            let level = if err.downcast_ref::<crate::post::DraftError>().is_some() {
                ToastLevel::Warning
            } else {
                ToastLevel::Error
            };
            model.show_toast(level, format!("Export failed: {err:#}"));
        }
    }
}

fn write_payload(model: &Model, path: &Path) -> Result<()> {
    let json = model.draft().validate()?.to_json_pretty()?;
    std::fs::write(path, format!("{json}\n"))
        .with_context(|| format!("Failed to write {}", path.display()))
}
