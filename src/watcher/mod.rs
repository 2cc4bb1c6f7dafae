//! Debounced change notifications for the draft file.
//!
//! The parent directory is watched rather than the file itself, because many
//! editors save by writing a temp file and renaming it over the original.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Result of polling a [`DraftWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchStatus {
    /// Nothing happened since the last reported change.
    Idle,
    /// A change was seen but the debounce window is still open.
    Settling,
    /// The file changed and has been quiet for the debounce window.
    Changed,
}

pub struct DraftWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    dir: PathBuf,
    file: PathBuf,
    file_name: Option<OsString>,
    debounce: Duration,
    last_event: Option<Instant>,
}

impl DraftWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    /// Returns an error if the platform watcher cannot be created or the
    /// parent directory cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        let path = path.as_ref();
        // Event paths arrive canonicalized; match them against the same form.
        let file = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let file_name = file.file_name().map(std::ffi::OsStr::to_os_string);
        let dir = parent_dir(&file);

        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(file = %file.display(), dir = %dir.display(), "watching draft");

        Ok(Self {
            _watcher: watcher,
            events,
            dir,
            file,
            file_name,
            debounce,
            last_event: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Drain pending events and report whether a settled change is ready.
    pub fn poll(&mut self) -> WatchStatus {
        self.poll_at(Instant::now())
    }

    fn poll_at(&mut self, now: Instant) -> WatchStatus {
        let mut relevant = 0u32;
        while let Ok(event) = self.events.try_recv() {
            match event {
                Ok(ev) if self.concerns_draft(&ev) => relevant += 1,
                Ok(ev) => {
                    crate::perf::log_event("watcher.ignored", format!("{:?}", ev.kind));
                }
                Err(err) => tracing::warn!(%err, "file watcher error"),
            }
        }
        if relevant > 0 {
            crate::perf::log_event("watcher.events", format!("relevant={relevant}"));
            self.last_event = Some(now);
        }

        match self.last_event {
            None => WatchStatus::Idle,
            Some(at) if now.saturating_duration_since(at) >= self.debounce => {
                self.last_event = None;
                WatchStatus::Changed
            }
            Some(_) => WatchStatus::Settling,
        }
    }

    fn concerns_draft(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.file
                || path == &self.dir
                || self
                    .file_name
                    .as_ref()
                    .is_some_and(|name| path.file_name() == Some(name.as_os_str()))
        })
    }
}

impl std::fmt::Debug for DraftWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftWatcher")
            .field("file", &self.file)
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
