//! Re-rendering a document when it changes on disk.
//!
//! Editors rarely write a file in place; most write a sibling and rename it
//! over the target. The watcher therefore listens on the parent directory
//! and matches events by file name.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::perf;

/// Interval between polls in [`SourceWatcher::wait_for_change`].
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Watches one source file and reports debounced changes.
pub struct SourceWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    watch_root: PathBuf,
    source_path: PathBuf,
    source_name: Option<OsString>,
    debounce: Duration,
    pending_since: Option<Instant>,
}

impl SourceWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    /// Returns an error if the parent directory cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // Event paths come back canonical.
        let source_path = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let source_name = source_path.file_name().map(std::ffi::OsStr::to_os_string);
        let watch_root = watch_root_for(&source_path);

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&watch_root, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %source_path.display(), "watching source");

        Ok(Self {
            _watcher: watcher,
            rx,
            watch_root,
            source_path,
            source_name,
            debounce,
            pending_since: None,
        })
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Drain pending events; true once a change has settled for the
    /// debounce period.
    pub fn take_change_ready(&mut self) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) if self.is_relevant(&ev) => relevant += 1,
                Ok(_) => ignored += 1,
                Err(err) => tracing::warn!(%err, "watch error"),
            }
        }
        if relevant + ignored > 0 {
            perf::log_event(
                "watcher.poll",
                format!("relevant={relevant} ignored={ignored}"),
            );
        }

        if relevant > 0 {
            self.pending_since = Some(Instant::now());
        }
        match self.pending_since {
            Some(since) if since.elapsed() >= self.debounce => {
                self.pending_since = None;
                true
            }
            _ => false,
        }
    }

    /// Block until the source changes, polling every [`POLL_INTERVAL`].
    pub fn wait_for_change(&mut self) {
        while !self.take_change_ready() {
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    fn is_relevant(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.watch_root
                || path == &self.source_path
                || self
                    .source_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn watch_root_for(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}
