//! File watching for live reload.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Editors often write a file several times per save.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WatchEvent {
    /// Markdown body of a post was modified
    PostModified(PathBuf),

    /// The post index was modified
    IndexModified(PathBuf),

    /// File was created
    Created(PathBuf),

    /// File was deleted
    Deleted(PathBuf),

    /// Generic modification
    Modified(PathBuf),
}

/// File watcher for detecting changes in the posts directory.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch `paths` recursively.
    ///
    /// `index_file` is the post index file name; changes to it are reported
    /// as [`WatchEvent::IndexModified`]. Events arrive on the returned
    /// channel and stop once the watcher is dropped.
    pub fn new(
        paths: &[PathBuf],
        index_file: &str,
    ) -> Result<(Self, mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (tx, rx) = mpsc::channel(100);
        let index_file = index_file.to_string();
        let mut debounce = Debounce::new(DEBOUNCE);

        // notify calls this from its own thread, so blocking_send is fine.
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!("Watch error: {}", e);
                    return;
                }
            };

            let now = Instant::now();
            for path in &event.paths {
                let Some(change) = classify_event(path, &event.kind, &index_file) else {
                    continue;
                };
                if debounce.accept(&change, now) {
                    let _ = tx.blocking_send(change);
                }
            }
        })
        .map_err(std::io::Error::other)?;

        for path in paths {
            if path.exists() {
                watcher
                    .watch(path, RecursiveMode::Recursive)
                    .map_err(std::io::Error::other)?;
            } else {
                tracing::warn!("Not watching missing path: {}", path.display());
            }
        }

        Ok((Self { _watcher: watcher }, rx))
    }
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::PostModified(path)
            | Self::IndexModified(path)
            | Self::Created(path)
            | Self::Deleted(path)
            | Self::Modified(path) => path,
        }
    }
}

/// Drops repeats of the same event on the same path inside a time window.
/// Distinct paths never suppress each other.
struct Debounce {
    window: Duration,
    seen: HashMap<WatchEvent, Instant>,
}

impl Debounce {
    fn new(window: Duration) -> Self {
        Self {
            window,
            seen: HashMap::new(),
        }
    }

    fn accept(&mut self, event: &WatchEvent, now: Instant) -> bool {
        let window = self.window;
        self.seen
            .retain(|_, at| now.saturating_duration_since(*at) < window);

        if self.seen.contains_key(event) {
            return false;
        }
        self.seen.insert(event.clone(), now);
        true
    }
}

fn classify_event(path: &Path, kind: &EventKind, index_file: &str) -> Option<WatchEvent> {
    let path_buf = path.to_path_buf();

    let event = match kind {
        EventKind::Create(_) => WatchEvent::Created(path_buf),
        EventKind::Remove(_) => WatchEvent::Deleted(path_buf),
        EventKind::Modify(_) if path.file_name().is_some_and(|n| n == index_file) => {
            WatchEvent::IndexModified(path_buf)
        }
        EventKind::Modify(_) => match path.extension().and_then(|e| e.to_str()) {
            Some("md" | "markdown") => WatchEvent::PostModified(path_buf),
            _ => WatchEvent::Modified(path_buf),
        },
        _ => return None,
    };

    Some(event)
}
