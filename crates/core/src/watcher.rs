use crate::error::Result;
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// Filesystem change seen in the manifest's directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum ManifestEvent {
    Created(PathBuf),
    Changed(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
    /// Old side of a rename the backend reported without its partner.
    MovedFrom(PathBuf),
    /// New side of a rename the backend reported without its partner.
    MovedTo(PathBuf),
    Deleted(PathBuf),
}

impl ManifestEvent {
    /// Translates a raw notify event. Access and metadata events produce
    /// nothing. Renames arrive paired (`Both`, inotify), split into `From` and
    /// `To` (Windows) or as one `Any` per path (FSEvents); unpaired halves are
    /// forwarded as `MovedFrom`/`MovedTo` and paired up per batch by
    /// [`plan`](crate::resolver::plan).
    pub fn from_notify(event: &Event) -> Vec<ManifestEvent> {
        match &event.kind {
            EventKind::Create(_) => event.paths.iter().cloned().map(Self::Created).collect(),
            EventKind::Remove(_) => event.paths.iter().cloned().map(Self::Deleted).collect(),
            EventKind::Modify(ModifyKind::Name(mode)) => match mode {
                RenameMode::Both if event.paths.len() >= 2 => vec![Self::Renamed {
                    from: event.paths[0].clone(),
                    to: event.paths[1].clone(),
                }],
                RenameMode::From => event.paths.iter().cloned().map(Self::MovedFrom).collect(),
                RenameMode::To => event.paths.iter().cloned().map(Self::MovedTo).collect(),
                // Backends that cannot tell the sides apart report one path;
                // whether it still exists tells which side it was.
                _ => event
                    .paths
                    .iter()
                    .map(|p| {
                        if p.exists() {
                            Self::MovedTo(p.clone())
                        } else {
                            Self::MovedFrom(p.clone())
                        }
                    })
                    .collect(),
            },
            EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
            EventKind::Modify(_) | EventKind::Any => {
                event.paths.iter().cloned().map(Self::Changed).collect()
            }
            EventKind::Access(_) | EventKind::Other => Vec::new(),
        }
    }
}

/// Watches the directory containing a manifest and forwards translated
/// events onto a channel. Events stop once the watcher is stopped or dropped.
pub struct ManifestWatcher {
    watcher: Option<RecommendedWatcher>,
    dir: PathBuf,
}

impl ManifestWatcher {
    pub fn new(manifest_path: &Path, tx: mpsc::UnboundedSender<ManifestEvent>) -> Result<Self> {
        let dir = manifest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for translated in ManifestEvent::from_notify(&event) {
                        let _ = tx.send(translated);
                    }
                }
                Err(err) => tracing::warn!("Watcher error: {}", err),
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        tracing::info!("Started watching {}", dir.display());

        Ok(Self {
            watcher: Some(watcher),
            dir,
        })
    }

    /// Stops raising events and releases the OS watch. Safe to call more
    /// than once.
    pub fn stop(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            if let Err(err) = watcher.unwatch(&self.dir) {
                tracing::debug!("Unwatch of {} failed: {}", self.dir.display(), err);
            }
            tracing::info!("Stopped watching {}", self.dir.display());
        }
    }

    pub fn is_active(&self) -> bool {
        self.watcher.is_some()
    }
}

impl Drop for ManifestWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
