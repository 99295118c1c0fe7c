use super::*;
use std::sync::Weak;
use std::time::Duration;

/// What a batch of change events asks the resolver to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Re-read the manifest and rebuild references.
    Resolve,
    /// The manifest moved; reload path facts from the new location, then resolve.
    Reload(PathBuf),
    /// The manifest is gone.
    Dispose,
}

/// Folds a batch of events into a single action for the manifest at
/// `current`. Renames are followed so later events in the same batch are
/// matched against the new path. A `MovedFrom` of the manifest pairs with the
/// next `MovedTo`; left unpaired at the end of the batch, the manifest has
/// left the directory and counts as deleted. Returns `None` when nothing
/// concerns the manifest.
pub fn plan(events: &[ManifestEvent], current: &Path) -> Option<Action> {
    let mut path = current.to_path_buf();
    let mut moved = false;
    let mut touched = false;
    let mut leaving = false;

    for event in events {
        match event {
            ManifestEvent::Deleted(p) if *p == path => return Some(Action::Dispose),
            ManifestEvent::Renamed { from, to } if *from == path => {
                path = to.clone();
                moved = true;
                leaving = false;
            }
            ManifestEvent::MovedFrom(p) if *p == path => leaving = true,
            ManifestEvent::MovedTo(to) if leaving => {
                path = to.clone();
                moved = true;
                leaving = false;
            }
            // Atomic saves replace the manifest by renaming a temp file onto it.
            ManifestEvent::Renamed { to, .. } | ManifestEvent::MovedTo(to) if *to == path => {
                touched = true
            }
            ManifestEvent::Created(p) | ManifestEvent::Changed(p) if *p == path => touched = true,
            _ => {}
        }
    }

    if leaving {
        Some(Action::Dispose)
    } else if moved {
        Some(Action::Reload(path))
    } else if touched {
        Some(Action::Resolve)
    } else {
        None
    }
}

impl ProjectResolver {
    /// Spawns the single sequential worker consuming `events`. The worker
    /// exits when the resolver is disposed or dropped, or the channel closes.
    pub(super) fn start_worker(
        &self,
        mut events: mpsc::UnboundedReceiver<ManifestEvent>,
        debounce: Duration,
        runtime: tokio::runtime::Handle,
    ) {
        let shared_weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let cancel_token = self.shared.cancel_token.clone();
        let manifest = self.info().file_path;

        runtime.spawn(async move {
            tracing::info!("Manifest worker started for {}", manifest.display());
            let mut pending: Vec<ManifestEvent> = Vec::new();

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        break;
                    }
                    event = events.recv() => {
                        match event {
                            Some(e) => pending.push(e),
                            None => {
                                if !pending.is_empty() {
                                    process_batch(&shared_weak, std::mem::take(&mut pending)).await;
                                }
                                break;
                            }
                        }
                    }
                    _ = tokio::time::sleep(debounce), if !pending.is_empty() => {
                        let batch = std::mem::take(&mut pending);
                        if !process_batch(&shared_weak, batch).await {
                            break;
                        }
                    }
                }
            }
            tracing::info!("Manifest worker ended for {}", manifest.display());
        });
    }
}

/// Runs one batch on the blocking pool. Returns `false` once the resolver is
/// gone and the worker should stop.
async fn process_batch(shared: &Weak<Shared>, batch: Vec<ManifestEvent>) -> bool {
    let Some(shared) = shared.upgrade() else {
        return false;
    };

    tracing::debug!("Processing {} manifest events", batch.len());
    let result = tokio::task::spawn_blocking(move || shared.process(&batch)).await;

    match result {
        Ok(Ok(())) => true,
        Ok(Err(RefscopeError::Disposed)) => false,
        Ok(Err(err)) => {
            tracing::error!("Failed to resolve references: {}", err);
            true
        }
        Err(err) => {
            tracing::error!("Resolution task panicked: {}", err);
            true
        }
    }
}
