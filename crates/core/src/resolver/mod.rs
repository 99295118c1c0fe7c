//! Project reference resolver.
//!
//! Joins the packages declared in a project manifest against the restore lock
//! file and publishes the resulting artifact paths. Readers get cheap
//! snapshots (`Arc` clone); a resolution pass builds a new list off to the
//! side and swaps it in only when the whole pass succeeds.

use crate::assets::AssetIndex;
use crate::config::ResolverOptions;
use crate::error::{RefscopeError, Result};
use crate::manifest;
use crate::model::{PackageReference, ProjectInfo};
use crate::watcher::{ManifestEvent, ManifestWatcher};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

mod watch;

pub use watch::{Action, plan};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
    Disposed,
}

/// Inputs of a resolution pass. The cache root and asset index are derived
/// from `info` and only re-derived when the manifest moves or a previous
/// re-derivation failed.
struct Session {
    info: ProjectInfo,
    cache_root: PathBuf,
    index: AssetIndex,
    stale: bool,
}

impl Session {
    fn load(file_path: &Path) -> Result<Self> {
        let info = manifest::load_basic_info(file_path);
        let cache_root = manifest::load_package_cache_root(&info)?;
        let index = AssetIndex::build(&info.assets_path())?;

        Ok(Self {
            info,
            cache_root,
            index,
            stale: false,
        })
    }

    fn refresh(&mut self, moved_to: Option<&Path>) -> Result<()> {
        if let Some(path) = moved_to {
            self.info = manifest::load_basic_info(path);
            self.stale = true;
        }
        if self.stale {
            self.cache_root = manifest::load_package_cache_root(&self.info)?;
            self.index = AssetIndex::build(&self.info.assets_path())?;
            self.stale = false;
        }
        Ok(())
    }

    fn resolve(&self) -> Result<Vec<PackageReference>> {
        let declared = manifest::load_declared_references(&self.info.file_path)?;

        let mut references = Vec::new();
        for id in &declared {
            let assets = self
                .index
                .get(id)
                .ok_or_else(|| RefscopeError::UnresolvedReference {
                    name: id.name.clone(),
                    version: id.version.clone(),
                })?;

            references.extend(
                assets
                    .iter()
                    .map(|asset| PackageReference::locate(id, &self.cache_root, asset)),
            );
        }

        Ok(references)
    }
}

struct Shared {
    /// Held for the duration of a pass so passes never interleave.
    session: Mutex<Session>,
    state: RwLock<ResolverState>,
    references: RwLock<Arc<[PackageReference]>>,
    watcher: Mutex<Option<ManifestWatcher>>,
    cancel_token: CancellationToken,
}

impl Shared {
    fn state(&self) -> ResolverState {
        *read(&self.state)
    }

    fn is_disposed(&self) -> bool {
        self.state() == ResolverState::Disposed
    }

    fn pass(&self, session: &mut Session, moved_to: Option<&Path>) -> Result<usize> {
        self.begin()?;
        let outcome = session
            .refresh(moved_to)
            .and_then(|_| session.resolve());
        self.publish(session, outcome)
    }

    /// Marks a pass as started unless the resolver is already disposed.
    fn begin(&self) -> Result<()> {
        let mut state = write(&self.state);
        if *state == ResolverState::Disposed {
            return Err(RefscopeError::Disposed);
        }
        *state = ResolverState::Loading;
        Ok(())
    }

    /// Swaps in the outcome of a pass. A pass that finishes after disposal
    /// publishes nothing.
    fn publish(
        &self,
        session: &Session,
        outcome: Result<Vec<PackageReference>>,
    ) -> Result<usize> {
        let mut state = write(&self.state);
        if *state == ResolverState::Disposed {
            tracing::debug!(
                "Discarding resolution of {}: resolver was disposed",
                session.info.file_path.display()
            );
            return Err(RefscopeError::Disposed);
        }

        match outcome {
            Ok(references) => {
                let count = references.len();
                *write(&self.references) = Arc::from(references);
                *state = ResolverState::Ready;
                tracing::info!(
                    "Resolved {} package references for {}",
                    count,
                    session.info.file_path.display()
                );
                Ok(count)
            }
            Err(err) => {
                *state = ResolverState::Failed;
                Err(err)
            }
        }
    }

    fn process(&self, events: &[ManifestEvent]) -> Result<()> {
        let mut session = lock(&self.session);
        if self.is_disposed() {
            return Err(RefscopeError::Disposed);
        }

        let action = plan(events, &session.info.file_path);
        match action {
            None => Ok(()),
            Some(Action::Dispose) => {
                drop(session);
                self.dispose();
                Ok(())
            }
            Some(Action::Reload(path)) => {
                tracing::info!(
                    "Manifest moved: {} -> {}",
                    session.info.file_path.display(),
                    path.display()
                );
                self.pass(&mut session, Some(&path)).map(|_| ())
            }
            Some(Action::Resolve) => self.pass(&mut session, None).map(|_| ()),
        }
    }

    fn dispose(&self) {
        {
            let mut state = write(&self.state);
            if *state == ResolverState::Disposed {
                return;
            }
            *state = ResolverState::Disposed;
        }

        self.cancel_token.cancel();
        if let Some(mut watcher) = lock(&self.watcher).take() {
            watcher.stop();
        }
        tracing::info!("Resolver disposed");
    }
}

/// Resolved package references of one project manifest.
pub struct ProjectResolver {
    shared: Arc<Shared>,
}

impl ProjectResolver {
    /// Loads the project and resolves its references. Any failure aborts the
    /// open; no watch is registered unless the first resolution succeeds.
    pub fn open(file_path: impl AsRef<Path>, options: ResolverOptions) -> Result<Self> {
        let file_path = file_path.as_ref();
        if !options.watch {
            return Self::load(file_path);
        }

        let runtime = current_runtime()?;
        let resolver = Self::load(file_path)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = ManifestWatcher::new(&resolver.info().file_path, tx)?;
        *lock(&resolver.shared.watcher) = Some(watcher);
        resolver.start_worker(rx, options.debounce, runtime);

        Ok(resolver)
    }

    /// Like [`open`](Self::open) with watching, but consumes events from a
    /// caller-supplied channel instead of a filesystem watcher.
    pub fn open_with_events(
        file_path: impl AsRef<Path>,
        options: ResolverOptions,
        events: mpsc::UnboundedReceiver<ManifestEvent>,
    ) -> Result<Self> {
        let runtime = current_runtime()?;
        let resolver = Self::load(file_path.as_ref())?;
        resolver.start_worker(events, options.debounce, runtime);
        Ok(resolver)
    }

    fn load(file_path: &Path) -> Result<Self> {
        if file_path.as_os_str().is_empty() {
            return Err(RefscopeError::Configuration(
                "manifest path must not be empty".to_string(),
            ));
        }

        // Watch events carry absolute paths.
        let file_path = std::path::absolute(file_path)?;
        let session = Session::load(&file_path)?;
        let shared = Arc::new(Shared {
            session: Mutex::new(session),
            state: RwLock::new(ResolverState::Uninitialized),
            references: RwLock::new(Arc::from(Vec::new())),
            watcher: Mutex::new(None),
            cancel_token: CancellationToken::new(),
        });

        {
            let mut session = lock(&shared.session);
            shared.pass(&mut session, None)?;
        }

        Ok(Self { shared })
    }

    /// Re-reads the manifest and rebuilds the reference list. On failure the
    /// previously published list stays in place.
    pub fn resolve_references(&self) -> Result<usize> {
        let mut session = lock(&self.shared.session);
        self.shared.pass(&mut session, None)
    }

    /// Re-derives every input from the manifest's current location,
    /// including the package-cache root and the asset index.
    pub fn reload(&self) -> Result<usize> {
        let mut session = lock(&self.shared.session);
        let path = session.info.file_path.clone();
        self.shared.pass(&mut session, Some(&path))
    }

    /// Applies one change notification synchronously, serialized with any
    /// background processing.
    pub fn handle_event(&self, event: ManifestEvent) -> Result<()> {
        self.shared.process(std::slice::from_ref(&event))
    }

    pub fn references(&self) -> Arc<[PackageReference]> {
        read(&self.shared.references).clone()
    }

    pub fn state(&self) -> ResolverState {
        self.shared.state()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.is_disposed()
    }

    pub fn info(&self) -> ProjectInfo {
        lock(&self.shared.session).info.clone()
    }

    pub fn package_cache_root(&self) -> PathBuf {
        lock(&self.shared.session).cache_root.clone()
    }

    pub fn is_watching(&self) -> bool {
        lock(&self.shared.watcher)
            .as_ref()
            .is_some_and(ManifestWatcher::is_active)
    }

    /// Resolves once the background worker has stopped, either through
    /// [`dispose`](Self::dispose) or a manifest deletion.
    pub async fn disposed(&self) {
        self.shared.cancel_token.cancelled().await
    }

    /// Stops change processing and releases the watch. Idempotent.
    pub fn dispose(&self) {
        self.shared.dispose();
    }
}

impl Drop for ProjectResolver {
    fn drop(&mut self) {
        self.shared.dispose();
    }
}

fn current_runtime() -> Result<tokio::runtime::Handle> {
    tokio::runtime::Handle::try_current().map_err(|_| {
        RefscopeError::Configuration("watching requires a running tokio runtime".to_string())
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
