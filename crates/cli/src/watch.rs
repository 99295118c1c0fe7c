use refscope_core::{ProjectResolver, ResolverOptions};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub async fn run(path: PathBuf, debounce_ms: Option<u64>) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = ResolverOptions::watching();
    if let Some(ms) = debounce_ms {
        options = options.with_debounce(Duration::from_millis(ms));
    }

    info!("Initializing: resolving {}...", path.display());
    let resolver = ProjectResolver::open(&path, options)?;
    info!(
        "Initial resolution complete: {} references. Watching for changes.",
        resolver.references().len()
    );
    info!("Press Ctrl+C to stop.");

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            res?;
            info!("Watcher stopped.");
        }
        _ = resolver.disposed() => {
            info!("Manifest {} was deleted. Watcher stopped.", path.display());
        }
    }

    resolver.dispose();
    Ok(())
}
