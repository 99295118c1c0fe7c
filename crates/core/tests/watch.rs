//! Background change processing.

mod common;

use common::ProjectFixture;
use refscope_core::{ManifestEvent, ProjectResolver, ResolverOptions, ResolverState};
use std::time::Duration;
use tokio::sync::mpsc;

fn fast() -> ResolverOptions {
    ResolverOptions::watching().with_debounce(Duration::from_millis(20))
}

async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    condition()
}

#[tokio::test]
async fn test_worker_applies_change_events() {
    let fx = ProjectFixture::new("App", "/cache", &[("PackageA", "1.2.3")]);
    let (tx, rx) = mpsc::unbounded_channel();
    let resolver = ProjectResolver::open_with_events(&fx.manifest, fast(), rx).unwrap();
    assert_eq!(resolver.references().len(), 1);

    fx.write_manifest(&[("PackageA", "1.2.3"), ("PackageB", "4.5.6")]);
    tx.send(ManifestEvent::Changed(fx.manifest.clone())).unwrap();

    assert!(wait_until(|| resolver.references().len() == 3).await);
    assert_eq!(resolver.state(), ResolverState::Ready);
}

#[tokio::test]
async fn test_worker_coalesces_bursts() {
    let fx = ProjectFixture::new("App", "/cache", &[("PackageA", "1.2.3")]);
    let (tx, rx) = mpsc::unbounded_channel();
    let resolver = ProjectResolver::open_with_events(&fx.manifest, fast(), rx).unwrap();

    // However the burst is split, it settles on the last manifest contents.
    fx.write_manifest(&[("Unknown", "0.0.0")]);
    tx.send(ManifestEvent::Changed(fx.manifest.clone())).unwrap();
    fx.write_manifest(&[("PackageB", "4.5.6")]);
    tx.send(ManifestEvent::Changed(fx.manifest.clone())).unwrap();

    assert!(wait_until(|| resolver.references().len() == 2).await);
    assert_eq!(resolver.state(), ResolverState::Ready);
}

#[tokio::test]
async fn test_worker_failure_is_not_terminal() {
    let fx = ProjectFixture::new("App", "/cache", &[("PackageA", "1.2.3")]);
    let (tx, rx) = mpsc::unbounded_channel();
    let resolver = ProjectResolver::open_with_events(&fx.manifest, fast(), rx).unwrap();

    fx.write_manifest(&[("Unknown", "0.0.0")]);
    tx.send(ManifestEvent::Changed(fx.manifest.clone())).unwrap();
    assert!(wait_until(|| resolver.state() == ResolverState::Failed).await);
    assert_eq!(resolver.references().len(), 1);

    fx.write_manifest(&[("PackageB", "4.5.6")]);
    tx.send(ManifestEvent::Changed(fx.manifest.clone())).unwrap();
    assert!(wait_until(|| resolver.state() == ResolverState::Ready).await);
    assert_eq!(resolver.references().len(), 2);
}

#[tokio::test]
async fn test_delete_event_stops_worker() {
    let fx = ProjectFixture::new("App", "/cache", &[("PackageA", "1.2.3")]);
    let (tx, rx) = mpsc::unbounded_channel();
    let resolver = ProjectResolver::open_with_events(&fx.manifest, fast(), rx).unwrap();

    tx.send(ManifestEvent::Deleted(fx.manifest.clone())).unwrap();
    tokio::time::timeout(Duration::from_secs(5), resolver.disposed())
        .await
        .unwrap();

    assert_eq!(resolver.state(), ResolverState::Disposed);
    // Later events go nowhere and nothing is resurrected.
    let _ = tx.send(ManifestEvent::Changed(fx.manifest.clone()));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(resolver.state(), ResolverState::Disposed);
}

#[tokio::test]
async fn test_dispose_while_events_pending() {
    let fx = ProjectFixture::new("App", "/cache", &[("PackageA", "1.2.3")]);
    let (tx, rx) = mpsc::unbounded_channel();
    let resolver = ProjectResolver::open_with_events(
        &fx.manifest,
        ResolverOptions::watching().with_debounce(Duration::from_millis(200)),
        rx,
    )
    .unwrap();

    fx.write_manifest(&[("PackageB", "4.5.6")]);
    tx.send(ManifestEvent::Changed(fx.manifest.clone())).unwrap();
    resolver.dispose();

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(resolver.state(), ResolverState::Disposed);
    assert_eq!(resolver.references()[0].name, "PackageA");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_filesystem_watch_follows_manifest_edits() {
    let fx = ProjectFixture::new("App", "/cache", &[("PackageA", "1.2.3")]);
    let resolver = ProjectResolver::open(&fx.manifest, fast()).unwrap();
    assert!(resolver.is_watching());

    fx.write_manifest(&[("PackageA", "1.2.3"), ("PackageB", "4.5.6")]);
    assert!(wait_until(|| resolver.references().len() == 3).await);

    resolver.dispose();
    assert!(!resolver.is_watching());
}
