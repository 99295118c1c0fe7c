pub mod assets;
pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod model;
pub mod resolver;
pub mod watcher;

pub use assets::AssetIndex;
pub use config::ResolverOptions;
pub use error::{RefscopeError, Result};
pub use model::{Hierarchy, PackageId, PackageReference, ProjectInfo};
pub use resolver::{ProjectResolver, ResolverState};
pub use watcher::{ManifestEvent, ManifestWatcher};
