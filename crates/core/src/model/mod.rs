pub mod hierarchy;
pub mod project;
pub mod reference;

pub use hierarchy::Hierarchy;
pub use project::ProjectInfo;
pub use reference::{PackageId, PackageReference};
