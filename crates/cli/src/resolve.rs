use refscope_core::{ProjectResolver, ResolverOptions};
use std::path::PathBuf;
use tracing::info;

pub fn run(path: PathBuf, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    info!("Resolving {}", path.display());
    let resolver = ProjectResolver::open(&path, ResolverOptions::default())?;
    let references = resolver.references();

    if json {
        println!("{}", serde_json::to_string_pretty(&*references)?);
    } else {
        for reference in references.iter() {
            println!(
                "{} {} {}",
                reference.name,
                reference.version,
                reference.path.display()
            );
        }
    }

    info!("Resolved {} references", references.len());
    Ok(())
}
