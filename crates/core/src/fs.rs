//! Filesystem helpers

use std::fs;
use std::path::Path;

use log::info;

/// Create a directory and all parents if they do not exist yet.
pub fn create_dir_all(path: &str) -> std::io::Result<()> {
    let path = Path::new(path);
    if !path.exists() {
        fs::create_dir_all(path)?;
        info!("Created directory: {}", path.display());
    }
    Ok(())
}

/// Check whether a path exists.
pub fn path_exists(path: &str) -> bool {
    Path::new(path).exists()
}
