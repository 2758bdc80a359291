pub mod disk;
pub mod local;
pub mod memory;
pub mod remote;

use anyhow::{Context, Result};
use fjall::Keyspace;
use std::path::Path;
use tracing::debug;

/// Opens (creating if needed) the fjall keyspace under `data_dir`.
pub fn open_keyspace(data_dir: &Path) -> Result<Keyspace> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    let db_path = data_dir.join("db");
    debug!("Opening keyspace at {}", db_path.display());
    fjall::Config::new(&db_path)
        .open()
        .with_context(|| format!("Failed to open keyspace at {}", db_path.display()))
}
