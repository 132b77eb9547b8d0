//! Loading and saving the session file the CLI operates on.

use std::path::Path;

use anyhow::{Result, bail};

use tabi_session::{MemorySession, load_session, save_session};

pub fn open(path: &Path) -> Result<MemorySession> {
    if !path.exists() {
        bail!(
            "session file not found at {}\nPass --session <file> or set TABI_SESSION.",
            path.display()
        );
    }
    Ok(load_session(path)?)
}

pub fn save(session: &MemorySession, path: &Path) -> Result<()> {
    save_session(session, path)?;
    tracing::debug!(path = %path.display(), "saved session file");
    Ok(())
}
