use crate::error::{QhError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A rendered file waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

/// Writes through a temp file in the target directory and renames it into place,
/// so readers never observe a half-written file.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| QhError::input(dir, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.flush())
        .map_err(|e| QhError::input(path, e))?;
    tmp.persist(path).map_err(|e| QhError::input(path, e.error))?;
    tracing::debug!("Wrote {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

/// Writes every artifact, in order. Rendering must already be complete.
pub fn write_all(artifacts: &[Artifact]) -> Result<()> {
    for artifact in artifacts {
        write_atomic(&artifact.path, &artifact.contents)?;
    }
    Ok(())
}
