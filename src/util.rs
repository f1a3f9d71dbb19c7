use anyhow::{anyhow, Result};
use std::path::Path;

/// Reads a whole file, naming its `kind` (e.g., "project") in the error.
pub fn read(path: &Path, kind: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Reading {} file `{}`: {}", kind, path.display(), e))
}
