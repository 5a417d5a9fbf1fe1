use std::path::{Component, Path};

use super::*;

/// Accepts workspace-relative paths only: no root, no drive prefix, no `..`.
/// The empty path names the workspace root.
pub(super) fn validate_relative_path(path: &str) -> Result<()> {
    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(anyhow::anyhow!("path cannot contain '..': {}", path));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(anyhow::anyhow!("path must be relative: {}", path));
            }
        }
    }
    Ok(())
}

/// Uploaded file names are stored directly in the target folder.
pub(super) fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(anyhow::anyhow!("file name cannot be empty"));
    }
    if name == "." || name == ".." || name.contains('/') || name.contains('\\') {
        return Err(anyhow::anyhow!("invalid file name: {}", name));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/bin/agentdesk_server/validators_tests.rs"]
mod tests;
