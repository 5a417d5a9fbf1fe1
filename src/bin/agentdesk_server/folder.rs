use std::path::Path;

use super::*;

/// Builds the listing of `dir`. Directories with nothing to show are left
/// out; entries are sorted by name.
pub(super) fn folder_structure(dir: &Path) -> Result<WorkspaceNode> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut children = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read dir entry in {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", entry.path().display()))?;
        if file_type.is_dir() {
            let sub = folder_structure(&entry.path())?;
            if !sub.is_empty_dir() {
                children.push(sub);
            }
        } else {
            children.push(WorkspaceNode::file(
                entry.file_name().to_string_lossy().into_owned(),
            ));
        }
    }
    children.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(WorkspaceNode::dir(name, children))
}
