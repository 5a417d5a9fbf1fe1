use serde::{Deserialize, Serialize};

/// One entry of the remote workspace listing. Files carry no `children`;
/// directories carry zero or more.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceNode {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<WorkspaceNode>>,
}

impl WorkspaceNode {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: None,
        }
    }

    pub fn dir(name: impl Into<String>, children: Vec<WorkspaceNode>) -> Self {
        Self {
            name: name.into(),
            children: Some(children),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.children.is_some()
    }

    pub fn is_empty_dir(&self) -> bool {
        matches!(&self.children, Some(c) if c.is_empty())
    }

    pub fn normalized(self) -> Self {
        normalize(self)
    }

    /// Paths of every file below this node, relative to it, in listing order.
    pub fn file_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(children) = &self.children {
            for child in children {
                collect_paths(child, "", &mut out);
            }
        }
        out
    }
}

fn collect_paths(node: &WorkspaceNode, prefix: &str, out: &mut Vec<String>) {
    let path = if prefix.is_empty() {
        node.name.clone()
    } else {
        format!("{}/{}", prefix, node.name)
    };
    match &node.children {
        None => out.push(path),
        Some(children) => {
            for child in children {
                collect_paths(child, &path, out);
            }
        }
    }
}

/// Drops directories that are empty once their own children are normalized.
/// The node passed in is kept even if it ends up childless.
pub fn normalize(node: WorkspaceNode) -> WorkspaceNode {
    WorkspaceNode {
        name: node.name,
        children: node.children.map(|children| {
            children
                .into_iter()
                .map(normalize)
                .filter(|c| !c.is_empty_dir())
                .collect()
        }),
    }
}

/// A named blob handed to an upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// A file opened for viewing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenedFile {
    pub path: String,
    pub code: String,
}

/// Joins a tree-relative path onto the workspace folder it was listed from.
pub fn qualify_path(workspace_subdir: &str, path: &str) -> String {
    let folder = workspace_subdir.trim_matches('/');
    if folder.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", folder, path)
    }
}

#[cfg(test)]
#[path = "tests/model/normalize_tests.rs"]
mod tests;
