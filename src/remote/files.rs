//! Tree listing, upload and file content.

use super::*;

impl WorkspaceClient {
    /// Raw listing of `workspace_subdir`, as the server sent it.
    pub async fn fetch_tree(&self, workspace_subdir: &str) -> ClientResult<WorkspaceNode> {
        let resp = self
            .client
            .get(self.url("/api/refresh-files"))
            .query(&[("workspace_subdir", workspace_subdir)])
            .send()
            .await
            .map_err(|e| self.send_error("refresh files", e))?;
        let resp = self
            .ensure_ok(resp, "refresh files", "Failed to refresh files.")
            .await?;
        let root: WorkspaceNode = resp
            .json()
            .await
            .map_err(|e| ClientError::request_failed(format!("parse workspace tree: {}", e)))?;
        debug!(subdir = workspace_subdir, root = %root.name, "fetched workspace tree");
        Ok(root)
    }

    /// Sends every file in one multipart request, one `files` field each.
    pub async fn upload_files(
        &self,
        workspace_subdir: &str,
        files: &[UploadFile],
    ) -> ClientResult<()> {
        let mut form = reqwest::multipart::Form::new();
        for f in files {
            form = form.part(
                "files",
                reqwest::multipart::Part::bytes(f.bytes.clone()).file_name(f.name.clone()),
            );
        }

        let resp = self
            .client
            .post(self.url("/api/upload-files"))
            .query(&[("workspace_subdir", workspace_subdir)])
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.send_error("upload files", e))?;
        self.ensure_ok(resp, "upload files", "Failed to upload files.")
            .await?;
        debug!(subdir = workspace_subdir, count = files.len(), "uploaded files");
        Ok(())
    }

    /// Content of `file`, a path qualified with its workspace folder.
    pub async fn select_file(&self, file: &str) -> ClientResult<String> {
        let resp = self
            .client
            .get(self.url("/api/select-file"))
            .query(&[("file", file)])
            .send()
            .await
            .map_err(|e| self.send_error("select file", e))?;
        let resp = self
            .ensure_ok(resp, "select file", "Failed to open file.")
            .await?;
        let body: FileContentResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::request_failed(format!("parse file content: {}", e)))?;
        Ok(body.code)
    }
}
