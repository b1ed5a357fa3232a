//! File service - local storage for uploaded attachments
//!
//! Files land in the configured upload directory under a random UUID name
//! that keeps the original extension. The stored names are the opaque
//! references clients put in a message's `fileUrls`; nothing here looks at
//! file contents.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, instrument};
use uuid::Uuid;

use chat_core::DomainError;

use crate::dto::UploadResponse;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Longest extension carried over from the client's file name
const MAX_EXTENSION_LEN: usize = 10;

/// One file received from a client
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub original_name: Option<String>,
    pub data: Vec<u8>,
}

/// File service
pub struct FileService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> FileService<'a> {
    /// Create a new FileService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn upload_dir(&self) -> &Path {
        Path::new(&self.ctx.storage_config().upload_dir)
    }

    /// Store a batch of files, checking every size limit before writing any
    #[instrument(skip(self, files), fields(count = files.len()))]
    pub async fn store_all(&self, files: Vec<IncomingFile>) -> ServiceResult<UploadResponse> {
        if files.is_empty() {
            return Err(ServiceError::validation("no files were uploaded"));
        }
        for file in &files {
            self.check_size(file)?;
        }

        let mut file_urls = Vec::with_capacity(files.len());
        for file in files {
            file_urls.push(self.store(&file).await?);
        }

        info!(count = file_urls.len(), "Files uploaded");

        Ok(UploadResponse { file_urls })
    }

    /// Write one file and return its stored name
    pub async fn store(&self, file: &IncomingFile) -> ServiceResult<String> {
        self.check_size(file)?;

        let dir = self.upload_dir();
        fs::create_dir_all(dir)
            .await
            .map_err(|e| storage_error("create upload directory", &e))?;

        let name = stored_name(file.original_name.as_deref());
        let path = dir.join(&name);

        // Write then rename so a half-written file is never served
        let temp_path: PathBuf = path.with_extension("part");
        fs::write(&temp_path, &file.data)
            .await
            .map_err(|e| storage_error("write file", &e))?;
        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| storage_error("move file into place", &e))?;

        Ok(name)
    }

    fn check_size(&self, file: &IncomingFile) -> ServiceResult<()> {
        let max = self.ctx.storage_config().max_file_size_bytes();
        if file.data.is_empty() {
            return Err(ServiceError::validation("uploaded file is empty"));
        }
        if file.data.len() > max {
            return Err(ServiceError::validation(format!(
                "file exceeds the {} MB limit",
                self.ctx.storage_config().max_file_size_mb
            )));
        }
        Ok(())
    }
}

fn storage_error(action: &str, err: &std::io::Error) -> ServiceError {
    DomainError::Storage(format!("failed to {action}: {err}")).into()
}

/// `<uuid>.<ext>`, keeping a short alphanumeric extension from the original name
fn stored_name(original_name: Option<&str>) -> String {
    let id = Uuid::new_v4();
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(str::to_ascii_lowercase);

    match extension {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}
