use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::path::Path;
use std::sync::Arc;

use super::page_query;
use crate::error::{Error, Result};
use crate::fetch::ApiClient;
use crate::models::{Image, Page};

/// A file to add to the gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub content: Bytes,
    pub mime_type: Option<String>,
}

impl Upload {
    pub fn new(file_name: &str, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content: content.into(),
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: &str) -> Self {
        self.mime_type = Some(mime_type.to_string());
        self
    }

    /// Read `path` into memory, naming the upload after the file.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| Error::config(format!("{} is not a file", path.display())))?;

        let content = tokio::fs::read(path).await?;
        Ok(Self::new(&file_name, content))
    }

    fn part(&self) -> Part {
        let part = || Part::bytes(self.content.to_vec()).file_name(self.file_name.clone());

        match &self.mime_type {
            Some(mime_type) => part().mime_str(mime_type).unwrap_or_else(|_| part()),
            None => part(),
        }
    }
}

#[async_trait]
pub trait ImageGalleryService: Send + Sync {
    async fn get_images(&self, page_number: u32, page_size: u32) -> Result<Page<Image>>;

    async fn upload_image(&self, upload: &Upload) -> Result<()>;

    async fn delete_image(&self, id: &str) -> Result<()>;
}

pub struct ApiImageGalleryService {
    client: Arc<ApiClient>,
    path: String,
}

impl ApiImageGalleryService {
    pub fn new(client: Arc<ApiClient>, path: &str) -> Self {
        Self {
            client,
            path: path.to_string(),
        }
    }
}

#[async_trait]
impl ImageGalleryService for ApiImageGalleryService {
    async fn get_images(&self, page_number: u32, page_size: u32) -> Result<Page<Image>> {
        self.client
            .get(&self.path, &page_query(page_number, page_size))
            .await
    }

    async fn upload_image(&self, upload: &Upload) -> Result<()> {
        self.client
            .post_multipart(&self.path, || Form::new().part("File", upload.part()))
            .await
    }

    async fn delete_image(&self, id: &str) -> Result<()> {
        self.client
            .request(Method::DELETE, &self.path)
            .segment(id)
            .execute_empty()
            .await
    }
}
