use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;

use crate::error::Result;
use crate::fetch::ApiClient;
use crate::models::{Category, CreateCategory, Created, UpdateCategory};

#[async_trait]
pub trait CategoryService: Send + Sync {
    async fn get_categories(&self) -> Result<Vec<Category>>;

    /// Returns the id assigned by the server
    async fn create_category(&self, model: &CreateCategory) -> Result<i64>;

    async fn update_category(&self, model: &UpdateCategory) -> Result<()>;

    async fn delete_category(&self, id: i64) -> Result<()>;
}

pub struct ApiCategoryService {
    client: Arc<ApiClient>,
    path: String,
}

impl ApiCategoryService {
    pub fn new(client: Arc<ApiClient>, path: &str) -> Self {
        Self {
            client,
            path: path.to_string(),
        }
    }
}

#[async_trait]
impl CategoryService for ApiCategoryService {
    async fn get_categories(&self) -> Result<Vec<Category>> {
        self.client.get(&self.path, &[]).await
    }

    async fn create_category(&self, model: &CreateCategory) -> Result<i64> {
        let created: Created<i64> = self.client.post(&self.path, model).await?;
        Ok(created.id)
    }

    async fn update_category(&self, model: &UpdateCategory) -> Result<()> {
        self.client
            .request(Method::PUT, &self.path)
            .segment(model.id)
            .json(model)?
            .execute_empty()
            .await
    }

    async fn delete_category(&self, id: i64) -> Result<()> {
        self.client
            .request(Method::DELETE, &self.path)
            .segment(id)
            .execute_empty()
            .await
    }
}
