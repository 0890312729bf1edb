use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;

use super::page_query;
use crate::error::Result;
use crate::fetch::ApiClient;
use crate::models::{CreateProduct, Page, Product, UpdateProduct};

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn get_product_by_sku(&self, sku: &str) -> Result<Product>;

    async fn get_products(&self, page_number: u32, page_size: u32) -> Result<Page<Product>>;

    /// Free-text search ranked by the catalog's semantic index
    async fn search_products(
        &self,
        semantic: &str,
        page_number: u32,
        page_size: u32,
    ) -> Result<Page<Product>>;

    async fn create_product(&self, model: &CreateProduct) -> Result<()>;

    async fn update_product(&self, model: &UpdateProduct) -> Result<()>;

    async fn delete_product(&self, sku: &str) -> Result<()>;
}

pub struct ApiProductService {
    client: Arc<ApiClient>,
    path: String,
}

impl ApiProductService {
    pub fn new(client: Arc<ApiClient>, path: &str) -> Self {
        Self {
            client,
            path: path.to_string(),
        }
    }
}

#[async_trait]
impl ProductService for ApiProductService {
    async fn get_product_by_sku(&self, sku: &str) -> Result<Product> {
        self.client
            .request(Method::GET, &self.path)
            .segment(sku)
            .execute()
            .await
    }

    async fn get_products(&self, page_number: u32, page_size: u32) -> Result<Page<Product>> {
        self.client
            .get(
                &format!("{}/all", self.path),
                &page_query(page_number, page_size),
            )
            .await
    }

    async fn search_products(
        &self,
        semantic: &str,
        page_number: u32,
        page_size: u32,
    ) -> Result<Page<Product>> {
        let mut query = vec![("semantic", semantic.to_string())];
        query.extend(page_query(page_number, page_size));

        self.client
            .get(&format!("{}/semantic", self.path), &query)
            .await
    }

    async fn create_product(&self, model: &CreateProduct) -> Result<()> {
        self.client.post_empty(&self.path, model).await
    }

    async fn update_product(&self, model: &UpdateProduct) -> Result<()> {
        self.client
            .request(Method::PUT, &self.path)
            .segment(&model.sku)
            .json(model)?
            .execute_empty()
            .await
    }

    async fn delete_product(&self, sku: &str) -> Result<()> {
        self.client
            .request(Method::DELETE, &self.path)
            .segment(sku)
            .execute_empty()
            .await
    }
}
