use async_trait::async_trait;
use reqwest::Method;
use std::sync::Arc;

use crate::error::Result;
use crate::fetch::ApiClient;
use crate::models::IncreaseStock;

#[async_trait]
pub trait StockService: Send + Sync {
    async fn increase_stock(&self, sku: &str, quantity: i64) -> Result<()>;
}

pub struct ApiStockService {
    client: Arc<ApiClient>,
    path: String,
}

impl ApiStockService {
    pub fn new(client: Arc<ApiClient>, path: &str) -> Self {
        Self {
            client,
            path: path.to_string(),
        }
    }
}

#[async_trait]
impl StockService for ApiStockService {
    async fn increase_stock(&self, sku: &str, quantity: i64) -> Result<()> {
        self.client
            .request(Method::PUT, &self.path)
            .segment(sku)
            .segment("increase-stock")
            .json(&IncreaseStock { quantity })?
            .execute_empty()
            .await
    }
}
