use async_trait::async_trait;
use std::sync::Arc;

use super::page_query;
use crate::error::Result;
use crate::fetch::ApiClient;
use crate::models::{Customer, Page};

/// Customers are read-only in the back office
#[async_trait]
pub trait CustomerService: Send + Sync {
    async fn get_customers(&self, page_number: u32, page_size: u32) -> Result<Page<Customer>>;
}

pub struct ApiCustomerService {
    client: Arc<ApiClient>,
    path: String,
}

impl ApiCustomerService {
    pub fn new(client: Arc<ApiClient>, path: &str) -> Self {
        Self {
            client,
            path: path.to_string(),
        }
    }
}

#[async_trait]
impl CustomerService for ApiCustomerService {
    async fn get_customers(&self, page_number: u32, page_size: u32) -> Result<Page<Customer>> {
        self.client
            .get(&self.path, &page_query(page_number, page_size))
            .await
    }
}
