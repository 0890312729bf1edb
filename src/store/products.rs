//! Products slice: the current product page and every product mutation,
//! stock increases included

use std::collections::BTreeSet;

use crate::models::{Page, Product, UpdateProduct};

use super::pagination::PageState;
use super::status::{Notice, Rejection, RequestStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductsStatus {
    pub fetch_page: RequestStatus,
    pub create: RequestStatus,
    pub update: RequestStatus,
    pub delete: RequestStatus,
    pub increase_stock: RequestStatus,
}

/// Fields an accepted update changes on a cached product
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPatch {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category_id: i64,
    /// Known only when the category is cached
    pub category_name: Option<String>,
    pub primary_image_id: Option<String>,
    pub supporting_image_ids: BTreeSet<String>,
    pub is_featured: bool,
}

impl ProductPatch {
    pub fn new(model: &UpdateProduct, category_name: Option<String>) -> Self {
        Self {
            sku: model.sku.clone(),
            name: model.name.clone(),
            description: model.description.clone(),
            price: model.price,
            category_id: model.category_id,
            category_name,
            primary_image_id: model.primary_image_id.clone(),
            supporting_image_ids: model.supporting_image_ids.clone(),
            is_featured: model.is_featured,
        }
    }

    fn apply(&self, product: &mut Product) {
        product.name = self.name.clone();
        product.description = self.description.clone();
        product.price = self.price;
        product.category_id = self.category_id;
        if let Some(category_name) = &self.category_name {
            product.category_name = category_name.clone();
        }
        product.primary_image_id = self.primary_image_id.clone();
        product.supporting_image_ids = self.supporting_image_ids.clone();
        product.is_featured = self.is_featured;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductsSlice {
    pub products: Vec<Product>,
    pub page: PageState,
    /// Non-empty switches page fetches to semantic search
    pub semantic: String,
    pub selected: Option<Product>,
    pub status: ProductsStatus,
    pub success: Option<Notice>,
    pub error: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProductsAction {
    FetchPagePending,
    FetchPageFulfilled { request: u64, page: Page<Product> },
    FetchPageRejected { request: u64, rejection: Rejection },
    CreatePending,
    CreateFulfilled,
    CreateRejected(Rejection),
    UpdatePending,
    UpdateFulfilled(ProductPatch),
    UpdateRejected(Rejection),
    DeletePending,
    DeleteFulfilled { sku: String },
    DeleteRejected(Rejection),
    IncreaseStockPending,
    IncreaseStockFulfilled { sku: String, quantity: i64 },
    IncreaseStockRejected(Rejection),
    SetSemantic(String),
    SetCurrentPageNumber(u32),
    Select(Product),
    Unselect,
    ClearSuccess,
    ClearError,
}

impl ProductsSlice {
    pub fn new(page_size: u32, discard_stale: bool) -> Self {
        Self {
            products: Vec::new(),
            page: PageState::new(page_size, discard_stale),
            semantic: String::new(),
            selected: None,
            status: ProductsStatus::default(),
            success: None,
            error: None,
        }
    }

    pub fn find(&self, sku: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.sku == sku)
    }

    pub fn reduce(&mut self, action: ProductsAction) {
        use ProductsAction::*;

        match action {
            FetchPagePending => {
                self.page.begin_request();
                self.status.fetch_page.start();
            }
            FetchPageFulfilled { request, page } => {
                if self.page.is_stale(request) {
                    log::debug!("Dropping stale product page {}", page.page_number);
                    return;
                }
                self.page.apply(&page);
                self.products = page.items;
                self.status.fetch_page.succeed(());
            }
            FetchPageRejected { request, rejection } => {
                if self.page.is_stale(request) {
                    return;
                }
                self.status.fetch_page.reject(rejection, &mut self.error);
            }

            CreatePending => self.status.create.start(),
            CreateFulfilled => {
                self.status.create.succeed(());
                self.success = Some(Notice::success("Product was successfully created"));
            }
            CreateRejected(rejection) => self.status.create.reject(rejection, &mut self.error),

            UpdatePending => self.status.update.start(),
            UpdateFulfilled(patch) => {
                if let Some(product) = self.products.iter_mut().find(|p| p.sku == patch.sku) {
                    patch.apply(product);
                }
                if let Some(selected) = self.selected.as_mut().filter(|p| p.sku == patch.sku) {
                    patch.apply(selected);
                }
                self.status.update.succeed(());
                self.success = Some(Notice::success("Product was successfully updated"));
            }
            UpdateRejected(rejection) => self.status.update.reject(rejection, &mut self.error),

            DeletePending => self.status.delete.start(),
            DeleteFulfilled { sku } => {
                let before = self.products.len();
                self.products.retain(|product| product.sku != sku);
                if self.products.len() < before {
                    self.page.item_removed();
                }
                if self.selected.as_ref().map_or(false, |p| p.sku == sku) {
                    self.selected = None;
                }
                self.status.delete.succeed(());
                self.success = Some(Notice::success("Product was successfully deleted"));
            }
            DeleteRejected(rejection) => self.status.delete.reject(rejection, &mut self.error),

            IncreaseStockPending => self.status.increase_stock.start(),
            IncreaseStockFulfilled { sku, quantity } => {
                if let Some(product) = self.products.iter_mut().find(|p| p.sku == sku) {
                    product.available_quantity += quantity;
                }
                self.status.increase_stock.succeed(());
                self.success = Some(Notice::success("Stock was successfully increased"));
            }
            IncreaseStockRejected(rejection) => {
                self.status.increase_stock.reject(rejection, &mut self.error)
            }

            SetSemantic(semantic) => self.semantic = semantic,
            SetCurrentPageNumber(page_number) => self.page.page_number = page_number.max(1),
            Select(product) => self.selected = Some(product),
            Unselect => self.selected = None,
            ClearSuccess => {
                self.success = None;
                self.status.fetch_page.acknowledge_success();
                self.status.create.acknowledge_success();
                self.status.update.acknowledge_success();
                self.status.delete.acknowledge_success();
                self.status.increase_stock.acknowledge_success();
            }
            ClearError => {
                self.error = None;
                self.status.fetch_page.acknowledge_failure();
                self.status.create.acknowledge_failure();
                self.status.update.acknowledge_failure();
                self.status.delete.acknowledge_failure();
                self.status.increase_stock.acknowledge_failure();
            }
        }
    }
}
