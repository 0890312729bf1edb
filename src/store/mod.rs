//! Application state: one slice per resource, driven by async thunks
//!
//! Every thunk dispatches `Pending`, awaits its service call and dispatches
//! `Fulfilled` or `Rejected`. Reducers run under the state write lock, so
//! transitions never interleave; the awaited requests do, and the last
//! response to arrive wins.

mod categories;
mod customers;
mod image_gallery;
mod pagination;
mod products;
mod status;

use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

use crate::config::{ApiRoutes, ClientOptions};
use crate::error::{Error, Result};
use crate::fetch::ApiClient;
use crate::models::{
    Category, CreateCategory, CreateProduct, Customer, Image, Page, Product, UpdateCategory,
    UpdateProduct,
};
use crate::services::{
    ApiCategoryService, ApiCustomerService, ApiImageGalleryService, ApiProductService,
    ApiStockService, CategoryService, CustomerService, ImageGalleryService, ProductService,
    StockService, Upload,
};

pub use categories::{CategoriesAction, CategoriesSlice, CategoriesStatus};
pub use customers::{CustomersAction, CustomersSlice};
pub use image_gallery::{ImageGalleryAction, ImageGallerySlice, ImageGalleryStatus};
pub use pagination::{page_count, page_window, PageFetcher, PageLink, PageState, PagedResource};
pub use products::{ProductPatch, ProductsAction, ProductsSlice, ProductsStatus};
pub use status::{Notice, Rejection, RequestStatus};

/// Every slice of the back office
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub categories: CategoriesSlice,
    pub products: ProductsSlice,
    pub customers: CustomersSlice,
    pub image_gallery: ImageGallerySlice,
}

impl AppState {
    pub fn new(options: &ClientOptions) -> Self {
        let sizes = options.page_sizes;
        let discard = options.discard_stale_pages;

        Self {
            categories: CategoriesSlice::default(),
            products: ProductsSlice::new(sizes.products, discard),
            customers: CustomersSlice::new(sizes.customers, discard),
            image_gallery: ImageGallerySlice::new(sizes.images, discard),
        }
    }
}

/// Services the store's thunks call
#[derive(Clone)]
pub struct Services {
    pub categories: Arc<dyn CategoryService>,
    pub products: Arc<dyn ProductService>,
    pub customers: Arc<dyn CustomerService>,
    pub stock: Arc<dyn StockService>,
    pub images: Arc<dyn ImageGalleryService>,
}

impl Services {
    /// REST-backed services sharing one gateway client
    pub fn api(client: Arc<ApiClient>, routes: &ApiRoutes) -> Self {
        Self {
            categories: Arc::new(ApiCategoryService::new(client.clone(), &routes.categories)),
            products: Arc::new(ApiProductService::new(client.clone(), &routes.products)),
            customers: Arc::new(ApiCustomerService::new(client.clone(), &routes.customers)),
            stock: Arc::new(ApiStockService::new(client.clone(), &routes.stock_items)),
            images: Arc::new(ApiImageGalleryService::new(client, &routes.image_gallery)),
        }
    }
}

/// Shared state container; clones observe the same state
#[derive(Clone)]
pub struct Store {
    state: Arc<RwLock<AppState>>,
    initial: Arc<AppState>,
    services: Services,
    revision: Arc<watch::Sender<u64>>,
}

impl Store {
    pub fn new(services: Services, options: &ClientOptions) -> Self {
        let initial = AppState::new(options);
        let (revision, _) = watch::channel(0);

        Self {
            state: Arc::new(RwLock::new(initial.clone())),
            initial: Arc::new(initial),
            services,
            revision: Arc::new(revision),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Run `f` against the current state
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    pub fn snapshot(&self) -> AppState {
        self.read(AppState::clone)
    }

    pub fn categories(&self) -> CategoriesSlice {
        self.read(|state| state.categories.clone())
    }

    pub fn products(&self) -> ProductsSlice {
        self.read(|state| state.products.clone())
    }

    pub fn customers(&self) -> CustomersSlice {
        self.read(|state| state.customers.clone())
    }

    pub fn image_gallery(&self) -> ImageGallerySlice {
        self.read(|state| state.image_gallery.clone())
    }

    /// Revision counter bumped after every transition
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn page_fetcher(&self, resource: PagedResource) -> PageFetcher {
        PageFetcher::new(self.clone(), resource)
    }

    /// Back to the initial state, e.g. after sign-out
    pub fn reset(&self) {
        let initial = (*self.initial).clone();
        self.apply(move |state| *state = initial);
    }

    fn apply<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let result = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut state)
        };
        self.revision.send_modify(|revision| *revision += 1);
        result
    }

    fn categories_action(&self, action: CategoriesAction) {
        self.apply(|state| state.categories.reduce(action));
    }

    fn products_action(&self, action: ProductsAction) {
        self.apply(|state| state.products.reduce(action));
    }

    fn customers_action(&self, action: CustomersAction) {
        self.apply(|state| state.customers.reduce(action));
    }

    fn image_gallery_action(&self, action: ImageGalleryAction) {
        self.apply(|state| state.image_gallery.reduce(action));
    }

    // Categories

    pub async fn fetch_categories(&self) -> Result<Vec<Category>> {
        self.categories_action(CategoriesAction::FetchPending);

        match self.services.categories.get_categories().await {
            Ok(categories) => {
                self.categories_action(CategoriesAction::FetchFulfilled(categories.clone()));
                Ok(categories)
            }
            Err(err) => {
                self.categories_action(CategoriesAction::FetchRejected(Rejection::from(&err)));
                Err(err)
            }
        }
    }

    pub async fn create_category(&self, model: &CreateCategory) -> Result<i64> {
        self.categories_action(CategoriesAction::CreatePending);

        match self.services.categories.create_category(model).await {
            Ok(id) => {
                self.categories_action(CategoriesAction::CreateFulfilled {
                    id,
                    model: model.clone(),
                });
                Ok(id)
            }
            Err(err) => {
                self.categories_action(CategoriesAction::CreateRejected(Rejection::from(&err)));
                Err(err)
            }
        }
    }

    pub async fn update_category(&self, model: &UpdateCategory) -> Result<()> {
        self.categories_action(CategoriesAction::UpdatePending);

        match self.services.categories.update_category(model).await {
            Ok(()) => {
                self.categories_action(CategoriesAction::UpdateFulfilled(model.clone()));
                Ok(())
            }
            Err(err) => {
                self.categories_action(CategoriesAction::UpdateRejected(Rejection::from(&err)));
                Err(err)
            }
        }
    }

    pub async fn delete_category(&self, id: i64) -> Result<()> {
        self.categories_action(CategoriesAction::DeletePending);

        match self.services.categories.delete_category(id).await {
            Ok(()) => {
                self.categories_action(CategoriesAction::DeleteFulfilled { id });
                Ok(())
            }
            Err(err) => {
                self.categories_action(CategoriesAction::DeleteRejected(Rejection::from(&err)));
                Err(err)
            }
        }
    }

    pub fn select_category(&self, category: Option<Category>) {
        self.categories_action(match category {
            Some(category) => CategoriesAction::Select(category),
            None => CategoriesAction::Unselect,
        });
    }

    pub fn clear_categories_success(&self) {
        self.categories_action(CategoriesAction::ClearSuccess);
    }

    pub fn clear_categories_error(&self) {
        self.categories_action(CategoriesAction::ClearError);
    }

    // Products

    /// Fetch a product page, through semantic search when a search term is set.
    pub async fn fetch_product_page(&self, page_number: u32, page_size: u32) -> Result<Page<Product>> {
        let (request, semantic) = self.apply(|state| {
            state.products.reduce(ProductsAction::FetchPagePending);
            (
                state.products.page.latest_request(),
                state.products.semantic.clone(),
            )
        });

        let result = if semantic.trim().is_empty() {
            self.services.products.get_products(page_number, page_size).await
        } else {
            self.services
                .products
                .search_products(&semantic, page_number, page_size)
                .await
        };

        match result {
            Ok(page) => {
                self.products_action(ProductsAction::FetchPageFulfilled {
                    request,
                    page: page.clone(),
                });
                Ok(page)
            }
            Err(err) => {
                self.products_action(ProductsAction::FetchPageRejected {
                    request,
                    rejection: Rejection::from(&err),
                });
                Err(err)
            }
        }
    }

    pub async fn get_product_by_sku(&self, sku: &str) -> Result<Product> {
        self.services.products.get_product_by_sku(sku).await
    }

    /// Create a product, then reload the first page so it shows up in
    /// server order. The create stays pending until the reload settles.
    pub async fn create_product(&self, model: &CreateProduct) -> Result<()> {
        self.products_action(ProductsAction::CreatePending);

        if let Err(err) = self.services.products.create_product(model).await {
            self.products_action(ProductsAction::CreateRejected(Rejection::from(&err)));
            return Err(err);
        }
        self.refetch_first_page(PagedResource::Products).await;
        self.products_action(ProductsAction::CreateFulfilled);
        Ok(())
    }

    pub async fn update_product(&self, model: &UpdateProduct) -> Result<()> {
        self.products_action(ProductsAction::UpdatePending);

        match self.services.products.update_product(model).await {
            Ok(()) => {
                let category_name = self.read(|state| {
                    state
                        .categories
                        .find(model.category_id)
                        .map(|category| category.name.clone())
                });
                self.products_action(ProductsAction::UpdateFulfilled(ProductPatch::new(
                    model,
                    category_name,
                )));
                Ok(())
            }
            Err(err) => {
                self.products_action(ProductsAction::UpdateRejected(Rejection::from(&err)));
                Err(err)
            }
        }
    }

    pub async fn delete_product(&self, sku: &str) -> Result<()> {
        self.products_action(ProductsAction::DeletePending);

        match self.services.products.delete_product(sku).await {
            Ok(()) => {
                self.products_action(ProductsAction::DeleteFulfilled {
                    sku: sku.to_string(),
                });
                Ok(())
            }
            Err(err) => {
                self.products_action(ProductsAction::DeleteRejected(Rejection::from(&err)));
                Err(err)
            }
        }
    }

    pub async fn increase_stock(&self, sku: &str, quantity: i64) -> Result<()> {
        self.products_action(ProductsAction::IncreaseStockPending);

        match self.services.stock.increase_stock(sku, quantity).await {
            Ok(()) => {
                self.products_action(ProductsAction::IncreaseStockFulfilled {
                    sku: sku.to_string(),
                    quantity,
                });
                Ok(())
            }
            Err(err) => {
                self.products_action(ProductsAction::IncreaseStockRejected(Rejection::from(
                    &err,
                )));
                Err(err)
            }
        }
    }

    pub fn set_semantic(&self, semantic: &str) {
        self.products_action(ProductsAction::SetSemantic(semantic.to_string()));
    }

    pub fn set_current_page_number(&self, resource: PagedResource, page_number: u32) {
        match resource {
            PagedResource::Products => {
                self.products_action(ProductsAction::SetCurrentPageNumber(page_number))
            }
            PagedResource::Customers => {
                self.customers_action(CustomersAction::SetCurrentPageNumber(page_number))
            }
            PagedResource::Images => {
                self.image_gallery_action(ImageGalleryAction::SetCurrentPageNumber(page_number))
            }
        }
    }

    pub fn select_product(&self, product: Option<Product>) {
        self.products_action(match product {
            Some(product) => ProductsAction::Select(product),
            None => ProductsAction::Unselect,
        });
    }

    pub fn clear_products_success(&self) {
        self.products_action(ProductsAction::ClearSuccess);
    }

    pub fn clear_products_error(&self) {
        self.products_action(ProductsAction::ClearError);
    }

    // Customers

    pub async fn fetch_customer_page(&self, page_number: u32, page_size: u32) -> Result<Page<Customer>> {
        let request = self.apply(|state| {
            state.customers.reduce(CustomersAction::FetchPagePending);
            state.customers.page.latest_request()
        });

        match self.services.customers.get_customers(page_number, page_size).await {
            Ok(page) => {
                self.customers_action(CustomersAction::FetchPageFulfilled {
                    request,
                    page: page.clone(),
                });
                Ok(page)
            }
            Err(err) => {
                self.customers_action(CustomersAction::FetchPageRejected {
                    request,
                    rejection: Rejection::from(&err),
                });
                Err(err)
            }
        }
    }

    pub fn clear_customers_error(&self) {
        self.customers_action(CustomersAction::ClearError);
    }

    // Image gallery

    pub async fn fetch_image_page(&self, page_number: u32, page_size: u32) -> Result<Page<Image>> {
        let request = self.apply(|state| {
            state.image_gallery.reduce(ImageGalleryAction::FetchPagePending);
            state.image_gallery.page.latest_request()
        });

        match self.services.images.get_images(page_number, page_size).await {
            Ok(page) => {
                self.image_gallery_action(ImageGalleryAction::FetchPageFulfilled {
                    request,
                    page: page.clone(),
                });
                Ok(page)
            }
            Err(err) => {
                self.image_gallery_action(ImageGalleryAction::FetchPageRejected {
                    request,
                    rejection: Rejection::from(&err),
                });
                Err(err)
            }
        }
    }

    /// Upload an image, then reload the first gallery page. The upload
    /// stays pending until the reload settles.
    pub async fn upload_image(&self, upload: &Upload) -> Result<()> {
        self.image_gallery_action(ImageGalleryAction::UploadPending);

        if let Err(err) = self.services.images.upload_image(upload).await {
            self.image_gallery_action(ImageGalleryAction::UploadRejected(Rejection::from(&err)));
            return Err(err);
        }
        self.refetch_first_page(PagedResource::Images).await;
        self.image_gallery_action(ImageGalleryAction::UploadFulfilled);
        Ok(())
    }

    pub async fn delete_image(&self, id: &str) -> Result<()> {
        self.image_gallery_action(ImageGalleryAction::DeletePending);

        match self.services.images.delete_image(id).await {
            Ok(()) => {
                self.image_gallery_action(ImageGalleryAction::DeleteFulfilled {
                    id: id.to_string(),
                });
                Ok(())
            }
            Err(err) => {
                self.image_gallery_action(ImageGalleryAction::DeleteRejected(Rejection::from(
                    &err,
                )));
                Err(err)
            }
        }
    }

    pub fn select_image(&self, image: Option<Image>) {
        self.image_gallery_action(match image {
            Some(image) => ImageGalleryAction::Select(image),
            None => ImageGalleryAction::Unselect,
        });
    }

    pub fn clear_image_gallery_success(&self) {
        self.image_gallery_action(ImageGalleryAction::ClearSuccess);
    }

    pub fn clear_image_gallery_error(&self) {
        self.image_gallery_action(ImageGalleryAction::ClearError);
    }

    // The mutation already succeeded; a failed reload only lands in the
    // slice's error envelope.
    async fn refetch_first_page(&self, resource: PagedResource) {
        if let Err(err) = self.page_fetcher(resource).fetch(1).await {
            if !matches!(err, Error::SignInRequired) {
                log::debug!("Reloading first page of {:?} failed: {}", resource, err);
            }
        }
    }
}
