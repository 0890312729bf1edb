//! Domain services: one per resource, each method one gateway call
//!
//! Services never retry, cache or catch; errors reach the store unchanged.

mod category;
mod customer;
mod image_gallery;
mod product;
mod stock;

pub use category::{ApiCategoryService, CategoryService};
pub use customer::{ApiCustomerService, CustomerService};
pub use image_gallery::{ApiImageGalleryService, ImageGalleryService, Upload};
pub use product::{ApiProductService, ProductService};
pub use stock::{ApiStockService, StockService};

pub(crate) fn page_query(page_number: u32, page_size: u32) -> Vec<(&'static str, String)> {
    vec![
        ("pageNumber", page_number.to_string()),
        ("pageSize", page_size.to_string()),
    ]
}
