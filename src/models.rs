//! Records mirrored from the RookieShop API

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::ApiRoutes;

/// A product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A catalog product, addressed by its SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category_id: i64,
    #[serde(default)]
    pub category_name: String,
    #[serde(default)]
    pub primary_image_id: Option<String>,
    #[serde(default)]
    pub supporting_image_ids: BTreeSet<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub available_quantity: i64,
}

/// A shop customer (read-only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub enabled: bool,
}

/// An image of the gallery; its content lives at [`Image::content_url`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
}

impl Image {
    /// Address of the binary content
    pub fn content_url(&self, api_url: &str, routes: &ApiRoutes) -> String {
        format!(
            "{}{}/{}",
            api_url.trim_end_matches('/'),
            routes.image_gallery,
            self.id
        )
    }
}

/// Envelope returned by every paged fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Total number of matching items
    pub count: u64,
    /// 1-based
    pub page_number: u32,
    pub page_size: u32,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategory {
    #[serde(skip)]
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Response of a category creation
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Created<T> {
    pub id: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category_id: i64,
    pub primary_image_id: Option<String>,
    pub supporting_image_ids: BTreeSet<String>,
    pub is_featured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[serde(skip)]
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category_id: i64,
    pub primary_image_id: Option<String>,
    pub supporting_image_ids: BTreeSet<String>,
    pub is_featured: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IncreaseStock {
    pub quantity: i64,
}
