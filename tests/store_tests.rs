use rookie_shop_admin::auth::StaticIdentity;
use rookie_shop_admin::config::ClientOptions;
use rookie_shop_admin::models::{CreateCategory, Image, UpdateCategory};
use rookie_shop_admin::services::Upload;
use rookie_shop_admin::store::{PagedResource, RequestStatus};
use rookie_shop_admin::RookieShop;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn shop(server: &MockServer) -> RookieShop {
    let options = ClientOptions::default().with_api_url(&server.uri());
    let identity = Arc::new(StaticIdentity::new(Some("token".into()), "roles"));
    RookieShop::new(options, identity).unwrap()
}

fn product(sku: &str, quantity: i64) -> Value {
    json!({
        "sku": sku,
        "name": format!("Product {}", sku),
        "description": "",
        "price": 19.99,
        "categoryId": 1,
        "categoryName": "Books",
        "primaryImageId": null,
        "supportingImageIds": [],
        "isFeatured": false,
        "availableQuantity": quantity
    })
}

async fn mount_products(server: &MockServer, items: Vec<Value>, page_number: u32, page_size: u32, count: u64) {
    Mock::given(method("GET"))
        .and(path("/product-catalog/api/products/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": count,
            "pageNumber": page_number,
            "pageSize": page_size,
            "items": items
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_page_takes_server_page_numbers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/product-catalog/api/products/all"))
        .and(query_param("pageNumber", "9"))
        .and(query_param("pageSize", "8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 17,
            "pageNumber": 3,
            "pageSize": 8,
            "items": [product("Q", 1)]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let shop = shop(&mock_server);
    shop.store().fetch_product_page(9, 8).await.unwrap();

    let products = shop.store().products();
    assert_eq!(products.page.page_number, 3);
    assert_eq!(products.page.count, 17);
    assert_eq!(products.page.page_count(), 3);
    assert!(!products.page.has_next());
    assert_eq!(products.status.fetch_page, RequestStatus::Succeeded(()));
}

#[tokio::test]
async fn test_fetch_page_twice_is_idempotent() {
    let mock_server = MockServer::start().await;
    mount_products(&mock_server, vec![product("A", 1), product("B", 2)], 1, 8, 2).await;

    let shop = shop(&mock_server);
    shop.store().fetch_product_page(1, 8).await.unwrap();
    let first = shop.store().products();
    shop.store().fetch_product_page(1, 8).await.unwrap();
    let second = shop.store().products();

    assert_eq!(first.products, second.products);
    assert_eq!(first.page.count, second.page.count);
}

#[tokio::test]
async fn test_increase_stock_adds_in_place() {
    let mock_server = MockServer::start().await;
    mount_products(&mock_server, vec![product("SKU-1", 10)], 1, 8, 1).await;

    Mock::given(method("PUT"))
        .and(path("/shopping/api/stock-items/SKU-1/increase-stock"))
        .and(body_json(json!({ "quantity": 5 })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let shop = shop(&mock_server);
    let store = shop.store();
    store.fetch_product_page(1, 8).await.unwrap();
    store.increase_stock("SKU-1", 5).await.unwrap();

    assert_eq!(store.products().find("SKU-1").unwrap().available_quantity, 15);
}

#[tokio::test]
async fn test_concurrent_stock_increases_both_apply() {
    let mock_server = MockServer::start().await;
    mount_products(&mock_server, vec![product("SKU-1", 10)], 1, 8, 1).await;

    Mock::given(method("PUT"))
        .and(path("/shopping/api/stock-items/SKU-1/increase-stock"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&mock_server)
        .await;

    let shop = shop(&mock_server);
    let store = shop.store();
    store.fetch_product_page(1, 8).await.unwrap();

    let (a, b) = tokio::join!(store.increase_stock("SKU-1", 3), store.increase_stock("SKU-1", 5));
    a.unwrap();
    b.unwrap();

    assert_eq!(store.products().find("SKU-1").unwrap().available_quantity, 18);
}

#[tokio::test]
async fn test_delete_product_keeps_page_boundaries() {
    let mock_server = MockServer::start().await;
    mount_products(
        &mock_server,
        vec![product("A", 1), product("B", 1), product("C", 1)],
        2,
        3,
        9,
    )
    .await;

    Mock::given(method("DELETE"))
        .and(path("/product-catalog/api/products/B"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let shop = shop(&mock_server);
    let store = shop.store();
    store.fetch_product_page(2, 3).await.unwrap();
    store.delete_product("B").await.unwrap();

    let products = store.products();
    assert_eq!(products.products.len(), 2);
    assert_eq!(products.page.page_number, 2);
    assert_eq!(products.page.page_size, 3);
    assert_eq!(
        products.success.unwrap().detail,
        "Product was successfully deleted"
    );
}

#[tokio::test]
async fn test_semantic_search_uses_search_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/product-catalog/api/products/semantic"))
        .and(query_param("semantic", "blue mug"))
        .and(query_param("pageNumber", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "pageNumber": 1,
            "pageSize": 8,
            "items": [product("MUG", 4)]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let shop = shop(&mock_server);
    shop.store().set_semantic("blue mug");
    shop.store()
        .page_fetcher(PagedResource::Products)
        .fetch(1)
        .await
        .unwrap();

    assert_eq!(shop.store().products().products[0].sku, "MUG");
}

#[tokio::test]
async fn test_category_lifecycle() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/product-catalog/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "name": "Books", "description": "Paper" }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/product-catalog/api/categories"))
        .and(body_json(json!({ "name": "Games", "description": "Board" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 2 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/product-catalog/api/categories/1"))
        .and(body_json(json!({ "name": "Novels", "description": "Stories" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/product-catalog/api/categories/2"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "title": "Conflict",
            "status": 409,
            "detail": "Category still has products"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let shop = shop(&mock_server);
    let store = shop.store();

    store.fetch_categories().await.unwrap();
    let id = store
        .create_category(&CreateCategory {
            name: "Games".into(),
            description: "Board".into(),
        })
        .await
        .unwrap();
    assert_eq!(id, 2);
    assert_eq!(store.categories().categories[0].id, 2);

    store
        .update_category(&UpdateCategory {
            id: 1,
            name: "Novels".into(),
            description: "Stories".into(),
        })
        .await
        .unwrap();
    assert_eq!(store.categories().find(1).unwrap().name, "Novels");

    assert!(store.delete_category(2).await.is_err());
    let categories = store.categories();
    assert_eq!(categories.categories.len(), 2);
    let error = categories.error.unwrap();
    assert_eq!(error.title, "Conflict");
    assert_eq!(error.detail, "Category still has products");
}

#[tokio::test]
async fn test_customers_are_paged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/identity/api/customers"))
        .and(query_param("pageNumber", "2"))
        .and(query_param("pageSize", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 11,
            "pageNumber": 2,
            "pageSize": 10,
            "items": [{
                "id": "c-11",
                "username": "zoe",
                "firstName": "Zoe",
                "lastName": "Doe",
                "email": "zoe@example.com",
                "emailVerified": true,
                "enabled": true
            }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let shop = shop(&mock_server);
    shop.store()
        .page_fetcher(PagedResource::Customers)
        .fetch(2)
        .await
        .unwrap();

    let customers = shop.store().customers();
    assert_eq!(customers.customers[0].username, "zoe");
    assert!(customers.page.has_previous());
    assert!(!customers.page.has_next());
}

#[tokio::test]
async fn test_upload_image_reloads_first_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/product-catalog/api/image-gallery"))
        .and(body_string_contains("name=\"File\""))
        .and(body_string_contains("filename=\"cat.png\""))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/product-catalog/api/image-gallery"))
        .and(query_param("pageNumber", "1"))
        .and(query_param("pageSize", "12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "pageNumber": 1,
            "pageSize": 12,
            "items": [{ "id": "img-1" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let shop = shop(&mock_server);
    let upload = Upload::new("cat.png", b"\x89PNG".to_vec()).with_mime_type("image/png");
    shop.store().upload_image(&upload).await.unwrap();

    let gallery = shop.store().image_gallery();
    assert_eq!(gallery.images, vec![Image { id: "img-1".into() }]);
    assert_eq!(
        shop.image_url(&gallery.images[0]),
        format!("{}/product-catalog/api/image-gallery/img-1", mock_server.uri())
    );
}

#[tokio::test]
async fn test_overtaken_page_is_discarded_when_enabled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/product-catalog/api/products/all"))
        .and(query_param("pageNumber", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_json(json!({
                    "count": 16,
                    "pageNumber": 1,
                    "pageSize": 8,
                    "items": [product("OLD", 1)]
                })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/product-catalog/api/products/all"))
        .and(query_param("pageNumber", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 16,
            "pageNumber": 2,
            "pageSize": 8,
            "items": [product("NEW", 1)]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = ClientOptions::default()
        .with_api_url(&mock_server.uri())
        .with_discard_stale_pages(true);
    let identity = Arc::new(StaticIdentity::new(Some("token".into()), "roles"));
    let shop = RookieShop::new(options, identity).unwrap();
    let store = shop.store();

    let (slow, fast) = tokio::join!(store.fetch_product_page(1, 8), store.fetch_product_page(2, 8));
    slow.unwrap();
    fast.unwrap();

    let products = store.products();
    assert_eq!(products.page.page_number, 2);
    assert_eq!(products.products[0].sku, "NEW");
    assert_eq!(products.status.fetch_page, RequestStatus::Succeeded(()));
}
