//! Pagination state and helpers

use crate::error::Result;
use crate::models::Page;

use super::Store;

/// Pagination bookkeeping of a paged slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    /// Total number of matching items on the server
    pub count: u64,
    /// 1-based
    pub page_number: u32,
    pub page_size: u32,
    latest_request: u64,
    discard_stale: bool,
}

impl PageState {
    pub fn new(page_size: u32, discard_stale: bool) -> Self {
        Self {
            count: 0,
            page_number: 1,
            page_size,
            latest_request: 0,
            discard_stale,
        }
    }

    /// Register a new fetch and return its request token.
    pub(crate) fn begin_request(&mut self) -> u64 {
        self.latest_request += 1;
        self.latest_request
    }

    pub fn latest_request(&self) -> u64 {
        self.latest_request
    }

    /// A response is stale when a newer fetch was issued after it and
    /// stale responses are being discarded.
    pub(crate) fn is_stale(&self, request: u64) -> bool {
        self.discard_stale && request < self.latest_request
    }

    /// Take count, page number and page size from the server's envelope.
    pub(crate) fn apply<T>(&mut self, page: &Page<T>) {
        self.count = page.count;
        self.page_number = page.page_number;
        self.page_size = page.page_size;
    }

    pub(crate) fn item_removed(&mut self) {
        self.count = self.count.saturating_sub(1);
    }

    pub fn page_count(&self) -> u32 {
        page_count(self.count, self.page_size)
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.page_count()
    }
}

/// Number of pages needed for `count` items
pub fn page_count(count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let size = u64::from(page_size);
    let pages = count / size + u64::from(count % size != 0);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// One control of a pagination bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Previous(u32),
    Page { number: u32, active: bool },
    Ellipsis,
    Next(u32),
}

/// Controls to render for `current` out of `total` pages.
///
/// Up to six pages are all listed; beyond that the first and last pages
/// frame the current page and its neighbours, with ellipses for the gaps.
/// With an unknown total only previous/next are offered.
pub fn page_window(current: u32, total: Option<u32>) -> Vec<PageLink> {
    let mut links = Vec::new();

    if current > 1 {
        links.push(PageLink::Previous(current - 1));
    }

    let total = match total {
        Some(total) if total > 0 => total,
        _ => {
            if let Some(next) = current.checked_add(1) {
                links.push(PageLink::Next(next));
            }
            return links;
        }
    };

    let page = |number: u32| PageLink::Page {
        number,
        active: number == current,
    };

    if total <= 6 {
        links.extend((1..=total).map(page));
    } else {
        links.push(page(1));
        if current.saturating_sub(1) > 2 {
            links.push(PageLink::Ellipsis);
        }
        let first = current.saturating_sub(1).max(2);
        let last = current.saturating_add(1).min(total - 1);
        links.extend((first..=last).map(page));
        if current.saturating_add(1) < total - 1 {
            links.push(PageLink::Ellipsis);
        }
        links.push(page(total));
    }

    if current < total {
        links.push(PageLink::Next(current + 1));
    }

    links
}

/// Paged resources of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagedResource {
    Products,
    Customers,
    Images,
}

/// Fetch a slice's pages by number, at the slice's current page size.
///
/// The page size is read on every call, so the fetcher follows the size
/// the server last echoed without being rebuilt.
#[derive(Clone)]
pub struct PageFetcher {
    store: Store,
    resource: PagedResource,
}

impl PageFetcher {
    pub(crate) fn new(store: Store, resource: PagedResource) -> Self {
        Self { store, resource }
    }

    pub fn page_size(&self) -> u32 {
        self.store.read(|state| match self.resource {
            PagedResource::Products => state.products.page.page_size,
            PagedResource::Customers => state.customers.page.page_size,
            PagedResource::Images => state.image_gallery.page.page_size,
        })
    }

    pub async fn fetch(&self, page_number: u32) -> Result<()> {
        let page_size = self.page_size();

        match self.resource {
            PagedResource::Products => {
                self.store.fetch_product_page(page_number, page_size).await?;
            }
            PagedResource::Customers => {
                self.store.fetch_customer_page(page_number, page_size).await?;
            }
            PagedResource::Images => {
                self.store.fetch_image_page(page_number, page_size).await?;
            }
        }
        Ok(())
    }
}
