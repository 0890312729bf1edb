//! Customers slice: read-only pages of shop customers

use crate::models::{Customer, Page};

use super::pagination::PageState;
use super::status::{Notice, Rejection, RequestStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct CustomersSlice {
    pub customers: Vec<Customer>,
    pub page: PageState,
    pub status: RequestStatus,
    pub error: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CustomersAction {
    FetchPagePending,
    FetchPageFulfilled { request: u64, page: Page<Customer> },
    FetchPageRejected { request: u64, rejection: Rejection },
    SetCurrentPageNumber(u32),
    ClearError,
}

impl CustomersSlice {
    pub fn new(page_size: u32, discard_stale: bool) -> Self {
        Self {
            customers: Vec::new(),
            page: PageState::new(page_size, discard_stale),
            status: RequestStatus::default(),
            error: None,
        }
    }

    pub fn reduce(&mut self, action: CustomersAction) {
        use CustomersAction::*;

        match action {
            FetchPagePending => {
                self.page.begin_request();
                self.status.start();
            }
            FetchPageFulfilled { request, page } => {
                if self.page.is_stale(request) {
                    log::debug!("Dropping stale customer page {}", page.page_number);
                    return;
                }
                self.page.apply(&page);
                self.customers = page.items;
                self.status.succeed(());
            }
            FetchPageRejected { request, rejection } => {
                if !self.page.is_stale(request) {
                    self.status.reject(rejection, &mut self.error);
                }
            }
            SetCurrentPageNumber(page_number) => self.page.page_number = page_number.max(1),
            ClearError => {
                self.error = None;
                self.status.acknowledge_failure();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(id: &str) -> Customer {
        Customer {
            id: id.to_string(),
            username: format!("user-{}", id),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: format!("{}@example.com", id),
            email_verified: true,
            enabled: true,
        }
    }

    #[test]
    fn fetch_replaces_customers_and_page() {
        let mut slice = CustomersSlice::new(10, false);
        slice.reduce(CustomersAction::FetchPagePending);
        assert!(slice.status.is_loading());

        slice.reduce(CustomersAction::FetchPageFulfilled {
            request: 1,
            page: Page {
                count: 21,
                page_number: 2,
                page_size: 10,
                items: vec![customer("a"), customer("b")],
            },
        });

        assert_eq!(slice.customers.len(), 2);
        assert_eq!(slice.page.page_number, 2);
        assert_eq!(slice.page.page_count(), 3);
        assert!(slice.page.has_next());
    }

    #[test]
    fn error_is_cleared_on_request() {
        let mut slice = CustomersSlice::new(10, false);
        slice.reduce(CustomersAction::FetchPagePending);
        slice.reduce(CustomersAction::FetchPageRejected {
            request: 1,
            rejection: Rejection::Failed(Notice::new("Forbidden", "Admins only")),
        });
        assert_eq!(slice.error.as_ref().unwrap().title, "Forbidden");

        slice.reduce(CustomersAction::ClearError);

        assert!(slice.error.is_none());
        assert!(slice.status.is_idle());
    }
}
