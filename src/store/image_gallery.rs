//! Image gallery slice

use crate::models::{Image, Page};

use super::pagination::PageState;
use super::status::{Notice, Rejection, RequestStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageGalleryStatus {
    pub fetch_page: RequestStatus,
    pub upload: RequestStatus,
    pub delete: RequestStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageGallerySlice {
    pub images: Vec<Image>,
    pub page: PageState,
    pub selected: Option<Image>,
    pub status: ImageGalleryStatus,
    pub success: Option<Notice>,
    pub error: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageGalleryAction {
    FetchPagePending,
    FetchPageFulfilled { request: u64, page: Page<Image> },
    FetchPageRejected { request: u64, rejection: Rejection },
    UploadPending,
    UploadFulfilled,
    UploadRejected(Rejection),
    DeletePending,
    DeleteFulfilled { id: String },
    DeleteRejected(Rejection),
    SetCurrentPageNumber(u32),
    Select(Image),
    Unselect,
    ClearSuccess,
    ClearError,
}

impl ImageGallerySlice {
    pub fn new(page_size: u32, discard_stale: bool) -> Self {
        Self {
            images: Vec::new(),
            page: PageState::new(page_size, discard_stale),
            selected: None,
            status: ImageGalleryStatus::default(),
            success: None,
            error: None,
        }
    }

    pub fn reduce(&mut self, action: ImageGalleryAction) {
        use ImageGalleryAction::*;

        match action {
            FetchPagePending => {
                self.page.begin_request();
                self.status.fetch_page.start();
            }
            FetchPageFulfilled { request, page } => {
                if self.page.is_stale(request) {
                    log::debug!("Dropping stale image page {}", page.page_number);
                    return;
                }
                self.page.apply(&page);
                self.images = page.items;
                self.status.fetch_page.succeed(());
            }
            FetchPageRejected { request, rejection } => {
                if !self.page.is_stale(request) {
                    self.status.fetch_page.reject(rejection, &mut self.error);
                }
            }

            UploadPending => self.status.upload.start(),
            UploadFulfilled => {
                self.status.upload.succeed(());
                self.success = Some(Notice::success("Image was successfully uploaded"));
            }
            UploadRejected(rejection) => self.status.upload.reject(rejection, &mut self.error),

            DeletePending => self.status.delete.start(),
            DeleteFulfilled { id } => {
                let before = self.images.len();
                self.images.retain(|image| image.id != id);
                if self.images.len() < before {
                    self.page.item_removed();
                }
                if self.selected.as_ref().map_or(false, |image| image.id == id) {
                    self.selected = None;
                }
                self.status.delete.succeed(());
                self.success = Some(Notice::success("Image was successfully deleted"));
            }
            DeleteRejected(rejection) => self.status.delete.reject(rejection, &mut self.error),

            SetCurrentPageNumber(page_number) => self.page.page_number = page_number.max(1),
            Select(image) => self.selected = Some(image),
            Unselect => self.selected = None,
            ClearSuccess => {
                self.success = None;
                self.status.fetch_page.acknowledge_success();
                self.status.upload.acknowledge_success();
                self.status.delete.acknowledge_success();
            }
            ClearError => {
                self.error = None;
                self.status.fetch_page.acknowledge_failure();
                self.status.upload.acknowledge_failure();
                self.status.delete.acknowledge_failure();
            }
        }
    }
}
