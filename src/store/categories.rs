//! Categories slice: the whole (unpaged) category list

use crate::models::{Category, CreateCategory, UpdateCategory};

use super::status::{Notice, Rejection, RequestStatus};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoriesStatus {
    pub fetch: RequestStatus,
    /// Holds the id assigned by the server
    pub create: RequestStatus<i64>,
    pub update: RequestStatus,
    pub delete: RequestStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoriesSlice {
    pub categories: Vec<Category>,
    pub selected: Option<Category>,
    pub status: CategoriesStatus,
    pub success: Option<Notice>,
    pub error: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CategoriesAction {
    FetchPending,
    FetchFulfilled(Vec<Category>),
    FetchRejected(Rejection),
    CreatePending,
    CreateFulfilled { id: i64, model: CreateCategory },
    CreateRejected(Rejection),
    UpdatePending,
    UpdateFulfilled(UpdateCategory),
    UpdateRejected(Rejection),
    DeletePending,
    DeleteFulfilled { id: i64 },
    DeleteRejected(Rejection),
    Select(Category),
    Unselect,
    ClearSuccess,
    ClearError,
}

impl CategoriesSlice {
    pub fn find(&self, id: i64) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.status.fetch.is_loading()
            || self.status.create.is_loading()
            || self.status.update.is_loading()
            || self.status.delete.is_loading()
    }

    pub fn reduce(&mut self, action: CategoriesAction) {
        use CategoriesAction::*;

        match action {
            FetchPending => self.status.fetch.start(),
            FetchFulfilled(categories) => {
                self.categories = categories;
                self.status.fetch.succeed(());
            }
            FetchRejected(rejection) => self.status.fetch.reject(rejection, &mut self.error),

            CreatePending => self.status.create.start(),
            CreateFulfilled { id, model } => {
                // The server only adds the id, so the entity is complete.
                self.categories.insert(
                    0,
                    Category {
                        id,
                        name: model.name,
                        description: model.description,
                    },
                );
                self.status.create.succeed(id);
                self.success = Some(Notice::success("Category was successfully created"));
            }
            CreateRejected(rejection) => self.status.create.reject(rejection, &mut self.error),

            UpdatePending => self.status.update.start(),
            UpdateFulfilled(model) => {
                if let Some(category) = self.categories.iter_mut().find(|c| c.id == model.id) {
                    category.name = model.name.clone();
                    category.description = model.description.clone();
                }
                if let Some(selected) = self.selected.as_mut().filter(|c| c.id == model.id) {
                    selected.name = model.name;
                    selected.description = model.description;
                }
                self.status.update.succeed(());
                self.success = Some(Notice::success("Category was successfully updated"));
            }
            UpdateRejected(rejection) => self.status.update.reject(rejection, &mut self.error),

            DeletePending => self.status.delete.start(),
            DeleteFulfilled { id } => {
                self.categories.retain(|category| category.id != id);
                if self.selected.as_ref().map_or(false, |c| c.id == id) {
                    self.selected = None;
                }
                self.status.delete.succeed(());
                self.success = Some(Notice::success("Category was successfully deleted"));
            }
            DeleteRejected(rejection) => self.status.delete.reject(rejection, &mut self.error),

            Select(category) => self.selected = Some(category),
            Unselect => self.selected = None,
            ClearSuccess => {
                self.success = None;
                self.status.fetch.acknowledge_success();
                self.status.create.acknowledge_success();
                self.status.update.acknowledge_success();
                self.status.delete.acknowledge_success();
            }
            ClearError => {
                self.error = None;
                self.status.fetch.acknowledge_failure();
                self.status.create.acknowledge_failure();
                self.status.update.acknowledge_failure();
                self.status.delete.acknowledge_failure();
            }
        }
    }
}
