//! Request lifecycle shared by every slice

use std::fmt;

use crate::error::Error;

/// Success or error envelope shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Notice {
    pub title: String,
    pub detail: String,
}

impl Notice {
    pub fn new<T: fmt::Display, D: fmt::Display>(title: T, detail: D) -> Self {
        Self {
            title: title.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn success<D: fmt::Display>(detail: D) -> Self {
        Self::new("Success", detail)
    }
}

/// Why an operation did not complete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The API refused the request; shown to the user
    Failed(Notice),
    /// The session could not be renewed and the user is being sent to
    /// sign-in; nothing to show
    Abandoned,
}

impl From<&Error> for Rejection {
    fn from(error: &Error) -> Self {
        match error {
            Error::SignInRequired => Rejection::Abandoned,
            other => Rejection::Failed(other.notice()),
        }
    }
}

/// State of one operation kind on a slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestStatus<T = ()> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(Notice),
}

impl<T> Default for RequestStatus<T> {
    fn default() -> Self {
        RequestStatus::Idle
    }
}

impl<T> RequestStatus<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestStatus::Pending)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, RequestStatus::Idle)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            RequestStatus::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Notice> {
        match self {
            RequestStatus::Failed(notice) => Some(notice),
            _ => None,
        }
    }

    pub(crate) fn start(&mut self) {
        *self = RequestStatus::Pending;
    }

    pub(crate) fn succeed(&mut self, value: T) {
        *self = RequestStatus::Succeeded(value);
    }

    /// Settle as rejected, copying a user-facing failure into `error`.
    pub(crate) fn reject(&mut self, rejection: Rejection, error: &mut Option<Notice>) {
        match rejection {
            Rejection::Failed(notice) => {
                *error = Some(notice.clone());
                *self = RequestStatus::Failed(notice);
            }
            Rejection::Abandoned => *self = RequestStatus::Idle,
        }
    }

    pub(crate) fn acknowledge_success(&mut self) {
        if matches!(self, RequestStatus::Succeeded(_)) {
            *self = RequestStatus::Idle;
        }
    }

    pub(crate) fn acknowledge_failure(&mut self) {
        if matches!(self, RequestStatus::Failed(_)) {
            *self = RequestStatus::Idle;
        }
    }
}
