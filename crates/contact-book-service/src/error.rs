use axum::extract::rejection::{FormRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contact_book_core::{ContactId, StoreError};

use crate::views::ViewError;

/// Failure of one contact request. Details go to the log; the client only sees the status
/// and a generic message.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("invalid contact id {0:?}")]
    InvalidId(String),
    #[error("unreadable contact id: {0}")]
    Path(#[from] PathRejection),
    #[error("unreadable query string: {0}")]
    Query(#[from] QueryRejection),
    #[error("contact {0} not found")]
    NotFound(ContactId),
    #[error("failed to parse form: {0}")]
    Form(#[from] FormRejection),
    #[error("failed to render view: {0}")]
    View(#[from] ViewError),
    #[error("contact store failed: {0}")]
    Store(StoreError),
}

impl From<StoreError> for HandlerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other @ StoreError::Backend(_) => Self::Store(other),
        }
    }
}

impl HandlerError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId(_) | Self::Path(_) | Self::Query(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Form(_) | Self::View(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidId(_) | Self::Path(_) => "Invalid ID",
            Self::Query(_) => "Bad Request",
            Self::NotFound(_) => "Contact not found",
            Self::Form(_) | Self::View(_) | Self::Store(_) => "Internal Server Error",
        }
    }

    /// Emit the failure in the current span: client mistakes at warn, server faults at error.
    pub fn log(&self) {
        if self.status().is_server_error() {
            tracing::error!(
                status = self.status().as_u16(),
                error = %self,
                "contact request failed"
            );
        } else {
            tracing::warn!(
                status = self.status().as_u16(),
                error = %self,
                "contact request rejected"
            );
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}
