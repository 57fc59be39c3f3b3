use std::sync::Arc;

use axum::extract::rejection::{FormRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use contact_book_core::{search_contacts, ContactForm, ContactId, ContactStore};
use tracing::Span;

use crate::error::HandlerError;
use crate::views::Views;

pub const CONTACTS_PATH: &str = "/contacts";

/// Path segment holding the contact id, before it is parsed.
pub type RawId = Result<String, PathRejection>;

/// The `q` search term; only its first occurrence counts.
pub type SearchTerm = Result<Option<String>, QueryRejection>;

/// Translates contact requests into store calls and view renders.
///
/// Every event the handler logs is recorded inside the span it was built with.
#[derive(Clone)]
pub struct ContactHandler {
    store: Arc<dyn ContactStore>,
    views: Views,
    span: Span,
}

impl ContactHandler {
    #[must_use]
    pub fn new(store: Arc<dyn ContactStore>, views: Views, span: Span) -> Self {
        Self { store, views, span }
    }

    pub fn list(&self, query: SearchTerm) -> Response {
        let _entered = self.span.enter();
        finish(self.try_list(query))
    }

    pub fn new_form(&self) -> Response {
        let _entered = self.span.enter();
        finish(self.views.new_contact().map(Html).map_err(HandlerError::from))
    }

    pub fn create(&self, form: Result<ContactForm, FormRejection>) -> Response {
        let _entered = self.span.enter();
        finish(self.try_create(form))
    }

    pub fn edit_form(&self, raw_id: RawId) -> Response {
        let _entered = self.span.enter();
        finish(self.try_edit_form(raw_id))
    }

    pub fn update(&self, raw_id: RawId, form: Result<ContactForm, FormRejection>) -> Response {
        let _entered = self.span.enter();
        finish(self.try_update(raw_id, form))
    }

    pub fn delete(&self, raw_id: RawId) -> Response {
        let _entered = self.span.enter();
        finish(self.try_delete(raw_id))
    }

    fn try_list(&self, query: SearchTerm) -> Result<Html<String>, HandlerError> {
        let query = query?.unwrap_or_default();
        let contacts = self.store.list_contacts()?;
        if !query.is_empty() {
            tracing::info!(query, "search query");
        }
        let shown = search_contacts(contacts, Some(&query));
        Ok(Html(self.views.contacts(&query, &shown)?))
    }

    fn try_create(
        &self,
        form: Result<ContactForm, FormRejection>,
    ) -> Result<Redirect, HandlerError> {
        let contact = form?.into_contact(ContactId::UNASSIGNED);
        let stored = self.store.create_contact(contact)?;
        tracing::info!(id = %stored.id, contact = ?stored, "created contact");
        Ok(Redirect::to(CONTACTS_PATH))
    }

    fn try_edit_form(&self, raw_id: RawId) -> Result<Html<String>, HandlerError> {
        let id = parse_id(raw_id)?;
        let contact = self.store.get_contact(id)?;
        Ok(Html(self.views.edit_contact(&contact)?))
    }

    fn try_update(
        &self,
        raw_id: RawId,
        form: Result<ContactForm, FormRejection>,
    ) -> Result<Redirect, HandlerError> {
        let id = parse_id(raw_id)?;
        let current = self.store.get_contact(id)?;
        let replacement = form?.into_contact(current.id);
        self.store.update_contact(replacement.clone())?;
        tracing::info!(id = %replacement.id, contact = ?replacement, "updated contact");
        Ok(Redirect::to(CONTACTS_PATH))
    }

    fn try_delete(&self, raw_id: RawId) -> Result<Redirect, HandlerError> {
        let id = parse_id(raw_id)?;
        self.store.delete_contact(id)?;
        tracing::info!(%id, "deleted contact");
        Ok(Redirect::to(CONTACTS_PATH))
    }
}

fn parse_id(raw_id: RawId) -> Result<ContactId, HandlerError> {
    let raw_id = raw_id?;
    ContactId::parse(&raw_id).ok_or(HandlerError::InvalidId(raw_id))
}

fn first_value(pairs: Vec<(String, String)>, name: &str) -> Option<String> {
    pairs.into_iter().find(|(key, _)| key == name).map(|(_, value)| value)
}

fn finish<R>(result: Result<R, HandlerError>) -> Response
where
    R: IntoResponse,
{
    match result {
        Ok(response) => response.into_response(),
        Err(err) => {
            err.log();
            err.into_response()
        }
    }
}

pub async fn root() -> Response {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, CONTACTS_PATH)]).into_response()
}

/// Unmatched paths with a trailing slash redirect to the same path without it.
pub async fn strip_trailing_slash(uri: Uri) -> Response {
    let path = uri.path();
    let trimmed = path.trim_end_matches('/');
    if trimmed.len() == path.len() || trimmed.is_empty() || trimmed.starts_with("//") {
        return StatusCode::NOT_FOUND.into_response();
    }
    let target = match uri.query() {
        Some(query) => format!("{trimmed}?{query}"),
        None => trimmed.to_string(),
    };
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]).into_response()
}

pub async fn list_contacts(
    State(handler): State<ContactHandler>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Response {
    handler.list(query.map(|Query(pairs)| first_value(pairs, "q")))
}

pub async fn new_contact_form(State(handler): State<ContactHandler>) -> Response {
    handler.new_form()
}

pub async fn create_contact(
    State(handler): State<ContactHandler>,
    form: Result<Form<ContactForm>, FormRejection>,
) -> Response {
    handler.create(form.map(|Form(form)| form))
}

pub async fn edit_contact_form(
    State(handler): State<ContactHandler>,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    handler.edit_form(id.map(|Path(id)| id))
}

pub async fn update_contact(
    State(handler): State<ContactHandler>,
    id: Result<Path<String>, PathRejection>,
    form: Result<Form<ContactForm>, FormRejection>,
) -> Response {
    handler.update(id.map(|Path(id)| id), form.map(|Form(form)| form))
}

pub async fn delete_contact(
    State(handler): State<ContactHandler>,
    id: Result<Path<String>, PathRejection>,
) -> Response {
    handler.delete(id.map(|Path(id)| id))
}
