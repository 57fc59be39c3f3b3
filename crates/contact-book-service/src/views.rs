use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use contact_book_core::Contact;

const BASE: &str = "html/base.tmpl.html";
const NAVBAR: &str = "components/base/navbar.tmpl.html";
const CONTACTS: &str = "html/contacts.tmpl.html";
const CONTACT_ROW: &str = "components/contacts/row.tmpl.html";
const CONTACT_NEW: &str = "html/contact_new.tmpl.html";
const CONTACT_EDIT: &str = "html/contact_edit.tmpl.html";

const EMPTY_LISTING: &str = "<tr><td colspan=\"5\">No contacts found.</td></tr>";

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("failed to load template {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unterminated placeholder in template {template}")]
    Unterminated { template: String },
    #[error("template {template} references unbound placeholder {name:?}")]
    Unbound { template: String, name: String },
}

/// Values bound to `{{ name }}` placeholders. Text is escaped on insertion, fragments are
/// already-rendered HTML and go in as-is.
#[derive(Debug, Default)]
struct Bindings(BTreeMap<&'static str, String>);

impl Bindings {
    fn text(mut self, name: &'static str, value: impl AsRef<str>) -> Self {
        self.0.insert(name, escape_html(value.as_ref()));
        self
    }

    fn fragment(mut self, name: &'static str, html: String) -> Self {
        self.0.insert(name, html);
        self
    }

    fn contact(self, contact: &Contact) -> Self {
        self.text("id", contact.id.to_string())
            .text("first_name", &contact.first_name)
            .text("last_name", &contact.last_name)
            .text("email", &contact.email)
            .text("phone", &contact.phone)
    }
}

/// File-backed HTML views. Templates are read from disk on every render so edits under the
/// template root show up without a restart.
#[derive(Debug, Clone)]
pub struct Views {
    root: PathBuf,
}

impl Views {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Listing page with the search term echoed back.
    ///
    /// # Errors
    /// Returns a [`ViewError`] when a template is missing or malformed.
    pub fn contacts(&self, query: &str, contacts: &[Contact]) -> Result<String, ViewError> {
        let mut rows = String::new();
        for contact in contacts {
            rows.push_str(&self.render(CONTACT_ROW, &Bindings::default().contact(contact))?);
        }
        if rows.is_empty() {
            rows.push_str(EMPTY_LISTING);
        }
        let content =
            self.render(CONTACTS, &Bindings::default().text("q", query).fragment("rows", rows))?;
        self.page("Contacts", content)
    }

    /// # Errors
    /// Returns a [`ViewError`] when a template is missing or malformed.
    pub fn new_contact(&self) -> Result<String, ViewError> {
        let content = self.render(CONTACT_NEW, &Bindings::default())?;
        self.page("New Contact", content)
    }

    /// # Errors
    /// Returns a [`ViewError`] when a template is missing or malformed.
    pub fn edit_contact(&self, contact: &Contact) -> Result<String, ViewError> {
        let content = self.render(CONTACT_EDIT, &Bindings::default().contact(contact))?;
        self.page("Edit Contact", content)
    }

    fn page(&self, title: &'static str, content: String) -> Result<String, ViewError> {
        let navbar = self.render(NAVBAR, &Bindings::default())?;
        self.render(
            BASE,
            &Bindings::default()
                .text("title", title)
                .fragment("navbar", navbar)
                .fragment("content", content),
        )
    }

    fn render(&self, template: &str, bindings: &Bindings) -> Result<String, ViewError> {
        let path = self.root.join(template);
        let source = fs::read_to_string(&path).map_err(|source| ViewError::Load { path, source })?;
        fill(template, &source, bindings)
    }
}

fn fill(template: &str, source: &str, bindings: &Bindings) -> Result<String, ViewError> {
    let mut output = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            return Err(ViewError::Unterminated { template: template.to_string() });
        };
        let name = after_open[..end].trim();
        let value = bindings.0.get(name).ok_or_else(|| ViewError::Unbound {
            template: template.to_string(),
            name: name.to_string(),
        })?;
        output.push_str(value);
        rest = &after_open[end + 2..];
    }
    output.push_str(rest);
    Ok(output)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
