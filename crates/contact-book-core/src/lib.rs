use std::fmt::{Display, Formatter};

use serde::Deserialize;

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum StoreError {
    #[error("contact not found: {0}")]
    NotFound(ContactId),
    #[error("store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ContactId(pub i64);

impl ContactId {
    /// Placeholder carried by a contact the store has not yet assigned an id to.
    pub const UNASSIGNED: Self = Self(-1);

    /// Parse a decimal id as it appears in a request path.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        value.parse::<i64>().ok().map(Self)
    }
}

impl Display for ContactId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: ContactId::UNASSIGNED,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: ContactId) -> Self {
        self.id = id;
        self
    }

    /// True when any of the four text fields equals `term` exactly.
    #[must_use]
    pub fn matches_exactly(&self, term: &str) -> bool {
        self.first_name == term
            || self.last_name == term
            || self.email == term
            || self.phone == term
    }
}

/// Fields submitted by the creation and edit forms. Absent fields are empty.
#[derive(Debug, Clone, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl ContactForm {
    #[must_use]
    pub fn into_contact(self, id: ContactId) -> Contact {
        Contact {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
        }
    }
}

/// Storage seam for contacts. Implementations own the authoritative sequence and hand out
/// clones; callers never mutate it except through these methods.
pub trait ContactStore: Send + Sync {
    /// All contacts in insertion order.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the underlying storage cannot be read.
    fn list_contacts(&self) -> Result<Vec<Contact>, StoreError>;

    /// # Errors
    /// Returns [`StoreError::NotFound`] when no contact carries `id`.
    fn get_contact(&self, id: ContactId) -> Result<Contact, StoreError>;

    /// Store a new contact under the next id, ignoring whatever id `contact` carries, and
    /// return the stored value.
    ///
    /// # Errors
    /// Returns [`StoreError::Backend`] when the underlying storage rejects the write.
    fn create_contact(&self, contact: Contact) -> Result<Contact, StoreError>;

    /// Replace the contact with the same id wholesale.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] when no contact carries `contact.id`; the store is
    /// left unchanged.
    fn update_contact(&self, contact: Contact) -> Result<(), StoreError>;

    /// Remove the contact with `id`, keeping the relative order of the others.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] when no contact carries `id`.
    fn delete_contact(&self, id: ContactId) -> Result<(), StoreError>;
}

/// Filter a listing by an exact-match term.
///
/// Without a term (or with an empty one) the listing is returned unchanged. Otherwise the
/// scan stops at the first contact whose first name, last name, email, or phone equals the
/// term, so at most one contact is returned.
#[must_use]
pub fn search_contacts(contacts: Vec<Contact>, term: Option<&str>) -> Vec<Contact> {
    match term {
        Some(term) if !term.is_empty() => {
            contacts.into_iter().find(|contact| contact.matches_exactly(term)).into_iter().collect()
        }
        _ => contacts,
    }
}
