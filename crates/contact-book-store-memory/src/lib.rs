use contact_book_core::{Contact, ContactId, ContactStore, StoreError};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct Inner {
    contacts: Vec<Contact>,
    last_id: i64,
}

impl Inner {
    fn position(&self, id: ContactId) -> Option<usize> {
        self.contacts.iter().position(|contact| contact.id == id)
    }
}

/// Ordered in-memory contact list with a monotonic id counter.
///
/// Every lookup is a linear scan. The list and the counter sit behind one mutex, so each
/// operation is atomic with respect to concurrent requests.
#[derive(Debug, Default)]
pub struct InMemoryContactStore {
    inner: Mutex<Inner>,
}

impl InMemoryContactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The three contacts the demo server starts with.
    #[must_use]
    pub fn seeded() -> Self {
        let store = Self::new();
        for contact in demo_contacts() {
            store.insert(contact);
        }
        store
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().contacts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, contact: Contact) -> Contact {
        let mut inner = self.inner.lock();
        inner.last_id += 1;
        let stored = contact.with_id(ContactId(inner.last_id));
        inner.contacts.push(stored.clone());
        stored
    }
}

#[must_use]
pub fn demo_contacts() -> Vec<Contact> {
    vec![
        Contact::new("John", "Doe", "john.doe@hollywood.com", "123456789"),
        Contact::new("Samuel", "L. Jackson", "samuel.ljackson@hollywood.com", "987123778"),
        Contact::new("Robert", "De Niro", "robert.niro@hollywood.com", "9871234987"),
    ]
}

impl ContactStore for InMemoryContactStore {
    fn list_contacts(&self) -> Result<Vec<Contact>, StoreError> {
        Ok(self.inner.lock().contacts.clone())
    }

    fn get_contact(&self, id: ContactId) -> Result<Contact, StoreError> {
        let inner = self.inner.lock();
        inner
            .contacts
            .iter()
            .find(|contact| contact.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn create_contact(&self, contact: Contact) -> Result<Contact, StoreError> {
        Ok(self.insert(contact))
    }

    fn update_contact(&self, contact: Contact) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let index = inner.position(contact.id).ok_or(StoreError::NotFound(contact.id))?;
        inner.contacts[index] = contact;
        Ok(())
    }

    fn delete_contact(&self, id: ContactId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let index = inner.position(id).ok_or(StoreError::NotFound(id))?;
        inner.contacts.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use proptest::prelude::*;

    use super::*;

    fn ids(store: &InMemoryContactStore) -> Vec<i64> {
        match store.list_contacts() {
            Ok(contacts) => contacts.iter().map(|contact| contact.id.0).collect(),
            Err(err) => panic!("listing failed: {err}"),
        }
    }

    fn create(store: &InMemoryContactStore, first_name: &str) -> Contact {
        let contact = Contact::new(first_name, "Doe", format!("{first_name}@x.com"), "111");
        match store.create_contact(contact) {
            Ok(stored) => stored,
            Err(err) => panic!("create failed: {err}"),
        }
    }

    #[test]
    fn first_contact_gets_id_one_and_ids_increase() {
        let store = InMemoryContactStore::new();
        assert!(store.is_empty());
        assert_eq!(create(&store, "a").id, ContactId(1));
        assert_eq!(create(&store, "b").id, ContactId(2));
        assert_eq!(create(&store, "c").id, ContactId(3));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn supplied_id_is_ignored_on_create() {
        let store = InMemoryContactStore::new();
        let supplied = Contact::new("a", "b", "c", "d").with_id(ContactId(77));
        let stored = match store.create_contact(supplied) {
            Ok(stored) => stored,
            Err(err) => panic!("create failed: {err}"),
        };
        assert_eq!(stored.id, ContactId(1));
        assert_eq!(store.get_contact(ContactId(77)), Err(StoreError::NotFound(ContactId(77))));
    }

    #[test]
    fn get_after_create_returns_equal_contact() {
        let store = InMemoryContactStore::new();
        let stored = create(&store, "John");
        assert_eq!(store.get_contact(stored.id), Ok(stored.clone()));
        assert_eq!(stored.first_name, "John");
        assert_eq!(stored.email, "John@x.com");
    }

    #[test]
    fn update_replaces_record_wholesale() {
        let store = InMemoryContactStore::new();
        let stored = create(&store, "John");
        let replacement = Contact::new("John", "Smith", "", "222").with_id(stored.id);
        assert_eq!(store.update_contact(replacement.clone()), Ok(()));
        assert_eq!(store.get_contact(stored.id), Ok(replacement));
    }

    #[test]
    fn update_missing_id_fails_and_leaves_store_unchanged() {
        let store = InMemoryContactStore::new();
        create(&store, "a");
        create(&store, "b");
        let before = store.list_contacts();
        let result = store.update_contact(Contact::new("x", "y", "z", "w").with_id(ContactId(9)));
        assert_eq!(result, Err(StoreError::NotFound(ContactId(9))));
        assert_eq!(store.list_contacts(), before);
    }

    #[test]
    fn delete_removes_exactly_one_and_keeps_order() {
        let store = InMemoryContactStore::new();
        for name in ["a", "b", "c", "d"] {
            create(&store, name);
        }
        assert_eq!(store.delete_contact(ContactId(2)), Ok(()));
        assert_eq!(ids(&store), vec![1, 3, 4]);
        assert_eq!(store.get_contact(ContactId(2)), Err(StoreError::NotFound(ContactId(2))));
    }

    #[test]
    fn delete_missing_id_fails() {
        let store = InMemoryContactStore::seeded();
        assert_eq!(store.delete_contact(ContactId(42)), Err(StoreError::NotFound(ContactId(42))));
        assert_eq!(ids(&store), vec![1, 2, 3]);
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let store = InMemoryContactStore::new();
        create(&store, "a");
        let second = create(&store, "b");
        assert_eq!(store.delete_contact(second.id), Ok(()));
        assert_eq!(create(&store, "c").id, ContactId(3));
    }

    #[test]
    fn seeded_store_holds_demo_contacts_in_order() {
        let store = InMemoryContactStore::seeded();
        let contacts = match store.list_contacts() {
            Ok(contacts) => contacts,
            Err(err) => panic!("listing failed: {err}"),
        };
        let names =
            contacts.iter().map(|contact| contact.first_name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["John", "Samuel", "Robert"]);
        assert_eq!(ids(&store), vec![1, 2, 3]);
    }

    #[test]
    fn concurrent_creates_assign_distinct_ids() {
        let store = Arc::new(InMemoryContactStore::new());
        let handles = (0..8)
            .map(|worker| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..25 {
                        create(&store, &format!("w{worker}"));
                    }
                })
            })
            .collect::<Vec<_>>();
        for handle in handles {
            if handle.join().is_err() {
                panic!("worker thread panicked");
            }
        }

        let mut assigned = ids(&store);
        assigned.sort_unstable();
        assert_eq!(assigned, (1..=200).collect::<Vec<_>>());
    }

    proptest! {
        #[test]
        fn property_ids_are_sequential_and_listing_preserves_insertion(
            names in prop::collection::vec("[a-z]{1,8}", 1..24)
        ) {
            let store = InMemoryContactStore::new();
            for (index, name) in names.iter().enumerate() {
                let stored = store.create_contact(Contact::new(name.as_str(), "", "", ""));
                let expected = i64::try_from(index).unwrap_or(i64::MAX) + 1;
                prop_assert_eq!(stored.map(|contact| contact.id), Ok(ContactId(expected)));
            }
            let listed = store.list_contacts().unwrap_or_default();
            let listed_names =
                listed.iter().map(|contact| contact.first_name.clone()).collect::<Vec<_>>();
            prop_assert_eq!(listed_names, names);
        }

        #[test]
        fn property_delete_preserves_relative_order(count in 1_usize..20, victim in 0_usize..20) {
            let store = InMemoryContactStore::new();
            for index in 0..count {
                create(&store, &format!("c{index}"));
            }
            let victim_id = i64::try_from(victim % count).unwrap_or(0) + 1;
            prop_assert_eq!(store.delete_contact(ContactId(victim_id)), Ok(()));

            let expected = (1..=i64::try_from(count).unwrap_or(0))
                .filter(|id| *id != victim_id)
                .collect::<Vec<_>>();
            prop_assert_eq!(ids(&store), expected);
        }
    }
}
