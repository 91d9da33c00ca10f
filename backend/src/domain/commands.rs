//! Domain-level command types.
//!
//! These are used by services inside the domain layer and are not exposed
//! over the public API. The REST layer maps the DTOs from the `shared` crate
//! to these types.

pub mod tracking {
    use chrono::{DateTime, Utc};
    use std::collections::BTreeMap;

    /// Raw input of a record form, exactly as the user typed it.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordForm {
        /// Observation date; defaults to the moment the form was opened
        pub date: DateTime<Utc>,
        /// Wire field name -> raw text
        pub values: BTreeMap<String, String>,
    }

    impl RecordForm {
        pub fn new(date: DateTime<Utc>) -> Self {
            Self {
                date,
                values: BTreeMap::new(),
            }
        }

        pub fn with_value(mut self, name: &str, raw: &str) -> Self {
            self.set_value(name, raw);
            self
        }

        pub fn set_value(&mut self, name: &str, raw: &str) {
            self.values.insert(name.to_string(), raw.to_string());
        }

        pub fn value(&self, name: &str) -> Option<&str> {
            self.values.get(name).map(String::as_str)
        }

        /// Clear typed values after a successful save, keeping the named
        /// fields. The date is kept.
        pub fn clear_values_except(&mut self, keep: &[&str]) {
            self.values.retain(|name, _| keep.contains(&name.as_str()));
        }
    }
}

pub mod journal {
    /// Input for creating a journal entry.
    #[derive(Debug, Clone, PartialEq)]
    pub struct CreateJournalEntryCommand {
        pub title: String,
        pub content: String,
    }
}
