//! # Uploaded File Store
//!
//! Read-only lookup for uploaded CSV content, injected into the compiler
//! entry points instead of being read from ambient state. Absence of a file
//! is a normal case (the generated loader falls back to a plain
//! read-from-path statement), not an error.

use std::collections::HashMap;

/// Read-only lookup from file name to uploaded file content.
pub trait FileStore {
    fn content(&self, file_name: &str) -> Option<String>;
}

/// Store with no files; every lookup misses.
pub struct EmptyStore;

impl FileStore for EmptyStore {
    fn content(&self, _file_name: &str) -> Option<String> {
        None
    }
}

impl FileStore for HashMap<String, String> {
    fn content(&self, file_name: &str) -> Option<String> {
        self.get(file_name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashmap_store_hits_and_misses() {
        let mut store = HashMap::new();
        store.insert("sales.csv".to_string(), "a,b\n1,2".to_string());
        assert_eq!(store.content("sales.csv").as_deref(), Some("a,b\n1,2"));
        assert!(store.content("other.csv").is_none());
        assert!(EmptyStore.content("sales.csv").is_none());
    }
}
