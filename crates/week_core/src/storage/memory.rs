use super::PersistenceBackend;
use crate::error::AppError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// In-process backend. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let backend = Self::new();
        backend
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        backend
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl PersistenceBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
