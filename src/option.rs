use crate::error::OptionError;
use std::collections::HashMap;
use std::sync::Mutex;

/// External collaborator: the option/config database consulted by
/// `set_option` before the engine is initialized. Out of scope per the spec
/// beyond this thin surface.
pub trait OptionStore: Send + Sync {
    /// Sets a string-valued option. `"idle"`/`"terminal"`/`"osc"` are
    /// accepted unconditionally by the built-in store (as the defaults
    /// `Engine::create` sets); anything else is simply recorded.
    fn set_string(&self, name: &str, value: &str) -> Result<(), OptionError>;
}

/// A permissive in-memory option store: accepts any option name, rejects
/// only an explicitly-empty value (stands in for "missing parameter").
#[derive(Debug, Default)]
pub struct MapOptionStore {
    values: Mutex<HashMap<String, String>>,
}

impl MapOptionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.values.lock().unwrap().get(name).cloned()
    }
}

impl OptionStore for MapOptionStore {
    fn set_string(&self, name: &str, value: &str) -> Result<(), OptionError> {
        if value.is_empty() {
            return Err(OptionError::MissingParam(name.to_owned()));
        }
        self.values.lock().unwrap().insert(name.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_stores_values() {
        let store = MapOptionStore::new();
        store.set_string("idle", "yes").unwrap();
        assert_eq!(store.get("idle").as_deref(), Some("yes"));
    }

    #[test]
    fn rejects_empty_value() {
        let store = MapOptionStore::new();
        assert!(matches!(
            store.set_string("idle", ""),
            Err(OptionError::MissingParam(_))
        ));
    }
}
