use crate::error::PropertyError;
use crate::event::Format;
use std::collections::HashMap;
use std::sync::Mutex;

/// External collaborator: the property database. Out of scope per the spec -
/// properties here are plain string key/value pairs with no notion of the
/// richer type system a real player exposes, which is enough to exercise
/// `get_property`/`set_property` and their `_async` counterparts end to end.
pub trait PropertyStore: Send + Sync {
    /// Reads a property, rendering it per `format`. `Format::OsdString`
    /// should return a human-readable rendering; `Format::None` is invalid.
    fn get(&self, name: &str, format: Format) -> Result<String, PropertyError>;

    /// Writes a string-formatted property. Only `Format::String` is valid
    /// for writes.
    fn set(&self, name: &str, format: Format, value: &str) -> Result<(), PropertyError>;
}

/// A plain in-memory key/value property store.
#[derive(Debug, Default)]
pub struct MapPropertyStore {
    values: Mutex<HashMap<String, String>>,
}

impl MapPropertyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an initial value (used by demos/tests, not part of the public
    /// request/reply surface).
    pub fn seed(&self, name: impl Into<String>, value: impl Into<String>) {
        self.values.lock().unwrap().insert(name.into(), value.into());
    }
}

impl PropertyStore for MapPropertyStore {
    fn get(&self, name: &str, format: Format) -> Result<String, PropertyError> {
        match format {
            Format::None => Err(PropertyError::Error),
            Format::String | Format::OsdString => self
                .values
                .lock()
                .unwrap()
                .get(name)
                .cloned()
                .ok_or_else(|| PropertyError::Unknown(name.to_owned())),
        }
    }

    fn set(&self, name: &str, format: Format, value: &str) -> Result<(), PropertyError> {
        if format != Format::String {
            return Err(PropertyError::Error);
        }
        self.values
            .lock()
            .unwrap()
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let store = MapPropertyStore::new();
        store.set("volume", Format::String, "50").unwrap();
        assert_eq!(store.get("volume", Format::String).unwrap(), "50");
        assert_eq!(store.get("volume", Format::OsdString).unwrap(), "50");
    }

    #[test]
    fn unknown_property_is_unknown() {
        let store = MapPropertyStore::new();
        assert_eq!(
            store.get("nonexistent", Format::String).unwrap_err(),
            PropertyError::Unknown("nonexistent".to_owned())
        );
    }

    #[test]
    fn write_rejects_non_string_format() {
        let store = MapPropertyStore::new();
        assert_eq!(
            store.set("volume", Format::OsdString, "50").unwrap_err(),
            PropertyError::Error
        );
    }
}
