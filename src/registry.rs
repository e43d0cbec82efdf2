use crate::client::Client;
use crate::event::{EventKind, EventPayload};
use std::sync::{Arc, Mutex};

/// The set of live handles for one engine.
///
/// Guarded by a single lock. Iteration order (insertion order) is preserved
/// so broadcast delivery order is deterministic across handles, even though
/// spec.md §4.6 makes no cross-handle ordering guarantee to callers - a
/// deterministic implementation is still easier to reason about and test.
///
/// Lock order: this registry's lock may be held while acquiring a `Client`'s
/// own lock (during `broadcast`/`send`); the reverse order is never taken
/// anywhere in this crate.
pub struct ClientRegistry {
    clients: Mutex<Vec<Arc<Client>>>,
    name_collision_limit: u32,
}

impl ClientRegistry {
    #[must_use]
    pub fn new(name_collision_limit: u32) -> Self {
        Self {
            clients: Mutex::new(Vec::new()),
            name_collision_limit,
        }
    }

    /// Registers `client` under `base_name`, or a unique `base_name{n}` if
    /// `base_name` is already taken. Returns the assigned name, or `None` if
    /// no free suffix was found within the collision limit.
    pub fn add(&self, base_name: &str, make_client: impl FnOnce(String) -> Arc<Client>) -> Option<Arc<Client>> {
        let mut clients = self.clients.lock().unwrap();

        let unique_name = if clients.iter().any(|c| c.name() == base_name) {
            let mut found = None;
            for n in 2..(self.name_collision_limit + 1) {
                let candidate = format!("{base_name}{n}");
                if !clients.iter().any(|c| c.name() == candidate) {
                    found = Some(candidate);
                    break;
                }
            }
            found?
        } else {
            base_name.to_owned()
        };

        let client = make_client(unique_name);
        clients.push(Arc::clone(&client));
        tracing::debug!(name = client.name(), "client registered");
        Some(client)
    }

    /// Removes `client` from the registry. No-op if it is not present
    /// (e.g. already destroyed).
    pub fn remove(&self, client: &Client) {
        let mut clients = self.clients.lock().unwrap();
        if let Some(pos) = clients.iter().position(|c| std::ptr::eq(c.as_ref(), client)) {
            clients.remove(pos);
            tracing::debug!(name = client.name(), "client destroyed");
        }
    }

    /// Looks up a handle by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<Arc<Client>> {
        self.clients.lock().unwrap().iter().find(|c| c.name() == name).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.lock().unwrap().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.lock().unwrap().is_empty()
    }

    /// Delivers one event to every handle whose mask admits `kind`. The
    /// registry lock is held for the whole walk (permitted lock order: this
    /// lock outermost, each handle's lock innermost). The payload, if any,
    /// is cloned per recipient since each `EventRecord` owns its payload.
    pub fn broadcast(&self, kind: EventKind, payload: Option<EventPayload>) {
        let clients = self.clients.lock().unwrap();
        for client in clients.iter() {
            client.deliver_unsolicited(kind, payload.clone());
        }
    }

    /// Delivers one event to a single named handle. Returns `false` if no
    /// handle with that name is registered.
    #[must_use]
    pub fn send(&self, name: &str, kind: EventKind, payload: Option<EventPayload>) -> bool {
        let clients = self.clients.lock().unwrap();
        match clients.iter().find(|c| c.name() == name) {
            Some(client) => {
                client.deliver_unsolicited(kind, payload);
                true
            }
            None => false,
        }
    }

    /// Marks every registered handle as shut down, so their next
    /// `wait_event` returns `EventKind::Shutdown`. Called once by the
    /// playback thread when it is tearing down.
    pub fn broadcast_shutdown(&self) {
        let clients = self.clients.lock().unwrap();
        for client in clients.iter() {
            client.mark_shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineShared;

    fn add_test_client(registry: &ClientRegistry, base_name: &str) -> Option<Arc<Client>> {
        let engine = EngineShared::for_test();
        registry.add(base_name, move |name| Client::new(name, engine))
    }

    #[test]
    fn collision_allocates_numeric_suffixes() {
        let registry = ClientRegistry::new(999);
        let c1 = add_test_client(&registry, "main").unwrap();
        let c2 = add_test_client(&registry, "main").unwrap();

        assert_eq!(c1.name(), "main");
        assert_eq!(c2.name(), "main2");
    }

    #[test]
    fn exhausting_collision_limit_fails_registration() {
        let registry = ClientRegistry::new(2);
        for _ in 0..3 {
            let _ = add_test_client(&registry, "main");
        }
        assert!(add_test_client(&registry, "main").is_none());
    }

    #[test]
    fn remove_then_find_returns_none() {
        let registry = ClientRegistry::new(999);
        let c1 = add_test_client(&registry, "main").unwrap();
        registry.remove(&c1);
        assert!(registry.find("main").is_none());
    }
}
