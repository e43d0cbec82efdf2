use crate::client::Client;
use crate::command::{CommandParser, SimpleCommandParser};
use crate::config::Config;
use crate::dispatch::DispatchBridge;
use crate::event::Format;
use crate::option::{MapOptionStore, OptionStore};
use crate::property::{MapPropertyStore, PropertyStore};
use crate::registry::ClientRegistry;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, OnceLock};

/// State shared by every handle on one engine and by its playback thread.
///
/// Created once per engine, kept alive by every live `Client`'s `Arc` clone;
/// the dispatch bridge (and its playback thread) exists only from
/// `Client::initialize` onward, hence the `OnceLock`.
pub(crate) struct EngineShared {
    pub(crate) registry: ClientRegistry,
    pub(crate) dispatch: OnceLock<DispatchBridge>,
    pub(crate) property_store: Arc<dyn PropertyStore>,
    pub(crate) option_store: Arc<dyn OptionStore>,
    pub(crate) command_parser: Arc<dyn CommandParser>,
    pub(crate) config: Config,
    pub(crate) initialized: AtomicBool,
}

impl EngineShared {
    pub(crate) fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            registry: ClientRegistry::new(config.name_collision_limit),
            dispatch: OnceLock::new(),
            property_store: Arc::new(MapPropertyStore::new()),
            option_store: Arc::new(MapOptionStore::new()),
            command_parser: Arc::new(SimpleCommandParser),
            config,
            initialized: AtomicBool::new(false),
        })
    }

    /// Pre-initialized engine (dispatch bridge already running) for unit
    /// tests elsewhere in the crate that only care about a handle's own
    /// behavior, not engine bring-up.
    #[cfg(test)]
    pub(crate) fn for_test() -> Arc<Self> {
        let shared = Self::new(Config::default());
        shared
            .dispatch
            .set(DispatchBridge::spawn())
            .unwrap_or_else(|_| unreachable!());
        shared.initialized.store(true, std::sync::atomic::Ordering::Release);
        shared
    }
}

impl Drop for EngineShared {
    fn drop(&mut self) {
        tracing::debug!("engine state dropped");
    }
}

/// Top-level entry point: owns the engine's shared state and mints handles
/// on it. Mirrors `mpv_create`/the implicit "new client on an existing
/// core" path scripts use, collapsed into one object since this crate
/// models a single engine rather than a process-per-instance.
pub struct Engine(Arc<EngineShared>);

impl Engine {
    /// Creates a fresh engine (not yet initialized - no playback thread
    /// running) together with its first handle, named `"main"`. Applies the
    /// same pre-initialize defaults the original constructor sets:
    /// `idle=yes`, `terminal=no`, `osc=no`.
    #[must_use]
    pub fn create() -> Option<(Self, Arc<Client>)> {
        Self::create_with_config(Config::default())
    }

    #[must_use]
    pub fn create_with_config(config: Config) -> Option<(Self, Arc<Client>)> {
        let shared = EngineShared::new(config);
        let engine = Self(Arc::clone(&shared));
        let client_shared = Arc::clone(&shared);
        let client = shared.registry.add("main", move |name| Client::new(name, client_shared))?;

        client.set_option("idle", Format::String, "yes");
        client.set_option("terminal", Format::String, "no");
        client.set_option("osc", Format::String, "no");

        Some((engine, client))
    }

    /// Registers another handle on this same engine (the scenario spec.md
    /// §8's name-collision walkthrough exercises: calling this twice with
    /// the same `base_name` yields `"main"`/`"main2"`). Returns `None` if
    /// the configured name-collision limit is exhausted.
    #[must_use]
    pub fn new_client(&self, base_name: &str) -> Option<Arc<Client>> {
        let shared = Arc::clone(&self.0);
        self.0.registry.add(base_name, move |name| Client::new(name, shared))
    }

    #[must_use]
    pub fn client_count(&self) -> usize {
        self.0.registry.len()
    }

    /// Broadcasts a shutdown notification to every live handle on this
    /// engine (each handle's next `wait_event` then returns
    /// `EventKind::Shutdown`).
    pub fn broadcast_shutdown(&self) {
        self.0.registry.broadcast_shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_registers_main_with_defaults_applied() {
        let (_engine, client) = Engine::create().unwrap();
        assert_eq!(client.name(), "main");
    }

    #[test]
    fn second_handle_on_same_engine_gets_numeric_suffix() {
        let (engine, first) = Engine::create().unwrap();
        let second = engine.new_client("main").unwrap();
        assert_eq!(first.name(), "main");
        assert_eq!(second.name(), "main2");
        assert_eq!(engine.client_count(), 2);
    }

    #[test]
    fn broadcast_shutdown_reaches_every_handle() {
        let (engine, client) = Engine::create().unwrap();
        let second = engine.new_client("main").unwrap();
        engine.broadcast_shutdown();
        assert_eq!(
            client.wait_event(1.0).event_id,
            crate::event::EventKind::Shutdown
        );
        assert_eq!(
            second.wait_event(1.0).event_id,
            crate::event::EventKind::Shutdown
        );
    }
}
