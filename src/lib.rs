//! A client-facing control plane for an embeddable media player.
//!
//! Each host thread gets its own [`Client`] handle: a name, an async
//! request/reply protocol, and a bounded event ring delivered through
//! [`Client::wait_event`]. Exactly one playback thread backs the whole
//! [`Engine`] (spun up by [`Client::initialize`]); synchronous requests
//! (`command`, `set_property`, `get_property`) run there via an internal
//! dispatch bridge, and async requests (`*_async`) return a reply ID whose
//! result later arrives as an event.
//!
//! # Example
//!
//! ```
//! use playctl_core::{Engine, Format};
//!
//! let (_engine, client) = Engine::create().unwrap();
//! client.initialize();
//! client.set_property("volume", Format::String, "50");
//! assert_eq!(client.get_property_string("volume").unwrap(), "50");
//! client.destroy();
//! ```

mod client;
mod command;
mod config;
mod dispatch;
mod engine;
mod error;
mod event;
mod log;
mod option;
mod property;
mod registry;
mod reply;
mod ring;

pub use client::Client;
pub use command::{CommandParser, ParsedCommand, SimpleCommandParser};
pub use config::Config;
pub use engine::Engine;
pub use error::{translate_option_error, translate_property_error, ErrorCode, OptionError, PropertyError};
pub use event::{EventKind, EventPayload, EventRecord, Format, ScriptInputKind};
pub use log::{LogEntry, LogLevel, LogSubscription};
pub use option::{MapOptionStore, OptionStore};
pub use property::{MapPropertyStore, PropertyStore};
pub use reply::ReplyToken;

/// `(MAJOR << 16) | MINOR`, matching the original's packed client API version.
pub const CLIENT_API_VERSION: u32 = (1 << 16) | 0;

/// Returns [`CLIENT_API_VERSION`]. A function (not just the constant) because
/// the original exposes this as a callable, version-checkable entry point
/// independent of any handle.
#[must_use]
pub fn client_api_version() -> u32 {
    CLIENT_API_VERSION
}
