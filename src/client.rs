use crate::engine::EngineShared;
use crate::error::{translate_option_error, translate_property_error, ErrorCode};
use crate::event::{EventKind, EventPayload, EventRecord, Format};
use crate::log::{LogLevel, LogSubscription};
use crate::reply::ReplyToken;
use crate::ring::EventRing;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::time::{Duration, Instant};

type WakeupCallback = dyn Fn() + Send + Sync;

/// Per-handle mutable state, guarded by `Client`'s lock.
struct ClientState {
    alloc_reply_id: u64,
    event_mask: u64,
    reserved_events: u32,
    queued_wakeup: bool,
    shutdown: bool,
    choke_warning: bool,
    wakeup_callback: Option<Arc<WakeupCallback>>,
    messages: Option<LogSubscription>,
    ring: EventRing,
}

/// Per-host control object: a private ring, lock, and name.
///
/// Immutable after creation: `name` (unique within the registry) and the
/// back-reference to the shared engine. Everything else lives behind the
/// handle's own lock, matching spec.md §3/§5.
pub struct Client {
    name: String,
    engine: Arc<EngineShared>,
    self_ref: Weak<Client>,
    state: Mutex<ClientState>,
    cv: Condvar,
}

impl Client {
    pub(crate) fn new(name: String, engine: Arc<EngineShared>) -> Arc<Self> {
        let max_events = engine.config.max_events;
        let default_mask = !0u64 & !EventKind::Tick.mask_bit();
        Arc::new_cyclic(|weak| Self {
            name,
            engine,
            self_ref: weak.clone(),
            state: Mutex::new(ClientState {
                alloc_reply_id: 0,
                event_mask: default_mask,
                reserved_events: 0,
                queued_wakeup: false,
                shutdown: false,
                choke_warning: false,
                wakeup_callback: None,
                messages: None,
                ring: EventRing::new(max_events),
            }),
            cv: Condvar::new(),
        })
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(name: &str) -> Arc<Self> {
        Self::new(name.to_owned(), EngineShared::for_test())
    }

    fn arc_self(&self) -> Arc<Self> {
        self.self_ref.upgrade().expect("client outlived its own Arc")
    }

    fn dispatch(&self) -> &crate::dispatch::DispatchBridge {
        self.engine
            .dispatch
            .get()
            .expect("operation requires Client::initialize() to have run first")
    }

    /// The handle's unique name within its engine (`mpv_client_name`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    // -- reply engine (spec.md §4.5) -----------------------------------

    fn reserve_reply(&self) -> Result<ReplyToken, ErrorCode> {
        let mut st = self.state.lock().unwrap();
        let in_flight = st.reserved_events as usize + st.ring.buffered();
        if in_flight < self.engine.config.max_events {
            st.reserved_events += 1;
            st.alloc_reply_id += 1;
            Ok(ReplyToken::new(st.alloc_reply_id))
        } else {
            Err(ErrorCode::EventBufferFull)
        }
    }

    /// Notifies the handle's waiter (condvar + optional foreign-thread
    /// callback). Must be called with the lock already released - the
    /// callback is host-supplied and may call back into this `Client`.
    fn notify(&self, callback: Option<Arc<WakeupCallback>>) {
        if let Some(cb) = callback {
            cb();
        }
    }

    /// Signals under lock (condvar only) and returns the callback to invoke
    /// once the lock is released.
    fn signal_locked(&self, st: &mut ClientState) -> Option<Arc<WakeupCallback>> {
        self.cv.notify_all();
        st.wakeup_callback.clone()
    }

    /// Delivers an unsolicited (broadcast/addressed) event. Silently
    /// dropped if masked out or if the ring has no free non-reserved slot;
    /// a dropped delivery latches the one-shot choke warning.
    pub(crate) fn deliver_unsolicited(&self, kind: EventKind, payload: Option<EventPayload>) {
        let mut st = self.state.lock().unwrap();
        if st.event_mask & kind.mask_bit() == 0 {
            return;
        }
        if st.ring.available() > st.reserved_events as usize {
            let wrote = st.ring.write(EventRecord {
                in_reply_to: 0,
                event_id: kind,
                error: 0,
                payload,
            });
            debug_assert!(wrote, "available() > reserved_events guarantees a free slot");
            let cb = self.signal_locked(&mut st);
            drop(st);
            self.notify(cb);
        } else if !st.choke_warning {
            st.choke_warning = true;
            tracing::warn!(client = %self.name, "too many events queued");
        }
    }

    fn send_reply(&self, token: ReplyToken, event_id: EventKind, error: i32, payload: Option<EventPayload>) {
        let mut st = self.state.lock().unwrap();
        assert!(st.reserved_events > 0, "send_reply without a matching reservation");
        st.reserved_events -= 1;
        let wrote = st.ring.write(EventRecord {
            in_reply_to: token.reply_id(),
            event_id,
            error,
            payload,
        });
        debug_assert!(wrote, "a reservation guarantees the ring slot is free");
        let cb = self.signal_locked(&mut st);
        drop(st);
        self.notify(cb);
    }

    fn send_ok_reply(&self, token: ReplyToken) {
        self.send_reply(token, EventKind::Ok, 0, None);
    }

    fn send_error_reply(&self, token: ReplyToken, error: ErrorCode) {
        self.send_reply(token, EventKind::Error, error.code(), None);
    }

    pub(crate) fn mark_shutdown(&self) {
        let mut st = self.state.lock().unwrap();
        st.shutdown = true;
        let cb = self.signal_locked(&mut st);
        drop(st);
        self.notify(cb);
    }

    // -- public request surface (spec.md §4.2) --------------------------

    /// Starts the playback thread. Idempotent-fails on a second call, for
    /// this or any other handle on the same engine.
    pub fn initialize(&self) -> ErrorCode {
        if self.engine.initialized.swap(true, Ordering::AcqRel) {
            return ErrorCode::InvalidParameter;
        }
        self.engine
            .dispatch
            .set(crate::dispatch::DispatchBridge::spawn())
            .unwrap_or_else(|_| panic!("dispatch bridge already initialized"));
        ErrorCode::Success
    }

    fn initialized(&self) -> bool {
        self.engine.initialized.load(Ordering::Acquire)
    }

    /// Before engine initialization, forwards to the option store (string
    /// format only). After initialization, aliases to `set_property`.
    pub fn set_option(&self, name: &str, format: Format, data: &str) -> ErrorCode {
        if self.initialized() {
            return self.set_property(name, format, data);
        }
        if format != Format::String {
            return ErrorCode::InvalidParameter;
        }
        match self.engine.option_store.set_string(name, data) {
            Ok(()) => ErrorCode::Success,
            Err(e) => translate_option_error(&e),
        }
    }

    pub fn set_option_string(&self, name: &str, data: &str) -> ErrorCode {
        self.set_option(name, Format::String, data)
    }

    fn run_parsed_command(&self, cmd: crate::command::ParsedCommand) -> ErrorCode {
        // The dispatched closure always reports success once the command
        // has been handed to the playback thread: the original's cmd_fn
        // hardcodes `req->status = 0` after calling run_command(), discarding
        // its actual return value. Parse failures (checked before dispatch,
        // above) are the only command errors this crate surfaces.
        self.dispatch().run(move || {
            let _ = cmd;
        });
        ErrorCode::Success
    }

    pub fn command(&self, argv: &[String]) -> ErrorCode {
        if !self.initialized() {
            return ErrorCode::Uninitialized;
        }
        match self.engine.command_parser.parse_argv(argv) {
            Some(cmd) => self.run_parsed_command(cmd),
            None => ErrorCode::InvalidParameter,
        }
    }

    pub fn command_string(&self, line: &str) -> ErrorCode {
        if !self.initialized() {
            return ErrorCode::Uninitialized;
        }
        match self.engine.command_parser.parse_line(line) {
            Some(cmd) => self.run_parsed_command(cmd),
            None => ErrorCode::InvalidParameter,
        }
    }

    pub fn command_async(&self, argv: &[String]) -> Result<u64, ErrorCode> {
        if !self.initialized() {
            return Err(ErrorCode::Uninitialized);
        }
        let cmd = self.engine.command_parser.parse_argv(argv).ok_or(ErrorCode::InvalidParameter)?;
        let token = self.reserve_reply()?;
        let reply_id = token.reply_id();
        let client = self.arc_self();
        self.dispatch().enqueue_autofree(move || {
            let _ = cmd;
            client.send_ok_reply(token);
        });
        Ok(reply_id)
    }

    pub fn set_property(&self, name: &str, format: Format, data: &str) -> ErrorCode {
        if !self.initialized() {
            return ErrorCode::Uninitialized;
        }
        if format != Format::String {
            return ErrorCode::InvalidParameter;
        }
        let name = name.to_owned();
        let data = data.to_owned();
        let store = Arc::clone(&self.engine.property_store);
        let result = Arc::new(Mutex::new(ErrorCode::Success));
        let result2 = Arc::clone(&result);
        self.dispatch().run(move || {
            let status = match store.set(&name, Format::String, &data) {
                Ok(()) => ErrorCode::Success,
                Err(e) => translate_property_error(&e),
            };
            *result2.lock().unwrap() = status;
        });
        *result.lock().unwrap()
    }

    pub fn set_property_string(&self, name: &str, data: &str) -> ErrorCode {
        self.set_property(name, Format::String, data)
    }

    pub fn set_property_async(&self, name: &str, format: Format, data: &str) -> Result<u64, ErrorCode> {
        if !self.initialized() {
            return Err(ErrorCode::Uninitialized);
        }
        if format != Format::String {
            return Err(ErrorCode::InvalidParameter);
        }
        let token = self.reserve_reply()?;
        let reply_id = token.reply_id();
        let client = self.arc_self();
        let name = name.to_owned();
        let data = data.to_owned();
        let store = Arc::clone(&self.engine.property_store);
        self.dispatch().enqueue_autofree(move || match store.set(&name, Format::String, &data) {
            Ok(()) => client.send_ok_reply(token),
            Err(e) => client.send_error_reply(token, translate_property_error(&e)),
        });
        Ok(reply_id)
    }

    /// Reads a property. `format` selects `String` or `OsdString`
    /// rendering; `Format::None` is invalid.
    pub fn get_property(&self, name: &str, format: Format) -> Result<String, ErrorCode> {
        if !self.initialized() {
            return Err(ErrorCode::Uninitialized);
        }
        if format == Format::None {
            return Err(ErrorCode::InvalidParameter);
        }
        let name = name.to_owned();
        let store = Arc::clone(&self.engine.property_store);
        let result: Arc<Mutex<Result<String, ErrorCode>>> =
            Arc::new(Mutex::new(Err(ErrorCode::Property)));
        let result2 = Arc::clone(&result);
        self.dispatch().run(move || {
            let r = store.get(&name, format).map_err(|e| translate_property_error(&e));
            *result2.lock().unwrap() = r;
        });
        Arc::try_unwrap(result).unwrap().into_inner().unwrap()
    }

    pub fn get_property_string(&self, name: &str) -> Result<String, ErrorCode> {
        self.get_property(name, Format::String)
    }

    pub fn get_property_osd_string(&self, name: &str) -> Result<String, ErrorCode> {
        self.get_property(name, Format::OsdString)
    }

    pub fn get_property_async(&self, name: &str, format: Format) -> Result<u64, ErrorCode> {
        if !self.initialized() {
            return Err(ErrorCode::Uninitialized);
        }
        let token = self.reserve_reply()?;
        let reply_id = token.reply_id();
        let client = self.arc_self();
        let name = name.to_owned();
        let store = Arc::clone(&self.engine.property_store);
        self.dispatch().enqueue_autofree(move || match store.get(&name, format) {
            Ok(data) => {
                let payload = EventPayload::Property {
                    name: name.clone(),
                    format,
                    data,
                };
                client.send_reply(token, EventKind::Property, 0, Some(payload));
            }
            Err(e) => client.send_error_reply(token, translate_property_error(&e)),
        });
        Ok(reply_id)
    }

    /// Toggles delivery of `kind`. Some kinds (currently just `Shutdown`)
    /// cannot be disabled; a clear request for them is silently not honored.
    pub fn request_event(&self, raw_kind: i32, enable: i32) -> ErrorCode {
        let Some(kind) = EventKind::from_raw(raw_kind) else {
            return ErrorCode::InvalidParameter;
        };
        if enable != 0 && enable != 1 {
            return ErrorCode::InvalidParameter;
        }
        let mut st = self.state.lock().unwrap();
        let bit = kind.mask_bit();
        if enable == 1 {
            st.event_mask |= bit;
        } else if kind != EventKind::Shutdown {
            st.event_mask &= !bit;
        }
        ErrorCode::Success
    }

    /// `"no"` tears down any existing subscription; any other valid level
    /// name allocates (or re-levels) a bounded log buffer.
    pub fn request_log_messages(&self, min_level: &str) -> ErrorCode {
        let mut st = self.state.lock().unwrap();
        if min_level == "no" {
            st.messages = None;
            return ErrorCode::Success;
        }
        let Some(level) = LogLevel::parse(min_level) else {
            return ErrorCode::InvalidParameter;
        };
        let needs_new = !matches!(&st.messages, Some(sub) if sub.min_level() == level);
        if needs_new {
            st.messages = Some(LogSubscription::new(level, self.engine.config.log_buffer_capacity));
        }
        ErrorCode::Success
    }

    /// Stand-in for the external log system pushing a message into this
    /// handle's subscription (if any). Not part of spec.md's public
    /// surface - it plays the role of the log subsystem collaborator that
    /// spec.md explicitly treats as external.
    pub fn deliver_log_message(&self, prefix: &str, level: LogLevel, text: &str) {
        let mut st = self.state.lock().unwrap();
        if let Some(sub) = st.messages.as_mut() {
            sub.push(prefix.to_owned(), level, text.to_owned());
            let cb = self.signal_locked(&mut st);
            drop(st);
            self.notify(cb);
        }
    }

    /// Blocks until an event is available, `timeout_seconds` elapses, or
    /// `wakeup()`/the wakeup callback interrupts the wait. Non-positive
    /// `timeout_seconds` means "poll once, do not sleep."
    pub fn wait_event(&self, timeout_seconds: f64) -> EventRecord {
        let deadline = if timeout_seconds > 0.0 {
            Some(Instant::now() + Duration::from_secs_f64(timeout_seconds))
        } else {
            None
        };

        let mut st = self.state.lock().unwrap();
        loop {
            if let Some(record) = st.ring.read() {
                st.queued_wakeup = false;
                return record;
            }
            if st.shutdown {
                st.queued_wakeup = false;
                return EventRecord::unsolicited(EventKind::Shutdown);
            }
            if let Some(entry) = st.messages.as_mut().and_then(LogSubscription::pop) {
                st.queued_wakeup = false;
                return EventRecord::unsolicited_with_payload(
                    EventKind::LogMessage,
                    EventPayload::LogMessage {
                        prefix: entry.prefix,
                        level: entry.level.as_str().to_owned(),
                        text: entry.text,
                    },
                );
            }
            if st.queued_wakeup {
                st.queued_wakeup = false;
                return EventRecord::none();
            }
            let Some(deadline) = deadline else {
                return EventRecord::none();
            };
            let now = Instant::now();
            if now >= deadline {
                st.queued_wakeup = false;
                return EventRecord::none();
            }
            let (guard, _timed_out) = self.cv.wait_timeout(st, deadline - now).unwrap();
            st = guard;
        }
    }

    /// Sets the wakeup sentinel and signals the condvar and any
    /// foreign-thread callback.
    pub fn wakeup(&self) {
        let mut st = self.state.lock().unwrap();
        st.queued_wakeup = true;
        let cb = self.signal_locked(&mut st);
        drop(st);
        self.notify(cb);
    }

    /// Atomically replaces the foreign-thread wakeup notifier.
    pub fn set_wakeup_callback(&self, callback: Option<Arc<WakeupCallback>>) {
        self.state.lock().unwrap().wakeup_callback = callback;
    }

    /// Delegates to the dispatch bridge; recursive and reentrant.
    pub fn suspend(&self) {
        self.dispatch().suspend();
    }

    pub fn resume(&self) {
        self.dispatch().resume();
    }

    /// Removes this handle from the registry, drains its ring, and tears
    /// down its log subscription. If it was the last live handle, runs
    /// final engine teardown on the playback thread and stops it.
    pub fn destroy(&self) {
        self.engine.registry.remove(self);
        {
            let mut st = self.state.lock().unwrap();
            st.ring.drain();
            st.messages = None;
        }
        if self.engine.registry.is_empty() {
            if let Some(bridge) = self.engine.dispatch.get() {
                bridge.run(|| tracing::info!("engine teardown: last client gone"));
                bridge.shutdown();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ScriptInputKind;

    #[test]
    fn wait_event_returns_none_on_immediate_poll() {
        let client = Client::new_for_test("main");
        let event = client.wait_event(0.0);
        assert_eq!(event.event_id, EventKind::None);
    }

    #[test]
    fn wakeup_interrupts_a_blocked_wait_event() {
        let client = Client::new_for_test("main");
        client.wakeup();
        let event = client.wait_event(5.0);
        assert_eq!(event.event_id, EventKind::None);
    }

    #[test]
    fn shutdown_takes_precedence_once_ring_is_empty() {
        let client = Client::new_for_test("main");
        client.mark_shutdown();
        let event = client.wait_event(1.0);
        assert_eq!(event.event_id, EventKind::Shutdown);
    }

    #[test]
    fn mask_filters_delivery() {
        let client = Client::new_for_test("main");
        assert_eq!(client.request_event(EventKind::Tick as i32, 0), ErrorCode::Success);
        client.deliver_unsolicited(EventKind::Tick, None);
        let event = client.wait_event(0.0);
        assert_eq!(event.event_id, EventKind::None, "masked-off kind must not be delivered");

        assert_eq!(client.request_event(EventKind::Tick as i32, 1), ErrorCode::Success);
        client.deliver_unsolicited(EventKind::Tick, None);
        let event = client.wait_event(0.0);
        assert_eq!(event.event_id, EventKind::Tick, "re-enabled kind is delivered again");
    }

    #[test]
    fn request_event_rejects_unknown_kind_and_bad_enable() {
        let client = Client::new_for_test("main");
        assert_eq!(client.request_event(9999, 1), ErrorCode::InvalidParameter);
        assert_eq!(client.request_event(EventKind::Tick as i32, 2), ErrorCode::InvalidParameter);
    }

    #[test]
    fn shutdown_bit_cannot_be_cleared() {
        let client = Client::new_for_test("main");
        assert_eq!(client.request_event(EventKind::Shutdown as i32, 0), ErrorCode::Success);
        client.mark_shutdown();
        let event = client.wait_event(1.0);
        assert_eq!(event.event_id, EventKind::Shutdown);
    }

    #[test]
    fn property_round_trip_via_sync_api() {
        let client = Client::new_for_test("main");
        assert_eq!(client.set_property_string("volume", "50"), ErrorCode::Success);
        assert_eq!(client.get_property_string("volume").unwrap(), "50");
    }

    #[test]
    fn get_property_async_unknown_name_yields_error_event() {
        let client = Client::new_for_test("main");
        let reply_id = client.get_property_async("nonexistent", Format::String).unwrap();
        let event = client.wait_event(1.0);
        assert_eq!(event.event_id, EventKind::Error);
        assert_eq!(event.in_reply_to, reply_id);
        assert_eq!(event.error, ErrorCode::NotFound.code());
    }

    #[test]
    fn script_input_dispatch_payload_round_trips() {
        let client = Client::new_for_test("main");
        client.deliver_unsolicited(
            EventKind::ScriptInputDispatch,
            Some(EventPayload::ScriptInputDispatch {
                arg0: 7,
                kind: ScriptInputKind::Press,
            }),
        );
        let event = client.wait_event(0.0);
        assert_eq!(event.event_id, EventKind::ScriptInputDispatch);
        assert_eq!(
            event.payload,
            Some(EventPayload::ScriptInputDispatch {
                arg0: 7,
                kind: ScriptInputKind::Press,
            })
        );
    }

    #[test]
    fn command_before_initialize_is_uninitialized() {
        // new_for_test pre-initializes the engine for convenience elsewhere
        // in this module; build a fresh, un-initialized one explicitly here.
        let engine = crate::engine::EngineShared::new(crate::config::Config::default());
        let client = Client::new("main".to_owned(), engine);
        assert_eq!(client.command(&["seek".into(), "10".into()]), ErrorCode::Uninitialized);
    }
}
