/// Enumerated event kinds, with fixed numeric codes (stable ABI).
///
/// New kinds may be appended at the end; consumers must ignore values they
/// don't recognize rather than treating them as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum EventKind {
    None = 0,
    Ok = 1,
    Error = 2,
    Shutdown = 3,
    LogMessage = 4,
    Tick = 5,
    Property = 6,
    StartFile = 7,
    EndFile = 8,
    PlaybackStart = 9,
    TracksChanged = 10,
    TrackSwitched = 11,
    Idle = 12,
    Pause = 13,
    Unpause = 14,
    ScriptInputDispatch = 15,
}

impl EventKind {
    pub(crate) const COUNT: usize = 16;

    /// Human-readable name, matching the original `mpv_event_name` table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ok => "ok",
            Self::Error => "error",
            Self::Shutdown => "shutdown",
            Self::LogMessage => "log-message",
            Self::Tick => "tick",
            Self::Property => "property",
            Self::StartFile => "start-file",
            Self::EndFile => "end-file",
            Self::PlaybackStart => "playback-start",
            Self::TracksChanged => "tracks-changed",
            Self::TrackSwitched => "track-switched",
            Self::Idle => "idle",
            Self::Pause => "pause",
            Self::Unpause => "unpause",
            Self::ScriptInputDispatch => "script-input-dispatch",
        }
    }

    /// The bit this kind occupies in a `u64` event mask.
    #[must_use]
    pub(crate) const fn mask_bit(self) -> u64 {
        1u64 << (self as i32)
    }

    /// Looks up a kind by its raw numeric code. Returns `None` for codes
    /// outside the currently-defined range (future/unknown kinds).
    #[must_use]
    pub fn from_raw(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Ok),
            2 => Some(Self::Error),
            3 => Some(Self::Shutdown),
            4 => Some(Self::LogMessage),
            5 => Some(Self::Tick),
            6 => Some(Self::Property),
            7 => Some(Self::StartFile),
            8 => Some(Self::EndFile),
            9 => Some(Self::PlaybackStart),
            10 => Some(Self::TracksChanged),
            11 => Some(Self::TrackSwitched),
            12 => Some(Self::Idle),
            13 => Some(Self::Pause),
            14 => Some(Self::Unpause),
            15 => Some(Self::ScriptInputDispatch),
            _ => None,
        }
    }

    /// Name lookup for a raw code, returning `None` for codes this version
    /// doesn't know (mirrors `mpv_event_name` returning `NULL`).
    #[must_use]
    pub fn name_for_raw(code: i32) -> Option<&'static str> {
        Self::from_raw(code).map(Self::as_str)
    }
}

/// Scalar property formats. Only `String` is accepted for writes;
/// `OsdString` is a read-only, human-readable rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Format {
    None = 0,
    String = 1,
    OsdString = 2,
}

/// Kind of script-input-dispatch event (keyboard forwarding to a script).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptInputKind {
    KeyupFollows,
    Press,
}

/// Payload variants, discriminated by the owning `EventRecord`'s `event_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    Property {
        name: String,
        format: Format,
        data: String,
    },
    LogMessage {
        prefix: String,
        level: String,
        text: String,
    },
    ScriptInputDispatch {
        arg0: i32,
        kind: ScriptInputKind,
    },
}

/// A fixed-shape record placed in a handle's event ring.
///
/// `in_reply_to` is `0` for unsolicited (broadcast) events, or the reply ID
/// originally handed back to the host by an async request. `error` is only
/// meaningful when `event_id == EventKind::Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub in_reply_to: u64,
    pub event_id: EventKind,
    pub error: i32,
    pub payload: Option<EventPayload>,
}

impl EventRecord {
    /// An unsolicited event with no payload and no reply correlation.
    #[must_use]
    pub fn unsolicited(event_id: EventKind) -> Self {
        Self {
            in_reply_to: 0,
            event_id,
            error: 0,
            payload: None,
        }
    }

    /// An unsolicited event carrying a payload (e.g. a broadcast `Property`
    /// change, or an internally-synthesized `LogMessage`/`ScriptInputDispatch`).
    #[must_use]
    pub fn unsolicited_with_payload(event_id: EventKind, payload: EventPayload) -> Self {
        Self {
            in_reply_to: 0,
            event_id,
            error: 0,
            payload: Some(payload),
        }
    }

    /// The zero-initialized "nothing happened" event returned by `wait_event`
    /// on timeout or a plain wakeup sentinel.
    #[must_use]
    pub fn none() -> Self {
        Self::unsolicited(EventKind::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_original_table() {
        assert_eq!(EventKind::Shutdown.as_str(), "shutdown");
        assert_eq!(EventKind::ScriptInputDispatch.as_str(), "script-input-dispatch");
    }

    #[test]
    fn unknown_raw_code_has_no_name() {
        assert_eq!(EventKind::name_for_raw(9999), None);
    }

    #[test]
    fn mask_bits_are_distinct() {
        let mut seen = 0u64;
        for code in 0..EventKind::COUNT as i32 {
            let kind = EventKind::from_raw(code).unwrap();
            let bit = kind.mask_bit();
            assert_eq!(seen & bit, 0, "duplicate bit for {code}");
            seen |= bit;
        }
    }
}
