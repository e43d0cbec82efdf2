/// Proof that a ring slot has been reserved for a future reply.
///
/// Grounded in the teacher's affine `Reservation<'a, T>`: obtained once from
/// `reserve(n)`, consumed exactly once by `commit()`. Here the "slot" is a
/// guaranteed spot in one handle's event ring and the "commit" is
/// `Client::send_reply`. `ReplyToken` carries no lifetime or pointer back
/// into the ring (unlike the zero-copy teacher version) because the payload
/// itself is produced on the playback thread, not written in place - but it
/// keeps the same contract: holding one guarantees `send_reply` cannot fail
/// for capacity reasons, and not consuming it leaks a reservation that
/// `Client::destroy` will still account for correctly (the count is simply
/// never decremented for an abandoned token, matching "an outstanding async
/// request in flight" until the handle is destroyed).
#[derive(Debug)]
#[must_use = "a ReplyToken must be consumed with Client::send_reply or send_error_reply"]
pub struct ReplyToken {
    reply_id: u64,
}

impl ReplyToken {
    pub(crate) fn new(reply_id: u64) -> Self {
        Self { reply_id }
    }

    /// The reply ID that was handed back to the host when this token was
    /// issued; this is the value that ends up in `EventRecord::in_reply_to`.
    #[must_use]
    pub fn reply_id(&self) -> u64 {
        self.reply_id
    }
}
