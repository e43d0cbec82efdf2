/// Tunables for the client control plane.
///
/// Mirrors how much capacity each handle gets, not how the media pipeline
/// itself behaves - this crate has no performance-tuning axis comparable to
/// a ring-buffer throughput config, so there is a single default rather than
/// a family of named presets.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Per-handle event ring capacity, in whole `EventRecord`s.
    pub max_events: usize,
    /// Capacity of a handle's log-message subscription buffer.
    pub log_buffer_capacity: usize,
    /// How many numeric suffixes (`name2`, `name3`, ...) `ClientRegistry::add`
    /// will try before giving up on a colliding name.
    pub name_collision_limit: u32,
}

impl Config {
    /// Creates a custom configuration.
    ///
    /// # Panics
    ///
    /// Panics if `max_events` or `log_buffer_capacity` is zero.
    #[must_use]
    pub const fn new(max_events: usize, log_buffer_capacity: usize, name_collision_limit: u32) -> Self {
        assert!(max_events > 0, "max_events must be positive");
        assert!(log_buffer_capacity > 0, "log_buffer_capacity must be positive");
        Self {
            max_events,
            log_buffer_capacity,
            name_collision_limit,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_events: 1000,
            log_buffer_capacity: 1000,
            name_collision_limit: 999,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_original_client() {
        let cfg = Config::default();
        assert_eq!(cfg.max_events, 1000);
        assert_eq!(cfg.log_buffer_capacity, 1000);
    }

    #[test]
    #[should_panic(expected = "max_events must be positive")]
    fn rejects_zero_capacity() {
        Config::new(0, 1000, 999);
    }
}
