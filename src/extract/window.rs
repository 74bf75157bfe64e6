/// Skip/take pagination over raw parent matches
///
/// Skips are consumed by raw matches, whether or not the row would have been
/// admitted; the take limit counts admitted rows only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    skip_remaining: u64,
    take: Option<u64>,
    admitted: u64,
}

impl Window {
    /// `start_from` is 1-based; `max_count` of None means unbounded
    pub fn new(start_from: u64, max_count: Option<u64>) -> Self {
        Window {
            skip_remaining: start_from.saturating_sub(1),
            take: max_count,
            admitted: 0,
        }
    }

    pub fn unbounded() -> Self {
        Window::new(1, None)
    }

    /// Call once per raw match; true while the match must be skipped
    pub fn should_skip(&mut self) -> bool {
        if self.skip_remaining > 0 {
            self.skip_remaining -= 1;
            true
        } else {
            false
        }
    }

    pub fn record_admission(&mut self) {
        self.admitted += 1;
    }

    /// True once the take limit has been reached; a limit of 0 is exhausted
    /// before any match is seen
    pub fn is_exhausted(&self) -> bool {
        self.take.is_some_and(|take| self.admitted >= take)
    }

    pub fn admitted(&self) -> u64 {
        self.admitted
    }
}
