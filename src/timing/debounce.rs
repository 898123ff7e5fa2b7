use std::time::{Duration, Instant};

pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(120);

/// Keeps only the latest signal and releases it once the input has been
/// quiet for `window`.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    latest: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            latest: None,
        }
    }

    pub fn signal(&mut self, value: T, now: Instant) {
        self.latest = Some((value, now));
    }

    pub fn is_pending(&self) -> bool {
        self.latest.is_some()
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let (_, at) = self.latest.as_ref()?;
        if now.saturating_duration_since(*at) < self.window {
            return None;
        }
        self.latest.take().map(|(value, _)| value)
    }
}
