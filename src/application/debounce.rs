//! Single-slot debouncer for filter input.

use std::time::Instant;

use tracing::trace;

use crate::application::options::FilterDelay;

#[derive(Debug, Clone)]
struct Pending {
    term: String,
    due: Instant,
}

/// Holds at most one pending filter run; each new input replaces it.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: FilterDelay,
    pending: Option<Pending>,
}

impl Debouncer {
    pub fn new(delay: FilterDelay) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Register input at `now`.
    ///
    /// Returns the term when it must run right away (immediate mode);
    /// otherwise it becomes the pending run and any earlier one is dropped.
    pub fn schedule(&mut self, term: &str, now: Instant) -> Option<String> {
        match self.delay {
            FilterDelay::Immediate => {
                self.pending = None;
                Some(term.to_string())
            }
            FilterDelay::Debounced(delay) => {
                if let Some(previous) = self.pending.take() {
                    trace!(term = %previous.term, "pending filter replaced");
                }
                self.pending = Some(Pending {
                    term: term.to_string(),
                    due: now + delay,
                });
                None
            }
        }
    }

    /// Take the pending term if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some(pending) if pending.due <= now => self.pending.take().map(|p| p.term),
            _ => None,
        }
    }

    pub fn pending_term(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.term.as_str())
    }

    pub fn due_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn given_burst_of_input_when_deadline_passes_then_only_last_term_runs() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(FilterDelay::Debounced(Duration::from_millis(100)));

        assert_eq!(debouncer.schedule("c", start), None);
        assert_eq!(debouncer.schedule("ch", start + Duration::from_millis(50)), None);
        assert_eq!(debouncer.take_due(start + Duration::from_millis(120)), None);
        assert_eq!(
            debouncer.take_due(start + Duration::from_millis(150)),
            Some("ch".to_string())
        );
        assert_eq!(debouncer.take_due(start + Duration::from_millis(500)), None);
    }

    #[test]
    fn given_immediate_delay_when_scheduling_then_runs_now() {
        let mut debouncer = Debouncer::new(FilterDelay::Immediate);
        assert_eq!(debouncer.schedule("x", Instant::now()), Some("x".to_string()));
        assert!(debouncer.pending_term().is_none());
    }
}
