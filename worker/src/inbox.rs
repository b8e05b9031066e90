use std::sync::{Arc, Mutex};

/// Generation token tying a background result to the match it was requested
/// for. Bumped whenever a new match begins.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Epoch(pub u64);

/// Single-slot mailbox for one kind of pending background result.
///
/// A newer post overwrites an undelivered older one, and `take` hands a value
/// out only while its epoch still matches the live match. Stale completions
/// from an abandoned match are dropped here rather than reaching the caller.
#[derive(Clone, Debug)]
pub struct Inbox<T> {
    slot: Arc<Mutex<Option<(Epoch, T)>>>,
}

impl<T> Default for Inbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Inbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn post(&self, epoch: Epoch, value: T) {
        let mut slot = self.slot.lock().unwrap();
        *slot = Some((epoch, value));
    }

    /// Takes the pending value if it belongs to `live`; a stale value is
    /// discarded instead of delivered.
    pub fn take(&self, live: Epoch) -> Option<T> {
        let mut slot = self.slot.lock().unwrap();
        match slot.take() {
            Some((epoch, value)) if epoch == live => Some(value),
            Some((epoch, _)) => {
                log::debug!("discarding stale result from epoch {epoch:?}");
                None
            }
            None => None,
        }
    }

    pub fn clear(&self) {
        let mut slot = self.slot.lock().unwrap();
        *slot = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_a_matching_epoch_once() {
        let inbox = Inbox::new();
        inbox.post(Epoch(3), "briefing");

        assert_eq!(inbox.take(Epoch(3)), Some("briefing"));
        assert_eq!(inbox.take(Epoch(3)), None);
    }

    #[test]
    fn stale_results_are_discarded() {
        let inbox = Inbox::new();
        inbox.post(Epoch(3), "old match");

        assert_eq!(inbox.take(Epoch(4)), None);
        // the stale value is gone, not merely hidden
        assert_eq!(inbox.take(Epoch(3)), None);
    }

    #[test]
    fn newer_post_overwrites_the_slot() {
        let inbox = Inbox::new();
        inbox.post(Epoch(1), "first");
        inbox.post(Epoch(1), "second");

        assert_eq!(inbox.take(Epoch(1)), Some("second"));
    }

    #[test]
    fn clear_empties_the_slot() {
        let inbox = Inbox::new();
        inbox.post(Epoch(1), "pending");
        inbox.clear();

        assert_eq!(inbox.take(Epoch(1)), None);
    }
}
