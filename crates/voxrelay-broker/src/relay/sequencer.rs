//! Envelope sequencer.

use voxrelay_core::protocol::Envelope;

/// Assigns strictly increasing sequence numbers, starting at 1.
///
/// Not internally synchronized: the relay keeps the sequencer behind the
/// same lock as the history ring and watermark table, so concurrent frames
/// from different connections cannot race on assignment.
#[derive(Debug, Default)]
pub struct Sequencer {
    last: u64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self { last: 0 }
    }

    /// Stamp the envelope with the next sequence number and return it.
    /// Called exactly once per syntactically-valid inbound frame, before
    /// any other processing.
    pub fn stamp(&mut self, env: &mut Envelope) -> u64 {
        self.last += 1;
        env.sequence = Some(self.last);
        self.last
    }

    /// Highest sequence assigned so far (0 if none).
    pub fn last(&self) -> u64 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Envelope {
        Envelope::from_relay("event", None, serde_json::Value::Null)
    }

    #[test]
    fn starts_at_one_and_never_repeats() {
        let mut seq = Sequencer::new();
        let mut a = env();
        let mut b = env();
        assert_eq!(seq.stamp(&mut a), 1);
        assert_eq!(seq.stamp(&mut b), 2);
        assert_eq!(a.sequence, Some(1));
        assert_eq!(b.sequence, Some(2));
        assert_eq!(seq.last(), 2);
    }

    #[test]
    fn overwrites_sender_assigned_sequence() {
        let mut seq = Sequencer::new();
        let mut e = env();
        e.sequence = Some(999);
        seq.stamp(&mut e);
        assert_eq!(e.sequence, Some(1));
    }
}
