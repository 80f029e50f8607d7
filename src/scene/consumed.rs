use super::Uid;
use std::collections::HashSet;

/// Every uid picked up this session. Grows until the session restarts.
#[derive(Debug, Default)]
pub struct ConsumedSet {
    uids: HashSet<Uid>,
}

impl ConsumedSet {
    pub fn new() -> Self {
        ConsumedSet::default()
    }

    pub fn is_consumed(&self, uid: Uid) -> bool {
        self.uids.contains(&uid)
    }

    /// `false` when the uid was already consumed
    pub fn mark_consumed(&mut self, uid: Uid) -> bool {
        self.uids.insert(uid)
    }

    pub fn len(&self) -> usize {
        self.uids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uids.is_empty()
    }

    pub fn reset(&mut self) {
        self.uids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::UidSource;

    #[test]
    fn marking_is_permanent_until_reset() {
        let mut source = UidSource::default();
        let uid = source.issue();
        let mut consumed = ConsumedSet::new();

        assert!(!consumed.is_consumed(uid));
        assert!(consumed.mark_consumed(uid));
        assert!(!consumed.mark_consumed(uid));
        assert!(consumed.is_consumed(uid));
        assert_eq!(consumed.len(), 1);

        consumed.reset();
        assert!(!consumed.is_consumed(uid));
        assert!(consumed.is_empty());
    }
}
