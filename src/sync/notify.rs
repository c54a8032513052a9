//! Out-of-band stat notifications.
//!
//! A typed message channel replaces the old shared-storage polling hack:
//! producers (another view in the same page session, a debug console)
//! push [`StatNotice`]s and the synchronizer drains them once per frame.
//! Delivery is at-most-once per notice id; the synchronizer keeps the
//! seen-set since it owns the apply step.

use std::sync::mpsc::{channel, Receiver, Sender};

/// Partial stat update carried by a notice. `None` fields are untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatPatch {
    pub level: Option<i32>,
    pub experience: Option<i32>,
    pub points: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct StatNotice {
    /// Unique message id; duplicates are dropped by the consumer
    pub id: u64,
    /// Identity the patch is addressed to; others must ignore it
    pub target: String,
    pub patch: StatPatch,
    /// Version stamp of the update, comparable to document `updated_at`
    pub timestamp: u64,
}

/// Sending half of the notice channel; cheap to clone and hand out.
#[derive(Clone)]
pub struct NoticeSender {
    tx: Sender<StatNotice>,
}

impl NoticeSender {
    /// Fire-and-forget; a closed bus just drops the notice.
    pub fn send(&self, notice: StatNotice) {
        let _ = self.tx.send(notice);
    }
}

pub struct NoticeBus {
    tx: Sender<StatNotice>,
    rx: Receiver<StatNotice>,
}

impl NoticeBus {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> NoticeSender {
        NoticeSender {
            tx: self.tx.clone(),
        }
    }

    /// Take everything queued since the last drain.
    pub fn drain(&self) -> Vec<StatNotice> {
        self.rx.try_iter().collect()
    }
}

impl Default for NoticeBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_send_order() {
        let bus = NoticeBus::new();
        let sender = bus.sender();
        for id in 0..3 {
            sender.send(StatNotice {
                id,
                target: "ada".to_string(),
                patch: StatPatch::default(),
                timestamp: id,
            });
        }

        let drained = bus.drain();
        let ids: Vec<u64> = drained.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn senders_outlive_a_drain() {
        let bus = NoticeBus::new();
        let sender = bus.sender();
        assert!(bus.drain().is_empty());

        sender.send(StatNotice {
            id: 9,
            target: "ada".to_string(),
            patch: StatPatch {
                points: Some(2),
                ..Default::default()
            },
            timestamp: 50,
        });
        assert_eq!(bus.drain().len(), 1);
    }
}
