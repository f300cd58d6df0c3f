use crate::icmp::v4::PacketId;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutstandingRecord {
    pub id: PacketId,
    pub host: String,
    pub send_time: Instant,
}

/// Echo requests awaiting a reply or a timeout, keyed by packet id.
///
/// `order` keeps ids in send order so the oldest expired packet is found without
/// scanning. Entries resolved out of order stay in `order` until they reach the front
/// and are skipped there.
#[derive(Debug, Default)]
pub(crate) struct OutstandingTable {
    records: HashMap<PacketId, OutstandingRecord>,
    order: VecDeque<(PacketId, Instant)>,
}

impl OutstandingTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn insert(&mut self, record: OutstandingRecord) {
        self.order.push_back((record.id, record.send_time));
        if let Some(replaced) = self.records.insert(record.id, record) {
            tracing::warn!(
                "packet id {} reused while still outstanding for {}",
                replaced.id,
                replaced.host
            );
        }
    }

    pub(crate) fn remove(&mut self, id: PacketId) -> Option<OutstandingRecord> {
        let record = self.records.remove(&id);
        self.prune_front();
        record
    }

    /// Send time of the oldest packet still outstanding.
    pub(crate) fn oldest_send_time(&mut self) -> Option<Instant> {
        self.prune_front();
        self.order.front().map(|(_, send_time)| *send_time)
    }

    /// Removes the oldest packet if it has been outstanding for longer than `timeout`.
    pub(crate) fn pop_oldest_expired(
        &mut self,
        now: Instant,
        timeout: Duration,
    ) -> Option<OutstandingRecord> {
        let send_time = self.oldest_send_time()?;
        if now.saturating_duration_since(send_time) <= timeout {
            return None;
        }
        let (id, _) = self.order.pop_front()?;
        let record = self.records.remove(&id);
        self.prune_front();
        record
    }

    /// Removes all packets, oldest first.
    pub(crate) fn drain(&mut self) -> Vec<OutstandingRecord> {
        let mut drained = Vec::with_capacity(self.records.len());
        while let Some((id, send_time)) = self.order.pop_front() {
            if self.is_live(id, send_time) {
                drained.extend(self.records.remove(&id));
            }
        }
        self.records.clear();
        drained
    }

    fn is_live(&self, id: PacketId, send_time: Instant) -> bool {
        self.records.get(&id).is_some_and(|record| record.send_time == send_time)
    }

    fn prune_front(&mut self) {
        while let Some(&(id, send_time)) = self.order.front() {
            if self.is_live(id, send_time) {
                break;
            }
            self.order.pop_front();
        }
    }
}
