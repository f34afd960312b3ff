//! Bounded, persisted FIFO of deferred notifications.
//!
//! Every mutation is a read-modify-write of the whole stored array, done under
//! one lock and written through before returning. Records are read one by
//! one, so a damaged record costs only itself; contents that are not a JSON
//! array count as an empty queue and are replaced by the next write.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde_json::Value;

use crate::config::DEFAULT_QUEUE_CAPACITY;
use crate::error::PushResult;
use crate::payload::NotificationPayload;
use crate::storage::QueueStorage;

pub struct NotificationQueue {
    storage: Box<dyn QueueStorage>,
    capacity: usize,
    guard: Mutex<()>,
}

impl NotificationQueue {
    pub fn new(storage: impl QueueStorage + 'static) -> Self {
        Self::with_capacity(storage, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(storage: impl QueueStorage + 'static, capacity: usize) -> Self {
        Self {
            storage: Box::new(storage),
            capacity: capacity.max(1),
            guard: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append `payload`, dropping the oldest entries beyond capacity.
    pub fn enqueue(&self, payload: NotificationPayload) -> PushResult<()> {
        let _guard = self.guard.lock();
        let mut entries = self.load()?;
        entries.push_back(payload);

        let mut evicted = 0;
        while entries.len() > self.capacity {
            entries.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            log::debug!("[QUEUE] at capacity {}, evicted {} oldest", self.capacity, evicted);
        }

        self.storage.write(&serde_json::to_string(&entries)?)?;
        log::debug!("[QUEUE] enqueued, {} pending", entries.len());
        Ok(())
    }

    /// Take every queued payload, oldest first, and clear the store.
    pub fn dequeue_all(&self) -> PushResult<Vec<NotificationPayload>> {
        let _guard = self.guard.lock();
        let entries = self.load()?;
        self.storage.clear()?;
        log::debug!("[QUEUE] drained {} notifications", entries.len());
        Ok(entries.into())
    }

    /// Non-destructive check. Any read or parse failure reports `false`.
    pub fn has_pending(&self) -> bool {
        let _guard = self.guard.lock();
        match self.storage.read() {
            Ok(Some(blob)) => parse_stored(&blob)
                .map(|entries| !entries.is_empty())
                .unwrap_or(false),
            Ok(None) => false,
            Err(e) => {
                log::warn!("[QUEUE] pending check failed: {}", e);
                false
            },
        }
    }

    pub fn len(&self) -> usize {
        let _guard = self.guard.lock();
        self.load().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn load(&self) -> PushResult<VecDeque<NotificationPayload>> {
        let Some(blob) = self.storage.read()? else {
            return Ok(VecDeque::new());
        };
        match parse_stored(&blob) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                log::warn!("[QUEUE] stored queue unreadable, treating as empty: {}", e);
                Ok(VecDeque::new())
            },
        }
    }
}

fn parse_stored(blob: &str) -> serde_json::Result<VecDeque<NotificationPayload>> {
    let records: Vec<Value> = serde_json::from_str(blob)?;
    let total = records.len();
    let entries: VecDeque<_> = records
        .iter()
        .filter_map(NotificationPayload::from_stored)
        .collect();
    if entries.len() < total {
        log::warn!("[QUEUE] skipped {} non-object records", total - entries.len());
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};

    fn payload(n: usize) -> NotificationPayload {
        NotificationPayload {
            title: format!("title {}", n),
            body: format!("body {}", n),
            image_url: String::new(),
            deep_link: format!("https://m.jeeey.com/p/{}", n),
            timestamp: n as i64,
        }
    }

    #[test]
    fn test_enqueue_past_capacity_keeps_newest_in_order() {
        let queue = NotificationQueue::new(MemoryStorage::new());
        for n in 0..25 {
            queue.enqueue(payload(n)).unwrap();
        }
        assert_eq!(queue.len(), 20);

        let drained = queue.dequeue_all().unwrap();
        let titles: Vec<_> = drained.iter().map(|p| p.title.clone()).collect();
        let expected: Vec<_> = (5..25).map(|n| format!("title {}", n)).collect();
        assert_eq!(titles, expected);
    }

    #[test]
    fn test_dequeue_all_returns_insertion_order_and_empties() {
        let queue = NotificationQueue::new(MemoryStorage::new());
        for n in 0..3 {
            queue.enqueue(payload(n)).unwrap();
        }
        assert!(queue.has_pending());

        assert_eq!(queue.dequeue_all().unwrap(), vec![payload(0), payload(1), payload(2)]);
        assert!(!queue.has_pending());
        assert!(queue.dequeue_all().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_storage_reads_as_empty() {
        let queue = NotificationQueue::new(MemoryStorage::with_contents("{{ definitely not json"));
        assert!(!queue.has_pending());
        assert!(queue.dequeue_all().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_storage_heals_on_next_write() {
        let queue = NotificationQueue::new(MemoryStorage::with_contents("garbage"));
        queue.enqueue(payload(1)).unwrap();
        assert_eq!(queue.dequeue_all().unwrap(), vec![payload(1)]);
    }

    #[test]
    fn test_mistyped_record_does_not_drop_valid_ones() {
        let stored = r#"[
            {"title": "valid", "body": "kept", "timestamp": 1},
            {"title": "x", "timestamp": 1.7e12},
            {"title": null, "timestamp": "1700000000000"},
            "not a record"
        ]"#;
        let queue = NotificationQueue::new(MemoryStorage::with_contents(stored));
        assert!(queue.has_pending());
        assert_eq!(queue.len(), 3);

        queue.enqueue(payload(9)).unwrap();
        let drained = queue.dequeue_all().unwrap();
        let titles: Vec<_> = drained.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["valid", "x", "", "title 9"]);
        assert_eq!(drained[0].body, "kept");
        assert_eq!(drained[1].timestamp, 1_700_000_000_000);
        assert_eq!(drained[2].timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_non_array_storage_reads_as_empty() {
        let queue = NotificationQueue::new(MemoryStorage::with_contents(r#"{"title": "x"}"#));
        assert!(!queue.has_pending());
        assert!(queue.dequeue_all().unwrap().is_empty());
    }

    #[test]
    fn test_empty_array_is_not_pending() {
        let queue = NotificationQueue::new(MemoryStorage::with_contents("[]"));
        assert!(!queue.has_pending());
    }

    #[test]
    fn test_queue_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notification_queue.json");

        let queue = NotificationQueue::new(FileStorage::new(&path));
        queue.enqueue(payload(7)).unwrap();
        drop(queue);

        let reopened = NotificationQueue::new(FileStorage::new(&path));
        assert!(reopened.has_pending());
        assert_eq!(reopened.dequeue_all().unwrap(), vec![payload(7)]);
        assert!(!path.exists());
    }

    #[test]
    fn test_concurrent_enqueues_are_not_lost() {
        let queue = Arc::new(NotificationQueue::with_capacity(MemoryStorage::new(), 100));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for n in 0..10 {
                        queue.enqueue(payload(t * 10 + n)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(queue.len(), 40);
    }

    #[test]
    fn test_zero_capacity_clamps() {
        let queue = NotificationQueue::with_capacity(MemoryStorage::new(), 0);
        queue.enqueue(payload(1)).unwrap();
        queue.enqueue(payload(2)).unwrap();
        assert_eq!(queue.capacity(), 1);
        assert_eq!(queue.dequeue_all().unwrap(), vec![payload(2)]);
    }
}
