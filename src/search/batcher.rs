//! Buffer management for search hits
//!
//! Hits accumulate in a local buffer and are handed off as whole batches when
//! the buffer reaches the batch size, and once more when traversal ends.

use super::types::HitRecord;

/// Receiver of completed batches
pub trait DeliverBatch {
    /// Hand off a batch; returns false if the consumer is gone
    fn deliver(&mut self, batch: Vec<HitRecord>) -> bool;
}

impl<F> DeliverBatch for F
where
    F: FnMut(Vec<HitRecord>) -> bool,
{
    fn deliver(&mut self, batch: Vec<HitRecord>) -> bool {
        self(batch)
    }
}

/// Accumulates hits and flushes them in bounded batches
pub struct Batcher<D> {
    buffer: Vec<HitRecord>,
    batch_size: usize,
    delivery: D,
    batches_sent: usize,
}

impl<D: DeliverBatch> Batcher<D> {
    /// `batch_size` of zero is treated as one
    pub fn new(batch_size: usize, delivery: D) -> Self {
        Self {
            buffer: Vec::new(),
            batch_size: batch_size.max(1),
            delivery,
            batches_sent: 0,
        }
    }

    /// Add hit to buffer, flush if full
    ///
    /// Returns false if a flush found the consumer gone.
    pub fn record(&mut self, hit: HitRecord) -> bool {
        self.buffer.push(hit);

        if self.buffer.len() >= self.batch_size {
            return self.flush();
        }
        true
    }

    /// Hand the buffered hits off as one batch. No-op when empty.
    pub fn flush(&mut self) -> bool {
        if self.buffer.is_empty() {
            return true;
        }

        let batch = std::mem::take(&mut self.buffer);
        self.batches_sent += 1;
        self.delivery.deliver(batch)
    }

    /// Hits waiting for the next flush
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn batches_sent(&self) -> usize {
        self.batches_sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn hit(n: usize) -> HitRecord {
        HitRecord::new(Path::new(&format!("/f{n}")), "text/plain")
    }

    #[test]
    fn flushes_exactly_at_batch_size() {
        let mut delivered: Vec<Vec<HitRecord>> = Vec::new();
        {
            let mut batcher = Batcher::new(3, |batch: Vec<HitRecord>| {
                delivered.push(batch);
                true
            });
            for n in 0..7 {
                assert!(batcher.record(hit(n)));
            }
            assert_eq!(batcher.pending(), 1);
            assert!(batcher.flush());
            assert_eq!(batcher.pending(), 0);
            assert_eq!(batcher.batches_sent(), 3);
        }

        let sizes: Vec<_> = delivered.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 1]);
        assert_eq!(delivered[2][0], hit(6));
    }

    #[test]
    fn empty_flush_delivers_nothing() {
        let mut calls = 0;
        let mut batcher = Batcher::new(500, |_: Vec<HitRecord>| {
            calls += 1;
            true
        });
        assert!(batcher.flush());
        assert_eq!(batcher.batches_sent(), 0);
        drop(batcher);
        assert_eq!(calls, 0);
    }

    #[test]
    fn closed_delivery_is_reported() {
        let mut batcher = Batcher::new(1, |_: Vec<HitRecord>| false);
        assert!(!batcher.record(hit(0)));
    }
}
