//! Time-bucketed frame history and cooldown timing.
//!
//! Frames are keyed by `now_ms / bucket_ms`. Lookback is by exact bucket with
//! no nearest-neighbour fallback, and entries older than the retention window
//! are never returned.

use crate::keypoint::KeypointFrame;
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Recent keypoint frames keyed by time bucket
#[derive(Debug, Clone)]
pub struct FrameHistory {
    bucket_ms: u64,
    retention_buckets: u64,
    frames: BTreeMap<u64, KeypointFrame>,
}

impl FrameHistory {
    /// Create a history keeping `retention_ms` worth of buckets
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `bucket_ms` is zero.
    pub fn new(bucket_ms: u64, retention_ms: u64) -> Result<Self> {
        if bucket_ms == 0 {
            return Err(Error::InvalidInput("Bucket size must be greater than 0".to_string()));
        }
        Ok(Self {
            bucket_ms,
            retention_buckets: retention_ms / bucket_ms,
            frames: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn bucket_ms(&self) -> u64 {
        self.bucket_ms
    }

    #[must_use]
    pub fn retention_buckets(&self) -> u64 {
        self.retention_buckets
    }

    /// Bucket index of a timestamp
    #[must_use]
    pub fn bucket_of(&self, now_ms: u64) -> u64 {
        now_ms / self.bucket_ms
    }

    /// Store a frame at the current bucket, replacing one recorded earlier in the same bucket
    pub fn record(&mut self, now_ms: u64, frame: KeypointFrame) -> u64 {
        let bucket = self.bucket_of(now_ms);
        self.frames.insert(bucket, frame);
        bucket
    }

    /// Frame recorded exactly `delay_buckets` before the current bucket
    #[must_use]
    pub fn lookback(&self, now_ms: u64, delay_buckets: u64) -> Option<&KeypointFrame> {
        if delay_buckets > self.retention_buckets {
            return None;
        }
        let bucket = self.bucket_of(now_ms).checked_sub(delay_buckets)?;
        self.frames.get(&bucket)
    }

    /// Drop every bucket older than the retention window, returning how many went
    pub fn expire(&mut self, now_ms: u64) -> usize {
        let cutoff = self.bucket_of(now_ms).saturating_sub(self.retention_buckets);
        let before = self.frames.len();
        self.frames = self.frames.split_off(&cutoff);
        before - self.frames.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

/// Rate limiter for one kind of action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownTimer {
    cooldown_ms: u64,
    last_fired_ms: Option<u64>,
}

impl CooldownTimer {
    #[must_use]
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last_fired_ms: None,
        }
    }

    #[must_use]
    pub fn cooldown_ms(&self) -> u64 {
        self.cooldown_ms
    }

    #[must_use]
    pub fn last_fired_ms(&self) -> Option<u64> {
        self.last_fired_ms
    }

    #[must_use]
    pub fn is_ready(&self, now_ms: u64) -> bool {
        self.last_fired_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= self.cooldown_ms)
    }

    /// Mark as fired if ready; returns whether it fired
    pub fn try_fire(&mut self, now_ms: u64) -> bool {
        if self.is_ready(now_ms) {
            self.last_fired_ms = Some(now_ms);
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.last_fired_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keypoint::{BodyPart, Keypoint};

    fn frame(x: f64) -> KeypointFrame {
        KeypointFrame::from_parts(1.0, [(BodyPart::Nose, Keypoint::new(x, 0.0, 1.0))])
    }

    #[test]
    fn test_zero_bucket_rejected() {
        assert!(FrameHistory::new(0, 100).is_err());
    }

    #[test]
    fn test_record_then_lookback_zero() {
        let mut history = FrameHistory::new(10, 1100).unwrap();
        history.record(12_345, frame(1.0));
        assert_eq!(history.lookback(12_345, 0), Some(&frame(1.0)));
        // same bucket
        assert_eq!(history.lookback(12_349, 0), Some(&frame(1.0)));
        assert!(history.lookback(12_350, 0).is_none());
    }

    #[test]
    fn test_exact_bucket_only() {
        let mut history = FrameHistory::new(10, 1100).unwrap();
        history.record(1_000, frame(1.0));
        assert!(history.lookback(2_000, 100).is_some());
        assert!(history.lookback(2_010, 100).is_none());
        assert!(history.lookback(1_990, 100).is_none());
    }

    #[test]
    fn test_lookback_beyond_retention() {
        let mut history = FrameHistory::new(10, 1100).unwrap();
        history.record(0, frame(1.0));
        assert_eq!(history.retention_buckets(), 110);
        assert!(history.lookback(1_100, 110).is_some());
        assert!(history.lookback(1_110, 111).is_none());
    }

    #[test]
    fn test_expire_drops_old_buckets() {
        let mut history = FrameHistory::new(10, 100).unwrap();
        for t in (0..200).step_by(10) {
            history.record(t, frame(t as f64));
        }
        assert_eq!(history.len(), 20);
        let removed = history.expire(190);
        assert_eq!(removed, 9);
        assert!(history.lookback(190, 10).is_some());
        assert!(history.lookback(190, 11).is_none());
    }

    #[test]
    fn test_cooldown() {
        let mut timer = CooldownTimer::new(2_000);
        assert!(timer.try_fire(500));
        assert!(!timer.try_fire(1_000));
        assert!(!timer.try_fire(2_499));
        assert!(timer.try_fire(2_500));
        timer.reset();
        assert!(timer.is_ready(2_501));
    }
}
