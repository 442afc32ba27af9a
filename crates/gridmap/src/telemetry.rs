// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lock-free power-of-two histogram for cheap runtime statistics.
//!
//! Sampling is a single atomic increment on the bucket for
//! `ceil(log2(value))`, cheap enough to sit on the datagram receive path.
//! The reader uses one to track accepted frame sizes; callers can keep their
//! own for latencies or payload sizes.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bucket 0 counts zero; bucket `b` counts values in `[2^(b-1), 2^b)`.
const BUCKET_COUNT: usize = 65;

/// Concurrent histogram over power-of-two buckets.
#[derive(Debug)]
pub struct Histogram {
    buckets: Box<[AtomicU64]>,
}

impl Histogram {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: (0..BUCKET_COUNT).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    fn bucket_for(value: u64) -> usize {
        if value == 0 {
            0
        } else {
            64 - value.leading_zeros() as usize
        }
    }

    /// Record one sample.
    pub fn sample(&self, value: u64) {
        self.buckets[Self::bucket_for(value)].fetch_add(1, Ordering::Relaxed);
    }

    /// Total number of samples recorded.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.buckets.iter().map(|b| b.load(Ordering::Relaxed)).sum()
    }

    /// Upper bound of the bucket containing the p-th percentile sample
    /// (`p` in `0.0..=1.0`), or `None` when the histogram is empty.
    #[must_use]
    pub fn percentile(&self, p: f64) -> Option<u64> {
        let total = self.count();
        if total == 0 {
            return None;
        }
        let rank = ((p.clamp(0.0, 1.0) * total as f64).ceil() as u64).max(1);
        let mut seen = 0u64;
        for (bucket, counter) in self.buckets.iter().enumerate() {
            seen += counter.load(Ordering::Relaxed);
            if seen >= rank {
                return Some(bucket_upper_bound(bucket));
            }
        }
        Some(u64::MAX)
    }

    /// Render non-empty buckets as `<= upper: count` lines.
    #[must_use]
    pub fn report(&self) -> String {
        let mut out = String::new();
        for (bucket, counter) in self.buckets.iter().enumerate() {
            let count = counter.load(Ordering::Relaxed);
            if count > 0 {
                let _ = writeln!(out, "<= {}: {}", bucket_upper_bound(bucket), count);
            }
        }
        out
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

fn bucket_upper_bound(bucket: usize) -> u64 {
    if bucket == 0 {
        0
    } else if bucket >= 64 {
        u64::MAX
    } else {
        (1u64 << bucket) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_assignment() {
        assert_eq!(Histogram::bucket_for(0), 0);
        assert_eq!(Histogram::bucket_for(1), 1);
        assert_eq!(Histogram::bucket_for(2), 2);
        assert_eq!(Histogram::bucket_for(3), 2);
        assert_eq!(Histogram::bucket_for(4), 3);
        assert_eq!(Histogram::bucket_for(1024), 11);
    }

    #[test]
    fn test_count_and_report() {
        let hist = Histogram::new();
        hist.sample(1);
        hist.sample(10);
        hist.sample(100);
        assert_eq!(hist.count(), 3);

        let report = hist.report();
        assert!(report.contains("<= 1: 1"));
        assert!(report.contains("<= 15: 1"));
        assert!(report.contains("<= 127: 1"));
    }

    #[test]
    fn test_percentile() {
        let hist = Histogram::new();
        assert_eq!(hist.percentile(0.5), None);

        for _ in 0..99 {
            hist.sample(8);
        }
        hist.sample(4096);

        assert_eq!(hist.percentile(0.5), Some(15));
        assert_eq!(hist.percentile(1.0), Some(8191));
    }
}
